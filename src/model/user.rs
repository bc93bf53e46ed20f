use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use thiserror::Error;

pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// One row of the `users` table, selected by column name.
///
/// Every column is read as nullable: the application never writes nulls, but
/// the schema does not forbid them.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
}

// Response body for GET /fetch-users
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        UserResponse {
            full_name: row.full_name,
            email: row.email,
            country_code: row.country_code,
            phone: row.phone,
            dob: row.dob.map(|dob| dob.format(DOB_FORMAT).to_string()),
            gender: row.gender,
        }
    }
}

// Form payload. Numbers and booleans arrive as text, falsy values as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitFormRequest {
    #[serde(default, deserialize_with = "text_field")]
    pub fullname: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub phonenumber: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "text_field")]
    pub gender: Option<String>,
}

/// A submission that passed every check, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub country_code: String,
    pub phone: String,
    pub dob: NaiveDate,
    pub gender: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid DOB format. Use YYYY-MM-DD")]
    InvalidDob,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static DOB_RE: OnceLock<Regex> = OnceLock::new();

// `$` is end of text, so a trailing newline is rejected
fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^\S+@\S+\.\S+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

// chrono alone accepts short years, signs and leading spaces
fn dob_regex() -> &'static Regex {
    DOB_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}$")
            .unwrap_or_else(|error| panic!("dob regex failed to compile: {error}"))
    })
}

fn text_field<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    })
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

impl SubmitFormRequest {
    /// Checks presence, then email shape, then date shape, stopping at the
    /// first failure.
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let (
            Some(full_name),
            Some(email),
            Some(country_code),
            Some(phone),
            Some(dob),
            Some(gender),
        ) = (
            present(self.fullname),
            present(self.email),
            present(self.code),
            present(self.phonenumber),
            present(self.dob),
            present(self.gender),
        )
        else {
            return Err(ValidationError::MissingFields);
        };

        if !email_regex().is_match(&email) {
            return Err(ValidationError::InvalidEmail);
        }

        if !dob_regex().is_match(&dob) {
            return Err(ValidationError::InvalidDob);
        }
        let dob = NaiveDate::parse_from_str(&dob, DOB_FORMAT)
            .map_err(|_| ValidationError::InvalidDob)?;

        Ok(NewUser {
            full_name,
            email,
            country_code,
            phone,
            dob,
            gender,
        })
    }
}
