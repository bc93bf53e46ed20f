use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_MAX_CONNECTIONS: u32 = 1;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

// Runtime settings, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bind_addr: SocketAddr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub source: DatabaseSource,
    pub max_connections: u32,
}

/// Where the connection settings came from: a full `DATABASE_URL`, or the
/// individual `DB_*` variables.
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseSource {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        name: String,
    },
}

impl fmt::Debug for DatabaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseSource::Url(_) => f.write_str("Url(<redacted>)"),
            DatabaseSource::Parts { host, port, user, name, .. } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("password", &"<redacted>")
                .field("name", name)
                .finish(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let source = match get("DATABASE_URL") {
            Some(url) => DatabaseSource::Url(url),
            None => DatabaseSource::Parts {
                host: get("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port: parse_or("DB_PORT", get("DB_PORT"), DEFAULT_DB_PORT)?,
                user: get("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?,
                password: get("DB_PASSWORD").unwrap_or_default(),
                name: get("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?,
            },
        };

        let max_connections = parse_or(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        Ok(Config {
            database: DatabaseConfig {
                source,
                max_connections,
            },
            bind_addr,
        })
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.source {
            DatabaseSource::Url(url) => PgConnectOptions::from_str(url),
            DatabaseSource::Parts {
                host,
                port,
                user,
                password,
                name,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(name)),
        }
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn parts_with_defaults() {
        let config =
            Config::from_lookup(lookup(&[("DB_USER", "forms"), ("DB_NAME", "forms_db")])).unwrap();

        assert_eq!(
            config.database.source,
            DatabaseSource::Parts {
                host: "localhost".to_string(),
                port: 5432,
                user: "forms".to_string(),
                password: String::new(),
                name: "forms_db".to_string(),
            }
        );
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.bind_addr, "0.0.0.0:5000".parse().unwrap());
    }

    #[test]
    fn database_url_wins_over_parts() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://u:p@db:5433/app"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();

        assert_eq!(
            config.database.source,
            DatabaseSource::Url("postgres://u:p@db:5433/app".to_string())
        );
        assert!(config.database.connect_options().is_ok());
    }

    #[test]
    fn missing_user_is_reported() {
        let err = Config::from_lookup(lookup(&[("DB_NAME", "forms_db")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DB_USER"));

        // empty counts as unset
        let err = Config::from_lookup(lookup(&[("DB_USER", "forms"), ("DB_NAME", "")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DB_NAME"));
    }

    #[test]
    fn invalid_numbers_and_addresses() {
        let base = [("DB_USER", "forms"), ("DB_NAME", "forms_db")];

        let err = Config::from_lookup(lookup(&[base[0], base[1], ("DB_PORT", "fivefour")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "DB_PORT",
                value: "fivefour".to_string()
            }
        );

        let err = Config::from_lookup(lookup(&[base[0], base[1], ("DB_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", .. }));

        let err = Config::from_lookup(lookup(&[base[0], base[1], ("BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
    }

    #[test]
    fn debug_hides_password() {
        let source = DatabaseSource::Parts {
            host: "localhost".to_string(),
            port: 5432,
            user: "forms".to_string(),
            password: "hunter2".to_string(),
            name: "forms_db".to_string(),
        };
        assert!(!format!("{:?}", source).contains("hunter2"));
    }
}
