use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json as RespJson, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::ConfigError;
use crate::model::user::ValidationError;

/// Failures that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Returned by every [`crate::store::UserStore`] operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid JSON payload: {0}")]
    InvalidPayload(#[from] JsonRejection),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(e) => {
                warn!("❌ Rejected submission: {}", e);
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::InvalidPayload(e) => {
                warn!("❌ Unreadable payload: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON payload".to_string())
            }
            // The cause stays in the logs, the client only sees a generic message.
            ApiError::Persistence(e) => {
                error!("❌ Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
        };

        (status, RespJson(serde_json::json!({ "error": message }))).into_response()
    }
}
