use axum::extract::multipart::MultipartError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::error;

/// Error taxonomy for the portal's HTTP surface.
///
/// Validation problems surface as 400 with the human-readable reason,
/// authorization as 401, unknown ids as 404. Backend faults (database,
/// storage, actor RPC) surface as a generic 500; the detail is logged
/// server-side only.
#[derive(Debug, ThisError)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Actor RPC error: {0}")]
    Actor(String),
}

impl PortalError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            PortalError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            PortalError::Multipart(e) => {
                (StatusCode::BAD_REQUEST, format!("Invalid upload body: {e}"))
            }

            PortalError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),

            PortalError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),

            PortalError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }

            PortalError::Storage(e) => {
                error!(error = %e, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }

            PortalError::Actor(msg) => {
                error!(error = %msg, "actor RPC error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
