use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Supabase returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Device controls are disabled")]
    ControlsDisabled,

    #[error("Cross-site command requests are not allowed")]
    CrossOrigin,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Http(ref e) => {
                tracing::error!("HTTP error talking to Supabase: {:?}", e);
                (StatusCode::BAD_GATEWAY, "Upstream request failed".to_string())
            }
            AppError::Upstream { status, ref message } => {
                tracing::error!(status, "Supabase error: {}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Upstream returned status {}", status),
                )
            }
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ControlsDisabled | AppError::CrossOrigin => {
                (StatusCode::FORBIDDEN, self.to_string())
            }
            ref other => {
                tracing::error!("Internal error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
