//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use dermwoe_core::ModelError;

pub type AppResult<T> = Result<T, AppError>;

pub const INVALID_FILE_FORMAT: &str = "Invalid file format. Please upload a JPEG or PNG image.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Upload errors
    #[error("Invalid file format. Please upload a JPEG or PNG image.")]
    InvalidFileFormat,

    #[error("could not decode image: {0}")]
    InvalidImage(String),

    #[error("malformed request: {0}")]
    BadRequest(String),

    // Form validation errors
    #[error("{0}")]
    ValidationError(String),

    // Inference errors
    #[error("model error: {0}")]
    ModelError(String),

    // Generic errors
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidFileFormat => (StatusCode::BAD_REQUEST, INVALID_FILE_FORMAT.to_string()),
            AppError::InvalidImage(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::ValidationError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::ModelError(msg) => {
                tracing::error!("Model error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed".to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Image(e) => AppError::InvalidImage(e.to_string()),
            other => AppError::ModelError(other.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
