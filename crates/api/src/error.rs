use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use cinehub_core::CineHubError;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the Synchronization API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

impl From<CineHubError> for ApiError {
    fn from(err: CineHubError) -> Self {
        match err {
            CineHubError::ValidationError { message, .. } => ApiError::Validation(message),
            CineHubError::UnknownVariant { .. } => ApiError::Validation(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (code, message) = match self {
            ApiError::Unauthorized => ("unauthorized", self.to_string()),
            ApiError::InvalidToken(_) => ("invalid_token", self.to_string()),
            ApiError::Validation(_) => ("validation_error", self.to_string()),
            ApiError::NotFound(_) => ("not_found", self.to_string()),
            ApiError::Conflict(_) => ("conflict", self.to_string()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal_error", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": code,
            "error_description": message
        }))
    }
}
