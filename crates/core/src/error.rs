//! Error types shared across CineHub crates

use thiserror::Error;

/// Top-level error type for CineHub core operations
#[derive(Debug, Error)]
pub enum CineHubError {
    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        key: Option<String>,
    },

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Telemetry error: {0}")]
    TelemetryError(String),
}

impl CineHubError {
    /// Validation error bound to a specific field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Collapse `validator` output into a single error naming the first failing field
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|k| k.to_string());
        Self::ValidationError {
            message: errors.to_string(),
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_field_display() {
        let err = CineHubError::validation_field("title must not be empty", "title");
        assert_eq!(err.to_string(), "Validation error: title must not be empty");
        match err {
            CineHubError::ValidationError { field, .. } => {
                assert_eq!(field.as_deref(), Some("title"))
            }
            _ => panic!("Expected ValidationError"),
        }
    }

    #[test]
    fn test_unknown_variant_display() {
        let err = CineHubError::UnknownVariant {
            kind: "media type",
            value: "podcast".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown media type: podcast");
    }
}
