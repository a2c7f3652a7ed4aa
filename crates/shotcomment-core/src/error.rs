use thiserror::Error;

/// Rejection raised when a value is written to a validated field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{field}' found empty, while only non-empty lists or strings are valid.")]
    Empty { field: String },

    #[error("'{field}' must be a list or a string")]
    Unsized { field: String },

    #[error("'{field}' must be string or bool!")]
    NotBoolLike { field: String },

    #[error("'{field}' must be either 'false' or 'true'.")]
    InvalidBool { field: String },

    #[error("'{field}' could not be prepared for validation: {reason}")]
    Unrepresentable { field: String, reason: String },
}

/// Core crate error types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Missing required environment variable: {0}")]
    MissingConfig(String),

    #[error("Environment variable {0} is not valid unicode")]
    InvalidEnv(String),

    #[error("Invalid configuration value: {0}")]
    Validation(#[from] ValidationError),

    #[error("This action only works for {supported:?} event(s), got '{event}'")]
    UnsupportedEvent {
        event: String,
        supported: Vec<String>,
    },

    #[error("Field '{0}' was read before a value was set")]
    UnsetField(&'static str),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_event_message_lists_events() {
        let err = CoreError::UnsupportedEvent {
            event: "push".to_string(),
            supported: vec!["pull_request".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "This action only works for [\"pull_request\"] event(s), got 'push'"
        );
    }

    #[test]
    fn test_validation_error_converts() {
        let err: CoreError = ValidationError::Empty {
            field: "images".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("'images' found empty"));
    }
}
