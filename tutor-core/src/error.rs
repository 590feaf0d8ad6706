//! Error types for the tutoring core.

use thiserror::Error;

/// Errors raised by a [`LearningStore`](crate::store::LearningStore) backend.
///
/// The assembler never surfaces these to its caller: it logs them and
/// degrades the affected layer to its default.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A stored value could not be read as the expected type.
    #[error("Corrupt {entity} record: {reason}")]
    Corrupt { entity: &'static str, reason: String },
}

/// Errors from loading or validating an [`AssemblerConfig`](crate::config::AssemblerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Corrupt {
            entity: "dialogue",
            reason: "bad json".to_string(),
        };
        assert_eq!(err.to_string(), "Corrupt dialogue record: bad json");

        let err = ConfigError::Invalid {
            field: "recent_window",
            reason: "must be positive".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for recent_window: must be positive"
        );
    }
}
