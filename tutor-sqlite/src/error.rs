//! SQLite adapter error types.

use thiserror::Error;
use tutor_core::StoreError;

/// Errors from the SQLite learning store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A previous holder of the connection panicked.
    #[error("Connection lock poisoned")]
    LockPoisoned,
}

/// Result alias for repository calls.
pub type Result<T> = std::result::Result<T, SqliteStoreError>;

impl SqliteStoreError {
    /// Convert for the core while reading `entity` rows.
    ///
    /// A stored value of the wrong type is a corrupt record; anything else is
    /// a backend failure.
    pub fn into_store_error(self, entity: &'static str) -> StoreError {
        match self {
            SqliteStoreError::Database(
                e @ (rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::IntegralValueOutOfRange(..)),
            ) => StoreError::Corrupt {
                entity,
                reason: e.to_string(),
            },
            other => other.into(),
        }
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(e: SqliteStoreError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Type;

    #[test]
    fn test_wrong_value_type_is_corrupt() {
        let err = SqliteStoreError::Database(rusqlite::Error::InvalidColumnType(
            3,
            "order_index".to_string(),
            Type::Text,
        ));
        assert!(matches!(
            err.into_store_error("corpus"),
            StoreError::Corrupt {
                entity: "corpus",
                ..
            }
        ));
    }

    #[test]
    fn test_other_failures_are_backend_errors() {
        let err = SqliteStoreError::Database(rusqlite::Error::InvalidQuery);
        assert!(matches!(
            err.into_store_error("learner"),
            StoreError::Backend(_)
        ));
        assert!(matches!(
            SqliteStoreError::LockPoisoned.into_store_error("learner"),
            StoreError::Backend(_)
        ));
    }
}
