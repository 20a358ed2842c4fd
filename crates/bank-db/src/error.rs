//! # Storage Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► TerminalError::Db
//!                   │
//!                   ├── NotFound   services turn it into CoreError::CardNotFound
//!                   └── the rest   fatal, the session ends
//! ```

use thiserror::Error;

/// Anything that can go wrong reading or writing cards.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row for this key. Raised by `get`, and by `update` / `remove`
    /// of a card that is already gone.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Adding a card whose number is already stored.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A stored row that does not decode into a valid card.
    #[error("Invalid record for {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// The database could not be opened, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement (constraint, syntax, locked file...).
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn invalid_record(id: impl Into<String>, reason: impl ToString) -> Self {
        DbError::InvalidRecord {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// SQLite reports unique violations as
/// `UNIQUE constraint failed: <table>.<column>`; the column is kept as the
/// field, the offending value is filled in by the caller when it knows it.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        const UNIQUE: &str = "UNIQUE constraint failed: ";

        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "unknown"),
            sqlx::Error::Database(db_err) => match db_err.message().strip_prefix(UNIQUE) {
                Some(column) => DbError::duplicate(column, "unknown"),
                None => DbError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Card", "4000000000000010").to_string(),
            "Card not found: 4000000000000010"
        );
        assert_eq!(
            DbError::duplicate("card number", "4000000000000010").to_string(),
            "Duplicate card number: '4000000000000010' already exists"
        );
        assert_eq!(
            DbError::invalid_record("4000000000000010", "pin is required").to_string(),
            "Invalid record for 4000000000000010: pin is required"
        );
    }

    #[test]
    fn test_sqlx_error_mapping() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());

        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));

        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}
