use thiserror::Error;

/// Error taxonomy for schema and entry operations.
///
/// Validation, conflict, and not-found errors surface synchronously to
/// the caller; transient failures in derivation, normalization, and
/// relation resolution are recovered locally and never reach here.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CoreError {
    /// True when the wrapped database error is a unique-constraint
    /// violation (PostgreSQL SQLSTATE 23505).
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
