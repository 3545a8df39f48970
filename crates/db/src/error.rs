//! Error type for the storage layer.

use libris_core::error::CoreError;

/// Errors returned by repositories and the transactional unit.
///
/// Domain outcomes (missing or deleted rows, malformed ids) travel as
/// [`CoreError`]; anything the database itself reports is passed through
/// untouched as [`sqlx::Error`].
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::Core(CoreError::NotFound { .. }))
    }
}

/// Map "zero rows affected" by a conditional write to a not-found error.
pub fn ensure_rows_affected(rows_affected: u64, id: impl ToString) -> Result<(), DbError> {
    if rows_affected == 0 {
        return Err(CoreError::book_not_found(id).into());
    }
    Ok(())
}
