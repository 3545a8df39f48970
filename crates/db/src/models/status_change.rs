//! Status history model.

use libris_core::book::BookStatus;
use libris_core::types::{BookId, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::book::Book;

/// A row from the append-only `book_status_changes` table.
///
/// Serialized as `{status, timestamp}`; the keys are internal.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct StatusChange {
    #[serde(skip_serializing)]
    pub id: DbId,
    #[serde(skip_serializing)]
    pub book_id: BookId,
    /// The status the book transitioned into.
    #[sqlx(try_from = "String")]
    pub status: BookStatus,
    pub timestamp: Timestamp,
}

/// A book together with its status history, most recent change first.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub book: Book,
    pub history: Vec<StatusChange>,
}
