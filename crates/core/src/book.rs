//! Book status values, the checkout/checkin transition table, and book id
//! parsing.
//!
//! Status strings must match the `CHECK` constraint on `books.status` and
//! `book_status_changes.status`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::BookId;

/// Book is on the shelf and can be checked out.
pub const STATUS_AVAILABLE: &str = "available";

/// Book is currently lent out.
pub const STATUS_CHECKED_OUT: &str = "checked_out";

/// All valid status values.
pub const VALID_STATUSES: &[&str] = &[STATUS_AVAILABLE, STATUS_CHECKED_OUT];

/// Circulation status of a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    /// Every new book starts here. The initial state is not written to history.
    #[default]
    Available,
    CheckedOut,
}

impl BookStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => STATUS_AVAILABLE,
            Self::CheckedOut => STATUS_CHECKED_OUT,
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_AVAILABLE => Ok(Self::Available),
            STATUS_CHECKED_OUT => Ok(Self::CheckedOut),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

/// Lets `sqlx` decode the `TEXT` status column via `#[sqlx(try_from = "String")]`.
impl TryFrom<String> for BookStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The two status transitions a book supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// available -> checked_out
    Checkout,
    /// checked_out -> available
    Checkin,
}

impl StatusTransition {
    /// The status a book ends up in after this transition.
    pub fn target(self) -> BookStatus {
        match self {
            Self::Checkout => BookStatus::CheckedOut,
            Self::Checkin => BookStatus::Available,
        }
    }

    /// Whether applying the transition to a book in `current` changes nothing.
    ///
    /// A no-op transition succeeds without touching the book or its history.
    pub fn is_noop(self, current: BookStatus) -> bool {
        current == self.target()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Checkin => "checkin",
        }
    }
}

/// Parse a book id from its textual form.
///
/// A malformed id cannot match any row, so it is reported as
/// [`CoreError::NotFound`] rather than a validation error.
pub fn parse_book_id(id: &str) -> Result<BookId, CoreError> {
    BookId::parse_str(id).map_err(|_| CoreError::book_not_found(id))
}
