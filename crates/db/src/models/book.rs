//! Book entity model and DTOs.

use libris_core::book::BookStatus;
use libris_core::error::CoreError;
use libris_core::listing::{self, SortField, SortOrder};
use libris_core::types::{BookId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A book row from the `books` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Book {
    pub id: BookId,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: BookStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Logical-delete flag. Never exposed over the API.
    #[serde(skip_serializing)]
    pub deleted: bool,
}

impl Book {
    /// Build a new, available book with a fresh id. `created_at` and
    /// `updated_at` share the single `now` value.
    pub fn new(payload: BookPayload, now: Timestamp) -> Self {
        Self {
            id: BookId::new_v4(),
            isbn: payload.isbn,
            title: payload.title,
            author: payload.author,
            description: payload.description,
            status: BookStatus::Available,
            created_at: now,
            updated_at: now,
            deleted: false,
        }
    }

    /// Overwrite the mutable metadata fields and bump `updated_at`.
    ///
    /// `id`, `status` and `created_at` are left untouched.
    pub fn apply(&mut self, payload: BookPayload, now: Timestamp) {
        self.isbn = payload.isbn;
        self.title = payload.title;
        self.author = payload.author;
        self.description = payload.description;
        self.updated_at = now;
    }
}

/// Request body shared by create and update.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookPayload {
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 255))]
    pub author: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

pub type CreateBook = BookPayload;
pub type UpdateBook = BookPayload;

impl BookPayload {
    /// Trim surrounding whitespace from every field.
    pub fn sanitize(&mut self) {
        for field in [
            &mut self.isbn,
            &mut self.title,
            &mut self.author,
            &mut self.description,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
    }
}

/// Filters, sorting and pagination for a book listing.
///
/// Accepted both as a JSON body (`POST /books/list`) and as a query string
/// (`GET /books`). Empty filter strings are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListBooksRequest {
    /// 1-based page index. Defaults to 1.
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    /// Items per page. Defaults to 10, capped at 100.
    #[validate(range(min = 1))]
    pub page_size: Option<i64>,
    /// One of `isbn`, `title`, `author`, `status`. Defaults to `title`.
    pub sort_by: Option<String>,
    /// `asc` or `desc`. Defaults to `asc`.
    pub sort_order: Option<String>,

    #[validate(length(max = 20))]
    pub isbn: Option<String>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub author: Option<String>,
    #[validate(length(max = 20))]
    pub status: Option<String>,
    /// Free-text filter matched against title OR description.
    #[validate(length(max = 500))]
    pub text: Option<String>,
}

impl ListBooksRequest {
    /// Normalize the request into a repository query.
    ///
    /// Fails only when a non-empty `status` filter is not a known status.
    pub fn into_query(self) -> Result<BookQuery, CoreError> {
        let status = match non_empty(self.status) {
            Some(s) => Some(s.parse::<BookStatus>()?),
            None => None,
        };

        Ok(BookQuery {
            filter: BookFilter {
                isbn: non_empty(self.isbn),
                title: non_empty(self.title),
                author: non_empty(self.author),
                status,
                text: non_empty(self.text),
            },
            sort_by: SortField::parse_or_default(self.sort_by.as_deref()),
            sort_order: SortOrder::parse_or_default(self.sort_order.as_deref()),
            page: listing::clamp_page(self.page),
            page_size: listing::clamp_page_size(self.page_size),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Conjunctive filter over non-deleted books.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Case-insensitive substring of `isbn`.
    pub isbn: Option<String>,
    /// Case-insensitive substring of `title`.
    pub title: Option<String>,
    /// Case-insensitive substring of `author`.
    pub author: Option<String>,
    /// Exact status match.
    pub status: Option<BookStatus>,
    /// Case-insensitive substring of `title` OR `description`.
    pub text: Option<String>,
}

/// A normalized listing query. Every field is already within bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct BookQuery {
    pub filter: BookFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: i64,
    pub page_size: i64,
}

impl BookQuery {
    pub fn offset(&self) -> i64 {
        listing::page_offset(self.page, self.page_size)
    }
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            filter: BookFilter::default(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: listing::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a book listing plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    /// Total items matching the filter across all pages.
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
}
