//! In-memory [`BookRepository`] for testing.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use libris_core::book::{parse_book_id, BookStatus};
use libris_core::error::CoreError;
use libris_core::listing::{contains_ignore_case, SortField, SortOrder};
use libris_core::types::{BookId, DbId, Timestamp};
use tokio::sync::RwLock;

use crate::error::{ensure_rows_affected, DbError};
use crate::models::book::{Book, BookFilter, BookQuery};
use crate::models::status_change::StatusChange;
use crate::repositories::BookRepository;
use crate::transaction::UnitOfWork;

#[derive(Debug, Default)]
struct Tables {
    books: HashMap<BookId, Book>,
    history: Vec<StatusChange>,
    next_history_id: DbId,
}

#[derive(Debug, Default)]
struct Switches {
    fail_history_appends: AtomicBool,
    fail_rollbacks: AtomicBool,
    storage_calls: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// In-memory book storage behind a [`RwLock`].
///
/// Clones share the same tables. Writes made through a unit of work are
/// staged and only applied on commit, so rollback leaves no trace, matching
/// the transactional contract of the PostgreSQL implementation.
///
/// ```
/// use libris_db::repositories::{BookRepository, InMemoryBookRepo};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let repo = InMemoryBookRepo::new();
/// assert!(repo.get_book_by_id("missing").await.unwrap_err().is_not_found());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookRepo {
    tables: Arc<RwLock<Tables>>,
    switches: Arc<Switches>,
}

impl InMemoryBookRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `append_status_change` fail with a storage error.
    pub fn fail_history_appends(&self, fail: bool) {
        self.switches
            .fail_history_appends
            .store(fail, AtomicOrdering::SeqCst);
    }

    /// Make every subsequent rollback fail with a storage error.
    pub fn fail_rollbacks(&self, fail: bool) {
        self.switches.fail_rollbacks.store(fail, AtomicOrdering::SeqCst);
    }

    /// Number of operations that reached the tables. Requests rejected
    /// before touching storage (such as malformed ids) are not counted.
    pub fn storage_call_count(&self) -> usize {
        self.switches.storage_calls.load(AtomicOrdering::SeqCst)
    }

    fn record_storage_call(&self) {
        self.switches.storage_calls.fetch_add(1, AtomicOrdering::SeqCst);
    }

    /// Number of committed units of work.
    pub fn commit_count(&self) -> usize {
        self.switches.commits.load(AtomicOrdering::SeqCst)
    }

    /// Number of rolled-back units of work.
    pub fn rollback_count(&self) -> usize {
        self.switches.rollbacks.load(AtomicOrdering::SeqCst)
    }

    /// Raw row lookup, including logically deleted books.
    pub async fn stored_book(&self, id: BookId) -> Option<Book> {
        self.tables.read().await.books.get(&id).cloned()
    }

    /// Number of history rows stored for `id`.
    pub async fn history_len(&self, id: BookId) -> usize {
        self.tables
            .read()
            .await
            .history
            .iter()
            .filter(|c| c.book_id == id)
            .count()
    }

    /// Look up a live book by parsed id.
    async fn live_book(&self, id: &str) -> Result<Book, DbError> {
        let book_id = parse_book_id(id)?;
        self.record_storage_call();
        self.tables
            .read()
            .await
            .books
            .get(&book_id)
            .filter(|b| !b.deleted)
            .cloned()
            .ok_or_else(|| CoreError::book_not_found(id).into())
    }
}

/// A write waiting for commit.
#[derive(Debug)]
enum StagedWrite {
    Status {
        id: BookId,
        status: BookStatus,
        at: Timestamp,
    },
    History {
        book_id: BookId,
        status: BookStatus,
        at: Timestamp,
    },
}

/// Unit of work for [`InMemoryBookRepo`].
#[derive(Debug)]
pub struct InMemoryUnitOfWork {
    tables: Arc<RwLock<Tables>>,
    switches: Arc<Switches>,
    staged: Vec<StagedWrite>,
}

impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;
        for write in self.staged {
            match write {
                StagedWrite::Status { id, status, at } => {
                    if let Some(book) = tables.books.get_mut(&id).filter(|b| !b.deleted) {
                        book.status = status;
                        book.updated_at = at;
                    }
                }
                StagedWrite::History {
                    book_id,
                    status,
                    at,
                } => {
                    tables.next_history_id += 1;
                    let id = tables.next_history_id;
                    tables.history.push(StatusChange {
                        id,
                        book_id,
                        status,
                        timestamp: at,
                    });
                }
            }
        }
        self.switches.commits.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        self.switches.rollbacks.fetch_add(1, AtomicOrdering::SeqCst);
        if self.switches.fail_rollbacks.load(AtomicOrdering::SeqCst) {
            return Err(sqlx::Error::Protocol("simulated rollback failure".to_string()).into());
        }
        Ok(())
    }
}

impl BookRepository for InMemoryBookRepo {
    type Tx = InMemoryUnitOfWork;

    async fn begin(&self) -> Result<InMemoryUnitOfWork, DbError> {
        Ok(InMemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            switches: Arc::clone(&self.switches),
            staged: Vec::new(),
        })
    }

    async fn create_book(&self, book: &Book) -> Result<(), DbError> {
        self.record_storage_call();
        let mut tables = self.tables.write().await;
        if tables.books.contains_key(&book.id) {
            return Err(sqlx::Error::Protocol(format!(
                "duplicate key value violates unique constraint \"books_pkey\": {}",
                book.id
            ))
            .into());
        }
        tables.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn list_books(&self, query: &BookQuery) -> Result<(Vec<Book>, i64), DbError> {
        self.record_storage_call();
        let tables = self.tables.read().await;
        let mut matching: Vec<Book> = tables
            .books
            .values()
            .filter(|b| !b.deleted && matches_filter(b, &query.filter))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ord = compare_by(a, b, query.sort_by);
            let ord = match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset().max(0) as usize)
            .take(query.page_size.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn get_book_by_id(&self, id: &str) -> Result<Book, DbError> {
        self.live_book(id).await
    }

    async fn update_book(&self, book: &Book) -> Result<(), DbError> {
        self.record_storage_call();
        let mut tables = self.tables.write().await;
        let rows = match tables.books.get_mut(&book.id).filter(|b| !b.deleted) {
            Some(stored) => {
                stored.isbn.clone_from(&book.isbn);
                stored.title.clone_from(&book.title);
                stored.author.clone_from(&book.author);
                stored.description.clone_from(&book.description);
                stored.status = book.status;
                stored.updated_at = book.updated_at;
                1
            }
            None => 0,
        };
        ensure_rows_affected(rows, book.id)
    }

    async fn delete_book(&self, id: &str) -> Result<(), DbError> {
        let book_id = parse_book_id(id)?;
        self.record_storage_call();
        let mut tables = self.tables.write().await;
        let rows = match tables.books.get_mut(&book_id).filter(|b| !b.deleted) {
            Some(stored) => {
                stored.deleted = true;
                1
            }
            None => 0,
        };
        ensure_rows_affected(rows, id)
    }

    async fn update_book_status(
        &self,
        tx: &mut InMemoryUnitOfWork,
        id: &str,
        status: BookStatus,
        at: Timestamp,
    ) -> Result<(), DbError> {
        let book = self.live_book(id).await?;
        tx.staged.push(StagedWrite::Status {
            id: book.id,
            status,
            at,
        });
        Ok(())
    }

    async fn append_status_change(
        &self,
        tx: &mut InMemoryUnitOfWork,
        id: &str,
        status: BookStatus,
        at: Timestamp,
    ) -> Result<(), DbError> {
        let book_id = parse_book_id(id)?;
        self.record_storage_call();
        if self
            .switches
            .fail_history_appends
            .load(AtomicOrdering::SeqCst)
        {
            return Err(sqlx::Error::Protocol("simulated history write failure".to_string()).into());
        }
        tx.staged.push(StagedWrite::History {
            book_id,
            status,
            at,
        });
        Ok(())
    }

    async fn get_book_with_history(&self, id: &str) -> Result<(Book, Vec<StatusChange>), DbError> {
        let book = self.live_book(id).await?;
        let mut history: Vec<StatusChange> = self
            .tables
            .read()
            .await
            .history
            .iter()
            .filter(|c| c.book_id == book.id)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok((book, history))
    }
}

fn matches_filter(book: &Book, filter: &BookFilter) -> bool {
    let contains = |field: &str, needle: &Option<String>| {
        needle
            .as_deref()
            .map_or(true, |n| contains_ignore_case(field, n))
    };

    contains(&book.isbn, &filter.isbn)
        && contains(&book.title, &filter.title)
        && contains(&book.author, &filter.author)
        && filter.status.map_or(true, |s| book.status == s)
        && filter.text.as_deref().map_or(true, |t| {
            contains_ignore_case(&book.title, t) || contains_ignore_case(&book.description, t)
        })
}

fn compare_by(a: &Book, b: &Book, field: SortField) -> Ordering {
    match field {
        SortField::Isbn => a.isbn.cmp(&b.isbn),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Author => a.author.cmp(&b.author),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}
