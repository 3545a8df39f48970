//! Repository for the `books` and `book_status_changes` tables.

use std::future::Future;

use libris_core::book::{parse_book_id, BookStatus};
use libris_core::error::CoreError;
use libris_core::listing::contains_pattern;
use libris_core::types::Timestamp;
use sqlx::PgPool;

use crate::error::{ensure_rows_affected, DbError};
use crate::models::book::{Book, BookQuery};
use crate::models::status_change::StatusChange;
use crate::transaction::{PgUnitOfWork, UnitOfWork};

/// Column list shared across `books` queries.
const COLUMNS: &str =
    "id, isbn, title, author, description, status, created_at, updated_at, deleted";

/// Column list for `book_status_changes` queries.
const HISTORY_COLUMNS: &str = "id, book_id, status, timestamp";

/// Storage operations for books and their status history.
///
/// Every read and write ignores logically deleted rows. Ids arrive as text
/// and a malformed id fails with `NotFound` before any query runs.
///
/// `update_book_status` and `append_status_change` never open their own
/// transaction: the caller begins one with [`begin`](Self::begin) and passes
/// it in, so both writes can be committed together.
pub trait BookRepository: Clone + Send + Sync + 'static {
    type Tx: UnitOfWork;

    /// Start a unit of work for writes that must commit together.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, DbError>> + Send;

    /// Insert all fields of `book`. Constraint violations propagate as-is.
    fn create_book(&self, book: &Book) -> impl Future<Output = Result<(), DbError>> + Send;

    /// One page of matching books plus the total match count.
    fn list_books(
        &self,
        query: &BookQuery,
    ) -> impl Future<Output = Result<(Vec<Book>, i64), DbError>> + Send;

    fn get_book_by_id(&self, id: &str) -> impl Future<Output = Result<Book, DbError>> + Send;

    /// Full-field update (metadata, status, `updated_at`) keyed by `book.id`.
    fn update_book(&self, book: &Book) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Logical delete. Fails with `NotFound` if already deleted or missing.
    fn delete_book(&self, id: &str) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Set `status` and `updated_at` on a non-deleted book inside `tx`.
    fn update_book_status(
        &self,
        tx: &mut Self::Tx,
        id: &str,
        status: BookStatus,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Record a transition into `status` at `at` inside `tx`.
    fn append_status_change(
        &self,
        tx: &mut Self::Tx,
        id: &str,
        status: BookStatus,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// The book and its history, most recent change first.
    fn get_book_with_history(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<(Book, Vec<StatusChange>), DbError>> + Send;
}

/// PostgreSQL-backed [`BookRepository`].
#[derive(Debug, Clone)]
pub struct PgBookRepo {
    pool: PgPool,
}

impl PgBookRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl BookRepository for PgBookRepo {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, DbError> {
        PgUnitOfWork::begin(&self.pool).await
    }

    async fn create_book(&self, book: &Book) -> Result<(), DbError> {
        let query = format!(
            "INSERT INTO books ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        );
        sqlx::query(&query)
            .bind(book.id)
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.description)
            .bind(book.status.as_str())
            .bind(book.created_at)
            .bind(book.updated_at)
            .bind(book.deleted)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_books(&self, query: &BookQuery) -> Result<(Vec<Book>, i64), DbError> {
        let filter = &query.filter;

        // Build dynamic WHERE clauses. Every bind value is text.
        let mut conditions = Vec::new();
        let mut args: Vec<String> = Vec::new();
        let mut bind_idx = 1u32;

        if let Some(ref isbn) = filter.isbn {
            conditions.push(format!("isbn ILIKE ${bind_idx}"));
            args.push(contains_pattern(isbn));
            bind_idx += 1;
        }
        if let Some(ref title) = filter.title {
            conditions.push(format!("title ILIKE ${bind_idx}"));
            args.push(contains_pattern(title));
            bind_idx += 1;
        }
        if let Some(ref author) = filter.author {
            conditions.push(format!("author ILIKE ${bind_idx}"));
            args.push(contains_pattern(author));
            bind_idx += 1;
        }
        if let Some(status) = filter.status {
            conditions.push(format!("status = ${bind_idx}"));
            args.push(status.as_str().to_string());
            bind_idx += 1;
        }
        if let Some(ref text) = filter.text {
            conditions.push(format!(
                "(title ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
            ));
            args.push(contains_pattern(text));
            bind_idx += 1;
        }
        conditions.push("deleted = false".to_string());

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let count_query = format!("SELECT COUNT(*) FROM books {where_clause}");
        let mut count = sqlx::query_as::<_, (i64,)>(&count_query);
        for arg in &args {
            count = count.bind(arg);
        }
        let (total,) = count.fetch_one(&self.pool).await?;

        // `id` breaks ties so pages never overlap.
        let select_query = format!(
            "SELECT {COLUMNS} FROM books \
             {where_clause} \
             ORDER BY {sort} {order}, id ASC \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            sort = query.sort_by.column(),
            order = query.sort_order.keyword(),
            next_idx = bind_idx + 1,
        );
        let mut select = sqlx::query_as::<_, Book>(&select_query);
        for arg in &args {
            select = select.bind(arg);
        }
        let books = select
            .bind(query.page_size)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    async fn get_book_by_id(&self, id: &str) -> Result<Book, DbError> {
        let book_id = parse_book_id(id)?;
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1 AND deleted = false");
        sqlx::query_as::<_, Book>(&query)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::book_not_found(id).into())
    }

    async fn update_book(&self, book: &Book) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE books SET \
                isbn = $2, \
                title = $3, \
                author = $4, \
                description = $5, \
                status = $6, \
                updated_at = $7 \
             WHERE id = $1 AND deleted = false",
        )
        .bind(book.id)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.status.as_str())
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;
        ensure_rows_affected(result.rows_affected(), book.id)
    }

    async fn delete_book(&self, id: &str) -> Result<(), DbError> {
        let book_id = parse_book_id(id)?;
        let result =
            sqlx::query("UPDATE books SET deleted = true WHERE id = $1 AND deleted = false")
                .bind(book_id)
                .execute(&self.pool)
                .await?;
        ensure_rows_affected(result.rows_affected(), id)
    }

    async fn update_book_status(
        &self,
        tx: &mut PgUnitOfWork,
        id: &str,
        status: BookStatus,
        at: Timestamp,
    ) -> Result<(), DbError> {
        let book_id = parse_book_id(id)?;
        let result = sqlx::query(
            "UPDATE books SET status = $2, updated_at = $3 WHERE id = $1 AND deleted = false",
        )
        .bind(book_id)
        .bind(status.as_str())
        .bind(at)
        .execute(tx.connection())
        .await?;
        ensure_rows_affected(result.rows_affected(), id)
    }

    async fn append_status_change(
        &self,
        tx: &mut PgUnitOfWork,
        id: &str,
        status: BookStatus,
        at: Timestamp,
    ) -> Result<(), DbError> {
        let book_id = parse_book_id(id)?;
        sqlx::query(
            "INSERT INTO book_status_changes (book_id, status, timestamp) VALUES ($1, $2, $3)",
        )
        .bind(book_id)
        .bind(status.as_str())
        .bind(at)
        .execute(tx.connection())
        .await?;
        Ok(())
    }

    async fn get_book_with_history(&self, id: &str) -> Result<(Book, Vec<StatusChange>), DbError> {
        let book = self.get_book_by_id(id).await?;
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM book_status_changes \
             WHERE book_id = $1 \
             ORDER BY timestamp DESC, id DESC"
        );
        let history = sqlx::query_as::<_, StatusChange>(&query)
            .bind(book.id)
            .fetch_all(&self.pool)
            .await?;
        Ok((book, history))
    }
}
