//! Book catalog operations: CRUD, listing, and the checkout/checkin workflow.
//!
//! [`BookService`] is generic over [`BookRepository`] so the HTTP layer runs
//! against PostgreSQL while unit tests run against the in-memory repository.

use libris_core::book::StatusTransition;
use libris_core::listing::total_pages;
use libris_core::types::now;
use libris_db::error::DbError;
use libris_db::models::book::{Book, BookPage, BookQuery, CreateBook, UpdateBook};
use libris_db::models::status_change::BookDetail;
use libris_db::repositories::BookRepository;
use libris_db::transaction::with_transaction;

/// Book operations on top of a [`BookRepository`].
#[derive(Debug, Clone)]
pub struct BookService<R> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Create a new `available` book with a fresh id.
    pub async fn create_book(&self, input: CreateBook) -> Result<Book, DbError> {
        let book = Book::new(input, now());
        self.repo.create_book(&book).await?;
        tracing::info!(book_id = %book.id, isbn = %book.isbn, "Book created");
        Ok(book)
    }

    /// One page of books matching `query`, with paging metadata.
    pub async fn list_books(&self, query: BookQuery) -> Result<BookPage, DbError> {
        let (books, total_items) = self.repo.list_books(&query).await?;
        tracing::debug!(
            total_items,
            page = query.page,
            page_size = query.page_size,
            "Listed books"
        );
        Ok(BookPage {
            books,
            total_items,
            total_pages: total_pages(total_items, query.page_size),
            current_page: query.page,
            page_size: query.page_size,
        })
    }

    pub async fn get_book(&self, id: &str) -> Result<Book, DbError> {
        self.repo.get_book_by_id(id).await
    }

    /// Overwrite the descriptive fields of an existing book.
    ///
    /// Status, id and `created_at` are left untouched.
    pub async fn update_book(&self, id: &str, input: UpdateBook) -> Result<Book, DbError> {
        let mut book = self.repo.get_book_by_id(id).await?;
        book.apply(input, now());
        self.repo.update_book(&book).await?;
        tracing::info!(book_id = %book.id, "Book updated");
        Ok(book)
    }

    /// Logically delete a book. A second delete reports `NotFound`.
    pub async fn delete_book(&self, id: &str) -> Result<(), DbError> {
        self.repo.delete_book(id).await?;
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    pub async fn checkout_book(&self, id: &str) -> Result<(), DbError> {
        self.change_status(id, StatusTransition::Checkout).await
    }

    pub async fn checkin_book(&self, id: &str) -> Result<(), DbError> {
        self.change_status(id, StatusTransition::Checkin).await
    }

    /// The book plus its status history, newest change first.
    pub async fn get_book_with_history(&self, id: &str) -> Result<BookDetail, DbError> {
        let (book, history) = self.repo.get_book_with_history(id).await?;
        Ok(BookDetail { book, history })
    }

    /// Apply `transition` to the book, recording it in the history.
    ///
    /// A transition into the status the book already has succeeds without
    /// writing anything. Otherwise the status update and the history row are
    /// written in one unit of work with the same timestamp.
    async fn change_status(&self, id: &str, transition: StatusTransition) -> Result<(), DbError> {
        let book = self.repo.get_book_by_id(id).await?;
        if transition.is_noop(book.status) {
            tracing::debug!(
                book_id = %book.id,
                status = %book.status,
                transition = transition.name(),
                "Status already set, nothing to record"
            );
            return Ok(());
        }

        let target = transition.target();
        let at = now();
        let repo = self.repo.clone();
        let book_id = book.id.to_string();

        let tx = self.repo.begin().await?;
        with_transaction(tx, move |tx| {
            Box::pin(async move {
                repo.update_book_status(tx, &book_id, target, at).await?;
                repo.append_status_change(tx, &book_id, target, at).await
            })
        })
        .await?;

        tracing::info!(
            book_id = %book.id,
            from = %book.status,
            to = %target,
            "Book status changed"
        );
        Ok(())
    }
}
