//! Integration tests for `PgBookRepo`.
//!
//! Exercises the repository against a real database to verify that:
//! - Created books round-trip unchanged
//! - Listing filters, sorts and paginates over non-deleted rows only
//! - Logical delete hides a book from every read and write path
//! - Status updates and history appends share the caller's transaction

use assert_matches::assert_matches;
use libris_core::book::BookStatus;
use libris_core::error::CoreError;
use libris_core::listing::{SortField, SortOrder};
use libris_core::types::now;
use libris_db::error::DbError;
use libris_db::models::book::{Book, BookFilter, BookPayload, BookQuery};
use libris_db::repositories::{BookRepository, PgBookRepo};
use libris_db::transaction::{with_transaction, UnitOfWork};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_book(isbn: &str, title: &str, author: &str, description: &str) -> Book {
    Book::new(
        BookPayload {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
        },
        now(),
    )
}

async fn seed(repo: &PgBookRepo, book: &Book) -> String {
    repo.create_book(book).await.unwrap();
    book.id.to_string()
}

async fn transition(repo: &PgBookRepo, id: &str, status: BookStatus) {
    let at = now();
    let mut tx = repo.begin().await.unwrap();
    repo.update_book_status(&mut tx, id, status, at).await.unwrap();
    repo.append_status_change(&mut tx, id, status, at)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

// ---------------------------------------------------------------------------
// Create / get
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_then_get_round_trips(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let book = new_book("9780141439518", "Pride and Prejudice", "Jane Austen", "Manners.");
    let id = seed(&repo, &book).await;

    let found = repo.get_book_by_id(&id).await.unwrap();
    assert_eq!(found, book);
    assert_eq!(found.status, BookStatus::Available);
    assert_eq!(found.created_at, found.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_id_propagates_database_error(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let book = new_book("1", "T", "A", "");
    seed(&repo, &book).await;

    let err = repo.create_book(&book).await.unwrap_err();
    assert_matches!(err, DbError::Database(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_unknown_id_is_not_found(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let err = repo
        .get_book_by_id(&uuid::Uuid::new_v4().to_string())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_id_is_not_found(pool: PgPool) {
    let repo = PgBookRepo::new(pool);

    assert!(repo.get_book_by_id("nope").await.unwrap_err().is_not_found());
    assert!(repo.delete_book("nope").await.unwrap_err().is_not_found());
    assert!(repo
        .get_book_with_history("nope")
        .await
        .unwrap_err()
        .is_not_found());
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_overwrites_fields(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let mut book = new_book("1", "Old", "A", "");
    let id = seed(&repo, &book).await;

    book.title = "New".to_string();
    book.description = "Now with a description".to_string();
    book.updated_at = now();
    repo.update_book(&book).await.unwrap();

    let found = repo.get_book_by_id(&id).await.unwrap();
    assert_eq!(found.title, "New");
    assert_eq!(found.description, "Now with a description");
    assert_eq!(found.created_at, book.created_at);
    assert_eq!(found.updated_at, book.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logical_delete_hides_book(pool: PgPool) {
    let repo = PgBookRepo::new(pool.clone());
    let book = new_book("1", "Gone", "A", "");
    let id = seed(&repo, &book).await;

    repo.delete_book(&id).await.unwrap();

    assert!(repo.get_book_by_id(&id).await.unwrap_err().is_not_found());
    assert!(repo.update_book(&book).await.unwrap_err().is_not_found());
    assert!(repo.delete_book(&id).await.unwrap_err().is_not_found());

    let (books, total) = repo.list_books(&BookQuery::default()).await.unwrap();
    assert!(books.is_empty());
    assert_eq!(total, 0);

    // The row is still physically present.
    let deleted: (bool,) = sqlx::query_as("SELECT deleted FROM books WHERE id = $1")
        .bind(book.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(deleted.0);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_paginates(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    for i in 0..25 {
        seed(&repo, &new_book(&format!("{i}"), &format!("Book {i:02}"), "A", "")).await;
    }

    let query = BookQuery {
        page: 2,
        page_size: 10,
        ..Default::default()
    };
    let (books, total) = repo.list_books(&query).await.unwrap();

    assert_eq!(total, 25);
    assert_eq!(books.len(), 10);
    assert_eq!(books[0].title, "Book 10");
    assert_eq!(books[9].title, "Book 19");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_sorts_by_allowed_field(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    seed(&repo, &new_book("2", "B", "Zola", "")).await;
    seed(&repo, &new_book("1", "A", "Austen", "")).await;
    seed(&repo, &new_book("3", "C", "Melville", "")).await;

    let query = BookQuery {
        sort_by: SortField::Author,
        sort_order: SortOrder::Desc,
        ..Default::default()
    };
    let (books, _) = repo.list_books(&query).await.unwrap();
    let authors: Vec<_> = books.iter().map(|b| b.author.as_str()).collect();
    assert_eq!(authors, ["Zola", "Melville", "Austen"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_substring_filters_are_case_insensitive(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    seed(&repo, &new_book("978-0", "Moby Dick", "Herman Melville", "")).await;
    seed(&repo, &new_book("978-1", "Billy Budd", "Herman Melville", "")).await;
    seed(&repo, &new_book("123-4", "Emma", "Jane Austen", "")).await;

    let query = BookQuery {
        filter: BookFilter {
            author: Some("MELVILLE".to_string()),
            isbn: Some("978".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let (books, total) = repo.list_books(&query).await.unwrap();
    assert_eq!(total, 2);
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["Billy Budd", "Moby Dick"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_wildcards_match_literally(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    seed(&repo, &new_book("1", "100% Cotton", "A", "")).await;
    seed(&repo, &new_book("2", "1000 Cotton Facts", "A", "")).await;

    let query = BookQuery {
        filter: BookFilter {
            title: Some("100%".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let (books, total) = repo.list_books(&query).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(books[0].title, "100% Cotton");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_combines_status_and_text(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let in_title = new_book("1", "War and Peace", "Tolstoy", "");
    let in_description = new_book("2", "Emma", "Austen", "Not about war at all");
    let wrong_status = new_book("3", "The Art of War", "Sun Tzu", "");
    let no_text = new_book("4", "Persuasion", "Austen", "");

    let id_title = seed(&repo, &in_title).await;
    let id_description = seed(&repo, &in_description).await;
    seed(&repo, &wrong_status).await;
    let id_no_text = seed(&repo, &no_text).await;
    let deleted = new_book("5", "War Diaries", "Anon", "");
    let id_deleted = seed(&repo, &deleted).await;

    transition(&repo, &id_title, BookStatus::CheckedOut).await;
    transition(&repo, &id_description, BookStatus::CheckedOut).await;
    transition(&repo, &id_no_text, BookStatus::CheckedOut).await;
    transition(&repo, &id_deleted, BookStatus::CheckedOut).await;
    repo.delete_book(&id_deleted).await.unwrap();

    let query = BookQuery {
        filter: BookFilter {
            status: Some(BookStatus::CheckedOut),
            text: Some("war".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let (books, total) = repo.list_books(&query).await.unwrap();

    assert_eq!(total, 2);
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["Emma", "War and Peace"]);
}

// ---------------------------------------------------------------------------
// Status transitions and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_update_and_history_commit_together(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let book = new_book("1", "T", "A", "");
    let id = seed(&repo, &book).await;

    transition(&repo, &id, BookStatus::CheckedOut).await;
    transition(&repo, &id, BookStatus::Available).await;

    let (found, history) = repo.get_book_with_history(&id).await.unwrap();
    assert_eq!(found.status, BookStatus::Available);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, BookStatus::Available);
    assert_eq!(history[1].status, BookStatus::CheckedOut);
    assert!(history[0].timestamp >= history[1].timestamp);
    assert_eq!(found.updated_at, history[0].timestamp);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_update_on_deleted_book_is_not_found(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let book = new_book("1", "T", "A", "");
    let id = seed(&repo, &book).await;
    repo.delete_book(&id).await.unwrap();

    let mut tx = repo.begin().await.unwrap();
    let err = repo
        .update_book_status(&mut tx, &id, BookStatus::CheckedOut, now())
        .await
        .unwrap_err();
    assert_matches!(err, DbError::Core(CoreError::NotFound { .. }));
    tx.rollback().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_work_rolls_back_status_update(pool: PgPool) {
    let repo = PgBookRepo::new(pool);
    let book = new_book("1", "T", "A", "");
    let id = seed(&repo, &book).await;

    let tx = repo.begin().await.unwrap();
    let worker = repo.clone();
    let work_id = id.clone();
    let result: Result<(), DbError> = with_transaction(tx, move |tx| {
        Box::pin(async move {
            worker
                .update_book_status(tx, &work_id, BookStatus::CheckedOut, now())
                .await?;
            Err::<(), DbError>(CoreError::Internal("history write aborted".to_string()).into())
        })
    })
    .await;

    assert_matches!(result, Err(DbError::Core(CoreError::Internal(_))));
    let (found, history) = repo.get_book_with_history(&id).await.unwrap();
    assert_eq!(found.status, BookStatus::Available);
    assert_eq!(found.updated_at, book.updated_at);
    assert!(history.is_empty());
}
