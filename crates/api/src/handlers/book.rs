//! Handlers for the `/books` resource.
//!
//! Request bodies are trimmed and validated here; everything else is
//! delegated to [`BookService`](crate::services::BookService).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use libris_db::models::book::{Book, BookPage, CreateBook, ListBooksRequest, UpdateBook};
use libris_db::models::status_change::BookDetail;
use validator::Validate;

use crate::error::AppResult;
use crate::response::MessageResponse;
use crate::state::AppState;

/// POST /api/v1/books
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(mut input) = body?;
    input.sanitize();
    input.validate()?;

    let book = state.books.create_book(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// POST /api/v1/books/list
///
/// Filters, sort and paging arrive as a JSON body. An absent body field
/// falls back to its default.
pub async fn list(
    State(state): State<AppState>,
    body: Result<Json<ListBooksRequest>, JsonRejection>,
) -> AppResult<Json<BookPage>> {
    let Json(request) = body?;
    run_list(&state, request).await
}

/// GET /api/v1/books
///
/// Same as [`list`] with the parameters taken from the query string.
pub async fn list_by_query(
    State(state): State<AppState>,
    params: Result<Query<ListBooksRequest>, QueryRejection>,
) -> AppResult<Json<BookPage>> {
    let Query(request) = params?;
    run_list(&state, request).await
}

/// GET /api/v1/books/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.books.get_book(&id).await?;
    Ok(Json(book))
}

/// PUT /api/v1/books/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateBook>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Json(mut input) = body?;
    input.sanitize();
    input.validate()?;

    let book = state.books.update_book(&id, input).await?;
    Ok(Json(book))
}

/// DELETE /api/v1/books/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.books.delete_book(&id).await?;
    Ok(Json(MessageResponse::new("Book deleted")))
}

/// PUT /api/v1/books/{id}/checkout
pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.books.checkout_book(&id).await?;
    Ok(Json(MessageResponse::new("Book checked out")))
}

/// PUT /api/v1/books/{id}/checkin
pub async fn checkin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.books.checkin_book(&id).await?;
    Ok(Json(MessageResponse::new("Book checked in")))
}

/// GET /api/v1/books/{id}/details
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookDetail>> {
    let detail = state.books.get_book_with_history(&id).await?;
    Ok(Json(detail))
}

// ── Private helpers ──────────────────────────────────────────────────────

async fn run_list(state: &AppState, request: ListBooksRequest) -> AppResult<Json<BookPage>> {
    request.validate()?;
    let query = request.into_query()?;
    let page = state.books.list_books(query).await?;
    Ok(Json(page))
}
