pub mod book;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /books                         create (POST), list via query string (GET)
/// /books/list                    list via JSON body (POST)
/// /books/{id}                    get, update, delete
/// /books/{id}/checkout           check out (PUT)
/// /books/{id}/checkin            check in (PUT)
/// /books/{id}/details            book plus status history (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/books", book::router())
}
