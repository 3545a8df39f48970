//! Route definitions for the `/books` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::book;
use crate::state::AppState;

/// Routes mounted at `/books`.
///
/// ```text
/// POST   /                  -> create
/// GET    /                  -> list_by_query
/// POST   /list              -> list
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// PUT    /{id}/checkout     -> checkout
/// PUT    /{id}/checkin      -> checkin
/// GET    /{id}/details      -> details
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(book::create).get(book::list_by_query))
        .route("/list", post(book::list))
        .route(
            "/{id}",
            get(book::get_by_id).put(book::update).delete(book::delete),
        )
        .route("/{id}/checkout", put(book::checkout))
        .route("/{id}/checkin", put(book::checkin))
        .route("/{id}/details", get(book::details))
}
