use std::sync::Arc;

use libris_db::repositories::PgBookRepo;

use crate::config::ServerConfig;
use crate::services::BookService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: libris_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Book catalog operations backed by PostgreSQL.
    pub books: BookService<PgBookRepo>,
}

impl AppState {
    pub fn new(pool: libris_db::DbPool, config: ServerConfig) -> Self {
        Self {
            books: BookService::new(PgBookRepo::new(pool.clone())),
            pool,
            config: Arc::new(config),
        }
    }
}
