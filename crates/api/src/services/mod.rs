//! Business logic sitting between HTTP handlers and the repository layer.

pub mod book;

pub use book::BookService;
