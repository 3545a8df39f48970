//! Repository layer.
//!
//! [`BookRepository`] is the capability set the service layer depends on.
//! [`PgBookRepo`] backs it with PostgreSQL; [`InMemoryBookRepo`] is a test
//! double with the same contract.

pub mod book_repo;
pub mod memory;

pub use book_repo::{BookRepository, PgBookRepo};
pub use memory::InMemoryBookRepo;
