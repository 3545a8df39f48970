//! Domain rules for the library catalog.
//!
//! Everything here is pure: no I/O, no database types. The storage and HTTP
//! layers build on these types so the same rules apply everywhere.

pub mod book;
pub mod error;
pub mod listing;
pub mod types;
