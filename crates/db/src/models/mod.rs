//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs validated with `validator`
//! - `Serialize` response shapes assembled by the service layer

pub mod book;
pub mod status_change;
