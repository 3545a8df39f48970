//! Shared response payloads for API handlers.

use serde::Serialize;

/// `{ "message": "..." }` acknowledgement for operations with no entity to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
