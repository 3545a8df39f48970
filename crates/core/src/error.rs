#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The entity is absent, logically deleted, or its identifier is malformed.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing book.
    pub fn book_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Book",
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_not_found_message() {
        let err = CoreError::book_not_found("abc");
        assert_eq!(err.to_string(), "Entity not found: Book with id abc");
    }
}
