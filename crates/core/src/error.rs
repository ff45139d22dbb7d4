//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (missing
/// references, malformed input). Storage failures belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required argument was missing or malformed (e.g. category omitted on create).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entity could not be resolved by its identifier.
    #[error("{entity} not found with ID: {id}")]
    NotFound { entity: &'static str, id: i64 },
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("Product", 42);
        assert_eq!(err.to_string(), "Product not found with ID: 42");
        assert!(err.is_not_found());
    }

    #[test]
    fn invalid_argument_is_not_a_lookup_failure() {
        let err = DomainError::invalid_argument("Category ID must be provided");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "invalid argument: Category ID must be provided");
    }
}
