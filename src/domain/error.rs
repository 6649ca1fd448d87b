//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent allocation logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("invalid spec value for node {id}: {value}")]
    InvalidSpecValue { id: String, value: f64 },

    #[error("invalid allocation spec: {0}")]
    SpecParse(String),
}

/// Result type for domain layer operations.
pub type DomainResult<T> = Result<T, DomainError>;
