//! Domain errors

use thiserror::Error;

/// Domain-level error types
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Single-reason validation failure.
    pub fn validation(reason: impl Into<String>) -> Self {
        DomainError::Validation(vec![reason.into()])
    }

    /// Whether this error is likely transient (e.g. DB connection lost)
    /// and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
