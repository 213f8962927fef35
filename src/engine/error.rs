// ==========================================
// Procurement Engine - engine error taxonomy
// ==========================================
// Engines classify and return; callers translate for users.
// Any error returned inside an open scope makes the caller roll back.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced id did not resolve
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Operation attempted outside its required source state
    #[error("{entity} {id} is {actual}, expected {expected}")]
    InvalidState {
        entity: String,
        id: String,
        expected: String,
        actual: String,
    },

    /// Malformed input (QR id, invoice XML, quantities, ...)
    #[error("validation failed: {0}")]
    Validation(String),

    /// Cross-supplier access
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("ambiguous result: {entity} matched {count} rows")]
    AmbiguousResult { entity: String, count: usize },

    /// Stored data contradicts itself; the operation must abort
    #[error("data integrity fault: {0}")]
    DataIntegrity(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl EngineError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn invalid_state(
        entity: &str,
        id: impl ToString,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        EngineError::InvalidState {
            entity: entity.to_string(),
            id: id.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            RepositoryError::AmbiguousResult { entity, count } => {
                EngineError::AmbiguousResult { entity, count }
            }
            other => EngineError::Repository(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
