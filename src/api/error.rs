// ==========================================
// Procurement Engine - API error types
// ==========================================
// Translates engine/repository/import errors into caller-facing
// errors. Every message names the offending entity or field.
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Business rule errors
    // ==========================================
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    #[error("invalid state transition: {entity} {id} is {actual}, expected {expected}")]
    InvalidStateTransition {
        entity: String,
        id: String,
        expected: String,
        actual: String,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("ambiguous result: {0}")]
    AmbiguousResult(String),

    #[error("data integrity fault: {0}")]
    DataIntegrity(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    // ==========================================
    // Data access errors
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // Import errors
    // ==========================================
    #[error("file import failed: {0}")]
    ImportError(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    // ==========================================
    // Generic
    // ==========================================
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// From RepositoryError
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::AmbiguousResult { entity, count } => {
                ApiError::AmbiguousResult(format!("{} matched {} rows", entity, count))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("database lock not acquired: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DuplicateEntry(format!("unique constraint: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("foreign key constraint: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("field {}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// From EngineError
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            EngineError::InvalidState {
                entity,
                id,
                expected,
                actual,
            } => ApiError::InvalidStateTransition {
                entity,
                id,
                expected,
                actual,
            },
            EngineError::Validation(msg) => ApiError::ValidationError(msg),
            EngineError::PermissionDenied(msg) => ApiError::PermissionDenied(msg),
            EngineError::DuplicateEntry(msg) => ApiError::DuplicateEntry(msg),
            EngineError::AmbiguousResult { entity, count } => {
                ApiError::AmbiguousResult(format!("{} matched {} rows", entity, count))
            }
            EngineError::DataIntegrity(msg) => ApiError::DataIntegrity(msg),
            EngineError::Repository(err) => err.into(),
        }
    }
}

// ==========================================
// From ImportError
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("file {}", path)),
            e @ (ImportError::RequiredFieldMissing { .. }
            | ImportError::TypeConversionError { .. }
            | ImportError::DuplicateKey { .. }
            | ImportError::MissingColumns(_)) => ApiError::ValidationError(e.to_string()),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
