//! Store error types.

use relgraph_catalog::AccessError;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entity type has no table in the store.
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    /// A record with the same key already exists.
    #[error("duplicate key {key} for {entity_type}")]
    DuplicateKey { entity_type: String, key: String },

    /// No record exists for the key.
    #[error("no {entity_type} record with key {key}")]
    NotFound { entity_type: String, key: String },

    /// A write was attempted outside a unit of work.
    #[error("no unit of work is active")]
    NoActiveUnitOfWork,

    /// A unit of work is already active on this session.
    #[error("unit of work already active")]
    AlreadyActive,

    /// A record could not be read through its accessors.
    #[error("record access failed: {0}")]
    Access(#[from] AccessError),

    /// Any other persistence failure.
    #[error("store failure: {message}")]
    Failure { message: String },
}

impl StoreError {
    pub fn duplicate_key(entity_type: impl Into<String>, key: impl ToString) -> Self {
        Self::DuplicateKey {
            entity_type: entity_type.into(),
            key: key.to_string(),
        }
    }

    pub fn not_found(entity_type: impl Into<String>, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            key: key.to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
