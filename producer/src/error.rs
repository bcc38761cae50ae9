//! Producer error taxonomy.

use relgraph_query::QueryError;
use relgraph_store::StoreError;
use std::error::Error as StdError;
use thiserror::Error;

/// Boxed underlying cause.
pub type Cause = Box<dyn StdError + Send + Sync>;

/// Errors surfaced by producer operations. Every error is terminal for the
/// current call; nothing is retried.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("Entity not found: {message}")]
    EntityNotFound { message: String },

    #[error("Invalid path segment '{segment}': {message}")]
    InvalidPathSegment { segment: String, message: String },

    #[error("Unsupported expression: {message}")]
    UnsupportedExpression { message: String },

    #[error("Invalid skip token {token}: {message}")]
    InvalidSkipToken { token: String, message: String },

    #[error("Cannot convert key for {entity_type}: {message}")]
    KeyConversion { entity_type: String, message: String },

    #[error("Invalid property {property} on {entity_type}: {message}")]
    InvalidProperty {
        entity_type: String,
        property: String,
        message: String,
    },

    #[error("Cannot materialize {entity_type}: {source}")]
    Materialization {
        entity_type: String,
        #[source]
        source: Cause,
    },

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown entity set: {0}")]
    UnknownEntitySet(String),

    #[error("Cannot resolve link {href}: {source}")]
    LinkResolution {
        href: String,
        #[source]
        source: Cause,
    },
}

/// Error kinds, for mapping onto protocol responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EntityNotFound,
    InvalidPathSegment,
    UnsupportedExpression,
    InvalidSkipToken,
    KeyConversion,
    InvalidProperty,
    Materialization,
    StoreFailure,
    UnknownEntitySet,
    LinkResolution,
}

impl ProducerError {
    pub fn entity_not_found(message: impl Into<String>) -> Self {
        Self::EntityNotFound {
            message: message.into(),
        }
    }

    pub fn invalid_path_segment(segment: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPathSegment {
            segment: segment.into(),
            message: message.into(),
        }
    }

    pub fn key_conversion(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::KeyConversion {
            entity_type: entity_type.into(),
            message: message.into(),
        }
    }

    pub fn invalid_property(
        entity_type: impl Into<String>,
        property: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidProperty {
            entity_type: entity_type.into(),
            property: property.into(),
            message: message.into(),
        }
    }

    pub fn materialization(entity_type: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::Materialization {
            entity_type: entity_type.into(),
            source: source.into(),
        }
    }

    pub fn link_resolution(href: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::LinkResolution {
            href: href.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EntityNotFound { .. } => ErrorKind::EntityNotFound,
            Self::InvalidPathSegment { .. } => ErrorKind::InvalidPathSegment,
            Self::UnsupportedExpression { .. } => ErrorKind::UnsupportedExpression,
            Self::InvalidSkipToken { .. } => ErrorKind::InvalidSkipToken,
            Self::KeyConversion { .. } => ErrorKind::KeyConversion,
            Self::InvalidProperty { .. } => ErrorKind::InvalidProperty,
            Self::Materialization { .. } => ErrorKind::Materialization,
            Self::Store(_) => ErrorKind::StoreFailure,
            Self::UnknownEntitySet(_) => ErrorKind::UnknownEntitySet,
            Self::LinkResolution { .. } => ErrorKind::LinkResolution,
        }
    }

    /// Whether the caller's request is at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Materialization | ErrorKind::StoreFailure | ErrorKind::LinkResolution
        )
    }
}

impl From<QueryError> for ProducerError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::UnsupportedExpression { message } => {
                Self::UnsupportedExpression { message }
            }
            QueryError::InvalidSkipToken { token, message } => {
                Self::InvalidSkipToken { token, message }
            }
            QueryError::Store(e) => Self::Store(e),
        }
    }
}

/// Result type for producer operations.
pub type ProducerResult<T> = Result<T, ProducerError>;
