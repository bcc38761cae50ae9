//! Query error types.

use relgraph_store::StoreError;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while translating or paging a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unsupported expression: {message}")]
    UnsupportedExpression { message: String },

    #[error("Invalid skip token {token}: {message}")]
    InvalidSkipToken { token: String, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            message: message.into(),
        }
    }

    pub fn invalid_skip_token(token: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSkipToken {
            token: token.into(),
            message: message.into(),
        }
    }
}
