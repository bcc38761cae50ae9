//! Common error types for relgraph core values.

use thiserror::Error;

/// A key or literal could not be parsed.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid key literal '{input}': {message}")]
pub struct KeyParseError {
    pub input: String,
    pub message: String,
}

impl KeyParseError {
    pub fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Report the error against a larger enclosing input.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }
}

/// Result type for literal parsing.
pub type KeyParseResult<T> = Result<T, KeyParseError>;
