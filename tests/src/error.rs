//! Error types for the test fixtures.

use relgraph_catalog::CatalogError;
use relgraph_store::StoreError;
use thiserror::Error;

/// Result type for fixture setup.
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Errors that can occur while building a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture schema did not build.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Seeding the store failed.
    #[error("seed error: {0}")]
    Seed(#[from] StoreError),

    /// A seed value is malformed.
    #[error("invalid seed value: {0}")]
    InvalidSeed(String),
}
