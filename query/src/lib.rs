//! relgraph query
//!
//! Turns abstract query descriptors into store queries and pages.
//!
//! Responsibilities:
//! - Model the abstract filter expression tree and query descriptor
//! - Translate filters and orderings into native predicates (QueryTranslator)
//! - Encode and re-parse continuation (skip) tokens
//! - Window results with one-row overfetch (PaginationEngine)
//! - Evaluate filters in memory for navigation collections

mod descriptor;
mod error;
mod eval;
mod expr;
mod pagination;
mod skip_token;
mod translator;

#[cfg(test)]
mod fixture;

pub use descriptor::{OrderByTerm, QueryDescriptor};
pub use error::{QueryError, QueryResult};
pub use eval::{evaluate, evaluate_value};
pub use expr::{BinaryOp, FilterExpr, Function};
pub use pagination::{fetch_page, window_entities, PageWindow, Window};
pub use relgraph_store::SortDirection;
pub use skip_token::SkipToken;
pub use translator::QueryTranslator;
