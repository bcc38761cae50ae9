//! relgraph store
//!
//! The persistence boundary the producer talks to.
//!
//! Responsibilities:
//! - Define the per-operation session contract (lookups, queries, counts, writes)
//! - Define the native predicate / ordering language and its text rendering
//! - Provide an in-memory reference store with a unit-of-work write buffer

mod buffer;
mod error;
mod memory;
mod predicate;
mod query;
mod session;

pub use buffer::{PendingWrite, WriteBuffer};
pub use error::{StoreError, StoreResult};
pub use memory::{MemorySession, MemoryStore, StoreStats};
pub use predicate::{CompareOp, FieldPath, LikePattern, Operand, OrderBy, Predicate, SortDirection};
pub use query::StoreQuery;
pub use session::{Store, StoreSession};
