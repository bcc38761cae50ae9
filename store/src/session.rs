//! The store session contract.

use crate::{StoreQuery, StoreResult};
use relgraph_core::{Record, RecordKey};

/// A backing store that hands out per-operation sessions.
pub trait Store: Send + Sync {
    /// Open a fresh session. The session is released when dropped.
    fn open_session(&self) -> StoreResult<Box<dyn StoreSession + '_>>;
}

/// One operation's view of the store.
///
/// Reads observe the session's own uncommitted writes. Writes require an
/// active unit of work and become visible to other sessions on commit.
/// Dropping a session with an active unit of work rolls it back.
pub trait StoreSession {
    /// Look up a record by its native key.
    fn find_by_key(&mut self, entity_type: &str, key: &RecordKey) -> StoreResult<Option<Record>>;

    /// Run a query and return the matching records in order.
    fn execute(&mut self, query: &StoreQuery) -> StoreResult<Vec<Record>>;

    /// Count the records matching the query's predicate, ignoring its window.
    fn count(&mut self, query: &StoreQuery) -> StoreResult<usize>;

    /// Begin a unit of work.
    fn begin(&mut self) -> StoreResult<()>;

    /// Whether a unit of work is active.
    fn is_active(&self) -> bool;

    /// Insert a new record. Fails if the key already exists.
    fn persist(&mut self, record: Record) -> StoreResult<RecordKey>;

    /// Replace an existing record. Fails if no record has the key.
    fn merge(&mut self, record: Record) -> StoreResult<RecordKey>;

    /// Remove a record. Fails if no record has the key.
    fn remove(&mut self, entity_type: &str, key: &RecordKey) -> StoreResult<()>;

    /// Commit the unit of work.
    fn commit(&mut self) -> StoreResult<()>;

    /// Discard the unit of work.
    fn rollback(&mut self) -> StoreResult<()>;
}
