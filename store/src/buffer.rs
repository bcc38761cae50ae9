//! Write buffer for tracking a unit of work's pending changes.

use relgraph_core::{Record, RecordKey};
use std::collections::BTreeMap;

/// A pending change to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    /// The record will hold this content after commit.
    Upsert(Record),
    /// The record will be gone after commit.
    Delete,
}

/// Unit-of-work buffer. Later writes to the same key replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct WriteBuffer {
    writes: BTreeMap<String, BTreeMap<RecordKey, PendingWrite>>,
}

impl WriteBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an insert or replacement.
    pub fn upsert(&mut self, key: RecordKey, record: Record) {
        self.writes
            .entry(record.entity_type().to_string())
            .or_default()
            .insert(key, PendingWrite::Upsert(record));
    }

    /// Record a deletion.
    pub fn delete(&mut self, entity_type: &str, key: RecordKey) {
        self.writes
            .entry(entity_type.to_string())
            .or_default()
            .insert(key, PendingWrite::Delete);
    }

    /// The pending write for a key, if any.
    pub fn get(&self, entity_type: &str, key: &RecordKey) -> Option<&PendingWrite> {
        self.writes.get(entity_type)?.get(key)
    }

    /// Pending writes for one entity type, in key order.
    pub fn writes_for<'a>(
        &'a self,
        entity_type: &str,
    ) -> impl Iterator<Item = (&'a RecordKey, &'a PendingWrite)> + 'a {
        self.writes.get(entity_type).into_iter().flat_map(|w| w.iter())
    }

    /// Drain every pending write, grouped by entity type.
    pub fn drain(&mut self) -> BTreeMap<String, BTreeMap<RecordKey, PendingWrite>> {
        std::mem::take(&mut self.writes)
    }

    /// Number of pending writes.
    pub fn len(&self) -> usize {
        self.writes.values().map(|w| w.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}
