//! In-memory reference store.

use crate::{
    PendingWrite, Predicate, Store, StoreError, StoreQuery, StoreResult, StoreSession, WriteBuffer,
};
use relgraph_catalog::SchemaCatalog;
use relgraph_core::{Record, RecordKey};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Table = BTreeMap<RecordKey, Record>;

/// Round-trip counters.
#[derive(Debug, Default)]
pub struct StoreStats {
    lookups: AtomicU64,
    queries: AtomicU64,
    counts: AtomicU64,
    commits: AtomicU64,
}

impl StoreStats {
    pub fn lookups(&self) -> u64 {
        self.lookups.load(AtomicOrdering::Relaxed)
    }

    pub fn queries(&self) -> u64 {
        self.queries.load(AtomicOrdering::Relaxed)
    }

    pub fn counts(&self) -> u64 {
        self.counts.load(AtomicOrdering::Relaxed)
    }

    pub fn commits(&self) -> u64 {
        self.commits.load(AtomicOrdering::Relaxed)
    }

    /// Every read or commit that reached the store.
    pub fn round_trips(&self) -> u64 {
        self.lookups() + self.queries() + self.counts() + self.commits()
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, AtomicOrdering::Relaxed);
    }
}

/// The in-memory store: one ordered table per entity type.
#[derive(Debug)]
pub struct MemoryStore {
    catalog: Arc<SchemaCatalog>,
    tables: RwLock<BTreeMap<String, Table>>,
    stats: StoreStats,
}

impl MemoryStore {
    /// Create an empty store with one table per catalog entity type.
    pub fn new(catalog: Arc<SchemaCatalog>) -> Self {
        let tables = catalog
            .all_types()
            .map(|t| (t.name.clone(), Table::new()))
            .collect();
        Self {
            catalog,
            tables: RwLock::new(tables),
            stats: StoreStats::default(),
        }
    }

    pub fn catalog(&self) -> &Arc<SchemaCatalog> {
        &self.catalog
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Load a record directly, outside any session. Used for seeding.
    pub fn insert(&self, record: Record) -> StoreResult<RecordKey> {
        let key = self.key_of(&record)?;
        let mut tables = self.write_tables()?;
        let table = tables
            .get_mut(record.entity_type())
            .ok_or_else(|| StoreError::UnknownEntityType(record.entity_type().to_string()))?;
        if table.contains_key(&key) {
            return Err(StoreError::duplicate_key(record.entity_type(), &key));
        }
        table.insert(key.clone(), record);
        Ok(key)
    }

    /// Committed record count for an entity type.
    pub fn len(&self, entity_type: &str) -> usize {
        self.read_tables()
            .map(|tables| tables.get(entity_type).map_or(0, |t| t.len()))
            .unwrap_or(0)
    }

    /// Committed record by key, outside any session.
    pub fn get(&self, entity_type: &str, key: &RecordKey) -> Option<Record> {
        self.read_tables()
            .ok()?
            .get(entity_type)?
            .get(key)
            .cloned()
    }

    fn key_of(&self, record: &Record) -> StoreResult<RecordKey> {
        let ty = self
            .catalog
            .entity_type(record.entity_type())
            .ok_or_else(|| StoreError::UnknownEntityType(record.entity_type().to_string()))?;
        Ok(ty.record_key(record)?)
    }

    fn read_tables(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, Table>>> {
        self.tables
            .read()
            .map_err(|_| StoreError::failure("store lock poisoned"))
    }

    fn write_tables(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, Table>>> {
        self.tables
            .write()
            .map_err(|_| StoreError::failure("store lock poisoned"))
    }
}

impl Store for MemoryStore {
    fn open_session(&self) -> StoreResult<Box<dyn StoreSession + '_>> {
        Ok(Box::new(MemorySession::new(self)))
    }
}

/// A session over a MemoryStore.
#[derive(Debug)]
pub struct MemorySession<'s> {
    store: &'s MemoryStore,
    buffer: Option<WriteBuffer>,
}

impl<'s> MemorySession<'s> {
    pub fn new(store: &'s MemoryStore) -> Self {
        Self {
            store,
            buffer: None,
        }
    }

    /// Committed table contents overlaid with this session's pending writes.
    fn visible(&self, entity_type: &str) -> StoreResult<Table> {
        let tables = self.store.read_tables()?;
        let mut table = tables
            .get(entity_type)
            .cloned()
            .ok_or_else(|| StoreError::UnknownEntityType(entity_type.to_string()))?;
        drop(tables);

        if let Some(buffer) = &self.buffer {
            for (key, write) in buffer.writes_for(entity_type) {
                match write {
                    PendingWrite::Upsert(record) => {
                        table.insert(key.clone(), record.clone());
                    }
                    PendingWrite::Delete => {
                        table.remove(key);
                    }
                }
            }
        }
        Ok(table)
    }

    fn lookup(&self, entity_type: &str, key: &RecordKey) -> StoreResult<Option<Record>> {
        if let Some(buffer) = &self.buffer {
            match buffer.get(entity_type, key) {
                Some(PendingWrite::Upsert(record)) => return Ok(Some(record.clone())),
                Some(PendingWrite::Delete) => return Ok(None),
                None => {}
            }
        }
        let tables = self.store.read_tables()?;
        let table = tables
            .get(entity_type)
            .ok_or_else(|| StoreError::UnknownEntityType(entity_type.to_string()))?;
        Ok(table.get(key).cloned())
    }

    fn matching(&self, entity_type: &str, predicate: Option<&Predicate>) -> StoreResult<Vec<Record>> {
        Ok(self
            .visible(entity_type)?
            .into_values()
            .filter(|r| predicate.map_or(true, |p| p.matches(r)))
            .collect())
    }

    fn buffer_mut(&mut self) -> StoreResult<&mut WriteBuffer> {
        self.buffer.as_mut().ok_or(StoreError::NoActiveUnitOfWork)
    }
}

impl StoreSession for MemorySession<'_> {
    fn find_by_key(&mut self, entity_type: &str, key: &RecordKey) -> StoreResult<Option<Record>> {
        StoreStats::bump(&self.store.stats.lookups);
        self.lookup(entity_type, key)
    }

    fn execute(&mut self, query: &StoreQuery) -> StoreResult<Vec<Record>> {
        StoreStats::bump(&self.store.stats.queries);
        log::debug!("executing {}", query);

        let mut records = self.matching(&query.entity_type, query.predicate.as_ref())?;

        // Stable sort keeps key order between equal sort values.
        if !query.order_by.is_empty() {
            records.sort_by(|a, b| {
                query
                    .order_by
                    .iter()
                    .map(|o| o.direction.apply(o.path.read(a).cmp_sortable(o.path.read(b))))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        let window = records.into_iter().skip(query.offset);
        Ok(match query.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        })
    }

    fn count(&mut self, query: &StoreQuery) -> StoreResult<usize> {
        StoreStats::bump(&self.store.stats.counts);
        Ok(self
            .matching(&query.entity_type, query.predicate.as_ref())?
            .len())
    }

    fn begin(&mut self) -> StoreResult<()> {
        if self.buffer.is_some() {
            return Err(StoreError::AlreadyActive);
        }
        self.buffer = Some(WriteBuffer::new());
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.buffer.is_some()
    }

    fn persist(&mut self, record: Record) -> StoreResult<RecordKey> {
        let key = self.store.key_of(&record)?;
        if self.buffer.is_none() {
            return Err(StoreError::NoActiveUnitOfWork);
        }
        if self.lookup(record.entity_type(), &key)?.is_some() {
            return Err(StoreError::duplicate_key(record.entity_type(), &key));
        }
        self.buffer_mut()?.upsert(key.clone(), record);
        Ok(key)
    }

    fn merge(&mut self, record: Record) -> StoreResult<RecordKey> {
        let key = self.store.key_of(&record)?;
        if self.buffer.is_none() {
            return Err(StoreError::NoActiveUnitOfWork);
        }
        if self.lookup(record.entity_type(), &key)?.is_none() {
            return Err(StoreError::not_found(record.entity_type(), &key));
        }
        self.buffer_mut()?.upsert(key.clone(), record);
        Ok(key)
    }

    fn remove(&mut self, entity_type: &str, key: &RecordKey) -> StoreResult<()> {
        if self.buffer.is_none() {
            return Err(StoreError::NoActiveUnitOfWork);
        }
        if self.lookup(entity_type, key)?.is_none() {
            return Err(StoreError::not_found(entity_type, key));
        }
        self.buffer_mut()?.delete(entity_type, key.clone());
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        let mut buffer = self.buffer.take().ok_or(StoreError::NoActiveUnitOfWork)?;
        StoreStats::bump(&self.store.stats.commits);

        let mut tables = self.store.write_tables()?;
        for (entity_type, writes) in buffer.drain() {
            let table = tables.entry(entity_type).or_default();
            for (key, write) in writes {
                match write {
                    PendingWrite::Upsert(record) => {
                        table.insert(key, record);
                    }
                    PendingWrite::Delete => {
                        table.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.buffer
            .take()
            .map(|_| ())
            .ok_or(StoreError::NoActiveUnitOfWork)
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            if !buffer.is_empty() {
                log::warn!("session dropped with {} uncommitted writes", buffer.len());
            }
        }
    }
}
