//! MutationCoordinator: create, update, merge and delete, each in one unit of work.

mod apply;
mod link;

pub use link::{EntityRepresentation, LinkFollower, NoLinks};

use crate::{ProducerError, ProducerResult, UnitOfWork};
use apply::{apply_properties, LinkWiring};
use relgraph_catalog::{EntityTypeDescriptor, SchemaCatalog};
use relgraph_core::{Entity, Record, RecordKey};
use relgraph_store::StoreSession;

pub struct MutationCoordinator<'a> {
    catalog: &'a SchemaCatalog,
}

impl<'a> MutationCoordinator<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Insert a new record built from the entity's properties and links.
    /// Returns the native key of the new record.
    pub fn create(
        &self,
        session: &mut dyn StoreSession,
        entity_type: &EntityTypeDescriptor,
        entity: &Entity,
        follower: &dyn LinkFollower,
    ) -> ProducerResult<RecordKey> {
        let mut record = Record::new(&entity_type.name);
        apply_properties(entity_type, &mut record, &entity.properties, true)?;
        let key = entity_type
            .record_key(&record)
            .map_err(|e| ProducerError::key_conversion(&entity_type.name, e.to_string()))?;

        let mut uow = UnitOfWork::begin(session)?;
        self.wiring(follower)
            .wire(uow.session(), entity_type, &mut record, &entity.links)?;
        uow.session().persist(record)?;
        uow.commit()?;

        log::info!("created {}{}", entity_type.name, key);
        Ok(key)
    }

    /// Replace the record at `key` with one built from the entity, as in create.
    /// The key in `key` wins over key properties in the entity.
    pub fn update(
        &self,
        session: &mut dyn StoreSession,
        entity_type: &EntityTypeDescriptor,
        key: &RecordKey,
        entity: &Entity,
        follower: &dyn LinkFollower,
    ) -> ProducerResult<()> {
        let mut uow = UnitOfWork::begin(session)?;
        require(uow.session(), entity_type, key)?;

        let mut record = Record::new(&entity_type.name);
        apply_properties(entity_type, &mut record, &entity.properties, false)?;
        entity_type
            .write_key(&mut record, key)
            .map_err(|e| ProducerError::key_conversion(&entity_type.name, e.to_string()))?;
        self.wiring(follower)
            .wire(uow.session(), entity_type, &mut record, &entity.links)?;
        uow.session().merge(record)?;
        uow.commit()?;

        log::info!("updated {}{}", entity_type.name, key);
        Ok(())
    }

    /// Overwrite only the supplied non-key properties of the record at `key`.
    pub fn merge(
        &self,
        session: &mut dyn StoreSession,
        entity_type: &EntityTypeDescriptor,
        key: &RecordKey,
        entity: &Entity,
    ) -> ProducerResult<()> {
        let mut uow = UnitOfWork::begin(session)?;
        let mut record = require(uow.session(), entity_type, key)?;
        apply_properties(entity_type, &mut record, &entity.properties, false)?;
        uow.session().merge(record)?;
        uow.commit()?;

        log::info!("merged {}{}", entity_type.name, key);
        Ok(())
    }

    pub fn delete(
        &self,
        session: &mut dyn StoreSession,
        entity_type: &EntityTypeDescriptor,
        key: &RecordKey,
    ) -> ProducerResult<()> {
        let mut uow = UnitOfWork::begin(session)?;
        require(uow.session(), entity_type, key)?;
        uow.session().remove(&entity_type.name, key)?;
        uow.commit()?;

        log::info!("deleted {}{}", entity_type.name, key);
        Ok(())
    }

    fn wiring<'f>(&'f self, follower: &'f dyn LinkFollower) -> LinkWiring<'f> {
        LinkWiring {
            catalog: self.catalog,
            follower,
        }
    }
}

fn require(
    session: &mut dyn StoreSession,
    entity_type: &EntityTypeDescriptor,
    key: &RecordKey,
) -> ProducerResult<Record> {
    session
        .find_by_key(&entity_type.name, key)?
        .ok_or_else(|| ProducerError::entity_not_found(format!("{}{}", entity_type.name, key)))
}
