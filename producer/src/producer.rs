//! The producer facade consumed by the protocol layer.

use crate::error::Cause;
use crate::mutation::{EntityRepresentation, LinkFollower, MutationCoordinator};
use crate::navigation::{NavigationResolver, Resolved};
use crate::{
    EntityMaterializer, KeyCodec, NavigationResult, Page, ProducerConfig, ProducerError,
    ProducerResult,
};
use regex_lite::Regex;
use relgraph_catalog::{EntityTypeDescriptor, SchemaCatalog};
use relgraph_core::{Entity, EntityKey, Property, Record, RecordKey};
use relgraph_query::{
    fetch_page, window_entities, PageWindow, QueryDescriptor, QueryTranslator, SkipToken, Window,
};
use relgraph_store::{Store, StoreSession};
use std::sync::{Arc, LazyLock};

/// Entity producer over a store.
///
/// Every operation opens its own store session and drops it before returning.
pub struct Producer<S> {
    catalog: Arc<SchemaCatalog>,
    store: S,
    config: ProducerConfig,
}

impl<S: Store> Producer<S> {
    pub fn new(catalog: Arc<SchemaCatalog>, store: S, config: ProducerConfig) -> Self {
        if catalog.namespace() != config.namespace {
            log::warn!(
                "catalog namespace {} differs from configured namespace {}",
                catalog.namespace(),
                config.namespace
            );
        }
        Self {
            catalog,
            store,
            config,
        }
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    // ==================== Reads ====================

    /// Fetch one entity. `query` may carry expand and select options.
    pub fn get_entity(
        &self,
        entity_set: &str,
        key: &EntityKey,
        query: Option<&QueryDescriptor>,
    ) -> ProducerResult<Entity> {
        let entity_type = self.entity_type(entity_set)?;
        let native = KeyCodec::new(entity_type).to_record_key(key)?;
        let mut session = self.store.open_session()?;
        let record = find(&mut *session, entity_set, entity_type, &native)?;

        let expand = query.map(|q| q.expand.as_slice()).unwrap_or_default();
        let mut entity =
            EntityMaterializer::new(&self.catalog).materialize(&mut *session, entity_type, &record, expand)?;
        if let Some(query) = query {
            project(&mut entity, &query.select);
        }
        Ok(entity)
    }

    /// Fetch one page of an entity set.
    pub fn get_entities(&self, entity_set: &str, query: &QueryDescriptor) -> ProducerResult<Page> {
        let entity_type = self.entity_type(entity_set)?;
        let store_query = QueryTranslator::new(entity_type).translate(query)?;
        let window = PageWindow::from_query(query, self.config.max_results);

        let mut session = self.store.open_session()?;
        let records = fetch_page(&mut *session, store_query, window, query.inline_count)?;
        let materializer = EntityMaterializer::new(&self.catalog);
        let entities = records.try_map(|record| {
            materializer.materialize(&mut *session, entity_type, &record, &query.expand)
        })?;
        Ok(page(entities, query, entity_type))
    }

    /// Follow a navigation path from one entity. Collections are paged like
    /// entity sets; a plain property comes back as a property-only entity.
    pub fn get_nav_property(
        &self,
        entity_set: &str,
        key: &EntityKey,
        path: &str,
        query: &QueryDescriptor,
    ) -> ProducerResult<NavigationResult> {
        let entity_type = self.entity_type(entity_set)?;
        let native = KeyCodec::new(entity_type).to_record_key(key)?;
        let mut session = self.store.open_session()?;
        let root = find(&mut *session, entity_set, entity_type, &native)?;

        let materializer = EntityMaterializer::new(&self.catalog);
        match NavigationResolver::new(&self.catalog).resolve(&mut *session, entity_type, root, path)? {
            Resolved::Single {
                entity_type,
                record,
            } => {
                let mut entity =
                    materializer.materialize(&mut *session, entity_type, &record, &query.expand)?;
                project(&mut entity, &query.select);
                Ok(NavigationResult::Entity(entity))
            }
            Resolved::Collection {
                entity_type,
                records,
            } => {
                let entities =
                    materializer.materialize_all(&mut *session, entity_type, &records, &query.expand)?;
                let window = window_entities(entities, query, entity_type, self.config.max_results)?;
                Ok(NavigationResult::Page(page(window, query, entity_type)))
            }
            Resolved::Property {
                owner,
                property,
                value,
            } => {
                let set = self
                    .catalog
                    .entity_set_for(&owner.name)
                    .map_or(entity_set, |s| s.name.as_str());
                let mut scalar = Property::new(&property.name, property.value_type, value);
                scalar.key = owner.is_key(&property.name);
                Ok(NavigationResult::Entity(
                    Entity::new(set, &owner.name).with_property(scalar),
                ))
            }
        }
    }

    // ==================== Mutations ====================

    /// Create an entity and return it as stored.
    pub fn create_entity(
        &self,
        entity_set: &str,
        entity: &Entity,
        links: &dyn LinkFollower,
    ) -> ProducerResult<Entity> {
        let entity_type = self.entity_type(entity_set)?;
        let mut session = self.store.open_session()?;
        let key = MutationCoordinator::new(&self.catalog).create(&mut *session, entity_type, entity, links)?;
        let record = find(&mut *session, entity_set, entity_type, &key)?;
        EntityMaterializer::new(&self.catalog).materialize(&mut *session, entity_type, &record, &[])
    }

    pub fn update_entity(
        &self,
        entity_set: &str,
        key: &EntityKey,
        entity: &Entity,
        links: &dyn LinkFollower,
    ) -> ProducerResult<()> {
        let entity_type = self.entity_type(entity_set)?;
        let native = KeyCodec::new(entity_type).to_record_key(key)?;
        let mut session = self.store.open_session()?;
        MutationCoordinator::new(&self.catalog).update(&mut *session, entity_type, &native, entity, links)
    }

    pub fn merge_entity(&self, entity_set: &str, key: &EntityKey, entity: &Entity) -> ProducerResult<()> {
        let entity_type = self.entity_type(entity_set)?;
        let native = KeyCodec::new(entity_type).to_record_key(key)?;
        let mut session = self.store.open_session()?;
        MutationCoordinator::new(&self.catalog).merge(&mut *session, entity_type, &native, entity)
    }

    pub fn delete_entity(&self, entity_set: &str, key: &EntityKey) -> ProducerResult<()> {
        let entity_type = self.entity_type(entity_set)?;
        let native = KeyCodec::new(entity_type).to_record_key(key)?;
        let mut session = self.store.open_session()?;
        MutationCoordinator::new(&self.catalog).delete(&mut *session, entity_type, &native)
    }

    fn entity_type(&self, entity_set: &str) -> ProducerResult<&EntityTypeDescriptor> {
        self.catalog
            .entity_set(entity_set)
            .and_then(|set| self.catalog.entity_type(&set.entity_type))
            .ok_or_else(|| ProducerError::UnknownEntitySet(entity_set.to_string()))
    }
}

static HREF_PATTERN: LazyLock<Result<Regex, regex_lite::Error>> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$"));

/// Resolves `Set(key)` hrefs against the producer's own entity sets, so links
/// between entities of one service can be followed without a network hop.
impl<S: Store> LinkFollower for Producer<S> {
    fn fetch(&self, href: &str) -> Result<String, Cause> {
        let pattern = HREF_PATTERN.as_ref().map_err(|e| e.to_string())?;
        let resource = href.rsplit('/').next().unwrap_or(href);
        let captures = pattern
            .captures(resource)
            .ok_or_else(|| format!("{} does not address an entity", href))?;
        let (Some(set), Some(key)) = (captures.get(1), captures.get(2)) else {
            return Err(format!("{} does not address an entity", href).into());
        };

        let key = EntityKey::parse(key.as_str())?;
        let entity = self.get_entity(set.as_str(), &key, None)?;
        let entity_type = self.entity_type(set.as_str())?;
        Ok(EntityRepresentation::from_entity(entity_type, &entity).encode()?)
    }
}

fn find(
    session: &mut dyn StoreSession,
    entity_set: &str,
    entity_type: &EntityTypeDescriptor,
    key: &RecordKey,
) -> ProducerResult<Record> {
    session
        .find_by_key(&entity_type.name, key)?
        .ok_or_else(|| ProducerError::entity_not_found(format!("{}{}", entity_set, key)))
}

/// Turn a window into a page: the continuation token is taken from the last
/// entity before projection drops its sort or key properties.
fn page(window: Window<Entity>, query: &QueryDescriptor, entity_type: &EntityTypeDescriptor) -> Page {
    let continuation = if window.truncated {
        window
            .items
            .last()
            .map(|last| SkipToken::from_entity(last, &query.order_by, entity_type).to_string())
    } else {
        None
    };

    let mut entities = window.items;
    for entity in &mut entities {
        project(entity, &query.select);
    }
    Page {
        entities,
        inline_count: window.inline_count,
        continuation,
    }
}

fn project(entity: &mut Entity, select: &[String]) {
    if !select.is_empty() {
        entity.retain_properties(select);
    }
}
