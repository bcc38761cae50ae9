//! EntityMaterializer: store records to protocol entities.

use crate::relations::{load_related, RelatedRecords};
use crate::{KeyCodec, ProducerError, ProducerResult};
use relgraph_catalog::{EntityTypeDescriptor, NavigationPropertyDescriptor, SchemaCatalog};
use relgraph_core::{Entity, Link, Property, Record};
use relgraph_store::StoreSession;

/// Builds entities from records, expanding navigation properties on request.
pub struct EntityMaterializer<'a> {
    catalog: &'a SchemaCatalog,
}

impl<'a> EntityMaterializer<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Materialize one record. Either the whole entity, expansions included,
    /// is built or an error is returned.
    pub fn materialize(
        &self,
        session: &mut dyn StoreSession,
        entity_type: &EntityTypeDescriptor,
        record: &Record,
        expand: &[String],
    ) -> ProducerResult<Entity> {
        let mut entity = Entity::new(self.entity_set_name(entity_type), &entity_type.name);

        for prop in &entity_type.properties {
            let value = prop
                .read(record)
                .map_err(|e| ProducerError::materialization(&entity_type.name, e))?;
            let property = Property::new(&prop.name, prop.value_type, value);
            entity.properties.push(if entity_type.is_key(&prop.name) {
                property.as_key()
            } else {
                property
            });
        }
        entity.key = Some(KeyCodec::new(entity_type).entity_key(record)?);

        for (head, nested) in group_expand(expand) {
            let navigation = entity_type.navigation(head).ok_or_else(|| {
                ProducerError::invalid_path_segment(
                    head,
                    format!("{} has no navigation property {}", entity_type.name, head),
                )
            })?;
            let link = self.expand(session, entity_type, navigation, record, &nested)?;
            entity.links.push(link);
        }

        Ok(entity)
    }

    /// Materialize several records of one type.
    pub fn materialize_all(
        &self,
        session: &mut dyn StoreSession,
        entity_type: &EntityTypeDescriptor,
        records: &[Record],
        expand: &[String],
    ) -> ProducerResult<Vec<Entity>> {
        let mut entities = Vec::with_capacity(records.len());
        for record in records {
            entities.push(self.materialize(session, entity_type, record, expand)?);
        }
        Ok(entities)
    }

    fn expand(
        &self,
        session: &mut dyn StoreSession,
        owner: &EntityTypeDescriptor,
        navigation: &NavigationPropertyDescriptor,
        record: &Record,
        nested: &[String],
    ) -> ProducerResult<Link> {
        let target = self.catalog.entity_type(&navigation.target_type).ok_or_else(|| {
            ProducerError::materialization(
                &owner.name,
                format!("unknown target type {}", navigation.target_type),
            )
        })?;

        match load_related(session, owner, navigation, record)? {
            RelatedRecords::Many(records) => {
                let related = self.materialize_all(session, target, &records, nested)?;
                Ok(Link::entities(&navigation.name, related))
            }
            RelatedRecords::One(Some(related)) => {
                let related = self.materialize(session, target, &related, nested)?;
                Ok(Link::entity(&navigation.name, Some(related)))
            }
            RelatedRecords::One(None) => Ok(Link::entity(&navigation.name, None)),
        }
    }

    fn entity_set_name(&self, entity_type: &EntityTypeDescriptor) -> String {
        self.catalog
            .entity_set_for(&entity_type.name)
            .map(|set| set.name.clone())
            .unwrap_or_else(|| entity_type.name.clone())
    }
}

/// Group expand paths by their first segment, keeping first-seen order.
/// `A/B` and `A/C` become `A -> [B, C]`.
fn group_expand(paths: &[String]) -> Vec<(&str, Vec<String>)> {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for path in paths {
        let (head, rest) = match path.split_once('/') {
            Some((head, rest)) => (head.trim(), Some(rest)),
            None => (path.trim(), None),
        };
        if head.is_empty() {
            continue;
        }
        let index = match groups.iter().position(|(h, _)| *h == head) {
            Some(index) => index,
            None => {
                groups.push((head, Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(rest) = rest.filter(|r| !r.is_empty()) {
            groups[index].1.push(rest.to_string());
        }
    }
    groups
}
