//! Writing supplied properties and links onto native records.

use super::link::{EntityRepresentation, LinkFollower};
use crate::{KeyCodec, ProducerError, ProducerResult};
use relgraph_catalog::{EntityTypeDescriptor, NavigationPropertyDescriptor, RelationMapping, SchemaCatalog};
use relgraph_core::{Field, Link, Property, Record, RecordKey, Related};
use relgraph_store::StoreSession;

/// Write properties onto a record, adapting date/times to their store form.
/// Key properties are skipped unless `include_keys` is set.
pub(crate) fn apply_properties(
    entity_type: &EntityTypeDescriptor,
    record: &mut Record,
    properties: &[Property],
    include_keys: bool,
) -> ProducerResult<()> {
    for property in properties {
        let descriptor = entity_type.property(&property.name).ok_or_else(|| {
            ProducerError::invalid_property(&entity_type.name, &property.name, "no such property")
        })?;
        if !include_keys && entity_type.is_key(&property.name) {
            continue;
        }
        descriptor
            .write(record, &property.value)
            .map_err(|e| ProducerError::invalid_property(&entity_type.name, &property.name, e.to_string()))?;
    }
    Ok(())
}

/// Resolves supplied links and wires the relationship fields.
pub(crate) struct LinkWiring<'a> {
    pub catalog: &'a SchemaCatalog,
    pub follower: &'a dyn LinkFollower,
}

impl LinkWiring<'_> {
    /// Wire every link of `record`. Inverse-side links update the related
    /// records in the same session.
    pub fn wire(
        &self,
        session: &mut dyn StoreSession,
        entity_type: &EntityTypeDescriptor,
        record: &mut Record,
        links: &[Link],
    ) -> ProducerResult<()> {
        for link in links {
            let name = link.property_name();
            let navigation = entity_type.navigation(name).ok_or_else(|| {
                ProducerError::invalid_property(&entity_type.name, name, "no such navigation property")
            })?;
            let target = self.target_type(entity_type, navigation)?;

            let mut related = Vec::new();
            for key in self.targets(target, link)? {
                let found = session.find_by_key(&target.name, &key)?.ok_or_else(|| {
                    ProducerError::link_resolution(
                        link.href.as_deref().unwrap_or(&link.name),
                        format!("{}{} does not exist", target.name, key),
                    )
                })?;
                related.push((key, found));
            }
            log::debug!(
                "wiring {}.{} to {} record(s)",
                entity_type.name,
                navigation.name,
                related.len()
            );

            match &navigation.mapping {
                RelationMapping::Owned { field } => {
                    let keys = related.into_iter().map(|(key, _)| key).collect();
                    set_owned(record, field, navigation.multiplicity.is_many(), keys);
                }
                RelationMapping::MappedBy { field } => {
                    let own_key = entity_type
                        .record_key(record)
                        .map_err(|e| ProducerError::key_conversion(&entity_type.name, e.to_string()))?;
                    let many = owner_side_is_many(target, field);
                    for (_, mut other) in related {
                        set_owned(&mut other, field, many, vec![own_key.clone()]);
                        session.merge(other)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Native keys of the records a link points at.
    fn targets(&self, target: &EntityTypeDescriptor, link: &Link) -> ProducerResult<Vec<RecordKey>> {
        let codec = KeyCodec::new(target);
        match &link.related {
            Related::Entity(None) => Ok(Vec::new()),
            Related::Entity(Some(entity)) => Ok(vec![codec.key_of_entity(entity)?]),
            Related::Entities(entities) => entities.iter().map(|e| codec.key_of_entity(e)).collect(),
            Related::Deferred => {
                let href = link.href.as_deref().ok_or_else(|| {
                    ProducerError::link_resolution(&link.name, "deferred link without href")
                })?;
                Ok(vec![self.follow(target, href)?])
            }
        }
    }

    fn follow(&self, target: &EntityTypeDescriptor, href: &str) -> ProducerResult<RecordKey> {
        let text = self
            .follower
            .fetch(href)
            .map_err(|e| ProducerError::link_resolution(href, e))?;
        let (entity_type, record) = EntityRepresentation::decode(href, &text)?.to_record(href, self.catalog)?;
        if entity_type.name != target.name {
            return Err(ProducerError::link_resolution(
                href,
                format!("expected {}, found {}", target.name, entity_type.name),
            ));
        }
        entity_type
            .record_key(&record)
            .map_err(|e| ProducerError::link_resolution(href, e))
    }

    fn target_type(
        &self,
        owner: &EntityTypeDescriptor,
        navigation: &NavigationPropertyDescriptor,
    ) -> ProducerResult<&EntityTypeDescriptor> {
        self.catalog.entity_type(&navigation.target_type).ok_or_else(|| {
            ProducerError::invalid_property(
                &owner.name,
                &navigation.name,
                format!("unknown target type {}", navigation.target_type),
            )
        })
    }
}

/// Point `field` at `keys`: a single reference is replaced, a reference list
/// gains the keys it does not hold yet.
fn set_owned(record: &mut Record, field: &str, many: bool, keys: Vec<RecordKey>) {
    if !many {
        record.set_field(field, Field::Reference(keys.into_iter().last()));
        return;
    }
    match record.field_mut(field) {
        Some(Field::References(existing)) => {
            for key in keys {
                if !existing.contains(&key) {
                    existing.push(key);
                }
            }
        }
        _ => record.set_field(field, Field::References(keys)),
    }
}

/// Whether the navigation that owns `field` on `entity_type` holds many references.
fn owner_side_is_many(entity_type: &EntityTypeDescriptor, field: &str) -> bool {
    entity_type.navigations.iter().any(|n| {
        n.multiplicity.is_many() && matches!(&n.mapping, RelationMapping::Owned { field: f } if f == field)
    })
}
