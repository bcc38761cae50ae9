//! KeyCodec: external entity keys to native record keys and back.

use crate::{ProducerError, ProducerResult};
use relgraph_catalog::{coerce_value, EntityTypeDescriptor, PropertyDescriptor};
use relgraph_core::{Entity, EntityKey, Record, RecordKey, Value};

/// Converts keys for one entity type.
pub struct KeyCodec<'a> {
    entity_type: &'a EntityTypeDescriptor,
}

impl<'a> KeyCodec<'a> {
    pub fn new(entity_type: &'a EntityTypeDescriptor) -> Self {
        Self { entity_type }
    }

    /// Decompose an external key into the native key, coercing each component
    /// to its declared type and store representation.
    pub fn to_record_key(&self, key: &EntityKey) -> ProducerResult<RecordKey> {
        let props = self.entity_type.key_properties();
        if key.len() != props.len() {
            return Err(self.error(format!(
                "expected {} key component(s), got {}",
                props.len(),
                key.len()
            )));
        }

        let components: Vec<(&PropertyDescriptor, &Value)> = match key {
            EntityKey::Single(value) => props.into_iter().map(|p| (p, value)).collect(),
            EntityKey::Composite(pairs) => props
                .into_iter()
                .map(|prop| {
                    pairs
                        .iter()
                        .find(|(name, _)| name == &prop.name)
                        .map(|(_, value)| (prop, value))
                        .ok_or_else(|| self.error(format!("missing key component {}", prop.name)))
                })
                .collect::<ProducerResult<_>>()?,
        };
        self.encode(components)
    }

    /// Native key from the key properties carried by an entity.
    pub fn key_of_entity(&self, entity: &Entity) -> ProducerResult<RecordKey> {
        let components = self
            .entity_type
            .key_properties()
            .into_iter()
            .map(|prop| {
                entity
                    .value(&prop.name)
                    .map(|value| (prop, value))
                    .ok_or_else(|| self.error(format!("missing key property {}", prop.name)))
            })
            .collect::<ProducerResult<Vec<_>>>()?;
        self.encode(components)
    }

    /// Recompose the external key of a record from its key properties.
    pub fn entity_key(&self, record: &Record) -> ProducerResult<EntityKey> {
        let mut pairs = Vec::new();
        for prop in self.entity_type.key_properties() {
            let value = prop
                .read(record)
                .map_err(|e| ProducerError::materialization(&self.entity_type.name, e))?;
            pairs.push((prop.name.clone(), value));
        }
        if self.entity_type.has_composite_key() {
            return Ok(EntityKey::Composite(pairs));
        }
        match pairs.pop() {
            Some((_, value)) => Ok(EntityKey::Single(value)),
            None => Err(self.error("entity type has no key")),
        }
    }

    fn encode(&self, components: Vec<(&PropertyDescriptor, &Value)>) -> ProducerResult<RecordKey> {
        let mut native = Vec::with_capacity(components.len());
        for (prop, value) in components {
            if value.is_null() {
                return Err(self.error(format!("key component {} is null", prop.name)));
            }
            let stored = coerce_value(&prop.name, value, prop.value_type)
                .and_then(|v| prop.accessor.adapter().to_store(&prop.name, v))
                .map_err(|e| self.error(e.to_string()))?;
            native.push(stored);
        }
        Ok(RecordKey::new(native))
    }

    fn error(&self, message: impl Into<String>) -> ProducerError {
        ProducerError::key_conversion(&self.entity_type.name, message)
    }
}
