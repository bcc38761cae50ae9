//! Link-follow capability and the entity representation behind a link.

use crate::error::Cause;
use crate::{ProducerError, ProducerResult};
use relgraph_catalog::{EntityTypeDescriptor, SchemaCatalog};
use relgraph_core::{format_datetime, millis_to_datetime, Entity, Record, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};

/// Fetches the representation a link points at.
///
/// Passed into each mutation call; a failure aborts the whole mutation.
pub trait LinkFollower {
    fn fetch(&self, href: &str) -> Result<String, Cause>;
}

/// Follower for callers that supply no deferred links.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLinks;

impl LinkFollower for NoLinks {
    fn fetch(&self, href: &str) -> Result<String, Cause> {
        Err(format!("link following is not available for {}", href).into())
    }
}

/// Serialized entity: `{"type": "Shop.Category", "properties": {"Id": 1, ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRepresentation {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub properties: Map<String, Json>,
}

impl EntityRepresentation {
    /// Represent a materialized entity under its qualified type name.
    pub fn from_entity(entity_type: &EntityTypeDescriptor, entity: &Entity) -> Self {
        let properties = entity
            .properties
            .iter()
            .map(|p| (p.name.clone(), value_to_json(&p.value)))
            .collect();
        Self {
            type_name: entity_type.full_name(),
            properties,
        }
    }

    pub fn decode(href: &str, text: &str) -> ProducerResult<Self> {
        serde_json::from_str(text).map_err(|e| ProducerError::link_resolution(href, e))
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Build the native record this representation describes. Properties the
    /// type does not declare are ignored.
    pub fn to_record<'c>(
        &self,
        href: &str,
        catalog: &'c SchemaCatalog,
    ) -> ProducerResult<(&'c EntityTypeDescriptor, Record)> {
        let entity_type = catalog
            .entity_type_by_full_name(&self.type_name)
            .ok_or_else(|| {
                ProducerError::link_resolution(href, format!("unknown entity type {}", self.type_name))
            })?;

        let mut record = Record::new(&entity_type.name);
        for (name, json) in &self.properties {
            let Some(prop) = entity_type.property(name) else {
                continue;
            };
            let value = json_to_value(json).ok_or_else(|| {
                ProducerError::link_resolution(href, format!("property {} is not a scalar", name))
            })?;
            prop.write(&mut record, &value)
                .map_err(|e| ProducerError::link_resolution(href, e))?;
        }
        Ok((entity_type, record))
    }
}

fn json_to_value(json: &Json) -> Option<Value> {
    match json {
        Json::Null => Some(Value::Null),
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        Json::String(s) => Some(Value::String(s.clone())),
        Json::Array(_) | Json::Object(_) => None,
    }
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::DateTime(dt) => Json::String(format_datetime(dt)),
        Value::Timestamp(ms) => match millis_to_datetime(*ms) {
            Some(dt) => Json::String(format_datetime(&dt)),
            None => Json::from(*ms),
        },
    }
}
