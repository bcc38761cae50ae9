//! Protocol-neutral entity representation.
//!
//! An entity is an ordered property bag plus the navigation links that were
//! materialized (expanded) or supplied alongside it.

use crate::{EntityKey, Value, ValueType};

/// A named, typed property value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value_type: ValueType,
    pub value: Value,
    /// Whether the value was read from the entity's key.
    pub key: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value_type: ValueType, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value_type,
            value: value.into(),
            key: false,
        }
    }

    /// Tag this property as key-derived.
    pub fn as_key(mut self) -> Self {
        self.key = true;
        self
    }
}

/// What a navigation link carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    /// Reference only (href), nothing inlined.
    Deferred,
    /// Inlined single related entity, absent if the relationship is empty.
    Entity(Option<Box<Entity>>),
    /// Inlined related collection.
    Entities(Vec<Entity>),
}

/// A navigation link tagged with the navigation property it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Navigation property name (or a relation path whose last segment is one).
    pub name: String,
    pub href: Option<String>,
    pub related: Related,
}

impl Link {
    /// A link to be resolved by following `href`.
    pub fn deferred(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: Some(href.into()),
            related: Related::Deferred,
        }
    }

    /// An inlined single related entity.
    pub fn entity(name: impl Into<String>, entity: Option<Entity>) -> Self {
        Self {
            name: name.into(),
            href: None,
            related: Related::Entity(entity.map(Box::new)),
        }
    }

    /// An inlined related collection.
    pub fn entities(name: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            name: name.into(),
            href: None,
            related: Related::Entities(entities),
        }
    }

    /// The navigation property name: the last `/` segment of the relation.
    pub fn property_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// A materialized entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub entity_set: String,
    pub entity_type: String,
    pub key: Option<EntityKey>,
    pub properties: Vec<Property>,
    pub links: Vec<Link>,
}

impl Entity {
    /// Create an empty entity for the given set and type.
    pub fn new(entity_set: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            entity_set: entity_set.into(),
            entity_type: entity_type.into(),
            ..Default::default()
        }
    }

    /// Builder-style property append.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Builder-style link append.
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Value of a property, if present.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.property(name).map(|p| &p.value)
    }

    /// Look up a link by navigation property name.
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.property_name() == name)
    }

    /// Property names in insertion order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Keep only the named properties (insertion order is preserved).
    pub fn retain_properties(&mut self, names: &[String]) {
        self.properties.retain(|p| names.iter().any(|n| n == &p.name));
    }
}
