//! Schema descriptor types.

use crate::accessor::{coerce_value, AccessError, AccessResult, Accessor};
use relgraph_core::{Field, Record, RecordKey, Value, ValueType};

/// Declared property of an entity type.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Property name.
    pub name: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Whether the property accepts null.
    pub nullable: bool,
    /// Where the property lives in a store record.
    pub accessor: Accessor,
}

impl PropertyDescriptor {
    /// Read the property from a record in its protocol representation.
    pub fn read(&self, record: &Record) -> AccessResult<Value> {
        self.accessor.get(record)
    }

    /// Coerce `value` to the declared type and write it into `record`.
    pub fn write(&self, record: &mut Record, value: &Value) -> AccessResult<()> {
        if value.is_null() && !self.nullable {
            return Err(AccessError::null_violation(record.entity_type(), &self.name));
        }
        let coerced = coerce_value(&self.name, value, self.value_type)?;
        self.accessor.set(record, coerced)
    }
}

/// How many records sit on the far side of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    ZeroOrOne,
    One,
    Many,
}

impl Multiplicity {
    pub fn is_many(&self) -> bool {
        matches!(self, Multiplicity::Many)
    }
}

/// How a relationship is held in store records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationMapping {
    /// This record's `field` holds the reference (or list of references).
    Owned { field: String },
    /// Inverse side: target records whose `field` references this record.
    MappedBy { field: String },
}

/// Navigation property of an entity type.
#[derive(Debug, Clone)]
pub struct NavigationPropertyDescriptor {
    /// Navigation property name.
    pub name: String,
    /// Role of the declaring type in the association.
    pub from_role: String,
    /// Role of the target type in the association.
    pub to_role: String,
    /// Target entity type name.
    pub target_type: String,
    /// Multiplicity of the target end.
    pub multiplicity: Multiplicity,
    /// Store mapping of the relationship.
    pub mapping: RelationMapping,
}

/// Shape of an entity type's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyShape {
    /// A single key property stored directly on the record.
    Simple { property: String },
    /// Composite key stored as an embedded sub-record under `field`.
    Embedded {
        field: String,
        components: Vec<String>,
    },
}

/// A member of an entity type, resolved to what it denotes.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Scalar(&'a PropertyDescriptor),
    SingleRelation(&'a NavigationPropertyDescriptor),
    CollectionRelation(&'a NavigationPropertyDescriptor),
}

impl<'a> Member<'a> {
    /// The navigation descriptor if this member is a relationship.
    pub fn navigation(&self) -> Option<&'a NavigationPropertyDescriptor> {
        match self {
            Member::Scalar(_) => None,
            Member::SingleRelation(nav) | Member::CollectionRelation(nav) => Some(nav),
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Member::Scalar(p) => &p.name,
            Member::SingleRelation(nav) | Member::CollectionRelation(nav) => &nav.name,
        }
    }
}

/// Entity type definition.
#[derive(Debug, Clone)]
pub struct EntityTypeDescriptor {
    /// Type name.
    pub name: String,
    /// Namespace the type is published under.
    pub namespace: String,
    /// Declared properties, in declaration order.
    pub properties: Vec<PropertyDescriptor>,
    /// Primary key shape.
    pub key: KeyShape,
    /// Navigation properties, in declaration order.
    pub navigations: Vec<NavigationPropertyDescriptor>,
}

impl EntityTypeDescriptor {
    /// Namespace-qualified type name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Key property names in key order.
    pub fn key_names(&self) -> Vec<&str> {
        match &self.key {
            KeyShape::Simple { property } => vec![property.as_str()],
            KeyShape::Embedded { components, .. } => {
                components.iter().map(|c| c.as_str()).collect()
            }
        }
    }

    /// Returns true if the key is composite.
    pub fn has_composite_key(&self) -> bool {
        matches!(self.key, KeyShape::Embedded { .. })
    }

    /// Returns true if `name` is a key property.
    pub fn is_key(&self, name: &str) -> bool {
        self.key_names().contains(&name)
    }

    /// Get a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Get a navigation property by name.
    pub fn navigation(&self, name: &str) -> Option<&NavigationPropertyDescriptor> {
        self.navigations.iter().find(|n| n.name == name)
    }

    /// Key property descriptors in key order.
    pub fn key_properties(&self) -> Vec<&PropertyDescriptor> {
        self.key_names()
            .into_iter()
            .filter_map(|name| self.property(name))
            .collect()
    }

    /// Resolve a member name to a scalar property or relationship.
    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        if let Some(prop) = self.property(name) {
            return Some(Member::Scalar(prop));
        }
        self.navigation(name).map(|nav| {
            if nav.multiplicity.is_many() {
                Member::CollectionRelation(nav)
            } else {
                Member::SingleRelation(nav)
            }
        })
    }

    /// Extract the native key of a record.
    pub fn record_key(&self, record: &Record) -> AccessResult<RecordKey> {
        let mut components = Vec::new();
        for prop in self.key_properties() {
            let raw = prop.accessor.get_raw(record)?;
            if raw.is_null() {
                return Err(AccessError::missing_key_component(&self.name, &prop.name));
            }
            components.push(raw);
        }
        Ok(RecordKey::new(components))
    }

    /// Write a native key into a record, building the embedded key sub-record
    /// for composite keys.
    pub fn write_key(&self, record: &mut Record, key: &RecordKey) -> AccessResult<()> {
        let props = self.key_properties();
        if props.len() != key.len() {
            return Err(AccessError::KeyArity {
                entity_type: self.name.clone(),
                expected: props.len(),
                actual: key.len(),
            });
        }
        if let KeyShape::Embedded { field, .. } = &self.key {
            if !matches!(record.field(field), Some(Field::Embedded(_)) | None) {
                return Err(AccessError::not_embedded(&self.name, field));
            }
        }
        for (prop, value) in props.into_iter().zip(key.components()) {
            match &prop.accessor {
                Accessor::Field { field, .. } => record.set_value(field.clone(), value.clone()),
                Accessor::KeyComponent {
                    key_field,
                    component,
                    ..
                } => {
                    record.set_embedded_value(key_field, component, value.clone());
                }
            }
        }
        Ok(())
    }
}

/// An entity set: a named collection of entities of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySetDescriptor {
    pub name: String,
    pub entity_type: String,
}
