//! Store-native records.
//!
//! A record is what a store session hands back: a bag of named fields. Scalar
//! fields hold values, composite keys live in an embedded sub-record, and
//! relationships hold the native keys of the records they point at.

use crate::value::{datetime_to_millis, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Native primary key of a record: one value per key component, in key order.
#[derive(Debug, Clone)]
pub struct RecordKey(Vec<Value>);

impl RecordKey {
    pub fn new(components: Vec<Value>) -> Self {
        Self(components)
    }

    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    /// Key components in key order.
    pub fn components(&self) -> &[Value] {
        &self.0
    }

    pub fn into_components(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RecordKey {}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.cmp_sortable(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for value in &self.0 {
            hash_value(value, state);
        }
    }
}

/// Hash consistent with `Value::cmp_sortable` equality.
fn hash_value<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => 0u8.hash(state),
        Value::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        Value::Int(i) => {
            2u8.hash(state);
            (*i as f64).to_bits().hash(state);
        }
        Value::Float(f) => {
            2u8.hash(state);
            f.to_bits().hash(state);
        }
        Value::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        Value::DateTime(dt) => {
            4u8.hash(state);
            datetime_to_millis(dt).hash(state);
        }
        Value::Timestamp(ms) => {
            4u8.hash(state);
            ms.hash(state);
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", v.to_literal())?;
        }
        write!(f, ")")
    }
}

/// A field of a store record.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Plain column value.
    Value(Value),
    /// Embedded sub-record (composite key holder).
    Embedded(BTreeMap<String, Value>),
    /// Single-valued relationship.
    Reference(Option<RecordKey>),
    /// Collection-valued relationship.
    References(Vec<RecordKey>),
}

/// A record as held by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entity_type: String,
    fields: BTreeMap<String, Field>,
}

impl Record {
    /// Create an empty record of the given entity type.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style scalar field assignment.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), Field::Value(value.into()));
        self
    }

    /// Builder-style field assignment.
    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// The entity type this record belongs to.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, field: Field) {
        self.fields.insert(name.into(), field);
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        self.fields.remove(name)
    }

    /// Iterate over all fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Scalar value of a plain field.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(Field::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), Field::Value(value));
    }

    /// Component of an embedded sub-record.
    pub fn embedded_value(&self, field: &str, component: &str) -> Option<&Value> {
        match self.fields.get(field) {
            Some(Field::Embedded(sub)) => sub.get(component),
            _ => None,
        }
    }

    /// Set a component of an embedded sub-record, creating the sub-record if
    /// needed. Returns false if `field` holds something other than a sub-record.
    pub fn set_embedded_value(&mut self, field: &str, component: &str, value: Value) -> bool {
        let entry = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Field::Embedded(BTreeMap::new()));
        match entry {
            Field::Embedded(sub) => {
                sub.insert(component.to_string(), value);
                true
            }
            _ => false,
        }
    }
}
