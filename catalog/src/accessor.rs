//! Accessor capabilities: how a declared property is read from and written to
//! a store record.
//!
//! Accessors are resolved once while the catalog is built, so the hot path never
//! has to work out where a property lives in a record.

use relgraph_core::{datetime_to_millis, millis_to_datetime, Field, Record, Value, ValueType};
use thiserror::Error;

/// Errors raised while reading or writing record fields.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Field {field} on {entity_type} does not hold a scalar value")]
    NotAScalar { entity_type: String, field: String },

    #[error("Field {field} on {entity_type} does not hold an embedded key")]
    NotEmbedded { entity_type: String, field: String },

    #[error("Cannot convert {actual} to {expected} for {field}")]
    Conversion {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Property {field} on {entity_type} is not nullable")]
    NullViolation { entity_type: String, field: String },

    #[error("Key component {component} missing on {entity_type}")]
    MissingKeyComponent {
        entity_type: String,
        component: String,
    },

    #[error("Key has {actual} components, {entity_type} declares {expected}")]
    KeyArity {
        entity_type: String,
        expected: usize,
        actual: usize,
    },
}

impl AccessError {
    pub fn not_a_scalar(entity_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::NotAScalar {
            entity_type: entity_type.into(),
            field: field.into(),
        }
    }

    pub fn not_embedded(entity_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::NotEmbedded {
            entity_type: entity_type.into(),
            field: field.into(),
        }
    }

    pub fn conversion(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Conversion {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn null_violation(entity_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self::NullViolation {
            entity_type: entity_type.into(),
            field: field.into(),
        }
    }

    pub fn missing_key_component(
        entity_type: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self::MissingKeyComponent {
            entity_type: entity_type.into(),
            component: component.into(),
        }
    }
}

/// Result type for accessor operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Conversion between the protocol-facing value and the store representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeAdapter {
    /// Stored as-is.
    #[default]
    Identity,
    /// Date/time stored as epoch milliseconds.
    EpochMillis,
}

impl TypeAdapter {
    /// Convert a protocol value into its store representation.
    pub fn to_store(&self, field: &str, value: Value) -> AccessResult<Value> {
        match (self, value) {
            (TypeAdapter::Identity, v) => Ok(v),
            (TypeAdapter::EpochMillis, Value::Null) => Ok(Value::Null),
            (TypeAdapter::EpochMillis, Value::Timestamp(ms)) => Ok(Value::Timestamp(ms)),
            (TypeAdapter::EpochMillis, Value::DateTime(dt)) => {
                Ok(Value::Timestamp(datetime_to_millis(&dt)))
            }
            (TypeAdapter::EpochMillis, other) => {
                Err(AccessError::conversion(field, "DateTime", other.type_name()))
            }
        }
    }

    /// Convert a store value into its protocol representation.
    pub fn from_store(&self, field: &str, value: Value) -> AccessResult<Value> {
        match (self, value) {
            (TypeAdapter::Identity, v) => Ok(v),
            (TypeAdapter::EpochMillis, Value::Null) => Ok(Value::Null),
            (TypeAdapter::EpochMillis, Value::DateTime(dt)) => Ok(Value::DateTime(dt)),
            (TypeAdapter::EpochMillis, Value::Timestamp(ms)) => millis_to_datetime(ms)
                .map(Value::DateTime)
                .ok_or_else(|| AccessError::conversion(field, "DateTime", "out-of-range Timestamp")),
            (TypeAdapter::EpochMillis, other) => {
                Err(AccessError::conversion(field, "Timestamp", other.type_name()))
            }
        }
    }
}

/// Where a property lives inside a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// A plain record field.
    Field { field: String, adapter: TypeAdapter },
    /// A component of an embedded composite key.
    KeyComponent {
        key_field: String,
        component: String,
        adapter: TypeAdapter,
    },
}

impl Accessor {
    pub fn field(field: impl Into<String>) -> Self {
        Accessor::Field {
            field: field.into(),
            adapter: TypeAdapter::Identity,
        }
    }

    pub fn adapter(&self) -> TypeAdapter {
        match self {
            Accessor::Field { adapter, .. } | Accessor::KeyComponent { adapter, .. } => *adapter,
        }
    }

    /// Native field path: the record field and, for key components, the
    /// component inside the embedded key.
    pub fn path(&self) -> (&str, Option<&str>) {
        match self {
            Accessor::Field { field, .. } => (field, None),
            Accessor::KeyComponent {
                key_field,
                component,
                ..
            } => (key_field, Some(component)),
        }
    }

    /// Read the raw store value (no adaptation). Missing fields read as null.
    pub fn get_raw(&self, record: &Record) -> AccessResult<Value> {
        match self {
            Accessor::Field { field, .. } => match record.field(field) {
                None => Ok(Value::Null),
                Some(Field::Value(v)) => Ok(v.clone()),
                Some(_) => Err(AccessError::not_a_scalar(record.entity_type(), field)),
            },
            Accessor::KeyComponent {
                key_field,
                component,
                ..
            } => match record.field(key_field) {
                None => Ok(Value::Null),
                Some(Field::Embedded(sub)) => Ok(sub.get(component).cloned().unwrap_or(Value::Null)),
                Some(_) => Err(AccessError::not_embedded(record.entity_type(), key_field)),
            },
        }
    }

    /// Read the value in its protocol representation.
    pub fn get(&self, record: &Record) -> AccessResult<Value> {
        let raw = self.get_raw(record)?;
        self.adapter().from_store(self.path().0, raw)
    }

    /// Write a protocol value, adapting it to the store representation.
    pub fn set(&self, record: &mut Record, value: Value) -> AccessResult<()> {
        let stored = self.adapter().to_store(self.path().0, value)?;
        match self {
            Accessor::Field { field, .. } => {
                if let Some(existing) = record.field(field) {
                    if !matches!(existing, Field::Value(_)) {
                        return Err(AccessError::not_a_scalar(record.entity_type(), field));
                    }
                }
                record.set_value(field.clone(), stored);
                Ok(())
            }
            Accessor::KeyComponent {
                key_field,
                component,
                ..
            } => {
                if record.set_embedded_value(key_field, component, stored) {
                    Ok(())
                } else {
                    Err(AccessError::not_embedded(record.entity_type(), key_field))
                }
            }
        }
    }
}

/// Coerce a value to a declared type, reporting a conversion error otherwise.
pub fn coerce_value(field: &str, value: &Value, value_type: ValueType) -> AccessResult<Value> {
    value
        .coerce(value_type)
        .ok_or_else(|| AccessError::conversion(field, value_type.name(), value.type_name()))
}
