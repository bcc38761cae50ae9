//! Value types for relgraph properties.
//!
//! Values are the atomic data carried by entity properties and record fields.
//! `Timestamp` is a store-native representation (epoch milliseconds); protocol
//! facing code works with `DateTime` and the catalog accessors adapt between them.

use chrono::{DateTime, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;

/// Text layout used for date/time literals.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A property or field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Calendar date and time without offset.
    DateTime(NaiveDateTime),
    /// Milliseconds since Unix epoch (store-native).
    Timestamp(i64),
}

/// Declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    String,
    DateTime,
}

impl ValueType {
    /// Type name as it appears in metadata.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "Boolean",
            ValueType::Int => "Int64",
            ValueType::Float => "Double",
            ValueType::String => "String",
            ValueType::DateTime => "DateTime",
        }
    }

    /// Returns true for textual types (quoted in literals).
    pub fn is_textual(&self) -> bool {
        matches!(self, ValueType::String)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a Float or Int value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as date/time, converting from a timestamp when needed.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Timestamp(ms) => millis_to_datetime(*ms),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::DateTime(_) => "DateTime",
            Value::Timestamp(_) => "Timestamp",
        }
    }

    /// The declared type this value naturally belongs to.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::String(_) => Some(ValueType::String),
            Value::DateTime(_) | Value::Timestamp(_) => Some(ValueType::DateTime),
        }
    }

    /// Coerce this value into the given declared type.
    ///
    /// Returns `None` when no lossless conversion exists. Null coerces to Null.
    pub fn coerce(&self, target: ValueType) -> Option<Value> {
        match (self, target) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Bool(b), ValueType::Bool) => Some(Value::Bool(*b)),
            (Value::String(s), ValueType::Bool) => match s.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            (Value::Int(i), ValueType::Int) => Some(Value::Int(*i)),
            (Value::Float(f), ValueType::Int) if f.fract() == 0.0 => {
                let i = *f as i64;
                (i as f64 == *f).then_some(Value::Int(i))
            }
            (Value::String(s), ValueType::Int) => s.trim().parse().ok().map(Value::Int),
            (Value::Int(i), ValueType::Float) => Some(Value::Float(*i as f64)),
            (Value::Float(f), ValueType::Float) => Some(Value::Float(*f)),
            (Value::String(s), ValueType::Float) => s.trim().parse().ok().map(Value::Float),
            (Value::String(s), ValueType::String) => Some(Value::String(s.clone())),
            (Value::DateTime(dt), ValueType::DateTime) => Some(Value::DateTime(*dt)),
            (Value::Timestamp(ms), ValueType::DateTime) => {
                millis_to_datetime(*ms).map(Value::DateTime)
            }
            (Value::String(s), ValueType::DateTime) => parse_datetime(s).map(Value::DateTime),
            _ => None,
        }
    }

    /// Compare values for sorting. Null sorts before everything else.
    ///
    /// Integers and floats compare numerically, date/times and timestamps compare
    /// chronologically. Otherwise unrelated types are ordered by a fixed rank so
    /// the ordering stays total.
    pub fn cmp_sortable(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::DateTime(a), Value::Timestamp(b)) => datetime_to_millis(a).cmp(b),
            (Value::Timestamp(a), Value::DateTime(b)) => a.cmp(&datetime_to_millis(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Equality under the sort ordering (so `Int(1)` equals `Float(1.0)`).
    pub fn sort_eq(&self, other: &Value) -> bool {
        self.cmp_sortable(other) == Ordering::Equal
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
            Value::DateTime(_) | Value::Timestamp(_) => 4,
        }
    }

    /// Literal form: strings single-quoted (quotes doubled), date/times as
    /// `datetime'...'`, everything else as plain text.
    pub fn to_literal(&self) -> String {
        match self {
            Value::String(s) => quote(s),
            Value::DateTime(dt) => format!("datetime'{}'", format_datetime(dt)),
            Value::Timestamp(ms) => match millis_to_datetime(*ms) {
                Some(dt) => format!("datetime'{}'", format_datetime(&dt)),
                None => ms.to_string(),
            },
            other => other.to_plain_string(),
        }
    }

    /// Unquoted text form.
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
            Value::DateTime(dt) => format_datetime(dt),
            Value::Timestamp(ms) => ms.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}

/// Single-quote a string, doubling embedded quotes.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Format a date/time in the literal layout.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Parse a date/time in the literal layout (fractional seconds optional,
/// seconds optional).
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Convert a date/time to epoch milliseconds.
pub fn datetime_to_millis(dt: &NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

/// Convert epoch milliseconds to a date/time, if in range.
pub fn millis_to_datetime(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}
