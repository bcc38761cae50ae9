//! Native predicate and ordering language.
//!
//! Predicates address raw store fields (not protocol properties) and compare
//! them against store-representation values. They render as the text of the
//! native query language and evaluate directly against records.

use relgraph_core::{Field, Record, RecordKey, Value};
use std::cmp::Ordering;
use std::fmt;

static NULL: Value = Value::Null;

/// Path to a scalar inside a record: a field, or a component of an embedded key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub field: String,
    pub component: Option<String>,
}

impl FieldPath {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            component: None,
        }
    }

    pub fn component(field: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            component: Some(component.into()),
        }
    }

    /// Read the raw value at this path. Missing or non-scalar fields read as null.
    pub fn read<'r>(&self, record: &'r Record) -> &'r Value {
        let found = match &self.component {
            None => record.value(&self.field),
            Some(component) => record.embedded_value(&self.field, component),
        };
        found.unwrap_or(&NULL)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            None => write!(f, "t.{}", self.field),
            Some(component) => write!(f, "t.{}.{}", self.field, component),
        }
    }
}

/// Either side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Field(FieldPath),
    Value(Value),
}

impl Operand {
    fn resolve<'r>(&'r self, record: &'r Record) -> &'r Value {
        match self {
            Operand::Field(path) => path.read(record),
            Operand::Value(value) => value,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(path) => write!(f, "{}", path),
            Operand::Value(value) => write!(f, "{}", value.to_literal()),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// The operator that gives the same result with the operands swapped.
    pub fn mirrored(self) -> Self {
        match self {
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
            other => other,
        }
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// String match shapes supported by `LIKE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikePattern {
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl LikePattern {
    fn matches(&self, text: &str) -> bool {
        match self {
            LikePattern::Prefix(p) => text.starts_with(p.as_str()),
            LikePattern::Suffix(p) => text.ends_with(p.as_str()),
            LikePattern::Contains(p) => text.contains(p.as_str()),
        }
    }

    fn pattern(&self) -> String {
        match self {
            LikePattern::Prefix(p) => format!("{}%", p),
            LikePattern::Suffix(p) => format!("%{}", p),
            LikePattern::Contains(p) => format!("%{}%", p),
        }
    }
}

/// A native predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    IsNull(FieldPath),
    IsNotNull(FieldPath),
    Like {
        path: FieldPath,
        pattern: LikePattern,
    },
    /// The relationship field references the given record key.
    RefersTo { field: String, key: RecordKey },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(left: Operand, op: CompareOp, right: Operand) -> Self {
        Predicate::Compare { left, op, right }
    }

    /// Compare a field against a value.
    pub fn field_cmp(path: FieldPath, op: CompareOp, value: Value) -> Self {
        Predicate::Compare {
            left: Operand::Field(path),
            op,
            right: Operand::Value(value),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Evaluate against a raw store record.
    ///
    /// Comparisons involving null are false; use `IsNull` to test for null.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Compare { left, op, right } => {
                let l = left.resolve(record);
                let r = right.resolve(record);
                if l.is_null() || r.is_null() {
                    return false;
                }
                op.holds(l.cmp_sortable(r))
            }
            Predicate::IsNull(path) => path.read(record).is_null(),
            Predicate::IsNotNull(path) => !path.read(record).is_null(),
            Predicate::Like { path, pattern } => path
                .read(record)
                .as_str()
                .map(|text| pattern.matches(text))
                .unwrap_or(false),
            Predicate::RefersTo { field, key } => match record.field(field) {
                Some(Field::Reference(Some(k))) => k == key,
                Some(Field::References(keys)) => keys.contains(key),
                _ => false,
            },
            Predicate::And(a, b) => a.matches(record) && b.matches(record),
            Predicate::Or(a, b) => a.matches(record) || b.matches(record),
            Predicate::Not(p) => !p.matches(record),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Predicate::IsNull(path) => write!(f, "{} IS NULL", path),
            Predicate::IsNotNull(path) => write!(f, "{} IS NOT NULL", path),
            Predicate::Like { path, pattern } => {
                write!(f, "{} LIKE {}", path, Value::from(pattern.pattern()).to_literal())
            }
            Predicate::RefersTo { field, key } => write!(f, "t.{} = {}", field, key),
            Predicate::And(a, b) => write!(f, "({} AND {})", a, b),
            Predicate::Or(a, b) => write!(f, "({} OR {})", a, b),
            Predicate::Not(p) => write!(f, "NOT ({})", p),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Apply the direction to an ascending ordering.
    pub fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// A native order-by term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub path: FieldPath,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(path: FieldPath) -> Self {
        Self {
            path,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(path: FieldPath) -> Self {
        Self {
            path,
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.path),
            SortDirection::Descending => write!(f, "{} DESC", self.path),
        }
    }
}
