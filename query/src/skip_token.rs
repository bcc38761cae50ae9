//! Continuation (skip) tokens.
//!
//! A token records where the last page ended: the sort values of the last row,
//! each as a literal (strings quoted, date/times as `datetime'...'`), followed
//! by its key. A single key is written unquoted and takes the whole rest of
//! the token; composite key components are written as literals. Everything is
//! comma-joined.

use crate::{FilterExpr, OrderByTerm, QueryError, QueryResult, SortDirection};
use relgraph_catalog::EntityTypeDescriptor;
use relgraph_core::{parse_literal, Entity, Value};
use std::fmt;

/// A decoded continuation token.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipToken {
    /// One value per sort term.
    pub values: Vec<Value>,
    /// Key values in key order.
    pub key: Vec<Value>,
}

impl SkipToken {
    /// Token for the position just after `entity`.
    pub fn from_entity(
        entity: &Entity,
        order_by: &[OrderByTerm],
        entity_type: &EntityTypeDescriptor,
    ) -> Self {
        let value_of = |name: &str| entity.value(name).cloned().unwrap_or(Value::Null);
        Self {
            values: order_by.iter().map(|t| value_of(&t.property)).collect(),
            key: entity_type.key_names().into_iter().map(value_of).collect(),
        }
    }

    /// Parse a token, reading each part as the type of the property it stands for.
    pub fn parse(
        text: &str,
        order_by: &[OrderByTerm],
        entity_type: &EntityTypeDescriptor,
    ) -> QueryResult<Self> {
        let invalid = |message: String| QueryError::invalid_skip_token(text, message);

        let mut rest = Some(text);
        let mut values = Vec::with_capacity(order_by.len());
        for term in order_by {
            let remaining = rest.ok_or_else(|| invalid("too few sort values".into()))?;
            let (token, next) = next_token(remaining);
            let prop = entity_type
                .property(&term.property)
                .ok_or_else(|| invalid(format!("unknown sort property {}", term.property)))?;
            let literal = parse_literal(token).map_err(|e| invalid(e.to_string()))?;
            let value = literal.coerce(prop.value_type).ok_or_else(|| {
                invalid(format!("{} is not a {}", token.trim(), prop.value_type))
            })?;
            values.push(value);
            rest = next;
        }

        let key_text = rest.ok_or_else(|| invalid("missing key".into()))?;
        let key_props = entity_type.key_properties();
        let arity = key_props.len();
        let key = if let [prop] = key_props.as_slice() {
            let value = Value::from(key_text).coerce(prop.value_type).ok_or_else(|| {
                invalid(format!("{} is not a {}", key_text, prop.value_type))
            })?;
            vec![value]
        } else {
            let mut rest = Some(key_text);
            let mut key = Vec::with_capacity(key_props.len());
            for prop in key_props {
                let remaining =
                    rest.ok_or_else(|| invalid(format!("expected {} key values", arity)))?;
                let (token, next) = next_token(remaining);
                let literal = parse_literal(token).map_err(|e| invalid(e.to_string()))?;
                let value = literal.coerce(prop.value_type).ok_or_else(|| {
                    invalid(format!("{} is not a {}", token.trim(), prop.value_type))
                })?;
                key.push(value);
                rest = next;
            }
            if rest.is_some() {
                return Err(invalid(format!("expected {} key values", arity)));
            }
            key
        };

        Ok(Self { values, key })
    }

    /// Filter selecting rows strictly after this token in the given order:
    /// `(s1 > v1) or (s1 = v1 and s2 > v2) or ... or (s1 = v1 and ... and key > k)`.
    ///
    /// Null sorts first, so on a descending term nulls come after every value.
    pub fn seek_filter(
        &self,
        order_by: &[OrderByTerm],
        entity_type: &EntityTypeDescriptor,
    ) -> QueryResult<FilterExpr> {
        let key_names = entity_type.key_names();
        if self.values.len() != order_by.len() || self.key.len() != key_names.len() {
            return Err(QueryError::invalid_skip_token(
                self.to_string(),
                "token does not match the ordering",
            ));
        }

        let terms: Vec<(&str, SortDirection, &Value)> = order_by
            .iter()
            .zip(&self.values)
            .map(|(t, v)| (t.property.as_str(), t.direction, v))
            .chain(
                key_names
                    .into_iter()
                    .zip(&self.key)
                    .map(|(k, v)| (k, SortDirection::Ascending, v)),
            )
            .collect();

        let mut seek: Option<FilterExpr> = None;
        for (i, &(name, direction, value)) in terms.iter().enumerate() {
            let Some(step) = after(name, direction, value) else {
                continue;
            };
            let disjunct = terms[..i]
                .iter()
                .map(|&(n, _, v)| FilterExpr::prop(n).eq(FilterExpr::Literal(v.clone())))
                .chain(std::iter::once(step))
                .reduce(FilterExpr::and);
            seek = FilterExpr::or_any(seek, disjunct);
        }

        seek.ok_or_else(|| QueryError::invalid_skip_token(self.to_string(), "empty seek"))
    }
}

/// Condition for "strictly after `value`" on one sort term.
fn after(name: &str, direction: SortDirection, value: &Value) -> Option<FilterExpr> {
    let prop = || FilterExpr::prop(name);
    let lit = || FilterExpr::Literal(value.clone());
    match (direction, value.is_null()) {
        (SortDirection::Ascending, true) => Some(prop().ne(FilterExpr::null())),
        (SortDirection::Ascending, false) => Some(prop().gt(lit())),
        (SortDirection::Descending, true) => None,
        (SortDirection::Descending, false) => {
            Some(prop().lt(lit()).or(prop().eq(FilterExpr::null())))
        }
    }
}

/// Split off the first comma-separated literal, honouring quotes.
fn next_token(text: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&text[..i], Some(&text[i + 1..])),
            _ => {}
        }
    }
    (text, None)
}

impl fmt::Display for SkipToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(Value::to_literal)
            .chain(self.key.iter().map(|k| match self.key.len() {
                1 => k.to_plain_string(),
                _ => k.to_literal(),
            }))
            .collect();
        f.write_str(&parts.join(","))
    }
}
