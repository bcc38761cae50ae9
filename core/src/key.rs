//! Entity keys and key literal parsing.
//!
//! Key literal grammar (parentheses optional):
//! - `5`, `2.5`, `true`, `'text'` (a doubled quote escapes a quote),
//!   `datetime'2024-01-02T03:04:05'`
//! - composite: `OrderId=1,LineNo=2`

use crate::value::{parse_datetime, Value};
use crate::{KeyParseError, KeyParseResult};
use std::fmt;

/// An externally supplied entity key.
///
/// A single scalar for simple keys, or an ordered list of
/// (key property name, value) pairs for composite keys.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKey {
    Single(Value),
    Composite(Vec<(String, Value)>),
}

impl EntityKey {
    /// Create a single-valued key.
    pub fn single(value: impl Into<Value>) -> Self {
        EntityKey::Single(value.into())
    }

    /// Create a composite key from (name, value) pairs.
    pub fn composite<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        EntityKey::Composite(
            pairs
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }

    /// Number of key components.
    pub fn len(&self) -> usize {
        match self {
            EntityKey::Single(_) => 1,
            EntityKey::Composite(pairs) => pairs.len(),
        }
    }

    /// Returns true for a composite key without components.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if this is a composite key.
    pub fn is_composite(&self) -> bool {
        matches!(self, EntityKey::Composite(_))
    }

    /// Key component values in order.
    pub fn values(&self) -> Vec<&Value> {
        match self {
            EntityKey::Single(v) => vec![v],
            EntityKey::Composite(pairs) => pairs.iter().map(|(_, v)| v).collect(),
        }
    }

    /// Parse a key literal such as `(5)`, `'abc'` or `(OrderId=1,LineNo=2)`.
    pub fn parse(text: &str) -> KeyParseResult<EntityKey> {
        let trimmed = text.trim();
        let inner = match (trimmed.strip_prefix('('), trimmed.strip_suffix(')')) {
            (Some(_), Some(_)) => &trimmed[1..trimmed.len() - 1],
            (None, None) => trimmed,
            _ => return Err(KeyParseError::new(text, "unbalanced parentheses")),
        };

        let parts = split_literals(inner, ',').map_err(|e| e.with_input(text))?;
        if parts.is_empty() || parts.iter().all(|p| p.trim().is_empty()) {
            return Err(KeyParseError::new(text, "empty key"));
        }

        let named = parts.iter().any(|p| find_unquoted(p, '=').is_some());
        if !named {
            if parts.len() > 1 {
                return Err(KeyParseError::new(
                    text,
                    "composite key components must be named",
                ));
            }
            return Ok(EntityKey::Single(
                parse_literal(parts[0]).map_err(|e| e.with_input(text))?,
            ));
        }

        let mut pairs = Vec::with_capacity(parts.len());
        for part in parts {
            let eq = find_unquoted(part, '=')
                .ok_or_else(|| KeyParseError::new(text, "mixed named and unnamed components"))?;
            let name = part[..eq].trim();
            if name.is_empty() {
                return Err(KeyParseError::new(text, "missing key component name"));
            }
            let value = parse_literal(&part[eq + 1..]).map_err(|e| e.with_input(text))?;
            pairs.push((name.to_string(), value));
        }
        Ok(EntityKey::Composite(pairs))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Single(v) => write!(f, "{}", v.to_literal()),
            EntityKey::Composite(pairs) => {
                for (i, (name, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}={}", name, value.to_literal())?;
                }
                Ok(())
            }
        }
    }
}

impl From<Value> for EntityKey {
    fn from(value: Value) -> Self {
        EntityKey::Single(value)
    }
}

impl From<i64> for EntityKey {
    fn from(i: i64) -> Self {
        EntityKey::Single(Value::Int(i))
    }
}

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        EntityKey::Single(Value::from(s))
    }
}

/// Parse a single literal value.
pub fn parse_literal(text: &str) -> KeyParseResult<Value> {
    let t = text.trim();
    if t.is_empty() {
        return Err(KeyParseError::new(text, "empty literal"));
    }

    if t.starts_with('\'') {
        return unquote(t).map(Value::String);
    }
    if let Some(rest) = t.strip_prefix("datetime") {
        let raw = unquote(rest.trim_start())?;
        return parse_datetime(&raw)
            .map(Value::DateTime)
            .ok_or_else(|| KeyParseError::new(text, "invalid datetime literal"));
    }
    match t {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    let numeric = t.strip_suffix(['L', 'l']).unwrap_or(t);
    if let Ok(i) = numeric.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    let numeric = t.strip_suffix(['d', 'D', 'm', 'M', 'f', 'F']).unwrap_or(t);
    if let Ok(f) = numeric.parse::<f64>() {
        if f.is_finite() {
            return Ok(Value::Float(f));
        }
    }

    Err(KeyParseError::new(text, "unrecognized literal"))
}

/// Strip single quotes from a quoted literal and collapse doubled quotes.
pub fn unquote(text: &str) -> KeyParseResult<String> {
    let t = text.trim();
    if t.len() < 2 || !t.starts_with('\'') || !t.ends_with('\'') {
        return Err(KeyParseError::new(text, "expected a quoted literal"));
    }
    let body = &t[1..t.len() - 1];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            } else {
                return Err(KeyParseError::new(text, "unescaped quote inside literal"));
            }
        }
        out.push(c);
    }
    Ok(out)
}

/// Split `text` on `delimiter`, ignoring delimiters inside single quotes.
pub fn split_literals(text: &str, delimiter: char) -> KeyParseResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if c == '\'' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    if in_quotes {
        return Err(KeyParseError::new(text, "unterminated quoted literal"));
    }
    parts.push(&text[start..]);
    Ok(parts)
}

fn find_unquoted(text: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        if c == '\'' {
            in_quotes = !in_quotes;
        } else if c == needle && !in_quotes {
            return Some(i);
        }
    }
    None
}
