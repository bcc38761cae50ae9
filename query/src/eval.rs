//! In-memory filter evaluation over materialized entities.
//!
//! Used where results are already in memory (navigation collections), so it
//! accepts the whole expression language, arithmetic and every function
//! included. Only `/` paths are refused.

use crate::{BinaryOp, FilterExpr, Function, QueryError, QueryResult};
use relgraph_core::{Entity, Value};
use std::cmp::Ordering;

/// Evaluate a condition. Null counts as false.
pub fn evaluate(expr: &FilterExpr, entity: &Entity) -> QueryResult<bool> {
    match evaluate_value(expr, entity)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        other => Err(QueryError::unsupported(format!(
            "{} evaluates to {}, not a condition",
            expr,
            other.type_name()
        ))),
    }
}

/// Evaluate an expression to a value.
pub fn evaluate_value(expr: &FilterExpr, entity: &Entity) -> QueryResult<Value> {
    match expr {
        FilterExpr::Literal(v) => Ok(v.clone()),
        FilterExpr::Property(name) => {
            if name.contains('/') {
                return Err(QueryError::unsupported(format!(
                    "navigation path {} in query",
                    name
                )));
            }
            Ok(entity.value(name).cloned().unwrap_or(Value::Null))
        }
        FilterExpr::Not(inner) => match evaluate_value(inner, entity)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            Value::Null => Ok(Value::Null),
            other => Err(QueryError::unsupported(format!(
                "not applied to {}",
                other.type_name()
            ))),
        },
        FilterExpr::Binary { op, left, right } => match op {
            BinaryOp::And => Ok(Value::Bool(
                evaluate(left, entity)? && evaluate(right, entity)?,
            )),
            BinaryOp::Or => Ok(Value::Bool(
                evaluate(left, entity)? || evaluate(right, entity)?,
            )),
            op => {
                let l = evaluate_value(left, entity)?;
                let r = evaluate_value(right, entity)?;
                if op.is_comparison() {
                    Ok(Value::Bool(compare(*op, &l, &r)))
                } else {
                    arithmetic(*op, &l, &r)
                }
            }
        },
        FilterExpr::Call { function, args } => {
            let args = args
                .iter()
                .map(|a| evaluate_value(a, entity))
                .collect::<QueryResult<Vec<_>>>()?;
            call(*function, &args)
        }
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        let both = left.is_null() && right.is_null();
        return match op {
            BinaryOp::Eq => both,
            BinaryOp::Ne => !both,
            _ => false,
        };
    }

    // Text literals compared with typed values are read as that type.
    let aligned = |text: &Value, typed: &Value| {
        typed
            .value_type()
            .and_then(|t| text.coerce(t))
            .unwrap_or_else(|| text.clone())
    };
    let (left, right) = match (left, right) {
        (Value::String(_), r) if !matches!(r, Value::String(_)) => (aligned(left, r), right.clone()),
        (l, Value::String(_)) if !matches!(l, Value::String(_)) => (left.clone(), aligned(right, l)),
        _ => (left.clone(), right.clone()),
    };

    let ord = left.cmp_sortable(&right);
    match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::Ne => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Ge => ord != Ordering::Less,
        _ => false,
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> QueryResult<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let result = match op {
            BinaryOp::Add => a.checked_add(*b),
            BinaryOp::Sub => a.checked_sub(*b),
            BinaryOp::Mul => a.checked_mul(*b),
            BinaryOp::Div => a.checked_div(*b),
            BinaryOp::Mod => a.checked_rem(*b),
            _ => None,
        };
        return result
            .map(Value::Int)
            .ok_or_else(|| QueryError::unsupported(format!("{} {} {} overflows", a, op.keyword(), b)));
    }
    match (left.as_float(), right.as_float()) {
        (Some(a), Some(b)) => Ok(Value::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            _ => a % b,
        })),
        _ => Err(QueryError::unsupported(format!(
            "{} on {} and {}",
            op.keyword(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn call(function: Function, args: &[Value]) -> QueryResult<Value> {
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let texts: Vec<&str> = args.iter().filter_map(Value::as_str).collect();
    let result = match (function, texts.as_slice()) {
        (_, t) if t.len() != args.len() => None,
        (Function::StartsWith, [text, prefix]) => Some(Value::Bool(text.starts_with(prefix))),
        (Function::EndsWith, [text, suffix]) => Some(Value::Bool(text.ends_with(suffix))),
        (Function::SubstringOf, [needle, text]) => Some(Value::Bool(text.contains(needle))),
        (Function::ToLower, [text]) => Some(Value::from(text.to_lowercase())),
        (Function::ToUpper, [text]) => Some(Value::from(text.to_uppercase())),
        (Function::Length, [text]) => Some(Value::Int(text.chars().count() as i64)),
        _ => None,
    };
    result.ok_or_else(|| {
        QueryError::unsupported(format!(
            "{} with {} argument(s)",
            function.name(),
            args.len()
        ))
    })
}
