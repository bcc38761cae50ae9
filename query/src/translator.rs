//! QueryTranslator: abstract query descriptors to native store queries.

use crate::{BinaryOp, FilterExpr, Function, OrderByTerm, QueryDescriptor, QueryError, QueryResult, SkipToken};
use relgraph_catalog::{coerce_value, EntityTypeDescriptor, PropertyDescriptor};
use relgraph_core::{Value, ValueType};
use relgraph_store::{CompareOp, FieldPath, LikePattern, Operand, OrderBy, Predicate, StoreQuery};

/// Translates queries against one entity type.
pub struct QueryTranslator<'a> {
    entity_type: &'a EntityTypeDescriptor,
}

impl<'a> QueryTranslator<'a> {
    pub fn new(entity_type: &'a EntityTypeDescriptor) -> Self {
        Self { entity_type }
    }

    /// Translate filter, continuation token and ordering. The window
    /// (limit/offset) is left to the pagination engine.
    pub fn translate(&self, query: &QueryDescriptor) -> QueryResult<StoreQuery> {
        let mut store_query = StoreQuery::new(&self.entity_type.name);

        if let Some(filter) = &query.filter {
            store_query = store_query.filter(self.predicate(filter)?);
        }
        if let Some(token) = &query.skip_token {
            let seek = SkipToken::parse(token, &query.order_by, self.entity_type)?
                .seek_filter(&query.order_by, self.entity_type)?;
            store_query = store_query.filter(self.predicate(&seek)?);
        }
        for term in &query.order_by {
            store_query = store_query.order_by(self.order_term(term)?);
        }

        log::debug!("translated query: {}", store_query);
        Ok(store_query)
    }

    /// Translate one sort term.
    pub fn order_term(&self, term: &OrderByTerm) -> QueryResult<OrderBy> {
        let (_, path) = self.resolve(&term.property)?;
        Ok(OrderBy {
            path,
            direction: term.direction,
        })
    }

    /// Translate a boolean filter expression into a native predicate.
    pub fn predicate(&self, expr: &FilterExpr) -> QueryResult<Predicate> {
        match expr {
            FilterExpr::Binary { op, left, right } => match op {
                BinaryOp::And => Ok(self.predicate(left)?.and(self.predicate(right)?)),
                BinaryOp::Or => Ok(self.predicate(left)?.or(self.predicate(right)?)),
                op if op.is_comparison() => self.comparison(*op, left, right),
                op => Err(QueryError::unsupported(format!(
                    "arithmetic operator '{}' in {}",
                    op.keyword(),
                    expr
                ))),
            },
            FilterExpr::Not(inner) => Ok(self.predicate(inner)?.negate()),
            FilterExpr::Call { function, args } => self.string_match(*function, args),
            FilterExpr::Property(name) => {
                let (prop, path) = self.resolve(name)?;
                if prop.value_type != ValueType::Bool {
                    return Err(QueryError::unsupported(format!(
                        "property {} is not boolean",
                        name
                    )));
                }
                Ok(Predicate::field_cmp(path, CompareOp::Eq, Value::Bool(true)))
            }
            FilterExpr::Literal(v) => Err(QueryError::unsupported(format!(
                "literal {} is not a condition",
                v.to_literal()
            ))),
        }
    }

    fn comparison(&self, op: BinaryOp, left: &FilterExpr, right: &FilterExpr) -> QueryResult<Predicate> {
        let op = compare_op(op);
        match (left, right) {
            (FilterExpr::Property(a), FilterExpr::Property(b)) => {
                let (_, a) = self.resolve(a)?;
                let (_, b) = self.resolve(b)?;
                Ok(Predicate::compare(Operand::Field(a), op, Operand::Field(b)))
            }
            (FilterExpr::Property(name), FilterExpr::Literal(v)) => self.against_literal(name, op, v),
            (FilterExpr::Literal(v), FilterExpr::Property(name)) => {
                self.against_literal(name, op.mirrored(), v)
            }
            _ => Err(QueryError::unsupported(format!(
                "cannot compare {} with {}",
                left, right
            ))),
        }
    }

    fn against_literal(&self, name: &str, op: CompareOp, value: &Value) -> QueryResult<Predicate> {
        let (prop, path) = self.resolve(name)?;
        if value.is_null() {
            return match op {
                CompareOp::Eq => Ok(Predicate::IsNull(path)),
                CompareOp::Ne => Ok(Predicate::IsNotNull(path)),
                _ => Err(QueryError::unsupported(format!(
                    "ordering comparison of {} with null",
                    name
                ))),
            };
        }
        Ok(Predicate::field_cmp(path, op, store_literal(prop, value)?))
    }

    fn string_match(&self, function: Function, args: &[FilterExpr]) -> QueryResult<Predicate> {
        let (name, text, pattern): (&str, &str, fn(String) -> LikePattern) = match (function, args) {
            (Function::StartsWith, [FilterExpr::Property(p), FilterExpr::Literal(Value::String(s))]) => {
                (p.as_str(), s.as_str(), LikePattern::Prefix)
            }
            (Function::EndsWith, [FilterExpr::Property(p), FilterExpr::Literal(Value::String(s))]) => {
                (p.as_str(), s.as_str(), LikePattern::Suffix)
            }
            (Function::SubstringOf, [FilterExpr::Literal(Value::String(s)), FilterExpr::Property(p)]) => {
                (p.as_str(), s.as_str(), LikePattern::Contains)
            }
            _ => {
                return Err(QueryError::unsupported(format!(
                    "function {} with these arguments",
                    function.name()
                )))
            }
        };

        let (prop, path) = self.resolve(name)?;
        if !prop.value_type.is_textual() {
            return Err(QueryError::unsupported(format!(
                "{} on non-text property {}",
                function.name(),
                name
            )));
        }
        Ok(Predicate::Like {
            path,
            pattern: pattern(text.to_string()),
        })
    }

    /// Resolve a property reference to its descriptor and native field path.
    fn resolve(&self, name: &str) -> QueryResult<(&'a PropertyDescriptor, FieldPath)> {
        if name.contains('/') {
            return Err(QueryError::unsupported(format!(
                "navigation path {} in query",
                name
            )));
        }
        let prop = self.entity_type.property(name).ok_or_else(|| {
            QueryError::unsupported(format!(
                "unknown property {} on {}",
                name, self.entity_type.name
            ))
        })?;
        let path = match prop.accessor.path() {
            (field, None) => FieldPath::field(field),
            (field, Some(component)) => FieldPath::component(field, component),
        };
        Ok((prop, path))
    }
}

fn compare_op(op: BinaryOp) -> CompareOp {
    match op {
        BinaryOp::Ne => CompareOp::Ne,
        BinaryOp::Lt => CompareOp::Lt,
        BinaryOp::Le => CompareOp::Le,
        BinaryOp::Gt => CompareOp::Gt,
        BinaryOp::Ge => CompareOp::Ge,
        _ => CompareOp::Eq,
    }
}

/// Convert a literal to the property's declared type and store representation.
fn store_literal(prop: &PropertyDescriptor, value: &Value) -> QueryResult<Value> {
    let coerced = coerce_value(&prop.name, value, prop.value_type)
        .map_err(|e| QueryError::unsupported(e.to_string()))?;
    prop.accessor
        .adapter()
        .to_store(&prop.name, coerced)
        .map_err(|e| QueryError::unsupported(e.to_string()))
}
