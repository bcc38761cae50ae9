//! Abstract filter expression tree.

use relgraph_core::Value;
use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn keyword(self) -> &'static str {
        match self {
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// `startswith(text, prefix)`
    StartsWith,
    /// `endswith(text, suffix)`
    EndsWith,
    /// `substringof(needle, text)`
    SubstringOf,
    ToLower,
    ToUpper,
    Length,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::StartsWith => "startswith",
            Function::EndsWith => "endswith",
            Function::SubstringOf => "substringof",
            Function::ToLower => "tolower",
            Function::ToUpper => "toupper",
            Function::Length => "length",
        }
    }
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Literal(Value),
    /// Property reference. A `/` separated path names a property of a related entity.
    Property(String),
    Binary {
        op: BinaryOp,
        left: Box<FilterExpr>,
        right: Box<FilterExpr>,
    },
    Not(Box<FilterExpr>),
    Call {
        function: Function,
        args: Vec<FilterExpr>,
    },
}

#[allow(clippy::should_implement_trait)]
impl FilterExpr {
    pub fn prop(name: impl Into<String>) -> Self {
        FilterExpr::Property(name.into())
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        FilterExpr::Literal(value.into())
    }

    pub fn null() -> Self {
        FilterExpr::Literal(Value::Null)
    }

    pub fn binary(op: BinaryOp, left: FilterExpr, right: FilterExpr) -> Self {
        FilterExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::Eq, self, other)
    }

    pub fn ne(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::Ne, self, other)
    }

    pub fn lt(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::Lt, self, other)
    }

    pub fn le(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::Le, self, other)
    }

    pub fn gt(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::Gt, self, other)
    }

    pub fn ge(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::Ge, self, other)
    }

    pub fn and(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::And, self, other)
    }

    pub fn or(self, other: FilterExpr) -> Self {
        Self::binary(BinaryOp::Or, self, other)
    }

    pub fn not(self) -> Self {
        FilterExpr::Not(Box::new(self))
    }

    pub fn call(function: Function, args: Vec<FilterExpr>) -> Self {
        FilterExpr::Call { function, args }
    }

    pub fn starts_with(property: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::call(
            Function::StartsWith,
            vec![Self::prop(property), Self::lit(prefix.into())],
        )
    }

    pub fn ends_with(property: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::call(
            Function::EndsWith,
            vec![Self::prop(property), Self::lit(suffix.into())],
        )
    }

    pub fn substring_of(needle: impl Into<String>, property: impl Into<String>) -> Self {
        Self::call(
            Function::SubstringOf,
            vec![Self::lit(needle.into()), Self::prop(property)],
        )
    }

    /// AND two optional filters together.
    pub fn and_all(left: Option<FilterExpr>, right: Option<FilterExpr>) -> Option<FilterExpr> {
        match (left, right) {
            (Some(l), Some(r)) => Some(l.and(r)),
            (l, r) => l.or(r),
        }
    }

    /// OR two optional filters together.
    pub fn or_any(left: Option<FilterExpr>, right: Option<FilterExpr>) -> Option<FilterExpr> {
        match (left, right) {
            (Some(l), Some(r)) => Some(l.or(r)),
            (l, r) => l.or(r),
        }
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Literal(v) => write!(f, "{}", v.to_literal()),
            FilterExpr::Property(name) => write!(f, "{}", name),
            FilterExpr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.keyword(), right)
            }
            FilterExpr::Not(inner) => write!(f, "not {}", inner),
            FilterExpr::Call { function, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", function.name(), args.join(","))
            }
        }
    }
}
