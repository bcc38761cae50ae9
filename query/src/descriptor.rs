//! The abstract query descriptor.

use crate::FilterExpr;
use relgraph_store::SortDirection;

/// One sort term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByTerm {
    pub property: String,
    pub direction: SortDirection,
}

impl OrderByTerm {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// What a caller asked for: filter, ordering, window, token, expansion,
/// projection and inline count.
///
/// `top == Some(0)` always yields an empty page without a continuation token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
    pub filter: Option<FilterExpr>,
    pub order_by: Vec<OrderByTerm>,
    pub skip: Option<usize>,
    pub top: Option<usize>,
    pub skip_token: Option<String>,
    /// Expand paths, `/` separated.
    pub expand: Vec<String>,
    /// Projected property names. Empty means all.
    pub select: Vec<String>,
    pub inline_count: bool,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, property: impl Into<String>) -> Self {
        self.order_by.push(OrderByTerm::asc(property));
        self
    }

    pub fn order_by_desc(mut self, property: impl Into<String>) -> Self {
        self.order_by.push(OrderByTerm::desc(property));
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip_token(mut self, token: impl Into<String>) -> Self {
        self.skip_token = Some(token.into());
        self
    }

    pub fn expand(mut self, path: impl Into<String>) -> Self {
        self.expand.push(path.into());
        self
    }

    pub fn select(mut self, property: impl Into<String>) -> Self {
        self.select.push(property.into());
        self
    }

    pub fn inline_count(mut self) -> Self {
        self.inline_count = true;
        self
    }
}
