//! PaginationEngine: page windows with one-row overfetch.
//!
//! A page is fetched with `limit = page size + 1`. The extra row only tells us
//! whether more rows exist; it is never returned.

use crate::{
    evaluate, FilterExpr, OrderByTerm, QueryDescriptor, QueryResult, SkipToken, SortDirection,
};
use relgraph_catalog::EntityTypeDescriptor;
use relgraph_core::{Entity, Record, Value};
use relgraph_store::{StoreQuery, StoreSession};
use std::cmp::Ordering;

/// The requested window against the server's maximum page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub top: Option<usize>,
    pub skip: usize,
    pub max: usize,
}

impl PageWindow {
    pub fn new(top: Option<usize>, skip: Option<usize>, max: usize) -> Self {
        Self {
            top,
            skip: skip.unwrap_or(0),
            max,
        }
    }

    pub fn from_query(query: &QueryDescriptor, max: usize) -> Self {
        Self::new(query.top, query.skip, max)
    }

    /// `top == 0`: nothing to fetch.
    pub fn is_empty(&self) -> bool {
        self.top == Some(0)
    }

    /// Rows returned at most.
    pub fn page_size(&self) -> usize {
        match self.top {
            Some(top) if top < self.max => top,
            _ => self.max,
        }
    }

    /// Rows to ask the store for.
    pub fn fetch_limit(&self) -> usize {
        self.page_size() + 1
    }

    /// Whether a continuation token is due after fetching `fetched` rows.
    ///
    /// Only truncation forced by the server cap is signalled: with an explicit
    /// `top`, a token is produced only when `top` exceeds the cap.
    pub fn use_continuation(&self, fetched: usize) -> bool {
        let truncated = fetched > self.page_size();
        match self.top {
            Some(top) => top > self.max && truncated,
            None => truncated,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    pub items: Vec<T>,
    pub inline_count: Option<usize>,
    /// A continuation token should follow the last item.
    pub truncated: bool,
}

impl<T> Window<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            inline_count: None,
            truncated: false,
        }
    }

    /// Convert the items, keeping count and truncation.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Window<U>, E> {
        Ok(Window {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            inline_count: self.inline_count,
            truncated: self.truncated,
        })
    }
}

/// Fetch one page of records for a translated query.
pub fn fetch_page(
    session: &mut dyn StoreSession,
    query: StoreQuery,
    window: PageWindow,
    inline_count: bool,
) -> QueryResult<Window<Record>> {
    if window.is_empty() {
        log::debug!("top=0 on {}, skipping the store", query.entity_type);
        return Ok(Window::empty());
    }

    let inline_count = if inline_count {
        Some(session.count(&query.unwindowed())?)
    } else {
        None
    };

    let query = query.limit(window.fetch_limit()).offset(window.skip);
    let mut records = session.execute(&query)?;
    let truncated = window.use_continuation(records.len());
    records.truncate(window.page_size());

    log::debug!(
        "page of {} {} (skip={}, size={}, truncated={})",
        records.len(),
        query.entity_type,
        window.skip,
        window.page_size(),
        truncated
    );

    Ok(Window {
        items: records,
        inline_count,
        truncated,
    })
}

/// Window an in-memory collection with the same rules as `fetch_page`:
/// filter, order, continuation token, inline count, skip, then page size.
pub fn window_entities(
    entities: Vec<Entity>,
    query: &QueryDescriptor,
    entity_type: &EntityTypeDescriptor,
    max: usize,
) -> QueryResult<Window<Entity>> {
    let window = PageWindow::from_query(query, max);
    if window.is_empty() {
        return Ok(Window::empty());
    }

    let mut items = retain_matching(entities, query.filter.as_ref())?;
    sort_entities(&mut items, &query.order_by, entity_type);

    if let Some(token) = &query.skip_token {
        let seek = SkipToken::parse(token, &query.order_by, entity_type)?
            .seek_filter(&query.order_by, entity_type)?;
        items = retain_matching(items, Some(&seek))?;
    }

    let inline_count = query.inline_count.then_some(items.len());

    let mut items: Vec<Entity> = items
        .into_iter()
        .skip(window.skip)
        .take(window.fetch_limit())
        .collect();
    let truncated = window.use_continuation(items.len());
    items.truncate(window.page_size());

    log::debug!(
        "in-memory page of {} {} (skip={}, size={}, truncated={})",
        items.len(),
        entity_type.name,
        window.skip,
        window.page_size(),
        truncated
    );

    Ok(Window {
        items,
        inline_count,
        truncated,
    })
}

fn retain_matching(
    entities: Vec<Entity>,
    filter: Option<&FilterExpr>,
) -> QueryResult<Vec<Entity>> {
    let Some(filter) = filter else {
        return Ok(entities);
    };
    let mut kept = Vec::with_capacity(entities.len());
    for entity in entities {
        if evaluate(filter, &entity)? {
            kept.push(entity);
        }
    }
    Ok(kept)
}

/// Order by the sort terms, then by ascending key, matching the seek filter.
fn sort_entities(
    entities: &mut [Entity],
    order_by: &[OrderByTerm],
    entity_type: &EntityTypeDescriptor,
) {
    let terms: Vec<(&str, SortDirection)> = order_by
        .iter()
        .map(|t| (t.property.as_str(), t.direction))
        .chain(
            entity_type
                .key_names()
                .into_iter()
                .map(|k| (k, SortDirection::Ascending)),
        )
        .collect();
    let null = Value::Null;
    entities.sort_by(|a, b| {
        terms
            .iter()
            .map(|&(name, direction)| {
                let l = a.value(name).unwrap_or(&null);
                let r = b.value(name).unwrap_or(&null);
                direction.apply(l.cmp_sortable(r))
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}
