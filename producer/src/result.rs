//! Results handed back to the protocol layer.

use relgraph_core::Entity;

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub entities: Vec<Entity>,
    /// Total matching rows, when requested.
    pub inline_count: Option<usize>,
    /// Token resuming after the last entity, when the server cap truncated the page.
    pub continuation: Option<String>,
}

/// What a navigation path resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationResult {
    Entity(Entity),
    Page(Page),
}

impl NavigationResult {
    pub fn into_entity(self) -> Option<Entity> {
        match self {
            NavigationResult::Entity(entity) => Some(entity),
            NavigationResult::Page(_) => None,
        }
    }

    pub fn into_page(self) -> Option<Page> {
        match self {
            NavigationResult::Page(page) => Some(page),
            NavigationResult::Entity(_) => None,
        }
    }
}
