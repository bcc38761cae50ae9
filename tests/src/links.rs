//! A link follower serving fixed documents.

use relgraph_producer::{Cause, LinkFollower};
use std::cell::RefCell;
use std::collections::HashMap;

/// Serves canned representations by href and records every request.
#[derive(Debug, Default)]
pub struct StaticLinks {
    documents: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl StaticLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `href`.
    pub fn with(mut self, href: impl Into<String>, document: serde_json::Value) -> Self {
        self.documents.insert(href.into(), document.to_string());
        self
    }

    /// Serve raw text at `href`.
    pub fn with_text(mut self, href: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(href.into(), text.into());
        self
    }

    /// Hrefs fetched so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl LinkFollower for StaticLinks {
    fn fetch(&self, href: &str) -> Result<String, Cause> {
        self.requests.borrow_mut().push(href.to_string());
        self.documents
            .get(href)
            .cloned()
            .ok_or_else(|| format!("nothing served at {}", href).into())
    }
}
