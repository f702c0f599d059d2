//! Anchor registry
//!
//! Append-only record of every anchor id seen while building one document:
//! section ids, inline anchors and the root document's own id. The catalog is
//! created by the parser, passed explicitly to each later phase, and dropped
//! with the build.

use crate::document::NodeId;
use std::collections::HashMap;

/// A registered anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: String,
    /// Node the anchor was registered on
    pub node: NodeId,
    /// Text used when a cross-reference to this anchor has none of its own
    pub reftext: Option<String>,
}

/// Append-only anchor registry
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    anchors: Vec<Anchor>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an anchor
    ///
    /// # Returns
    /// * `true` - The anchor was added
    /// * `false` - The id was already registered; the first registration wins
    pub fn register(&mut self, id: &str, node: NodeId, reftext: Option<String>) -> bool {
        if self.by_id.contains_key(id) {
            log::warn!("id '{}' already registered; keeping the first anchor", id);
            return false;
        }
        self.by_id.insert(id.to_string(), self.anchors.len());
        self.anchors.push(Anchor {
            id: id.to_string(),
            node,
            reftext,
        });
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Anchor> {
        self.by_id.get(id).map(|&index| &self.anchors[index])
    }

    /// Anchors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
