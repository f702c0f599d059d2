//! Typed attribute resolution
//!
//! Nodes carry a string-typed attribute bag. Every numeric setting is read
//! through [`resolve`], which walks node → ancestors → document defaults →
//! hard default. Page roots continue the walk at the node that originally
//! contained their section, so a setting inherited before the split is still
//! inherited after it.

use crate::document::{DocumentTree, NodeId};

/// Numeric settings understood on any node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    /// Depth threshold for splitting sections into pages
    PageLevels,
    /// Depth of the table of contents
    TocLevels,
    /// Deepest level that receives a number
    SectNumLevels,
}

impl AttributeKey {
    pub fn name(self) -> &'static str {
        match self {
            AttributeKey::PageLevels => "pagelevels",
            AttributeKey::TocLevels => "toclevels",
            AttributeKey::SectNumLevels => "sectnumlevels",
        }
    }

    pub fn hard_default(self) -> usize {
        match self {
            AttributeKey::PageLevels => 0,
            AttributeKey::TocLevels => 2,
            AttributeKey::SectNumLevels => 3,
        }
    }
}

/// Parse a level value; negatives clamp to 0 with a warning
///
/// # Returns
/// * `Some(value)` - A usable level
/// * `None` - The value is not an integer (a warning is logged)
pub fn parse_level(key: AttributeKey, raw: &str) -> Option<usize> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value < 0 => {
            log::warn!(
                "attribute '{}' must be >= 0; setting to 0 (was {})",
                key.name(),
                value
            );
            Some(0)
        }
        Ok(value) => Some(usize::try_from(value).unwrap_or(usize::MAX)),
        Err(_) => {
            log::warn!(
                "attribute '{}' is not an integer: '{}'; ignoring",
                key.name(),
                raw
            );
            None
        }
    }
}

/// Value of `key` set on `node` itself
pub fn own_value(tree: &DocumentTree, node: NodeId, key: AttributeKey) -> Option<usize> {
    tree.node(node)
        .attr(key.name())
        .and_then(|raw| parse_level(key, raw))
}

/// Resolve `key` for `node`
///
/// The first value found walking up from `node` wins; the original document
/// node carries the document-wide defaults. Falls back to the key's hard
/// default.
pub fn resolve(tree: &DocumentTree, node: NodeId, key: AttributeKey) -> usize {
    let mut current = Some(node);
    while let Some(id) = current {
        if let Some(value) = own_value(tree, id, key) {
            return value;
        }
        let n = tree.node(id);
        current = n.parent.or(n.inherits_from);
    }
    key.hard_default()
}
