//! Linking the page forest
//!
//! After the split, one pass fills in every page's navigation references and
//! builds the [`ReferenceIndex`] that maps anchor ids to their owning page.
//! Document order is pre-order, depth-first, left-to-right over
//! `child_pages`.

use crate::catalog::Catalog;
use crate::document::NodeId;
use crate::forest::{Forest, PageId};
use std::collections::HashMap;
use thiserror::Error;

/// Forest invariant violations found while linking
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("node {node} ({context}) has no owning page after the split")]
    UnownedNode {
        node: NodeId,
        context: &'static str,
    },

    #[error("anchor '{id}' does not resolve to any page")]
    UnownedAnchor { id: String },

    #[error("expected exactly one root page, found {count}")]
    RootCount { count: usize },
}

/// Where an anchor lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    pub page: PageId,
    pub node: NodeId,
    pub reftext: Option<String>,
}

/// Anchor id to owning page, immutable once built
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    refs: HashMap<String, RefTarget>,
}

impl ReferenceIndex {
    pub fn get(&self, id: &str) -> Option<&RefTarget> {
        self.refs.get(id)
    }

    pub fn page_of(&self, id: &str) -> Option<PageId> {
        self.refs.get(id).map(|target| target.page)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Fill in navigation references and index every registered anchor
///
/// # Returns
/// * `Ok(ReferenceIndex)` - All pages linked, all anchors resolved
/// * `Err(LinkError)` - The forest violates an ownership invariant
pub fn link(forest: &mut Forest, catalog: &Catalog) -> Result<ReferenceIndex, LinkError> {
    check_ownership(forest)?;
    make_linear_connections(forest);

    let roots = forest
        .ids()
        .filter(|&page| forest.page(page).nav.parent.is_none())
        .count();
    if roots != 1 {
        return Err(LinkError::RootCount { count: roots });
    }

    let mut refs = HashMap::with_capacity(catalog.len());
    for anchor in catalog.iter() {
        let page = owning_page(forest, anchor.node).ok_or_else(|| LinkError::UnownedAnchor {
            id: anchor.id.clone(),
        })?;
        refs.insert(
            anchor.id.clone(),
            RefTarget {
                page,
                node: anchor.node,
                reftext: anchor.reftext.clone(),
            },
        );
    }

    log::debug!(
        "linked {} page(s), indexed {} anchor(s)",
        forest.len(),
        refs.len()
    );
    Ok(ReferenceIndex { refs })
}

/// Every node must belong to a page once the split is done
fn check_ownership(forest: &Forest) -> Result<(), LinkError> {
    for id in forest.tree.ids() {
        let node = forest.tree.node(id);
        if node.page.is_none() {
            return Err(LinkError::UnownedNode {
                node: id,
                context: node.context.name(),
            });
        }
    }
    Ok(())
}

fn make_linear_connections(forest: &mut Forest) {
    let top = forest.root();

    for page in forest.ids().collect::<Vec<_>>() {
        for child in forest.page(page).child_pages.clone() {
            forest.page_mut(child).nav.parent = Some(page);
        }
    }

    let order = forest.document_order();
    for (i, &page) in order.iter().enumerate() {
        let nav = &mut forest.page_mut(page).nav;
        nav.top = Some(top);
        nav.prev = i.checked_sub(1).map(|j| order[j]);
        nav.next = order.get(i + 1).copied();
    }
}

/// Walk up from `node` to the nearest page root and return its page
fn owning_page(forest: &Forest, node: NodeId) -> Option<PageId> {
    let document = forest.tree.enclosing_document(node)?;
    forest.tree.node(document).page
}
