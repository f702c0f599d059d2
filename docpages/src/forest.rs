//! The forest of output pages
//!
//! A [`Forest`] owns the document arena and the pages cut out of it. Pages own
//! their child pages through `child_pages`; every other page reference
//! (`top`, `parent`, `prev`, `next`) is a non-owning index filled in once by
//! the link pass.

use crate::document::{DocumentTree, NodeId};

/// Index of a page in the forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(pub(crate) usize);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page#{}", self.0)
    }
}

/// Navigation references, written once by [`crate::link::link`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigation {
    pub top: Option<PageId>,
    pub parent: Option<PageId>,
    pub prev: Option<PageId>,
    pub next: Option<PageId>,
}

/// A standalone output page
#[derive(Debug, Clone)]
pub struct Page {
    /// Stable id: the promoted section's anchor, or the output file stem for
    /// the root page
    pub id: String,

    /// Plain-text title
    pub title: String,

    /// Depth of the promoted section in the unsplit tree (0 for the root page)
    pub real_level: usize,

    /// Document node whose blocks are this page's content
    pub root: NodeId,

    /// Pages split out from within this page, in document order
    pub child_pages: Vec<PageId>,

    pub nav: Navigation,

    /// The page's title is carried by its first section, not a document header
    pub notitle: bool,

    /// Path of the page's source, for "Edit this page" links
    pub source_location: Option<String>,
}

/// Pages plus the arena they were cut from
#[derive(Debug, Clone)]
pub struct Forest {
    pub tree: DocumentTree,
    pages: Vec<Page>,
    root: PageId,
}

impl Forest {
    pub(crate) fn new(tree: DocumentTree, pages: Vec<Page>, root: PageId) -> Self {
        Self { tree, pages, root }
    }

    /// The page that has no parent
    pub fn root(&self) -> PageId {
        self.root
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub(crate) fn page_mut(&mut self, id: PageId) -> &mut Page {
        &mut self.pages[id.0]
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All page ids in arena order (not document order)
    pub fn ids(&self) -> impl Iterator<Item = PageId> {
        (0..self.pages.len()).map(PageId)
    }

    /// Pages in document order: pre-order over `child_pages`
    pub fn document_order(&self) -> Vec<PageId> {
        let mut out = Vec::with_capacity(self.pages.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.page(id).child_pages.iter().rev());
        }
        out
    }

    /// Content blocks of a page
    pub fn blocks(&self, page: PageId) -> &[NodeId] {
        &self.tree.node(self.page(page).root).blocks
    }

    /// First section of a page's content
    pub fn first_section(&self, page: PageId) -> Option<NodeId> {
        self.tree.first_section(self.page(page).root)
    }

    /// Look up a page by id
    pub fn find(&self, id: &str) -> Option<PageId> {
        self.ids().find(|&page| self.page(page).id == id)
    }

    /// Number of parent links between `page` and the root
    pub fn depth(&self, page: PageId) -> usize {
        let mut depth = 0;
        let mut current = self.page(page).nav.parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.page(parent).nav.parent;
        }
        depth
    }
}
