//! Splitting a document tree into pages
//!
//! The splitter walks the immediate child blocks of a node. A child section
//! with an id whose level is within the threshold is promoted to its own page,
//! after the same rule has been applied inside it. Everything else stays
//! where it is and is not descended into.

use crate::attributes::{self, AttributeKey};
use crate::document::{plain_text, Context, DocumentTree, Node, NodeId, SectionInfo};
use crate::forest::{Forest, Navigation, Page, PageId};
use crate::rebase::Reparenter;
use std::path::Path;

/// Split `tree` into a forest of pages
///
/// # Parameters
/// * `tree` - The parsed document
/// * `root_id` - Id of the root page (the output file stem)
/// * `depth_threshold` - Deepest section level that becomes a page; 0 splits
///   nothing, negative values are clamped to 0 with a warning
pub fn split(tree: DocumentTree, root_id: &str, depth_threshold: i64) -> Forest {
    TreeSplitter::new(tree).split(root_id, depth_threshold)
}

/// Clamp a document-wide threshold to a usable level
pub fn clamp_threshold(depth_threshold: i64) -> usize {
    if depth_threshold < 0 {
        log::warn!("attribute 'pagelevels' must be >= 0; setting to 0");
        return 0;
    }
    usize::try_from(depth_threshold).unwrap_or(usize::MAX)
}

/// Builds the page forest out of one document tree
pub struct TreeSplitter {
    tree: DocumentTree,
    pages: Vec<Page>,
}

impl TreeSplitter {
    pub fn new(tree: DocumentTree) -> Self {
        Self {
            tree,
            pages: Vec::new(),
        }
    }

    /// Run the split; see [`split`]
    pub fn split(mut self, root_id: &str, depth_threshold: i64) -> Forest {
        let threshold = clamp_threshold(depth_threshold);
        let root = self.tree.root();
        self.tree
            .node_mut(root)
            .attributes
            .insert(AttributeKey::PageLevels.name().to_string(), threshold.to_string());
        self.tree.node_mut(root).id = Some(root_id.to_string());
        self.tree.assign_real_levels();

        let root_page = self.reserve_page();
        let child_pages = self.spawn_children(root, threshold);
        self.ensure_section(root);
        self.tree.node_mut(root).page = Some(root_page);
        Reparenter::new(&mut self.tree).claim(root, root_page);

        let title = self
            .tree
            .node(root)
            .attr("doctitle")
            .map_or_else(|| root_id.to_string(), str::to_string);
        self.pages[root_page.0] = Page {
            id: root_id.to_string(),
            title,
            real_level: 0,
            root,
            child_pages,
            nav: Navigation::default(),
            notitle: false,
            source_location: None,
        };

        log::debug!(
            "split '{}' at pagelevels={} into {} page(s)",
            root_id,
            threshold,
            self.pages.len()
        );
        Forest::new(self.tree, self.pages, root_page)
    }

    fn reserve_page(&mut self) -> PageId {
        let id = PageId(self.pages.len());
        self.pages.push(Page {
            id: String::new(),
            title: String::new(),
            real_level: 0,
            root: self.tree.root(),
            child_pages: Vec::new(),
            nav: Navigation::default(),
            notitle: true,
            source_location: None,
        });
        id
    }

    /// Promote the split candidates among `node`'s child blocks
    fn spawn_children(&mut self, node: NodeId, threshold: usize) -> Vec<PageId> {
        let blocks = std::mem::take(&mut self.tree.node_mut(node).blocks);
        let mut kept = Vec::with_capacity(blocks.len());
        let mut pages = Vec::new();

        for child in blocks {
            match self.candidate_threshold(child, threshold) {
                Some(local) => pages.push(self.spawn_page(child, node, local)),
                None => kept.push(child),
            }
        }

        self.tree.node_mut(node).blocks = kept;
        pages
    }

    /// Threshold to split inside `node` with, if `node` is a split candidate
    fn candidate_threshold(&self, node: NodeId, inherited: usize) -> Option<usize> {
        let n = self.tree.node(node);
        if !n.is_section() || n.id.is_none() {
            return None;
        }
        let local =
            attributes::own_value(&self.tree, node, AttributeKey::PageLevels).unwrap_or(inherited);
        (n.level <= local).then_some(local)
    }

    fn spawn_page(&mut self, section: NodeId, origin: NodeId, threshold: usize) -> PageId {
        let page = self.reserve_page();
        let child_pages = self.spawn_children(section, threshold);

        let ordinal = self.tree.node(section).ordinal;
        let real_level = self.tree.node(section).real_level;
        let mut root = Node::new(Context::Document);
        root.inherits_from = Some(origin);
        root.real_level = real_level.saturating_sub(1);
        root.page = Some(page);
        root.blocks.push(section);
        let root = self.tree.push(root);
        self.tree.node_mut(root).ordinal = ordinal;
        self.tree.node_mut(section).parent = Some(root);

        Reparenter::new(&mut self.tree).rebase(section, page);

        let node = self.tree.node(section);
        let id = node.id.clone().unwrap_or_default();
        let title = node
            .section()
            .map(|info| plain_text(&info.title))
            .unwrap_or_default();
        log::debug!("promoted section '{}' to its own page", id);

        self.pages[page.0] = Page {
            id,
            title,
            real_level,
            root,
            child_pages,
            nav: Navigation::default(),
            notitle: true,
            source_location: None,
        };
        page
    }

    /// Give a sectionless page root an empty first-level section
    fn ensure_section(&mut self, page_root: NodeId) {
        if self.tree.first_section(page_root).is_some() {
            return;
        }
        let mut placeholder = Node::new(Context::Section(SectionInfo::new(Vec::new())));
        placeholder.level = 1;
        placeholder.real_level = self.tree.node(page_root).real_level + 1;
        self.tree.append(page_root, placeholder);
    }
}

/// Record each page's source path for "Edit this page" links
///
/// A `source-location` attribute on the page's first section wins; otherwise
/// the section's source file is used, relative to `project_dir` when given.
pub fn update_source_locations(forest: &mut Forest, project_dir: Option<&Path>) {
    for page in forest.ids().collect::<Vec<_>>() {
        let Some(first) = forest.first_section(page) else {
            continue;
        };
        let node = forest.tree.node(first);
        let location = match node.attr("source-location") {
            Some(explicit) => Some(explicit.to_string()),
            None => node.source.as_ref().map(|source| {
                let path = project_dir
                    .and_then(|dir| source.file.strip_prefix(dir).ok())
                    .unwrap_or(&source.file);
                path.display().to_string()
            }),
        };
        forest.page_mut(page).source_location = location;
    }
}
