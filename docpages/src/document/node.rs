//! Block-level nodes of the document tree

use super::inline::Inline;
use super::section_number::SectionNumber;
use crate::forest::PageId;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Index of a node in the document arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Table cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(align: pulldown_cmark::Alignment) -> Self {
        match align {
            pulldown_cmark::Alignment::None => Alignment::None,
            pulldown_cmark::Alignment::Left => Alignment::Left,
            pulldown_cmark::Alignment::Center => Alignment::Center,
            pulldown_cmark::Alignment::Right => Alignment::Right,
        }
    }
}

/// Where a node came from in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
}

/// Kind of a section, used for signifier text in book documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionName {
    Section,
    Chapter,
    Part,
    Appendix,
}

/// Section-specific data
#[derive(Debug, Clone)]
pub struct SectionInfo {
    /// Heading content
    pub title: Vec<Inline>,
    pub sectname: SectionName,
    /// Whether the section takes part in numbering
    pub numbered: bool,
    /// Custom caption (e.g. "Appendix A: "); captioned sections carry no number
    pub caption: Option<String>,
    /// Number assigned on the unsplit tree
    pub number: Option<SectionNumber>,
}

impl SectionInfo {
    pub fn new(title: Vec<Inline>) -> Self {
        Self {
            title,
            sectname: SectionName::Section,
            numbered: false,
            caption: None,
            number: None,
        }
    }
}

/// One entry of a description list: its terms and optional description
#[derive(Debug, Clone, Default)]
pub struct DlistItem {
    /// Term list items
    pub terms: Vec<NodeId>,
    /// Description list item
    pub description: Option<NodeId>,
}

/// Closed set of node kinds
///
/// Every variant states explicitly where its structural children live; see
/// [`Node::structural_children`].
#[derive(Debug, Clone)]
pub enum Context {
    /// Document root (the original document or a page root)
    Document,

    Section(SectionInfo),

    Paragraph(Vec<Inline>),

    /// A code block
    Listing {
        language: Option<String>,
        code: String,
    },

    /// A block quote; quoted blocks are children
    Quote,

    /// An ordered (`start` set) or unordered list; list items are children
    List { start: Option<u64> },

    /// A list item; `text` is the principal text (description list terms),
    /// nested blocks are children
    ListItem { text: Vec<Inline> },

    /// A description list; its items are not regular children
    DescriptionList { items: Vec<DlistItem> },

    /// A table; columns and cells are not regular children
    Table {
        columns: Vec<NodeId>,
        head: Vec<NodeId>,
        body: Vec<Vec<NodeId>>,
    },

    TableColumn { align: Alignment },

    TableCell { text: Vec<Inline> },

    Image {
        target: String,
        alt: String,
        title: String,
    },

    ThematicBreak,

    /// Raw HTML block passed through as-is
    Pass(String),
}

impl Context {
    /// Short name used in log messages
    pub fn name(&self) -> &'static str {
        match self {
            Context::Document => "document",
            Context::Section(_) => "section",
            Context::Paragraph(_) => "paragraph",
            Context::Listing { .. } => "listing",
            Context::Quote => "quote",
            Context::List { .. } => "list",
            Context::ListItem { .. } => "list_item",
            Context::DescriptionList { .. } => "dlist",
            Context::Table { .. } => "table",
            Context::TableColumn { .. } => "table_column",
            Context::TableCell { .. } => "table_cell",
            Context::Image { .. } => "image",
            Context::ThematicBreak => "thematic_break",
            Context::Pass(_) => "pass",
        }
    }
}

/// A node of the document tree
#[derive(Debug, Clone)]
pub struct Node {
    pub context: Context,

    /// Anchor id
    pub id: Option<String>,

    /// String-typed attribute bag (`pagelevels`, `toclevels`, ...)
    pub attributes: BTreeMap<String, String>,

    /// Section level relative to the owning page (rebased on promotion)
    pub level: usize,

    /// Depth in the original, unsplit tree (document = 0); never rebased
    pub real_level: usize,

    pub parent: Option<NodeId>,

    /// Owning page, assigned by the splitter
    pub page: Option<PageId>,

    /// For page roots: the node that originally contained the promoted section
    pub inherits_from: Option<NodeId>,

    /// Ordered child blocks
    pub blocks: Vec<NodeId>,

    /// Position in document order
    pub ordinal: usize,

    pub source: Option<SourceLocation>,
}

impl Node {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            id: None,
            attributes: BTreeMap::new(),
            level: 0,
            real_level: 0,
            parent: None,
            page: None,
            inherits_from: None,
            blocks: Vec::new(),
            ordinal: 0,
            source: None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self.context, Context::Section(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self.context, Context::Document)
    }

    pub fn section(&self) -> Option<&SectionInfo> {
        match &self.context {
            Context::Section(info) => Some(info),
            _ => None,
        }
    }

    pub fn section_mut(&mut self) -> Option<&mut SectionInfo> {
        match &mut self.context {
            Context::Section(info) => Some(info),
            _ => None,
        }
    }

    /// Attribute lookup on this node only
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All nodes this node structurally contains
    ///
    /// Description list terms and descriptions, and table columns, header
    /// cells and body cells are not in `blocks` but are children all the same.
    pub fn structural_children(&self) -> Vec<NodeId> {
        match &self.context {
            Context::Document
            | Context::Section(_)
            | Context::Quote
            | Context::List { .. }
            | Context::ListItem { .. } => self.blocks.clone(),
            Context::DescriptionList { items } => items
                .iter()
                .flat_map(|item| item.terms.iter().copied().chain(item.description))
                .collect(),
            Context::Table {
                columns,
                head,
                body,
            } => columns
                .iter()
                .chain(head)
                .chain(body.iter().flatten())
                .copied()
                .collect(),
            Context::Paragraph(_)
            | Context::Listing { .. }
            | Context::TableColumn { .. }
            | Context::TableCell { .. }
            | Context::Image { .. }
            | Context::ThematicBreak
            | Context::Pass(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dlist_children_include_terms_and_descriptions() {
        let node = Node::new(Context::DescriptionList {
            items: vec![
                DlistItem {
                    terms: vec![NodeId(1), NodeId(2)],
                    description: Some(NodeId(3)),
                },
                DlistItem {
                    terms: vec![NodeId(4)],
                    description: None,
                },
            ],
        });
        assert_eq!(
            node.structural_children(),
            vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
    }

    #[test]
    fn test_table_children_include_columns_and_cells() {
        let node = Node::new(Context::Table {
            columns: vec![NodeId(1), NodeId(2)],
            head: vec![NodeId(3), NodeId(4)],
            body: vec![vec![NodeId(5), NodeId(6)], vec![NodeId(7), NodeId(8)]],
        });
        let children = node.structural_children();
        assert_eq!(children.len(), 8);
        assert_eq!(children.first(), Some(&NodeId(1)));
        assert_eq!(children.last(), Some(&NodeId(8)));
    }

    #[test]
    fn test_leaf_blocks_have_no_children() {
        let mut node = Node::new(Context::Paragraph(Vec::new()));
        node.blocks.push(NodeId(9));
        assert!(node.structural_children().is_empty());
    }
}
