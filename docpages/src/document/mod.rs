//! Arena document tree
//!
//! The front end produces a [`DocumentTree`]; the splitter consumes it. Nodes
//! live in one arena and refer to each other by [`NodeId`]. Parent and child
//! links form the owning tree; the owning page and `inherits_from` are plain
//! indices on top of it.

mod inline;
mod node;
mod section_number;

pub use inline::{plain_text, styled_html, to_html, Inline, TextRun, TextStyle};
pub use node::{
    Alignment, Context, DlistItem, Node, NodeId, SectionInfo, SectionName, SourceLocation,
};
pub use section_number::{to_roman, SectionNumber};

/// Document tree stored in an arena
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl DocumentTree {
    /// Create a tree holding only an empty document node
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.push(Node::new(Context::Document));
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in arena order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Add a detached node; its ordinal is its arena position
    pub fn push(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.ordinal = id.0;
        self.nodes.push(node);
        id
    }

    /// Add a node as the last block of `parent`
    pub fn append(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        node.parent = Some(parent);
        let id = self.push(node);
        self.node_mut(parent).blocks.push(id);
        id
    }

    /// Add a node whose parent is `parent` without listing it in `blocks`
    ///
    /// Used for description list items and table columns/cells, which the
    /// container tracks in its own payload.
    pub fn attach(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        node.parent = Some(parent);
        self.push(node)
    }

    /// Child blocks of `node` that are sections
    pub fn sections(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(node)
            .blocks
            .iter()
            .copied()
            .filter(|&id| self.node(id).is_section())
    }

    pub fn first_section(&self, node: NodeId) -> Option<NodeId> {
        self.sections(node).next()
    }

    /// All structural descendants of `node` in pre-order, excluding `node`
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(node).structural_children();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let mut children = self.node(id).structural_children();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Nearest ancestor-or-self that is a document node
    pub fn enclosing_document(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.node(id).is_document() {
                return Some(id);
            }
            current = self.node(id).parent;
        }
        None
    }

    /// Record every node's depth in the tree, the document being depth 0
    pub fn assign_real_levels(&mut self) {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            self.node_mut(id).real_level = depth;
            for child in self.node(id).structural_children() {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Assign section numbers and appendix captions on the whole tree
    ///
    /// Runs once, before splitting, so numbering survives the split.
    pub fn number_sections(&mut self, sectnums: bool) {
        let mut counters = Counters::default();
        self.number_children(self.root, &Scope::Top, sectnums, &mut counters);
    }

    fn number_children(
        &mut self,
        parent: NodeId,
        scope: &Scope,
        sectnums: bool,
        counters: &mut Counters,
    ) {
        let sections: Vec<NodeId> = self.sections(parent).collect();
        let mut index = 0;

        for id in sections {
            let unnumbered = self.node(id).attr("numbered") == Some("false");
            let Some(info) = self.node_mut(id).section_mut() else {
                continue;
            };

            let child_scope = match info.sectname {
                SectionName::Appendix => {
                    counters.appendix += 1;
                    if info.caption.is_none() {
                        info.caption = Some(format!(
                            "Appendix {}: ",
                            appendix_letter(counters.appendix)
                        ));
                    }
                    info.numbered = false;
                    Scope::Unnumbered
                }
                SectionName::Part => {
                    counters.part += 1;
                    info.numbered = sectnums;
                    info.number = Some(SectionNumber::top(counters.part));
                    Scope::Top
                }
                SectionName::Chapter | SectionName::Section => {
                    if !sectnums || unnumbered || info.caption.is_some() {
                        Scope::Unnumbered
                    } else {
                        let number = match scope {
                            Scope::Top => {
                                counters.chapter += 1;
                                Some(SectionNumber::top(counters.chapter))
                            }
                            Scope::Under(prefix) => {
                                index += 1;
                                Some(prefix.child(index))
                            }
                            Scope::Unnumbered => None,
                        };
                        info.numbered = number.is_some();
                        info.number = number.clone();
                        number.map_or(Scope::Unnumbered, Scope::Under)
                    }
                }
            };

            self.number_children(id, &child_scope, sectnums, counters);
        }
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbering context of a section's children
enum Scope {
    /// Children of the document or of a part; chapters number document-wide
    Top,
    Under(SectionNumber),
    Unnumbered,
}

#[derive(Default)]
struct Counters {
    chapter: u32,
    part: u32,
    appendix: u32,
}

fn appendix_letter(n: u32) -> char {
    char::from_u32(u32::from(b'A') + n.saturating_sub(1)).unwrap_or('?')
}
