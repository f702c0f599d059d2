//! Re-parenting of promoted subtrees
//!
//! When a section becomes a page, every node below it changes owner and its
//! level is rebased so the section behaves like the first-level section of a
//! fresh document. Real levels are re-derived from the subtree root's real
//! level and never shift.

use crate::document::{DocumentTree, NodeId};
use crate::forest::PageId;

/// Walks a subtree and rewrites ownership and levels
pub struct Reparenter<'a> {
    tree: &'a mut DocumentTree,
}

impl<'a> Reparenter<'a> {
    pub fn new(tree: &'a mut DocumentTree) -> Self {
        Self { tree }
    }

    /// Move `subtree_root` and all of its descendants to `owner`
    ///
    /// Levels become `level - root_level + 1`; real levels keep counting from
    /// the root's real level.
    pub fn rebase(&mut self, subtree_root: NodeId, owner: PageId) {
        let base = self.tree.node(subtree_root).level;
        self.walk(subtree_root, owner, Some(base));
    }

    /// Give `root` and its descendants to `owner` without touching levels
    pub fn claim(&mut self, root: NodeId, owner: PageId) {
        self.walk(root, owner, None);
    }

    fn walk(&mut self, root: NodeId, owner: PageId, base: Option<usize>) {
        let root_real_level = self.tree.node(root).real_level;
        let mut stack = vec![(root, root_real_level)];

        while let Some((id, real_level)) = stack.pop() {
            let node = self.tree.node_mut(id);
            node.page = Some(owner);
            if let Some(base) = base {
                node.level = (node.level + 1).saturating_sub(base);
            }
            debug_assert_eq!(
                node.real_level, real_level,
                "real level of {} drifted from its original depth",
                id
            );
            node.real_level = real_level;

            // Columns, cells and dlist items are reached here too; their parent
            // reference is rewritten like any other child's.
            for child in node.structural_children() {
                self.tree.node_mut(child).parent = Some(id);
                stack.push((child, real_level + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Alignment, Context, DlistItem, Node, SectionInfo};

    struct Fixture {
        tree: DocumentTree,
        section: NodeId,
        sub: NodeId,
        column: NodeId,
        cell: NodeId,
        description: NodeId,
        nested: NodeId,
    }

    fn node(context: Context, level: usize) -> Node {
        let mut node = Node::new(context);
        node.level = level;
        node
    }

    /// Level-2 section holding a subsection, a table and a description list
    fn fixture() -> Fixture {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let top = tree.append(root, node(Context::Section(SectionInfo::new(vec![])), 1));
        let section = tree.append(top, node(Context::Section(SectionInfo::new(vec![])), 2));
        let sub = tree.append(section, node(Context::Section(SectionInfo::new(vec![])), 3));

        let table = tree.append(
            section,
            node(
                Context::Table {
                    columns: vec![],
                    head: vec![],
                    body: vec![],
                },
                2,
            ),
        );
        let column = tree.attach(
            table,
            node(
                Context::TableColumn {
                    align: Alignment::Left,
                },
                2,
            ),
        );
        let cell = tree.attach(table, node(Context::TableCell { text: vec![] }, 2));
        tree.node_mut(table).context = Context::Table {
            columns: vec![column],
            head: vec![],
            body: vec![vec![cell]],
        };

        let dlist = tree.append(section, node(Context::DescriptionList { items: vec![] }, 2));
        let term = tree.attach(dlist, node(Context::ListItem { text: vec![] }, 2));
        let description = tree.attach(dlist, node(Context::ListItem { text: vec![] }, 2));
        let nested = tree.append(description, node(Context::Paragraph(vec![]), 2));
        tree.node_mut(dlist).context = Context::DescriptionList {
            items: vec![DlistItem {
                terms: vec![term],
                description: Some(description),
            }],
        };

        tree.assign_real_levels();
        Fixture {
            tree,
            section,
            sub,
            column,
            cell,
            description,
            nested,
        }
    }

    #[test]
    fn test_rebase_reaches_every_descendant() {
        let mut fx = fixture();
        let owner = PageId(3);
        Reparenter::new(&mut fx.tree).rebase(fx.section, owner);

        let mut reached = fx.tree.descendants(fx.section);
        reached.push(fx.section);
        assert_eq!(reached.len(), 9);
        for id in reached {
            assert_eq!(fx.tree.node(id).page, Some(owner), "{} not reparented", id);
        }
    }

    #[test]
    fn test_rebase_levels_relative_to_root() {
        let mut fx = fixture();
        Reparenter::new(&mut fx.tree).rebase(fx.section, PageId(1));

        assert_eq!(fx.tree.node(fx.section).level, 1);
        assert_eq!(fx.tree.node(fx.sub).level, 2);
        assert_eq!(fx.tree.node(fx.cell).level, 1);
        assert_eq!(fx.tree.node(fx.nested).level, 1);
    }

    #[test]
    fn test_rebase_keeps_real_levels() {
        let mut fx = fixture();
        let before: Vec<usize> = fx
            .tree
            .ids()
            .map(|id| fx.tree.node(id).real_level)
            .collect();

        Reparenter::new(&mut fx.tree).rebase(fx.section, PageId(1));

        let after: Vec<usize> = fx
            .tree
            .ids()
            .map(|id| fx.tree.node(id).real_level)
            .collect();
        assert_eq!(before, after);
        assert_eq!(fx.tree.node(fx.section).real_level, 2);
        assert_eq!(fx.tree.node(fx.nested).real_level, 5);
    }

    #[test]
    fn test_table_and_dlist_parents_point_at_container() {
        let mut fx = fixture();
        Reparenter::new(&mut fx.tree).rebase(fx.section, PageId(1));

        let column_parent = fx.tree.node(fx.column).parent.unwrap();
        assert!(matches!(
            fx.tree.node(column_parent).context,
            Context::Table { .. }
        ));
        let description_parent = fx.tree.node(fx.description).parent.unwrap();
        assert!(matches!(
            fx.tree.node(description_parent).context,
            Context::DescriptionList { .. }
        ));
    }

    #[test]
    fn test_claim_leaves_levels_alone() {
        let mut fx = fixture();
        let root = fx.tree.root();
        Reparenter::new(&mut fx.tree).claim(root, PageId(0));

        assert_eq!(fx.tree.node(fx.section).level, 2);
        assert_eq!(fx.tree.node(fx.sub).level, 3);
        assert_eq!(fx.tree.node(fx.nested).page, Some(PageId(0)));
    }
}
