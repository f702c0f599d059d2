//! Tree builders shared by unit tests

use crate::catalog::Catalog;
use crate::document::{Context, DocumentTree, Inline, Node, NodeId, SectionInfo, TextRun};

/// Build a document from `(level, id)` pairs in document order
///
/// Each section is titled after its id (upper-cased) and holds one paragraph
/// ahead of its subsections. Section ids are registered in the returned
/// catalog with their title as reftext.
pub(crate) fn outline(sections: &[(usize, Option<&str>)]) -> (DocumentTree, Catalog) {
    let mut tree = DocumentTree::new();
    let mut catalog = Catalog::new();
    let root = tree.root();
    tree.node_mut(root)
        .attributes
        .insert("doctitle".to_string(), "Manual".to_string());
    let mut open: Vec<(usize, NodeId)> = Vec::new();

    for (index, &(level, id)) in sections.iter().enumerate() {
        while open.last().is_some_and(|&(open_level, _)| open_level >= level) {
            open.pop();
        }
        let parent = open.last().map_or(root, |&(_, node)| node);

        let title = id.map_or_else(|| format!("Untitled {}", index), str::to_uppercase);
        let mut node = Node::new(Context::Section(SectionInfo::new(vec![Inline::Text(
            TextRun::new(title.clone()),
        )])));
        node.level = level;
        node.id = id.map(str::to_string);
        let section = tree.append(parent, node);

        let mut para = Node::new(Context::Paragraph(vec![Inline::Text(TextRun::new(format!(
            "Body of {}",
            title
        )))]));
        para.level = level;
        tree.append(section, para);

        if let Some(id) = id {
            catalog.register(id, section, Some(title));
        }
        open.push((level, section));
    }

    (tree, catalog)
}

/// Node carrying anchor `id`
pub(crate) fn find(tree: &DocumentTree, id: &str) -> NodeId {
    tree.ids()
        .find(|&n| tree.node(n).id.as_deref() == Some(id))
        .unwrap_or_else(|| panic!("no node with id '{}'", id))
}

pub(crate) fn set_attr(tree: &mut DocumentTree, id: &str, key: &str, value: &str) {
    let node = find(tree, id);
    tree.node_mut(node)
        .attributes
        .insert(key.to_string(), value.to_string());
}
