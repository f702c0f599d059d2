//! Navigation markup: breadcrumbs, previous/next links and the table of contents
//!
//! Every page gets the same outline, rendered from the top page and following
//! document order across page boundaries. Links are produced from the current
//! page's point of view, so each rendered page needs its own call.

use crate::attributes::{self, AttributeKey};
use crate::document::{to_html, Node, NodeId, SectionInfo, SectionName};
use crate::forest::{Forest, PageId};
use crate::paths::PathResolver;
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

static DROP_ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:a\b[^>]*|/a)>").unwrap());

/// Document-level settings that shape navigation text
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Book documents prefix chapters and parts with a signifier
    pub book: bool,
    pub chapter_signifier: String,
    pub part_signifier: String,
    /// Repository URL for "Edit this page" links
    pub project_gh: Option<String>,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            book: false,
            chapter_signifier: "Chapter".to_string(),
            part_signifier: "Part".to_string(),
            project_gh: None,
        }
    }
}

enum OutlineEntry {
    Page(PageId),
    Section(NodeId),
}

/// Renders navigation for the pages of one linked forest
pub struct NavigationRenderer<'a> {
    forest: &'a Forest,
    paths: &'a PathResolver<'a>,
    options: &'a NavigationOptions,
}

impl<'a> NavigationRenderer<'a> {
    pub fn new(
        forest: &'a Forest,
        paths: &'a PathResolver<'a>,
        options: &'a NavigationOptions,
    ) -> Self {
        Self {
            forest,
            paths,
            options,
        }
    }

    /// Navigation placed above the page content
    pub fn header(&self, page: PageId) -> String {
        let mut html = String::from("<div class=\"nav-links\"><div class=\"nav-links-content\">");
        if let Some(crumbs) = self.breadcrumbs(page) {
            html.push_str(&crumbs);
        }
        html.push_str(&self.siblings(page, "siblings-header"));
        html.push_str("</div></div>");
        html
    }

    /// Navigation placed below the page content, preceded by the edit link
    pub fn footer(&self, page: PageId) -> String {
        let mut html = self.edit_link(page).unwrap_or_default();
        html.push_str("<div class=\"nav-links\"><div class=\"nav-links-content\">");
        html.push_str(&self.siblings(page, "siblings-footer"));
        html.push_str("</div></div>");
        html
    }

    /// Links from the top page down to `page`; `None` for the top page
    pub fn breadcrumbs(&self, page: PageId) -> Option<String> {
        self.forest.page(page).nav.parent?;

        let mut chain = vec![page];
        let mut current = self.forest.page(page).nav.parent;
        while let Some(ancestor) = current {
            chain.push(ancestor);
            current = self.forest.page(ancestor).nav.parent;
        }

        let links: String = chain
            .iter()
            .rev()
            .map(|&target| self.nav_link(page, target, "nav-link nav-crumb"))
            .collect();
        Some(format!("<nav id=\"breadcrumbs\"><ul>{}</ul></nav>", links))
    }

    /// Previous/next links in a `<nav>` with the given id
    pub fn siblings(&self, page: PageId, nav_id: &str) -> String {
        let nav = self.forest.page(page).nav;
        let mut links = String::new();
        if let Some(prev) = nav.prev {
            links.push_str(&self.nav_link(page, prev, "nav-link nav-prev"));
        }
        if let Some(next) = nav.next {
            links.push_str(&self.nav_link(page, next, "nav-link nav-next"));
        }
        format!("<nav id=\"{}\"><ul>{}</ul></nav>", nav_id, links)
    }

    /// One navigation list item pointing at `target`, seen from `current`
    pub fn nav_link(&self, current: PageId, target: PageId, role: &str) -> String {
        let page = self.forest.page(target);
        let href = self.paths.resolve_target(current, &page.id, None);
        format!(
            "<li class=\"{}\"><a href=\"{}\" title=\"{}\"><span class=\"title\">{}</span></a></li>",
            role,
            html_escape::encode_double_quoted_attribute(&href),
            html_escape::encode_double_quoted_attribute(&page.title),
            self.page_title_html(target)
        )
    }

    fn page_title_html(&self, page: PageId) -> String {
        let p = self.forest.page(page);
        let section_title = self
            .forest
            .first_section(page)
            .and_then(|s| self.forest.tree.node(s).section())
            .filter(|info| p.notitle && !info.title.is_empty())
            .map(|info| strip_anchors(&to_html(&info.title)));
        section_title.unwrap_or_else(|| html_escape::encode_text(&p.title).into_owned())
    }

    fn edit_link(&self, page: PageId) -> Option<String> {
        let project = self.options.project_gh.as_deref()?;
        let location = self.forest.page(page).source_location.as_deref()?;
        let href = format!("{}/{}", project, location);
        Some(format!(
            "<div class=\"edit-link\"><div class=\"edit-link-content\"><a href=\"{}\">Edit this page</a></div></div>",
            html_escape::encode_double_quoted_attribute(&href)
        ))
    }

    /// Table of contents as seen from `current`
    ///
    /// # Returns
    /// The nested `<ul>` lists, or an empty string when there is nothing to list
    pub fn outline(&self, current: PageId) -> String {
        self.outline_page(current, self.forest.root())
            .unwrap_or_default()
    }

    fn outline_page(&self, current: PageId, page: PageId) -> Option<String> {
        let tree = &self.forest.tree;
        let first = self.forest.first_section(page)?;
        let p = self.forest.page(page);
        if p.real_level >= attributes::resolve(tree, first, AttributeKey::TocLevels) {
            return None;
        }

        // a promoted page lists what is inside its own section
        let container = if tree.node(first).id.as_deref() == Some(p.id.as_str()) {
            first
        } else {
            p.root
        };

        let sections = tree
            .sections(container)
            .filter(|&s| listable(tree.node(s)))
            .map(|s| (tree.node(s).ordinal, OutlineEntry::Section(s)));
        let pages = p
            .child_pages
            .iter()
            .map(|&c| (tree.node(self.forest.page(c).root).ordinal, OutlineEntry::Page(c)));
        let entries = sections
            .chain(pages)
            .sorted_by_key(|(ordinal, _)| *ordinal)
            .map(|(_, entry)| entry)
            .collect();

        self.outline_list(current, entries, p.real_level + 1)
    }

    fn outline_section(&self, current: PageId, section: NodeId) -> Option<String> {
        let tree = &self.forest.tree;
        let toclevels = attributes::resolve(tree, section, AttributeKey::TocLevels);
        if tree.node(section).real_level >= toclevels {
            return None;
        }

        let entries = tree
            .sections(section)
            .filter(|&s| listable(tree.node(s)))
            .map(OutlineEntry::Section)
            .collect();
        self.outline_list(current, entries, tree.node(section).real_level + 1)
    }

    fn outline_list(
        &self,
        current: PageId,
        entries: Vec<OutlineEntry>,
        level: usize,
    ) -> Option<String> {
        if entries.is_empty() {
            return None;
        }

        let mut html = format!("<ul class=\"sectlevel{}\">\n", level);
        for entry in entries {
            let (section, nested) = match entry {
                OutlineEntry::Page(page) => (
                    self.forest.first_section(page),
                    self.outline_page(current, page),
                ),
                OutlineEntry::Section(section) => {
                    (Some(section), self.outline_section(current, section))
                }
            };
            let Some(item) = section.and_then(|s| self.outline_item(current, s)) else {
                continue;
            };
            html.push_str(&item);
            if let Some(nested) = nested {
                html.push('\n');
                html.push_str(&nested);
            }
            html.push_str("</li>\n");
        }
        html.push_str("</ul>\n");
        Some(html)
    }

    /// Opening `<li>` and link of one outline entry
    fn outline_item(&self, current: PageId, section: NodeId) -> Option<String> {
        let node = self.forest.tree.node(section);
        let info = node.section()?;
        let title = strip_anchors(&format!(
            "{}{}",
            self.numeral(node, info),
            to_html(&info.title)
        ));

        let current_id = self.forest.page(current).id.as_str();
        let item = match node.id.as_deref() {
            Some(id) if id == current_id => {
                format!("<li><a href=\"#\" class=\"this-page\">{}</a>", title)
            }
            Some(id) => format!(
                "<li><a href=\"{}\">{}</a>",
                html_escape::encode_double_quoted_attribute(
                    &self.paths.resolve_target(current, id, None)
                ),
                title
            ),
            None => format!("<li><a href=\"#\">{}</a>", title),
        };
        Some(item)
    }

    /// Signifier and number shown in front of a top-level book section
    fn numeral(&self, node: &Node, info: &SectionInfo) -> String {
        let sectnumlevels = attributes::resolve(
            &self.forest.tree,
            self.forest.tree.root(),
            AttributeKey::SectNumLevels,
        );
        let level = node.real_level;
        if !self.options.book
            || info.caption.is_some()
            || !info.numbered
            || level > sectnumlevels
            || level >= 2
        {
            return String::new();
        }
        let Some(number) = &info.number else {
            return String::new();
        };

        match info.sectname {
            SectionName::Chapter => {
                with_signifier(&self.options.chapter_signifier, &number.sectnum('.'))
            }
            SectionName::Part => {
                with_signifier(&self.options.part_signifier, &number.roman_sectnum(':'))
            }
            SectionName::Section | SectionName::Appendix => format!("{} ", number.sectnum('.')),
        }
    }
}

fn with_signifier(signifier: &str, number: &str) -> String {
    if signifier.is_empty() {
        format!("{} ", number)
    } else {
        format!("{} {} ", signifier, number)
    }
}

/// Sections with neither an id nor a title (page placeholders) have no entry
fn listable(node: &Node) -> bool {
    node.id.is_some() || node.section().is_some_and(|info| !info.title.is_empty())
}

/// Remove `<a ...>` and `</a>` tags, keeping their content
pub fn strip_anchors(html: &str) -> String {
    if html.contains("<a") {
        DROP_ANCHOR_RE.replace_all(html, "").into_owned()
    } else {
        html.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::document::{DocumentTree, Inline};
    use crate::link::{link, ReferenceIndex};
    use crate::split::split;
    use crate::testing::{find, outline, set_attr};

    fn example_tree() -> (DocumentTree, Catalog) {
        outline(&[
            (1, Some("a")),
            (2, Some("b")),
            (3, Some("c")),
            (2, Some("d")),
            (1, Some("e")),
        ])
    }

    fn build(tree: DocumentTree, mut catalog: Catalog, threshold: i64) -> (Forest, ReferenceIndex) {
        catalog.register("index", tree.root(), Some("Manual".to_string()));
        let mut forest = split(tree, "index", threshold);
        let index = link(&mut forest, &catalog).unwrap();
        (forest, index)
    }

    fn example() -> (Forest, ReferenceIndex) {
        let (tree, catalog) = example_tree();
        build(tree, catalog, 2)
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
    }

    #[test]
    fn test_top_page_header_has_no_breadcrumbs() {
        let (forest, index) = example();
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        let header = nav.header(forest.root());
        assert!(!header.contains("breadcrumbs"));
        assert!(header.contains("<nav id=\"siblings-header\">"));
        assert!(header.contains(
            "<li class=\"nav-link nav-next\"><a href=\"a.html\" title=\"A\"><span class=\"title\">A</span></a></li>"
        ));
        assert!(!header.contains("nav-prev"));
    }

    #[test]
    fn test_nested_page_header() {
        let (forest, index) = example();
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);
        let b = forest.find("b").unwrap();

        let crumbs = nav.breadcrumbs(b).unwrap();
        let root = position(&crumbs, "href=\"../index.html\" title=\"Manual\"");
        let a = position(&crumbs, "href=\"../a.html\"");
        let this = position(&crumbs, "href=\"#b\"");
        assert!(root < a && a < this);
        assert_eq!(crumbs.matches("nav-link nav-crumb").count(), 3);

        let header = nav.header(b);
        assert!(header.starts_with("<div class=\"nav-links\"><div class=\"nav-links-content\">"));
        assert!(header.contains("<li class=\"nav-link nav-prev\"><a href=\"../a.html\""));
        assert!(header.contains("<li class=\"nav-link nav-next\"><a href=\"d.html\""));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let (forest, index) = example();
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);
        let e = forest.find("e").unwrap();

        let footer = nav.footer(e);
        assert!(footer.contains("<nav id=\"siblings-footer\">"));
        assert!(footer.contains("<li class=\"nav-link nav-prev\"><a href=\"a/d.html\""));
        assert!(!footer.contains("nav-next"));
    }

    #[test]
    fn test_edit_link_needs_project_and_location() {
        let (mut forest, index) = example();
        let a = forest.find("a").unwrap();
        forest.page_mut(a).source_location = Some("docs/a.md".to_string());

        let paths = PathResolver::new(&forest, &index, ".html");
        let mut options = NavigationOptions::default();
        assert!(!NavigationRenderer::new(&forest, &paths, &options)
            .footer(a)
            .contains("edit-link"));

        options.project_gh = Some("https://github.com/acme/manual/blob/main".to_string());
        let nav = NavigationRenderer::new(&forest, &paths, &options);
        assert!(nav.footer(a).starts_with(
            "<div class=\"edit-link\"><div class=\"edit-link-content\"><a href=\"https://github.com/acme/manual/blob/main/docs/a.md\">Edit this page</a></div></div>"
        ));
        let e = forest.find("e").unwrap();
        assert!(!nav.footer(e).contains("edit-link"));
    }

    #[test]
    fn test_outline_follows_document_order() {
        let (forest, index) = example();
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        let toc = nav.outline(forest.root());
        assert!(toc.starts_with("<ul class=\"sectlevel1\">"));
        assert!(toc.contains("<ul class=\"sectlevel2\">"));
        assert!(!toc.contains("sectlevel3"));
        assert!(!toc.contains(">C<"));

        let a = position(&toc, "<a href=\"a.html\">A</a>");
        let b = position(&toc, "<a href=\"a/b.html\">B</a>");
        let d = position(&toc, "<a href=\"a/d.html\">D</a>");
        let e = position(&toc, "<a href=\"e.html\">E</a>");
        assert!(a < b && b < d && d < e);
    }

    #[test]
    fn test_outline_marks_current_page() {
        let (forest, index) = example();
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);
        let b = forest.find("b").unwrap();

        let toc = nav.outline(b);
        assert!(toc.contains("<li><a href=\"#\" class=\"this-page\">B</a>"));
        assert!(toc.contains("<a href=\"../a.html\">A</a>"));
        assert!(toc.contains("<a href=\"d.html\">D</a>"));
        assert_eq!(toc.matches("this-page").count(), 1);
    }

    #[test]
    fn test_deeper_toclevels_reach_inline_sections() {
        let (mut tree, catalog) = example_tree();
        let root = tree.root();
        tree.node_mut(root)
            .attributes
            .insert("toclevels".to_string(), "3".to_string());
        let (forest, index) = build(tree, catalog, 2);
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        let toc = nav.outline(forest.root());
        assert!(toc.contains("<ul class=\"sectlevel3\">"));
        assert!(toc.contains("<a href=\"a/b.html#c\">C</a>"));
    }

    #[test]
    fn test_section_toclevels_override() {
        let (mut tree, catalog) = example_tree();
        set_attr(&mut tree, "a", "toclevels", "1");
        let (forest, index) = build(tree, catalog, 2);
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        let toc = nav.outline(forest.root());
        assert!(toc.contains(">A</a>"));
        assert!(toc.contains(">E</a>"));
        assert!(!toc.contains(">B</a>"));
        assert!(!toc.contains("sectlevel2"));
    }

    #[test]
    fn test_outline_of_unsplit_document() {
        let (tree, catalog) = example_tree();
        let (forest, index) = build(tree, catalog, 0);
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        let toc = nav.outline(forest.root());
        assert!(toc.contains("<a href=\"#a\">A</a>"));
        assert!(toc.contains("<a href=\"#b\">B</a>"));
        assert!(!toc.contains(">C<"));
    }

    #[test]
    fn test_book_signifiers() {
        let (mut tree, catalog) = outline(&[(1, Some("p")), (1, Some("intro")), (2, Some("goals"))]);
        let p = find(&tree, "p");
        let intro = find(&tree, "intro");
        if let Some(info) = tree.node_mut(p).section_mut() {
            info.sectname = SectionName::Part;
        }
        if let Some(info) = tree.node_mut(intro).section_mut() {
            info.sectname = SectionName::Chapter;
        }
        tree.number_sections(true);
        let (forest, index) = build(tree, catalog, 1);
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions {
            book: true,
            ..NavigationOptions::default()
        };
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        let toc = nav.outline(forest.root());
        assert!(toc.contains(">Part I: P</a>"));
        assert!(toc.contains(">Chapter 1. INTRO</a>"));
        assert!(toc.contains(">GOALS</a>"));
    }

    #[test]
    fn test_article_has_no_signifiers() {
        let (mut tree, catalog) = outline(&[(1, Some("intro"))]);
        tree.number_sections(true);
        let (forest, index) = build(tree, catalog, 0);
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        assert!(nav.outline(forest.root()).contains("<a href=\"#intro\">INTRO</a>"));
    }

    #[test]
    fn test_anchor_tags_dropped_from_titles() {
        let (mut tree, catalog) = outline(&[(1, Some("intro"))]);
        let intro = find(&tree, "intro");
        if let Some(info) = tree.node_mut(intro).section_mut() {
            info.title.push(Inline::Html("<a id=\"start\"></a>".to_string()));
        }
        let (forest, index) = build(tree, catalog, 0);
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let nav = NavigationRenderer::new(&forest, &paths, &options);

        assert!(nav.outline(forest.root()).contains("<a href=\"#intro\">INTRO</a>"));
        assert_eq!(strip_anchors("x <a href=\"y\">z</a>"), "x z");
    }
}
