//! HTML rendering of linked pages
//!
//! Each page becomes a standalone HTML document with:
//! - Header navigation (breadcrumbs, previous/next) and an optional outline
//! - Numbered section headings nested in `sectN` divisions
//! - Cross-references resolved across page boundaries
//! - Footer navigation and an "Edit this page" link

use crate::attributes::{self, AttributeKey};
use crate::document::{styled_html, Alignment, Context, Inline, NodeId, SectionName, TextRun};
use crate::forest::{Forest, PageId};
use crate::link::ReferenceIndex;
use crate::navigation::{strip_anchors, NavigationOptions, NavigationRenderer};
use crate::paths::PathResolver;

/// Renders the pages of one linked forest
pub struct PageRenderer<'a> {
    forest: &'a Forest,
    index: &'a ReferenceIndex,
    paths: &'a PathResolver<'a>,
    nav: NavigationRenderer<'a>,
    toc: bool,
}

impl<'a> PageRenderer<'a> {
    /// # Parameters
    /// * `forest` - The linked forest
    /// * `index` - Anchor index built by the link pass
    /// * `paths` - Path resolver over the same forest
    /// * `options` - Navigation settings
    /// * `toc` - Whether to render the outline on every page
    pub fn new(
        forest: &'a Forest,
        index: &'a ReferenceIndex,
        paths: &'a PathResolver<'a>,
        options: &'a NavigationOptions,
        toc: bool,
    ) -> Self {
        Self {
            forest,
            index,
            paths,
            nav: NavigationRenderer::new(forest, paths, options),
            toc,
        }
    }

    /// Render one page as a complete HTML document
    pub fn render(&self, page: PageId) -> String {
        let p = self.forest.page(page);
        let mut output = String::new();

        write_html_header(&mut output, &p.title);

        output.push_str("<body>\n");
        output.push_str("<div class=\"container\">\n");

        output.push_str("<div id=\"header\">\n");
        output.push_str(&self.nav.header(page));
        output.push('\n');
        if !p.notitle && !p.title.is_empty() {
            output.push_str(&format!(
                "<h1 class=\"document-title\">{}</h1>\n",
                html_escape::encode_text(&p.title)
            ));
        }
        if self.toc {
            let outline = self.nav.outline(page);
            if !outline.is_empty() {
                output.push_str("<div id=\"toc\" class=\"toc\">\n");
                output.push_str("<div id=\"toctitle\">Table of Contents</div>\n");
                output.push_str(&outline);
                output.push_str("</div>\n");
            }
        }
        output.push_str("</div>\n");

        output.push_str("<div id=\"content\">\n");
        for &block in self.forest.blocks(page) {
            self.write_block(&mut output, page, block);
        }
        output.push_str("</div>\n");

        output.push_str("<div id=\"footer\">\n");
        output.push_str(&self.nav.footer(page));
        output.push_str("\n</div>\n");

        output.push_str("</div>\n");
        output.push_str("</body>\n");
        output.push_str("</html>\n");
        output
    }

    /// Write a single block to the output
    fn write_block(&self, output: &mut String, page: PageId, block: NodeId) {
        let node = self.forest.tree.node(block);
        match &node.context {
            Context::Section(_) => self.write_section(output, page, block),

            Context::Paragraph(inlines) => {
                output.push_str(&format!("<p>{}</p>\n", self.inline_html(page, inlines)));
            }

            Context::Listing { language, code } => match language {
                Some(lang) => output.push_str(&format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>\n",
                    html_escape::encode_double_quoted_attribute(lang),
                    html_escape::encode_text(code)
                )),
                None => output.push_str(&format!(
                    "<pre><code>{}</code></pre>\n",
                    html_escape::encode_text(code)
                )),
            },

            Context::Quote => {
                output.push_str("<blockquote>\n");
                self.write_blocks(output, page, &node.blocks);
                output.push_str("</blockquote>\n");
            }

            Context::List { start } => {
                match start {
                    Some(1) => output.push_str("<ol>\n"),
                    Some(n) => output.push_str(&format!("<ol start=\"{}\">\n", n)),
                    None => output.push_str("<ul>\n"),
                }
                for &item in &node.blocks {
                    self.write_list_item(output, page, item);
                }
                output.push_str(if start.is_some() { "</ol>\n" } else { "</ul>\n" });
            }

            Context::DescriptionList { items } => {
                output.push_str("<dl>\n");
                for item in items {
                    for &term in &item.terms {
                        if let Context::ListItem { text } = &self.forest.tree.node(term).context {
                            output.push_str(&format!("<dt>{}</dt>\n", self.inline_html(page, text)));
                        }
                    }
                    if let Some(description) = item.description {
                        output.push_str("<dd>\n");
                        self.write_blocks(output, page, &self.forest.tree.node(description).blocks);
                        output.push_str("</dd>\n");
                    }
                }
                output.push_str("</dl>\n");
            }

            Context::Table {
                columns,
                head,
                body,
            } => self.write_table(output, page, columns, head, body),

            Context::Image { target, alt, title } => {
                write_image(output, target, alt, title);
            }

            Context::ThematicBreak => {
                output.push_str("<hr>\n");
            }

            Context::Pass(html) => {
                output.push_str(html);
                if !html.ends_with('\n') {
                    output.push('\n');
                }
            }

            // rendered by their containers
            Context::Document
            | Context::ListItem { .. }
            | Context::TableColumn { .. }
            | Context::TableCell { .. } => {}
        }
    }

    fn write_blocks(&self, output: &mut String, page: PageId, blocks: &[NodeId]) {
        for &block in blocks {
            self.write_block(output, page, block);
        }
    }

    /// Write a section heading and its content
    fn write_section(&self, output: &mut String, page: PageId, section: NodeId) {
        let node = self.forest.tree.node(section);
        let Some(info) = node.section() else {
            return;
        };

        output.push_str(&format!("<div class=\"sect{}\">\n", node.level));

        if !info.title.is_empty() {
            let level = (node.level + 1).min(6);
            let id_attr = node
                .id
                .as_ref()
                .map(|id| format!(" id=\"{}\"", html_escape::encode_double_quoted_attribute(id)))
                .unwrap_or_default();
            output.push_str(&format!(
                "<h{}{}>{}{}</h{}>\n",
                level,
                id_attr,
                self.heading_prefix(section),
                self.inline_html(page, &info.title),
                level
            ));
        }

        self.write_blocks(output, page, &node.blocks);
        output.push_str("</div>\n");
    }

    /// Caption or number shown in front of a section title
    fn heading_prefix(&self, section: NodeId) -> String {
        let tree = &self.forest.tree;
        let node = tree.node(section);
        let Some(info) = node.section() else {
            return String::new();
        };
        if let Some(caption) = &info.caption {
            return html_escape::encode_text(caption).into_owned();
        }

        let sectnumlevels = attributes::resolve(tree, tree.root(), AttributeKey::SectNumLevels);
        match &info.number {
            Some(number) if info.numbered && node.real_level <= sectnumlevels => {
                match info.sectname {
                    SectionName::Part => format!("{} ", number.roman_sectnum(':')),
                    _ => format!("{} ", number.sectnum('.')),
                }
            }
            _ => String::new(),
        }
    }

    /// Write a single list item; a leading paragraph stays inline with `<li>`
    fn write_list_item(&self, output: &mut String, page: PageId, item: NodeId) {
        output.push_str("<li>");
        let mut blocks = self.forest.tree.node(item).blocks.iter();
        if let Some(&first) = blocks.next() {
            match &self.forest.tree.node(first).context {
                Context::Paragraph(inlines) => {
                    output.push_str(&self.inline_html(page, inlines));
                    output.push('\n');
                }
                _ => self.write_block(output, page, first),
            }
        }
        for &block in blocks {
            self.write_block(output, page, block);
        }
        output.push_str("</li>\n");
    }

    fn write_table(
        &self,
        output: &mut String,
        page: PageId,
        columns: &[NodeId],
        head: &[NodeId],
        body: &[Vec<NodeId>],
    ) {
        let aligns: Vec<Alignment> = columns
            .iter()
            .map(|&column| match self.forest.tree.node(column).context {
                Context::TableColumn { align } => align,
                _ => Alignment::None,
            })
            .collect();

        output.push_str("<table>\n");
        if !head.is_empty() {
            output.push_str("<thead>\n<tr>\n");
            for (i, &cell) in head.iter().enumerate() {
                output.push_str(&format!(
                    "<th{}>{}</th>\n",
                    align_attr(aligns.get(i).copied()),
                    self.cell_html(page, cell)
                ));
            }
            output.push_str("</tr>\n</thead>\n");
        }

        output.push_str("<tbody>\n");
        for row in body {
            output.push_str("<tr>\n");
            for (i, &cell) in row.iter().enumerate() {
                output.push_str(&format!(
                    "<td{}>{}</td>\n",
                    align_attr(aligns.get(i).copied()),
                    self.cell_html(page, cell)
                ));
            }
            output.push_str("</tr>\n");
        }
        output.push_str("</tbody>\n</table>\n");
    }

    fn cell_html(&self, page: PageId, cell: NodeId) -> String {
        match &self.forest.tree.node(cell).context {
            Context::TableCell { text } => self.inline_html(page, text),
            _ => String::new(),
        }
    }

    /// Inline content as seen from `page`
    pub fn inline_html(&self, page: PageId, inlines: &[Inline]) -> String {
        let mut result = String::new();
        for inline in inlines {
            match inline {
                Inline::Text(run) => match (&run.xref, &run.link_url) {
                    (Some(refid), _) => result.push_str(&self.xref_html(page, refid, run)),
                    (None, Some(url)) => result.push_str(&link_html(url, run)),
                    (None, None) => result.push_str(&styled_html(run)),
                },
                Inline::Html(raw) => result.push_str(raw),
                Inline::LineBreak => result.push_str("<br>\n"),
            }
        }
        result
    }

    /// A cross-reference; without its own text it shows the target's reftext
    fn xref_html(&self, page: PageId, refid: &str, run: &TextRun) -> String {
        let target = self.index.get(refid);
        if target.is_none() {
            log::warn!("possible invalid reference: {}", refid);
        }

        let text = if !run.text.is_empty() {
            styled_html(run)
        } else {
            target
                .and_then(|t| t.reftext.as_deref())
                .map(|reftext| strip_anchors(&html_escape::encode_text(reftext)))
                .unwrap_or_else(|| format!("[{}]", html_escape::encode_text(refid)))
        };

        format!(
            "<a href=\"{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(&self.paths.resolve_target(page, refid, None)),
            text
        )
    }
}

/// An external link around a styled run
fn link_html(url: &str, run: &TextRun) -> String {
    let href = html_escape::encode_double_quoted_attribute(url);
    match &run.link_title {
        Some(title) => format!(
            "<a href=\"{}\" title=\"{}\">{}</a>",
            href,
            html_escape::encode_double_quoted_attribute(title),
            styled_html(run)
        ),
        None => format!("<a href=\"{}\">{}</a>", href, styled_html(run)),
    }
}

/// Write an image block to HTML output
fn write_image(output: &mut String, target: &str, alt: &str, title: &str) {
    let src = html_escape::encode_double_quoted_attribute(target);
    let alt = html_escape::encode_double_quoted_attribute(alt);
    if title.is_empty() {
        output.push_str(&format!(
            "<figure><img src=\"{}\" alt=\"{}\"></figure>\n",
            src, alt
        ));
    } else {
        output.push_str(&format!(
            "<figure><img src=\"{}\" alt=\"{}\" title=\"{}\"><figcaption>{}</figcaption></figure>\n",
            src,
            alt,
            html_escape::encode_double_quoted_attribute(title),
            html_escape::encode_text(title)
        ));
    }
}

/// Get HTML align attribute for table cells
fn align_attr(align: Option<Alignment>) -> &'static str {
    match align {
        Some(Alignment::Left) => " style=\"text-align: left;\"",
        Some(Alignment::Center) => " style=\"text-align: center;\"",
        Some(Alignment::Right) => " style=\"text-align: right;\"",
        Some(Alignment::None) | None => "",
    }
}

/// Write HTML header with CSS styling
fn write_html_header(output: &mut String, title: &str) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    output.push_str(&format!("<title>{}</title>\n", html_escape::encode_text(title)));
    output.push_str("<style>\n");
    output.push_str(CSS_STYLES);
    output.push_str("</style>\n");
    output.push_str("</head>\n");
}

/// Page styles: sans-serif body, sticky navigation bars
const CSS_STYLES: &str = r#"
* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Oxygen',
                 'Ubuntu', 'Cantarell', 'Fira Sans', 'Droid Sans', 'Helvetica Neue',
                 sans-serif;
    line-height: 1.6;
    color: #333;
    background-color: #f5f5f5;
    padding: 20px;
}

.container {
    max-width: 900px;
    margin: 0 auto;
    background: white;
    padding: 40px 60px;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
    border-radius: 4px;
}

.document-title {
    font-size: 2.5em;
    font-weight: 700;
    margin: 20px 0;
    color: #1a1a1a;
    border-bottom: 3px solid #0066cc;
    padding-bottom: 10px;
}

.nav-links-content {
    display: flex;
    justify-content: space-between;
    flex-wrap: wrap;
    font-size: 0.9em;
}

.nav-links ul {
    list-style: none;
    display: flex;
    gap: 12px;
}

.nav-links a {
    color: #0066cc;
    text-decoration: none;
}

.nav-crumb + .nav-crumb::before {
    content: "/";
    margin-right: 12px;
    color: #999;
}

.nav-prev .title::before {
    content: "\2190  ";
}

.nav-next .title::after {
    content: "  \2192";
}

#toc {
    margin: 20px 0 30px;
    padding: 16px 20px;
    background-color: #f9f9f9;
    border-left: 4px solid #0066cc;
    border-radius: 4px;
}

#toctitle {
    font-weight: 600;
    margin-bottom: 8px;
}

#toc ul {
    list-style: none;
    padding-left: 16px;
    margin-bottom: 0;
}

#toc ul.sectlevel1 {
    padding-left: 0;
}

#toc a {
    color: #0066cc;
    text-decoration: none;
}

#toc a.this-page {
    font-weight: 700;
    color: #1a1a1a;
}

h1, h2, h3, h4, h5, h6 {
    margin-top: 32px;
    margin-bottom: 16px;
    color: #1a1a1a;
    font-weight: 600;
}

.sect1 > h2 {
    border-bottom: 2px solid #e0e0e0;
    padding-bottom: 8px;
}

p {
    margin-bottom: 16px;
}

code {
    font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', 'Consolas', monospace;
    background-color: #f4f4f4;
    padding: 2px 6px;
    border-radius: 3px;
    font-size: 0.9em;
    color: #d73a49;
}

pre {
    background-color: #f6f8fa;
    border: 1px solid #e1e4e8;
    border-radius: 4px;
    padding: 16px;
    margin-bottom: 16px;
    overflow-x: auto;
}

pre code {
    background: none;
    padding: 0;
    color: #24292e;
}

blockquote {
    border-left: 4px solid #ddd;
    padding-left: 16px;
    margin: 16px 0;
    color: #666;
}

ul, ol, dl {
    margin-bottom: 16px;
    padding-left: 30px;
}

dt {
    font-weight: 600;
}

dd {
    margin-left: 20px;
}

table {
    width: 100%;
    border-collapse: collapse;
    margin-bottom: 20px;
}

th, td {
    padding: 10px 12px;
    border-bottom: 1px solid #d0d7de;
    text-align: left;
}

figure {
    margin: 24px 0;
    text-align: center;
}

figure img {
    max-width: 100%;
    height: auto;
}

.edit-link {
    margin-top: 40px;
    font-size: 0.85em;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::document::{DocumentTree, Node, TextStyle};
    use crate::link::link;
    use crate::split::split;
    use crate::testing::{find, outline};

    fn xref(refid: &str, text: &str) -> Inline {
        Inline::Text(TextRun::with_style(
            text,
            &TextStyle {
                xref: Some(refid.to_string()),
                ..TextStyle::default()
            },
        ))
    }

    fn example_tree() -> (DocumentTree, Catalog) {
        let (mut tree, catalog) = outline(&[
            (1, Some("a")),
            (2, Some("b")),
            (3, Some("c")),
            (2, Some("d")),
            (1, Some("e")),
        ]);
        let e = find(&tree, "e");
        tree.append(
            e,
            Node::new(Context::Paragraph(vec![
                xref("c", ""),
                xref("b", "the b page"),
                xref("missing", ""),
            ])),
        );
        (tree, catalog)
    }

    fn render(mut tree: DocumentTree, mut catalog: Catalog, page: &str, toc: bool) -> String {
        catalog.register("index", tree.root(), Some("Manual".to_string()));
        tree.number_sections(true);
        let mut forest = split(tree, "index", 2);
        let index = link(&mut forest, &catalog).unwrap();
        let paths = PathResolver::new(&forest, &index, ".html");
        let options = NavigationOptions::default();
        let renderer = PageRenderer::new(&forest, &index, &paths, &options, toc);
        renderer.render(forest.find(page).unwrap())
    }

    #[test]
    fn test_cross_page_references() {
        let (tree, catalog) = example_tree();
        let html = render(tree, catalog, "e", true);

        assert!(html.contains("<a href=\"a/b.html#c\">C</a>"));
        assert!(html.contains("<a href=\"a/b.html\">the b page</a>"));
        assert!(html.contains("<a href=\"#missing\">[missing]</a>"));
    }

    #[test]
    fn test_promoted_page_headings() {
        let (tree, catalog) = example_tree();
        let html = render(tree, catalog, "b", true);

        assert!(html.contains("<div class=\"sect1\">\n<h2 id=\"b\">1.1. B</h2>"));
        assert!(html.contains("<div class=\"sect2\">\n<h3 id=\"c\">1.1.1. C</h3>"));
        assert!(!html.contains("<h1 class=\"document-title\""));
        assert!(html.contains("<title>B</title>"));
    }

    #[test]
    fn test_root_page_layout() {
        let (tree, catalog) = example_tree();
        let html = render(tree, catalog, "index", true);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1 class=\"document-title\">Manual</h1>"));
        assert!(html.contains("<div id=\"toc\" class=\"toc\">"));
        assert!(html.contains("<nav id=\"siblings-header\">"));
        assert!(html.contains("<nav id=\"siblings-footer\">"));

        let header = html.find("siblings-header").unwrap();
        let content = html.find("<div id=\"content\">").unwrap();
        let footer = html.find("siblings-footer").unwrap();
        assert!(header < content && content < footer);
    }

    #[test]
    fn test_outline_can_be_disabled() {
        let (tree, catalog) = example_tree();
        let html = render(tree, catalog, "index", false);
        assert!(!html.contains("id=\"toc\""));
    }

    #[test]
    fn test_blocks_pass_through() {
        let (mut tree, catalog) = outline(&[(1, Some("a"))]);
        let a = find(&tree, "a");
        tree.append(
            a,
            Node::new(Context::Listing {
                language: Some("rust".to_string()),
                code: "let x = 1 < 2;".to_string(),
            }),
        );
        let table = tree.append(
            a,
            Node::new(Context::Table {
                columns: Vec::new(),
                head: Vec::new(),
                body: Vec::new(),
            }),
        );
        let column = tree.attach(
            table,
            Node::new(Context::TableColumn {
                align: Alignment::Right,
            }),
        );
        let cell = tree.attach(
            table,
            Node::new(Context::TableCell {
                text: vec![Inline::Text(TextRun::new("42"))],
            }),
        );
        tree.node_mut(table).context = Context::Table {
            columns: vec![column],
            head: Vec::new(),
            body: vec![vec![cell]],
        };
        tree.append(a, Node::new(Context::Pass("<div class=\"raw\"></div>".to_string())));

        let html = render(tree, catalog, "a", false);

        assert!(html.contains(
            "<pre><code class=\"language-rust\">let x = 1 &lt; 2;</code></pre>"
        ));
        assert!(html.contains("<td style=\"text-align: right;\">42</td>"));
        assert!(html.contains("<div class=\"raw\"></div>"));
    }
}
