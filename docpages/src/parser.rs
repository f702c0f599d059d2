//! Markdown event stream parser
//!
//! Converts pulldown-cmark's event stream into a [`DocumentTree`] plus the
//! [`Catalog`] of anchors it defines. Nodes are pushed into the arena in
//! document order, so arena position doubles as a node's ordinal.
//!
//! Headings open sections. When the source has exactly one `#` heading and it
//! comes first, it is taken as the document title and every other heading
//! moves up one level. Headings accept `{#id .class key=value}` attributes:
//! the id becomes the section's anchor, `.part`/`.appendix` set the section
//! kind, `.discrete` keeps it out of numbering, and key/value pairs land in the
//! section's attribute bag.

use crate::catalog::Catalog;
use crate::config::{BuildConfig, Doctype};
use crate::document::{
    plain_text, to_html, Alignment, Context, DlistItem, DocumentTree, Inline, Node, NodeId,
    SectionInfo, SectionName, SourceLocation, TextRun, TextStyle,
};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Tag, TagEnd};
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static INLINE_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s[^>]*\b(?:id|name)\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Errors that can occur while reading a source document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Front-end settings
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Generate `_title` ids for sections without an explicit id
    pub sectids: bool,
    /// Level-1 sections are chapters
    pub book: bool,
    /// Source file recorded on sections
    pub source_path: Option<PathBuf>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            sectids: true,
            book: false,
            source_path: None,
        }
    }
}

impl ParseOptions {
    pub fn from_config(config: &BuildConfig, source_path: Option<PathBuf>) -> Self {
        Self {
            sectids: config.sectids,
            book: config.doctype == Doctype::Book,
            source_path,
        }
    }
}

/// Result of parsing one source document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub tree: DocumentTree,
    pub catalog: Catalog,
}

/// Read and parse a Markdown file
///
/// # Parameters
/// * `path` - Path of the Markdown source
/// * `options` - Front-end settings; `source_path` defaults to `path`
///
/// # Returns
/// * `Ok(ParsedDocument)` - The document tree and its anchors
/// * `Err(ParseError)` - The file could not be read
pub fn parse_file(path: &Path, mut options: ParseOptions) -> Result<ParsedDocument, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if options.source_path.is_none() {
        options.source_path = Some(path.to_path_buf());
    }
    Ok(MarkdownParser::parse(&content, options))
}

/// What the heading being read will become
enum Heading {
    /// The document title
    Title(Vec<(String, String)>),
    /// A section, already in the tree
    Section(NodeId),
    /// A heading nested in a quote or list: rendered in place, not a section
    Discrete(usize),
}

/// Table being built; columns and cells live outside `blocks`
struct TableBuilder {
    node: NodeId,
    columns: Vec<NodeId>,
    head: Vec<NodeId>,
    body: Vec<Vec<NodeId>>,
    row: Vec<NodeId>,
    in_head: bool,
}

/// Description list being built
struct DlistBuilder {
    node: NodeId,
    items: Vec<DlistItem>,
    /// Term whose text is being read
    term: Option<NodeId>,
}

/// Image being read; its alt text arrives as text events
struct PendingImage {
    target: String,
    title: String,
    runs_before: usize,
}

/// Parser state for converting markdown events to a document tree
pub struct MarkdownParser {
    tree: DocumentTree,
    catalog: Catalog,
    options: ParseOptions,

    /// Current formatting state
    style: TextStyle,

    /// Inline content of the paragraph, heading or cell being read
    runs: Vec<Inline>,

    /// Open block containers, innermost last; the document is always first
    containers: Vec<NodeId>,

    heading: Option<Heading>,

    /// Whether the first `#` heading is the document title
    title_mode: bool,

    /// Language and text of the code block being read
    code: Option<(Option<String>, String)>,

    /// Raw HTML block being read
    html_block: Option<String>,

    table: Option<TableBuilder>,

    dlists: Vec<DlistBuilder>,

    image: Option<PendingImage>,

    /// Set when the last finished inline was a lone image
    last_image: Option<(String, String, String)>,

    /// Number of runs present when the current link opened
    link_runs: Option<usize>,

    /// Byte offset of each line start, for source line numbers
    line_starts: Vec<usize>,
}

impl MarkdownParser {
    /// Create a new parser
    ///
    /// # Parameters
    /// * `content` - Markdown source, used for line numbers
    /// * `options` - Front-end settings
    pub fn new(content: &str, options: ParseOptions) -> Self {
        let tree = DocumentTree::new();
        let root = tree.root();
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            tree,
            catalog: Catalog::new(),
            options,
            style: TextStyle::default(),
            runs: Vec::new(),
            containers: vec![root],
            heading: None,
            title_mode: false,
            code: None,
            html_block: None,
            table: None,
            dlists: Vec::new(),
            image: None,
            last_image: None,
            link_runs: None,
            line_starts,
        }
    }

    /// Pulldown-cmark extensions the front end understands
    pub fn markdown_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
    }

    /// Parse Markdown content into a document tree
    ///
    /// # Parameters
    /// * `content` - Raw markdown content to parse
    /// * `options` - Front-end settings
    ///
    /// # Returns
    /// * `ParsedDocument` - The tree and the anchors it registers
    pub fn parse(content: &str, options: ParseOptions) -> ParsedDocument {
        let events: Vec<(Event<'_>, Range<usize>)> =
            pulldown_cmark::Parser::new_ext(content, Self::markdown_options())
                .into_offset_iter()
                .collect();

        let mut parser = Self::new(content, options);
        parser.title_mode = has_title_heading(&events);

        for (event, range) in events {
            parser.process_event(event, range);
        }
        parser.finalize();

        ParsedDocument {
            tree: parser.tree,
            catalog: parser.catalog,
        }
    }

    /// Process a single markdown event
    fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.handle_start_tag(tag, range),
            Event::End(tag_end) => self.handle_end_tag(tag_end),
            Event::Text(text) => self.handle_text(text.into_string()),
            Event::Code(code) => self.handle_inline_code(code.into_string()),
            Event::SoftBreak => self.handle_text(" ".to_string()),
            Event::HardBreak => self.runs.push(Inline::LineBreak),
            Event::Html(html) => self.handle_html_block(&html),
            Event::InlineHtml(html) => self.handle_inline_html(html.into_string()),
            Event::Rule => {
                self.flush_loose_text();
                self.append(Node::new(Context::ThematicBreak));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.handle_text(marker.to_string());
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.handle_inline_code(math.into_string())
            }
            Event::FootnoteReference(_) => {}
        }
    }

    /// Handle opening tags
    fn handle_start_tag(&mut self, tag: Tag<'_>, range: Range<usize>) {
        match tag {
            Tag::Paragraph => {
                self.flush_loose_text();
                self.last_image = None;
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                self.flush_loose_text();
                self.start_heading(level, id, classes, attrs, range.start);
            }
            Tag::BlockQuote(_) => {
                self.flush_loose_text();
                self.open(Node::new(Context::Quote));
            }
            Tag::CodeBlock(kind) => {
                self.flush_loose_text();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.into_string()),
                    CodeBlockKind::Fenced(_) | CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::HtmlBlock => {
                self.flush_loose_text();
                self.html_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_loose_text();
                self.open(Node::new(Context::List { start }));
            }
            Tag::Item => {
                self.flush_loose_text();
                self.open(Node::new(Context::ListItem { text: Vec::new() }));
            }
            Tag::Table(alignments) => {
                self.flush_loose_text();
                self.start_table(alignments);
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                }
            }
            Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => {
                self.runs.clear();
            }
            Tag::DefinitionList => {
                self.flush_loose_text();
                let node = self.append(Node::new(Context::DescriptionList { items: Vec::new() }));
                self.dlists.push(DlistBuilder {
                    node,
                    items: Vec::new(),
                    term: None,
                });
            }
            Tag::DefinitionListTitle => {
                self.runs.clear();
                self.start_term();
            }
            Tag::DefinitionListDefinition => {
                self.start_definition();
            }
            Tag::Emphasis => {
                self.style.italic = true;
            }
            Tag::Strong => {
                self.style.bold = true;
            }
            Tag::Strikethrough => {
                self.style.strikethrough = true;
            }
            Tag::Superscript => {
                self.style.superscript = true;
            }
            Tag::Subscript => {
                self.style.subscript = true;
            }
            Tag::Link {
                dest_url, title, ..
            } => {
                self.start_link(dest_url.into_string(), title.into_string());
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(PendingImage {
                    target: dest_url.into_string(),
                    title: title.into_string(),
                    runs_before: self.runs.len(),
                });
            }
            Tag::FootnoteDefinition(_) => {}
            Tag::MetadataBlock(_) => {}
        }
    }

    /// Handle closing tags
    fn handle_end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph => {
                self.finish_paragraph();
            }
            TagEnd::Heading(_) => {
                self.finish_heading();
            }
            TagEnd::BlockQuote(_) | TagEnd::List(_) => {
                self.close();
            }
            TagEnd::Item => {
                self.flush_loose_text();
                self.close();
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.append(Node::new(Context::Listing { language, code }));
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html_block.take() {
                    self.append(Node::new(Context::Pass(html)));
                }
            }
            TagEnd::Table => {
                self.finish_table();
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.body.push(row);
                }
            }
            TagEnd::TableCell => {
                self.finish_table_cell();
            }
            TagEnd::DefinitionList => {
                self.finish_dlist();
            }
            TagEnd::DefinitionListTitle => {
                self.finish_term();
            }
            TagEnd::DefinitionListDefinition => {
                self.flush_loose_text();
                self.close();
            }
            TagEnd::Emphasis => {
                self.style.italic = false;
            }
            TagEnd::Strong => {
                self.style.bold = false;
            }
            TagEnd::Strikethrough => {
                self.style.strikethrough = false;
            }
            TagEnd::Superscript => {
                self.style.superscript = false;
            }
            TagEnd::Subscript => {
                self.style.subscript = false;
            }
            TagEnd::Link => {
                self.finish_link();
            }
            TagEnd::Image => {
                self.finish_image();
            }
            TagEnd::FootnoteDefinition => {}
            TagEnd::MetadataBlock(_) => {}
        }
    }

    /// Handle text content
    fn handle_text(&mut self, text: String) {
        if let Some((_, code)) = self.code.as_mut() {
            code.push_str(&text);
            return;
        }
        if let Some(html) = self.html_block.as_mut() {
            html.push_str(&text);
            return;
        }
        if text.is_empty() {
            return;
        }
        self.runs.push(Inline::Text(TextRun::with_style(text, &self.style)));
    }

    fn handle_inline_code(&mut self, code: String) {
        let mut run = TextRun::with_style(code, &self.style);
        run.style.code = true;
        self.runs.push(Inline::Text(run));
    }

    fn handle_inline_html(&mut self, html: String) {
        self.register_inline_anchors(&html);
        self.runs.push(Inline::Html(html));
    }

    fn handle_html_block(&mut self, html: &str) {
        self.register_inline_anchors(html);
        match self.html_block.as_mut() {
            Some(block) => block.push_str(html),
            None => {
                self.append(Node::new(Context::Pass(html.to_string())));
            }
        }
    }

    /// Register `<a id="...">` anchors on the innermost open container
    fn register_inline_anchors(&mut self, html: &str) {
        let owner = match &self.heading {
            Some(Heading::Section(section)) => *section,
            _ => self.container(),
        };
        for capture in INLINE_ANCHOR_RE.captures_iter(html) {
            self.catalog.register(&capture[1], owner, None);
        }
    }

    fn start_link(&mut self, url: String, title: String) {
        self.link_runs = Some(self.runs.len());
        self.style.link_title = (!title.is_empty()).then_some(title);
        match url.strip_prefix('#').filter(|id| !id.is_empty()) {
            Some(id) => self.style.xref = Some(id.to_string()),
            None => self.style.link_url = Some(url),
        }
    }

    fn finish_link(&mut self) {
        // `[](#id)` still needs a run to carry the reference
        if let (Some(start), Some(_)) = (self.link_runs.take(), self.style.xref.as_ref()) {
            if self.runs.len() == start {
                self.runs
                    .push(Inline::Text(TextRun::with_style(String::new(), &self.style)));
            }
        }
        self.style.link_url = None;
        self.style.link_title = None;
        self.style.xref = None;
    }

    fn finish_image(&mut self) {
        let Some(image) = self.image.take() else {
            return;
        };
        let alt = plain_text(&self.runs[image.runs_before..]);
        self.runs.truncate(image.runs_before);

        let mut html = format!(
            "<img src=\"{}\" alt=\"{}\"",
            html_escape::encode_double_quoted_attribute(&image.target),
            html_escape::encode_double_quoted_attribute(&alt)
        );
        if !image.title.is_empty() {
            html.push_str(&format!(
                " title=\"{}\"",
                html_escape::encode_double_quoted_attribute(&image.title)
            ));
        }
        html.push('>');

        self.runs.push(Inline::Html(html));
        self.last_image = (self.runs.len() == 1).then_some((image.target, alt, image.title));
    }

    fn start_heading(
        &mut self,
        level: HeadingLevel,
        id: Option<CowStr<'_>>,
        classes: Vec<CowStr<'_>>,
        attrs: Vec<(CowStr<'_>, Option<CowStr<'_>>)>,
        offset: usize,
    ) {
        self.runs.clear();
        let level = level as usize;
        let attributes: Vec<(String, String)> = attrs
            .into_iter()
            .map(|(key, value)| {
                (
                    key.into_string(),
                    value.map(CowStr::into_string).unwrap_or_default(),
                )
            })
            .collect();

        if self.title_mode && level == 1 {
            self.heading = Some(Heading::Title(attributes));
            return;
        }

        let level = if self.title_mode { level - 1 } else { level };
        if !self.close_sections(level) {
            self.heading = Some(Heading::Discrete(level + 1));
            return;
        }

        let mut info = SectionInfo::new(Vec::new());
        let classes: Vec<String> = classes.into_iter().map(CowStr::into_string).collect();
        info.sectname = if classes.iter().any(|c| c == "part") {
            SectionName::Part
        } else if classes.iter().any(|c| c == "appendix") {
            SectionName::Appendix
        } else if self.options.book && level == 1 {
            SectionName::Chapter
        } else {
            SectionName::Section
        };

        let mut node = Node::new(Context::Section(info));
        node.level = level;
        node.id = id.map(CowStr::into_string);
        node.source = self.options.source_path.as_ref().map(|file| SourceLocation {
            file: file.clone(),
            line: self.line_of(offset),
        });
        if classes.iter().any(|c| c == "discrete") {
            node.attributes
                .insert("numbered".to_string(), "false".to_string());
        }
        for (key, value) in attributes {
            if key == "caption" {
                if let Some(info) = node.section_mut() {
                    info.caption = Some(value);
                }
            } else {
                node.attributes.insert(key, value);
            }
        }

        let parent = self.container();
        let parent_level = self.tree.node(parent).level;
        if level > parent_level + 1 {
            log::warn!(
                "section title out of sequence: expected level {}, got level {}",
                parent_level + 1,
                level
            );
        }

        let section = self.open(node);
        self.heading = Some(Heading::Section(section));
    }

    /// Close sections at `level` or deeper
    ///
    /// # Returns
    /// * `false` - The heading sits inside a quote, list or description, so
    ///   it cannot open a section
    fn close_sections(&mut self, level: usize) -> bool {
        loop {
            let top = self.container();
            let node = self.tree.node(top);
            if node.is_document() {
                return true;
            }
            if !node.is_section() {
                return false;
            }
            if node.level < level {
                return true;
            }
            self.containers.pop();
        }
    }

    fn finish_heading(&mut self) {
        let runs = std::mem::take(&mut self.runs);
        match self.heading.take() {
            Some(Heading::Title(attributes)) => {
                let root = self.tree.root();
                let node = self.tree.node_mut(root);
                node.attributes
                    .insert("doctitle".to_string(), plain_text(&runs));
                node.attributes.extend(attributes);
            }
            Some(Heading::Section(section)) => self.finish_section(section, runs),
            Some(Heading::Discrete(level)) => {
                let level = level.clamp(1, 6);
                let html = format!(
                    "<h{} class=\"discrete\">{}</h{}>",
                    level,
                    to_html(&runs),
                    level
                );
                self.append(Node::new(Context::Pass(html)));
            }
            None => {}
        }
    }

    fn finish_section(&mut self, section: NodeId, title: Vec<Inline>) {
        let plain = plain_text(&title);
        let node = self.tree.node_mut(section);
        if let Some(info) = node.section_mut() {
            info.title = title;
        }

        let explicit = match node.id.take() {
            Some(id) if self.catalog.contains(&id) => {
                log::warn!(
                    "duplicate id '{}' on section '{}'; the first use keeps it",
                    id,
                    plain
                );
                None
            }
            other => other,
        };

        let id = match explicit {
            Some(id) => Some(id),
            None if self.options.sectids => Some(self.unique_id(&generate_id(&plain))),
            None => None,
        };
        self.tree.node_mut(section).id = id.clone();

        if let Some(id) = id {
            let reftext = self
                .tree
                .node(section)
                .attr("reftext")
                .map_or(plain, str::to_string);
            self.catalog.register(&id, section, Some(reftext));
        }
    }

    /// `base`, or `base_2`, `base_3`, ... when already taken
    fn unique_id(&self, base: &str) -> String {
        if !self.catalog.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !self.catalog.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn finish_paragraph(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);

        match self.last_image.take() {
            Some((target, alt, title)) if runs.len() == 1 => {
                self.append(Node::new(Context::Image { target, alt, title }));
            }
            _ => {
                self.append(Node::new(Context::Paragraph(runs)));
            }
        }
    }

    /// Turn text read directly inside a list item or definition into a paragraph
    fn flush_loose_text(&mut self) {
        if self.heading.is_some() || self.table.is_some() || self.runs.is_empty() {
            return;
        }
        self.finish_paragraph();
    }

    fn start_table(&mut self, alignments: Vec<pulldown_cmark::Alignment>) {
        let table = self.append(Node::new(Context::Table {
            columns: Vec::new(),
            head: Vec::new(),
            body: Vec::new(),
        }));
        let columns = alignments
            .into_iter()
            .map(|align| {
                self.tree.attach(
                    table,
                    Node::new(Context::TableColumn {
                        align: Alignment::from(align),
                    }),
                )
            })
            .collect();

        self.table = Some(TableBuilder {
            node: table,
            columns,
            head: Vec::new(),
            body: Vec::new(),
            row: Vec::new(),
            in_head: false,
        });
    }

    fn finish_table_cell(&mut self) {
        let text = std::mem::take(&mut self.runs);
        let Some(table) = self.table.as_mut() else {
            return;
        };
        let cell = self
            .tree
            .attach(table.node, Node::new(Context::TableCell { text }));
        if table.in_head {
            table.head.push(cell);
        } else {
            table.row.push(cell);
        }
    }

    fn finish_table(&mut self) {
        let Some(table) = self.table.take() else {
            return;
        };
        self.tree.node_mut(table.node).context = Context::Table {
            columns: table.columns,
            head: table.head,
            body: table.body,
        };
    }

    fn start_term(&mut self) {
        let Some(dlist) = self.dlists.last_mut() else {
            return;
        };
        let term = self
            .tree
            .attach(dlist.node, Node::new(Context::ListItem { text: Vec::new() }));
        match dlist.items.last_mut() {
            Some(item) if item.description.is_none() => item.terms.push(term),
            _ => dlist.items.push(DlistItem {
                terms: vec![term],
                description: None,
            }),
        }
        dlist.term = Some(term);
    }

    fn finish_term(&mut self) {
        let text = std::mem::take(&mut self.runs);
        let Some(term) = self.dlists.last_mut().and_then(|dlist| dlist.term.take()) else {
            return;
        };
        self.tree.node_mut(term).context = Context::ListItem { text };
    }

    fn start_definition(&mut self) {
        let Some(dlist) = self.dlists.last_mut() else {
            return;
        };
        let description = self
            .tree
            .attach(dlist.node, Node::new(Context::ListItem { text: Vec::new() }));
        match dlist.items.last_mut() {
            Some(item) if item.description.is_none() => item.description = Some(description),
            _ => dlist.items.push(DlistItem {
                terms: Vec::new(),
                description: Some(description),
            }),
        }
        self.containers.push(description);
    }

    fn finish_dlist(&mut self) {
        let Some(dlist) = self.dlists.pop() else {
            return;
        };
        self.tree.node_mut(dlist.node).context = Context::DescriptionList { items: dlist.items };
    }

    fn container(&self) -> NodeId {
        self.containers
            .last()
            .copied()
            .unwrap_or_else(|| self.tree.root())
    }

    /// Add a block to the innermost open container
    fn append(&mut self, node: Node) -> NodeId {
        let parent = self.container();
        self.tree.append(parent, node)
    }

    /// Add a block and make it the innermost open container
    fn open(&mut self, node: Node) -> NodeId {
        let id = self.append(node);
        self.containers.push(id);
        id
    }

    fn close(&mut self) {
        if self.containers.len() > 1 {
            self.containers.pop();
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// Finalize parsing
    fn finalize(&mut self) {
        self.flush_loose_text();
    }
}

/// Whether the first heading is the only `#` heading
fn has_title_heading(events: &[(Event<'_>, Range<usize>)]) -> bool {
    let mut levels = events.iter().filter_map(|(event, _)| match event {
        Event::Start(Tag::Heading { level, .. }) => Some(*level),
        _ => None,
    });
    match levels.next() {
        Some(HeadingLevel::H1) => levels.all(|level| level != HeadingLevel::H1),
        _ => false,
    }
}

/// Section id derived from its title: `_` + lower-cased words joined by `_`
pub fn generate_id(title: &str) -> String {
    let mut id = String::from("_");
    for c in title.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            id.push(c);
        } else if (c.is_whitespace() || matches!(c, '-' | '.' | '_')) && !id.ends_with('_') {
            id.push('_');
        }
    }
    if id.len() > 1 && id.ends_with('_') {
        id.pop();
    }
    id
}
