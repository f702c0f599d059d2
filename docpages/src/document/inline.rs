//! Inline content of paragraphs, headings and table cells
//!
//! Inline content is kept as a flat list of runs. A run is a span of text with
//! consistent formatting; links and cross-references are a property of the run
//! rather than a container around it.

/// A piece of inline content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Formatted text
    Text(TextRun),
    /// Raw inline HTML passed through as-is
    Html(String),
    /// Hard line break
    LineBreak,
}

/// A span of text with consistent formatting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Active formatting
    pub style: TextStyle,

    /// External link URL (if this text is part of a hyperlink)
    pub link_url: Option<String>,

    /// Link title (if this text is part of a hyperlink)
    pub link_title: Option<String>,

    /// Target anchor id when this run is an internal cross-reference
    pub xref: Option<String>,
}

impl TextRun {
    /// Create a new plain text run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a run carrying the given formatting state
    pub fn with_style(text: impl Into<String>, style: &TextStyle) -> Self {
        Self {
            text: text.into(),
            style: style.clone(),
            link_url: style.link_url.clone(),
            link_title: style.link_title.clone(),
            xref: style.xref.clone(),
        }
    }
}

/// Active formatting state during parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub superscript: bool,
    pub subscript: bool,

    /// Link URL (if inside an external link)
    pub link_url: Option<String>,

    /// Link title (if inside a link)
    pub link_title: Option<String>,

    /// Cross-reference target (if inside a `#id` link)
    pub xref: Option<String>,
}

/// Plain text of inline content, formatting and markup dropped
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(run) => run.text.as_str(),
            Inline::Html(_) => "",
            Inline::LineBreak => " ",
        })
        .collect()
}

/// HTML for inline content outside of any link context
///
/// Cross-references and links render as their text. Used for titles, where the
/// surrounding markup (TOC entries, navigation links) is itself a link.
pub fn to_html(inlines: &[Inline]) -> String {
    let mut html = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(run) => html.push_str(&styled_html(run)),
            Inline::Html(raw) => html.push_str(raw),
            Inline::LineBreak => html.push_str("<br>\n"),
        }
    }
    html
}

/// Escaped text of a run wrapped in its formatting tags
pub fn styled_html(run: &TextRun) -> String {
    let mut text = html_escape::encode_text(&run.text).into_owned();
    let style = &run.style;

    if style.code {
        text = format!("<code>{}</code>", text);
    }
    if style.bold {
        text = format!("<strong>{}</strong>", text);
    }
    if style.italic {
        text = format!("<em>{}</em>", text);
    }
    if style.strikethrough {
        text = format!("<del>{}</del>", text);
    }
    if style.superscript {
        text = format!("<sup>{}</sup>", text);
    }
    if style.subscript {
        text = format!("<sub>{}</sub>", text);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_drops_html() {
        let inlines = vec![
            Inline::Text(TextRun::new("Intro")),
            Inline::Html("<a id=\"x\"></a>".to_string()),
            Inline::Text(TextRun::new(" text")),
        ];
        assert_eq!(plain_text(&inlines), "Intro text");
    }

    #[test]
    fn test_styled_html_escapes_and_nests() {
        let style = TextStyle {
            bold: true,
            code: true,
            ..TextStyle::default()
        };
        let run = TextRun::with_style("a < b", &style);
        assert_eq!(styled_html(&run), "<strong><code>a &lt; b</code></strong>");
    }

    #[test]
    fn test_to_html_keeps_raw_html() {
        let inlines = vec![
            Inline::Html("<a id=\"here\"></a>".to_string()),
            Inline::Text(TextRun::new("Title")),
        ];
        assert_eq!(to_html(&inlines), "<a id=\"here\"></a>Title");
    }
}
