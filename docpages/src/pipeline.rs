//! Document build pipeline
//!
//! Each source document goes through the same stages:
//! 1. **Parsing**: Markdown into a document tree and its anchor catalog
//! 2. **Splitting**: sections within `pagelevels` become pages
//! 3. **Linking**: navigation references and the anchor index
//! 4. **Rendering**: one HTML document per page
//! 5. **Writing**: the root page to the output file, the rest beside it
//!
//! Documents share nothing, so several inputs are built independently (in
//! parallel with the `parallel` feature).

use crate::config::{BuildConfig, ConfigError};
use crate::html::PageRenderer;
use crate::link::{link, LinkError};
use crate::parser::{parse_file, ParseError, ParseOptions, ParsedDocument};
use crate::paths::PathResolver;
use crate::split::{split, update_source_locations};
use crate::writer::{page_targets, write_pages, RenderedPage, WriteError};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Errors that can occur while building documents
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Failed to scan input directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("No Markdown files found in {path}", path = .0.display())]
    NoInputs(PathBuf),

    #[error("More than one page would be written to {path}", path = .0.display())]
    DuplicateOutput(PathBuf),
}

/// Summary of a build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Number of source documents built
    pub documents: usize,
    /// Every file written
    pub pages: Vec<PathBuf>,
}

/// Load the configuration for `input`
///
/// # Parameters
/// * `input` - Source file or directory
/// * `explicit` - Configuration file given on the command line
///
/// # Returns
/// * `Ok(BuildConfig)` - The explicit file, else `docpages.toml` next to the
///   input, else defaults
/// * `Err(ConfigError)` - The configuration file could not be read or parsed
pub fn load_config(input: &Path, explicit: Option<&Path>) -> Result<BuildConfig, ConfigError> {
    if let Some(path) = explicit {
        return BuildConfig::load(path);
    }
    let dir = if input.is_dir() {
        input
    } else {
        input.parent().unwrap_or_else(|| Path::new("."))
    };
    BuildConfig::discover(dir)
}

/// Markdown sources under `input`, sorted by path
///
/// A file input is returned as-is.
pub fn discover_inputs(input: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(input).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            paths.push(path.to_path_buf());
        }
    }

    if paths.is_empty() {
        return Err(BuildError::NoInputs(input.to_path_buf()));
    }
    Ok(paths)
}

/// Build every document under `input`
///
/// # Parameters
/// * `input` - A Markdown file or a directory of them
/// * `output` - Output file (file input) or directory (directory input);
///   defaults to the input with the output suffix, or `build/`
/// * `config` - Build configuration
///
/// # Returns
/// * `Ok(BuildReport)` - Documents built and files written
/// * `Err(BuildError)` - The first failure
pub fn build(
    input: &Path,
    output: Option<&Path>,
    config: &BuildConfig,
) -> Result<BuildReport, BuildError> {
    let extension = config.outfilesuffix.trim_start_matches('.');
    let jobs: Vec<(PathBuf, PathBuf)> = if input.is_dir() {
        let outdir = output.map_or_else(|| PathBuf::from("build"), Path::to_path_buf);
        discover_inputs(input)?
            .into_iter()
            .map(|source| {
                let relative = source.strip_prefix(input).unwrap_or(&source);
                let target = outdir.join(relative).with_extension(extension);
                (source, target)
            })
            .collect()
    } else {
        let target = output.map_or_else(|| input.with_extension(extension), Path::to_path_buf);
        vec![(input.to_path_buf(), target)]
    };

    #[cfg(feature = "parallel")]
    let rendered: Result<Vec<_>, _> = jobs
        .par_iter()
        .map(|(source, target)| render_file(source, target, config))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let rendered: Result<Vec<_>, _> = jobs
        .iter()
        .map(|(source, target)| render_file(source, target, config))
        .collect();

    let rendered = rendered?;
    check_targets(
        jobs.iter()
            .zip(&rendered)
            .map(|((_, target), pages)| (target.as_path(), pages.as_slice())),
    )?;

    let mut pages = Vec::new();
    for ((_, target), document) in jobs.iter().zip(&rendered) {
        pages.extend(write_pages(document, target)?);
    }
    Ok(BuildReport {
        documents: jobs.len(),
        pages,
    })
}

/// Build one source document into `output` and its sibling pages
pub fn build_file(
    input: &Path,
    output: &Path,
    config: &BuildConfig,
) -> Result<Vec<PathBuf>, BuildError> {
    let pages = render_file(input, output, config)?;
    check_targets([(output, pages.as_slice())])?;
    Ok(write_pages(&pages, output)?)
}

fn render_file(
    input: &Path,
    output: &Path,
    config: &BuildConfig,
) -> Result<Vec<RenderedPage>, BuildError> {
    log::info!("Building '{}'", input.display());
    let document = parse_file(input, ParseOptions::from_config(config, None))?;
    let root_id = root_id(output, &config.outfilesuffix);
    render_document(document, &root_id, config)
}

/// Fail before writing anything if two pages share an output file
fn check_targets<'a>(
    documents: impl IntoIterator<Item = (&'a Path, &'a [RenderedPage])>,
) -> Result<(), BuildError> {
    let duplicate = documents
        .into_iter()
        .flat_map(|(output, pages)| page_targets(pages, output))
        .duplicates()
        .next();
    match duplicate {
        Some(path) => Err(BuildError::DuplicateOutput(path)),
        None => Ok(()),
    }
}

/// Id of the root page: the output file name without the output suffix
pub fn root_id(output: &Path, suffix: &str) -> String {
    let name = output
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("index");
    name.strip_suffix(suffix)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(name)
        .to_string()
}

/// Split, link and render a parsed document
///
/// # Parameters
/// * `document` - Output of the parser
/// * `root_id` - Id of the root page
/// * `config` - Build configuration
///
/// # Returns
/// * `Ok(Vec<RenderedPage>)` - Every page in document order, root first
/// * `Err(BuildError)` - The split forest failed its consistency checks
pub fn render_document(
    document: ParsedDocument,
    root_id: &str,
    config: &BuildConfig,
) -> Result<Vec<RenderedPage>, BuildError> {
    let ParsedDocument {
        mut tree,
        mut catalog,
    } = document;
    let root = tree.root();

    if tree.node(root).attr("doctitle").is_none() {
        if let Some(title) = &config.title {
            tree.node_mut(root)
                .attributes
                .insert("doctitle".to_string(), title.clone());
        }
    }
    config.seed_attributes(&mut tree);
    let doctitle = tree.node(root).attr("doctitle").map(str::to_string);
    catalog.register(root_id, root, doctitle);

    let pagelevels = config.pagelevels_for(&tree);
    tree.number_sections(config.sectnums);

    let mut forest = split(tree, root_id, pagelevels);
    update_source_locations(&mut forest, config.project_dir.as_deref());
    let index = link(&mut forest, &catalog)?;

    let paths = PathResolver::new(&forest, &index, &config.outfilesuffix);
    let options = config.navigation_options();
    let renderer = PageRenderer::new(&forest, &index, &paths, &options, config.toc);

    let pages = forest
        .document_order()
        .into_iter()
        .map(|page| RenderedPage {
            path: paths.filepath(page),
            html: renderer.render(page),
        })
        .collect::<Vec<_>>();

    log::info!("Rendered {} page(s) for '{}'", pages.len(), root_id);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MarkdownParser;

    const MANUAL: &str = "\
# Manual {pagelevels=2}

Welcome.

## Alpha {#a}

See [](#c).

### Beta {#b}

#### Gamma {#c}

### Delta {#d}

## Epsilon {#e}
";

    fn render(markdown: &str, config: &BuildConfig) -> Vec<RenderedPage> {
        let document = MarkdownParser::parse(markdown, ParseOptions::from_config(config, None));
        render_document(document, "manual", config).unwrap()
    }

    fn paths(pages: &[RenderedPage]) -> Vec<&str> {
        pages.iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn test_pages_in_document_order() {
        let pages = render(MANUAL, &BuildConfig::default());
        assert_eq!(
            paths(&pages),
            vec!["manual.html", "a.html", "a/b.html", "a/d.html", "e.html"]
        );
    }

    #[test]
    fn test_cross_reference_into_nested_page() {
        let pages = render(MANUAL, &BuildConfig::default());
        let alpha = &pages[1].html;
        assert!(alpha.contains("<a href=\"a/b.html#c\">Gamma</a>"));
    }

    #[test]
    fn test_configured_pagelevels_used_without_source_value() {
        let markdown = MANUAL.replace(" {pagelevels=2}", "");
        let config = BuildConfig {
            pagelevels: 1,
            ..BuildConfig::default()
        };
        let pages = render(&markdown, &config);
        assert_eq!(paths(&pages), vec!["manual.html", "a.html", "e.html"]);
    }

    #[test]
    fn test_negative_pagelevels_keeps_one_page() {
        let markdown = MANUAL.replace("{pagelevels=2}", "{pagelevels=-1}");
        let pages = render(&markdown, &BuildConfig::default());
        assert_eq!(paths(&pages), vec!["manual.html"]);
        assert!(pages[0].html.contains("<a href=\"#c\">Gamma</a>"));
    }

    #[test]
    fn test_config_title_fills_missing_doctitle() {
        let config = BuildConfig {
            title: Some("Handbook".to_string()),
            ..BuildConfig::default()
        };
        let pages = render("## One\n\n## Two\n", &config);
        assert!(pages[0].html.contains("<title>Handbook</title>"));
    }

    #[test]
    fn test_root_id_strips_suffix() {
        assert_eq!(root_id(Path::new("out/manual.html"), ".html"), "manual");
        assert_eq!(root_id(Path::new("out/manual.htm"), ".html"), "manual.htm");
        assert_eq!(root_id(Path::new(".html"), ".html"), ".html");
    }
}
