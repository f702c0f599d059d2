//! Writing rendered pages to disk

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing pages
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to create directory {path}: {source}", path = .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}", path = .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Path relative to the output directory
    pub path: String,
    pub html: String,
}

/// Write the root page to `output` and every other page next to it
///
/// Child pages go to `{output's directory}/{page path}`; directories are
/// created as needed.
///
/// # Parameters
/// * `pages` - Rendered pages, root page first
/// * `output` - Output file of the root page
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Paths written, in page order
/// * `Err(WriteError)` - A directory or file could not be written
pub fn write_pages(pages: &[RenderedPage], output: &Path) -> Result<Vec<PathBuf>, WriteError> {
    let targets = page_targets(pages, output);
    for (page, target) in pages.iter().zip(&targets) {
        write_page(target, &page.html)?;
    }
    Ok(targets)
}

/// Where [`write_pages`] puts each page, in page order
pub fn page_targets(pages: &[RenderedPage], output: &Path) -> Vec<PathBuf> {
    let outdir = output.parent().unwrap_or_else(|| Path::new(""));
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            if i == 0 {
                output.to_path_buf()
            } else {
                outdir.join(&page.path)
            }
        })
        .collect()
}

fn write_page(target: &Path, html: &str) -> Result<(), WriteError> {
    if let Some(dir) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
    }

    log::info!("Writing to '{}'", target.display());
    fs::write(target, html).map_err(|source| WriteError::Write {
        path: target.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(path: &str) -> RenderedPage {
        RenderedPage {
            path: path.to_string(),
            html: format!("<p>{}</p>", path),
        }
    }

    #[test]
    fn test_pages_land_under_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("site").join("manual.html");
        let pages = vec![page("manual.html"), page("a.html"), page("a/b.html")];

        let written = write_pages(&pages, &output).unwrap();

        assert_eq!(written[0], output);
        assert_eq!(written[2], dir.path().join("site/a/b.html"));
        assert_eq!(
            fs::read_to_string(dir.path().join("site/a/b.html")).unwrap(),
            "<p>a/b.html</p>"
        );
        assert!(dir.path().join("site/a.html").is_file());
    }

    #[test]
    fn test_root_page_written_to_output_name() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("custom.html");

        write_pages(&[page("index.html")], &output).unwrap();

        assert!(output.is_file());
        assert!(!dir.path().join("index.html").exists());
    }

    #[test]
    fn test_unwritable_target_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("a");
        fs::write(&blocker, "not a directory").unwrap();
        let output = dir.path().join("index.html");

        let err = write_pages(&[page("index.html"), page("a/b.html")], &output).unwrap_err();

        assert!(matches!(err, WriteError::Write { .. } | WriteError::CreateDir { .. }));
    }
}
