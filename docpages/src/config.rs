//! Build configuration from docpages.toml

use crate::attributes::AttributeKey;
use crate::document::DocumentTree;
use crate::navigation::NavigationOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up next to the input
pub const CONFIG_FILE: &str = "docpages.toml";

/// Document type; books get chapter and part signifiers in the outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Doctype {
    #[default]
    Article,
    Book,
}

/// Build configuration
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Deepest section level split into its own page (0 keeps one page)
    pub pagelevels: i64,

    /// Depth of the table of contents
    pub toclevels: i64,

    /// Deepest section level that gets a number
    pub sectnumlevels: i64,

    /// Number sections
    pub sectnums: bool,

    /// Generate ids for sections that have none
    pub sectids: bool,

    /// Render a table of contents on every page
    pub toc: bool,

    pub doctype: Doctype,

    pub chapter_signifier: String,

    pub part_signifier: String,

    /// Suffix of every output file, including the dot
    pub outfilesuffix: String,

    /// Repository URL prefix for "Edit this page" links
    pub project_gh: Option<String>,

    /// Source paths in edit links are made relative to this directory
    pub project_dir: Option<PathBuf>,

    /// Document title used when the source has no level-1 title
    pub title: Option<String>,

    /// Values given on the command line; never read from or written to the file
    #[serde(skip)]
    pub overrides: AttributeOverrides,
}

/// Level settings that win over the values written in the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeOverrides {
    pub pagelevels: Option<i64>,
    pub toclevels: Option<i64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            pagelevels: 0,
            toclevels: 2,
            sectnumlevels: 3,
            sectnums: false,
            sectids: true,
            toc: true,
            doctype: Doctype::Article,
            chapter_signifier: "Chapter".to_string(),
            part_signifier: "Part".to_string(),
            outfilesuffix: ".html".to_string(),
            project_gh: None,
            project_dir: None,
            title: None,
            overrides: AttributeOverrides::default(),
        }
    }
}

impl BuildConfig {
    /// Load configuration from a docpages.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(BuildConfig)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: BuildConfig = toml::from_str(&content)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `dir/docpages.toml` if it exists, defaults otherwise
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a docpages.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the configuration file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(ConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;

        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// Write the document-wide level settings onto the document node
    ///
    /// Values already present on the document (from the source) win over
    /// the file; command-line overrides win over both.
    pub fn seed_attributes(&self, tree: &mut DocumentTree) {
        let root = tree.root();
        let attributes = &mut tree.node_mut(root).attributes;
        for (key, value) in [
            ("toclevels", self.toclevels),
            ("sectnumlevels", self.sectnumlevels),
        ] {
            attributes
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        if let Some(toclevels) = self.overrides.toclevels {
            attributes.insert("toclevels".to_string(), toclevels.to_string());
        }
    }

    /// Splitting depth for a document whose source may set its own
    ///
    /// The command line wins, then the source, then the file.
    pub fn pagelevels_for(&self, tree: &DocumentTree) -> i64 {
        if let Some(pagelevels) = self.overrides.pagelevels {
            return pagelevels;
        }
        let key = AttributeKey::PageLevels.name();
        match tree.node(tree.root()).attr(key).map(|raw| raw.trim().parse::<i64>()) {
            Some(Ok(value)) => value,
            Some(Err(_)) => {
                log::warn!(
                    "attribute '{}' is not an integer; using {}",
                    key,
                    self.pagelevels
                );
                self.pagelevels
            }
            None => self.pagelevels,
        }
    }

    pub fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions {
            book: self.doctype == Doctype::Book,
            chapter_signifier: self.chapter_signifier.clone(),
            part_signifier: self.part_signifier.clone(),
            project_gh: self.project_gh.clone(),
        }
    }
}

/// Errors that can occur when loading or saving the build configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error on {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: BuildConfig = toml::from_str("").unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.toclevels, 2);
        assert_eq!(config.sectnumlevels, 3);
        assert_eq!(config.outfilesuffix, ".html");
    }

    #[test]
    fn test_parse_example_toml() {
        let toml_content = r#"
pagelevels = 2
toclevels = 3
sectnums = true
doctype = "book"
chapter_signifier = "Kapitel"
project_gh = "https://github.com/acme/manual/blob/main"
project_dir = "/srv/manual"
"#;

        let config: BuildConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.pagelevels, 2);
        assert_eq!(config.toclevels, 3);
        assert!(config.sectnums);
        assert_eq!(config.doctype, Doctype::Book);
        assert_eq!(config.part_signifier, "Part");
        assert_eq!(config.project_dir, Some(PathBuf::from("/srv/manual")));

        let nav = config.navigation_options();
        assert!(nav.book);
        assert_eq!(nav.chapter_signifier, "Kapitel");
    }

    #[test]
    fn test_unknown_doctype_is_rejected() {
        let result: Result<BuildConfig, _> = toml::from_str("doctype = \"manpage\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = BuildConfig {
            pagelevels: 1,
            title: Some("Manual".to_string()),
            ..BuildConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = BuildConfig::discover(dir.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            BuildConfig::discover(dir.path()).unwrap(),
            BuildConfig::default()
        );
    }

    #[test]
    fn test_seed_keeps_document_values() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        tree.node_mut(root)
            .attributes
            .insert("toclevels".to_string(), "4".to_string());

        BuildConfig::default().seed_attributes(&mut tree);

        assert_eq!(tree.node(root).attr("toclevels"), Some("4"));
        assert_eq!(tree.node(root).attr("sectnumlevels"), Some("3"));
    }

    #[test]
    fn test_command_line_beats_document_values() {
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let attributes = &mut tree.node_mut(root).attributes;
        attributes.insert("toclevels".to_string(), "4".to_string());
        attributes.insert("pagelevels".to_string(), "2".to_string());

        let mut config = BuildConfig::default();
        assert_eq!(config.pagelevels_for(&tree), 2);

        config.overrides = AttributeOverrides {
            pagelevels: Some(0),
            toclevels: Some(1),
        };
        config.seed_attributes(&mut tree);

        assert_eq!(config.pagelevels_for(&tree), 0);
        assert_eq!(tree.node(root).attr("toclevels"), Some("1"));
    }

    #[test]
    fn test_overrides_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = BuildConfig {
            overrides: AttributeOverrides {
                pagelevels: Some(3),
                toclevels: None,
            },
            ..BuildConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = BuildConfig::load(&path).unwrap();

        assert_eq!(loaded.overrides, AttributeOverrides::default());
        assert_eq!(loaded.pagelevels, 0);
    }
}
