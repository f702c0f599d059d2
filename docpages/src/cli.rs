//! Command-line interface definitions for docpages

use clap::{Parser, Subcommand};
use docpages::Doctype;
use std::path::PathBuf;

/// CLI structure for the docpages application
#[derive(Parser)]
#[command(name = "docpages")]
#[command(version)]
#[command(about = "Split Markdown documents into linked multi-page HTML", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for docpages
#[derive(Subcommand)]
pub enum Commands {
    /// Write a default docpages.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,

        /// Document title used when the source has none
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Build multi-page HTML
    Build {
        /// Input Markdown file or directory (defaults to current directory)
        #[arg(value_name = "PATH", default_value = ".")]
        input: PathBuf,

        /// Output file (file input) or directory (directory input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to docpages.toml next to the input)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Split sections up to this level into pages (0 keeps one page)
        #[arg(long, allow_hyphen_values = true)]
        pagelevels: Option<i64>,

        /// Depth of the table of contents
        #[arg(long)]
        toclevels: Option<i64>,

        /// Document type
        #[arg(long, value_enum)]
        doctype: Option<Doctype>,

        /// Number sections
        #[arg(long)]
        sectnums: bool,

        /// Skip table of contents generation
        #[arg(long)]
        no_toc: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}
