//! docpages - split Markdown documents into linked multi-page HTML

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use docpages::config::{AttributeOverrides, CONFIG_FILE};
use docpages::pipeline::load_config;
use docpages::{build, BuildConfig, Doctype};
use std::path::{Path, PathBuf};

/// Main entry point for the docpages CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, force, title } => {
            handle_init_command(path, force, title)?;
        }

        Commands::Build {
            input,
            output,
            config,
            pagelevels,
            toclevels,
            doctype,
            sectnums,
            no_toc,
            verbose,
        } => {
            init_logging(verbose);

            let mut build_config = load_config(&input, config.as_deref())
                .with_context(|| format!("Failed to load configuration for {}", input.display()))?;
            apply_overrides(
                &mut build_config,
                pagelevels,
                toclevels,
                doctype,
                sectnums,
                no_toc,
            );

            handle_build_command(&input, output.as_deref(), &build_config)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `--verbose` selects info over warn
fn init_logging(verbose: bool) {
    env_logger::Builder::from_env(logging_env(env_logger::DEFAULT_FILTER_ENV, verbose)).init();
}

fn logging_env(filter_var: &'static str, verbose: bool) -> env_logger::Env<'static> {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Env::default().filter_or(filter_var, default_level)
}

/// Command-line flags win over the configuration file, and the level
/// settings also win over values written in the source
fn apply_overrides(
    config: &mut BuildConfig,
    pagelevels: Option<i64>,
    toclevels: Option<i64>,
    doctype: Option<Doctype>,
    sectnums: bool,
    no_toc: bool,
) {
    config.overrides = AttributeOverrides {
        pagelevels,
        toclevels,
    };
    if let Some(doctype) = doctype {
        config.doctype = doctype;
    }
    if sectnums {
        config.sectnums = true;
    }
    if no_toc {
        config.toc = false;
    }
}

/// Handle the init command
fn handle_init_command(path: Option<PathBuf>, force: bool, title: Option<String>) -> Result<()> {
    let target = path.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create directory {}", target.display()))?;

    let config_path = target.join(CONFIG_FILE);
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = BuildConfig {
        title,
        ..BuildConfig::default()
    };
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✓ Wrote {}", config_path.display());
    Ok(())
}

/// Handle the build command
fn handle_build_command(input: &Path, output: Option<&Path>, config: &BuildConfig) -> Result<()> {
    println!("Building documentation...");
    println!("Input: {}", input.display());
    if let Some(output) = output {
        println!("Output: {}", output.display());
    }

    let report = build(input, output, config)
        .with_context(|| format!("Failed to build {}", input.display()))?;

    println!(
        "✓ Built {} document(s) into {} page(s)",
        report.documents,
        report.pages.len()
    );
    Ok(())
}
