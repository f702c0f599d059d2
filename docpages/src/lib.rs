//! docpages - split one document into a linked set of HTML pages
//!
//! Sections up to a configurable depth are promoted to pages of their own.
//! Pages are re-parented and renumbered so each stands alone, then linked in
//! reading order, and every cross-reference is rewritten to a relative path
//! that works across page boundaries.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod attributes;
pub mod catalog;
pub mod config;
pub mod document;
pub mod forest;
pub mod html;
pub mod link;
pub mod navigation;
pub mod parser;
pub mod paths;
pub mod pipeline;
pub mod rebase;
pub mod split;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{BuildConfig, Doctype};
pub use pipeline::{build, BuildError, BuildReport};
