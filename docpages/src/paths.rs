//! Output paths and link targets between pages
//!
//! Pages whose parent is the root page live next to it; deeper pages live in
//! a directory named after their parent's output file without its suffix.
//! A child's `"{parent_id}_"` id prefix is dropped from its filename since the
//! directory already carries it.

use crate::forest::{Forest, PageId};
use crate::link::ReferenceIndex;
use relative_path::RelativePathBuf;

/// Computes page paths and resolves anchor ids to hrefs
///
/// Only meaningful once the forest has been linked.
pub struct PathResolver<'a> {
    forest: &'a Forest,
    index: &'a ReferenceIndex,
    suffix: &'a str,
}

impl<'a> PathResolver<'a> {
    pub fn new(forest: &'a Forest, index: &'a ReferenceIndex, suffix: &'a str) -> Self {
        Self {
            forest,
            index,
            suffix,
        }
    }

    /// Parent page when it is not the top page
    fn nested_parent(&self, page: PageId) -> Option<PageId> {
        let nav = self.forest.page(page).nav;
        nav.parent.filter(|&parent| Some(parent) != nav.top)
    }

    /// Directory of a page relative to the output root ("" for the root)
    pub fn dirname(&self, page: PageId) -> RelativePathBuf {
        match self.nested_parent(page) {
            Some(parent) => {
                let path = self.filepath(parent);
                let dir = path.strip_suffix(self.suffix).unwrap_or(&path);
                RelativePathBuf::from(dir)
            }
            None => RelativePathBuf::new(),
        }
    }

    pub fn filename(&self, page: PageId) -> String {
        let id = self.forest.page(page).id.as_str();
        let base = match self.nested_parent(page) {
            Some(parent) => {
                let prefix = format!("{}_", self.forest.page(parent).id);
                id.strip_prefix(prefix.as_str()).unwrap_or(id)
            }
            None => id,
        };
        format!("{}{}", base, self.suffix)
    }

    /// Path of a page's output file relative to the output root
    pub fn filepath(&self, page: PageId) -> String {
        join(self.dirname(page).as_str(), &self.filename(page))
    }

    /// Path from `from`'s directory to `to`'s file
    pub fn relative_path(&self, from: PageId, to: PageId) -> String {
        let from_dir = self.dirname(from);
        let to_dir = self.dirname(to);
        let relative = from_dir.relative(&to_dir);
        join(relative.as_str(), &self.filename(to))
    }

    /// Href for a reference to `refid` made from `current`
    ///
    /// * unknown id, or an anchor on `current` itself → `fallback` (default `#refid`)
    /// * the target page's own anchor → the page path alone
    /// * any other anchor → the page path plus the fragment
    pub fn resolve_target(&self, current: PageId, refid: &str, fallback: Option<&str>) -> String {
        let target = fallback.map_or_else(|| format!("#{}", refid), str::to_string);
        let Some(page) = self.index.page_of(refid) else {
            return target;
        };
        if page == current {
            return target;
        }

        let path = self.relative_path(current, page);
        if target == format!("#{}", self.forest.page(page).id) {
            path
        } else {
            format!("{}{}", path, target)
        }
    }
}

fn join(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}
