//! Noise filtering for watch events.
//!
//! Filters run on the notify backend thread, before a change is queued, so
//! editor swap files and non-template files in the source root never reach
//! the watch loop.
//!
//! # Examples
//!
//! ```
//! use sg_watcher::{CompositeFilter, EditorArtifactFilter, FileFilter, PageSuffixFilter};
//! use sg_core::WatchedRole;
//! use camino::Utf8Path;
//!
//! let filter = CompositeFilter::new()
//!     .and(EditorArtifactFilter::default())
//!     .and(PageSuffixFilter::new(".html"));
//!
//! assert!(filter.should_process(WatchedRole::Pages, Utf8Path::new("www/index.html")));
//! assert!(!filter.should_process(WatchedRole::Pages, Utf8Path::new("www/notes.txt")));
//! assert!(!filter.should_process(WatchedRole::Css, Utf8Path::new("www/css/.site.css.swp")));
//! ```

use camino::Utf8Path;
use sg_core::WatchedRole;
use smallvec::SmallVec;

/// A predicate deciding whether a classified change is worth queueing.
///
/// # Thread Safety
///
/// Filters must be [`Send`] and [`Sync`] because they are used from the
/// notify backend thread, and `'static` to be moved into its callback.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the change to `path` in a directory of `role` should
    /// be delivered.
    fn should_process(&self, role: WatchedRole, path: &Utf8Path) -> bool;
}

/// A filter that accepts every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _role: WatchedRole, _path: &Utf8Path) -> bool {
        true
    }
}

/// Rejects temporary files written by editors while saving.
///
/// By default the filter rejects names ending in `.swp`, `.swx` or `~`,
/// names starting with `.#`, and the name `4913`, which vim creates to probe
/// directory permissions.
#[derive(Debug, Clone)]
pub struct EditorArtifactFilter {
    suffixes: SmallVec<[&'static str; 4]>,
    prefixes: SmallVec<[&'static str; 2]>,
    names: SmallVec<[&'static str; 2]>,
}

impl EditorArtifactFilter {
    /// Creates a filter with the default patterns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            suffixes: SmallVec::from_slice(&[".swp", ".swx", "~"]),
            prefixes: SmallVec::from_slice(&[".#"]),
            names: SmallVec::from_slice(&["4913"]),
        }
    }

    /// Adds a file name suffix to reject.
    #[must_use]
    pub fn reject_suffix(mut self, suffix: &'static str) -> Self {
        if !self.suffixes.contains(&suffix) {
            self.suffixes.push(suffix);
        }
        self
    }

    /// Returns `true` if `name` looks like an editor artefact.
    #[must_use]
    pub fn is_artifact(&self, name: &str) -> bool {
        self.names.contains(&name)
            || self.suffixes.iter().any(|suffix| name.ends_with(suffix))
            || self.prefixes.iter().any(|prefix| name.starts_with(prefix))
    }
}

impl Default for EditorArtifactFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFilter for EditorArtifactFilter {
    fn should_process(&self, _role: WatchedRole, path: &Utf8Path) -> bool {
        path.file_name().is_none_or(|name| !self.is_artifact(name))
    }
}

/// Keeps only template files among changes in the source root.
///
/// Changes for other roles pass unchanged: only [`WatchedRole::Pages`] is
/// narrowed to names ending with the template suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSuffixFilter {
    suffix: String,
}

impl PageSuffixFilter {
    /// Creates a filter for the given template suffix, e.g. `".html"`.
    #[must_use]
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl FileFilter for PageSuffixFilter {
    fn should_process(&self, role: WatchedRole, path: &Utf8Path) -> bool {
        if role != WatchedRole::Pages {
            return true;
        }
        path.file_name()
            .is_some_and(|name| name.len() > self.suffix.len() && name.ends_with(&self.suffix))
    }
}

/// A composite filter that combines multiple filters with AND logic.
///
/// An empty composite accepts everything.
pub struct CompositeFilter {
    filters: Vec<Box<dyn FileFilter>>,
}

impl CompositeFilter {
    /// Creates a new empty composite filter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Adds a filter to the composite.
    #[must_use]
    pub fn and<F: FileFilter>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl Default for CompositeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CompositeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl FileFilter for CompositeFilter {
    fn should_process(&self, role: WatchedRole, path: &Utf8Path) -> bool {
        self.filters.iter().all(|f| f.should_process(role, path))
    }
}

// Implement FileFilter for boxed filters
impl<F: FileFilter + ?Sized> FileFilter for Box<F> {
    fn should_process(&self, role: WatchedRole, path: &Utf8Path) -> bool {
        (**self).should_process(role, path)
    }
}

// Implement FileFilter for Arc-wrapped filters (useful for shared filters)
impl<F: FileFilter + ?Sized> FileFilter for std::sync::Arc<F> {
    fn should_process(&self, role: WatchedRole, path: &Utf8Path) -> bool {
        (**self).should_process(role, path)
    }
}

/// The filter the site watcher installs: editor artefacts everywhere, and
/// only templates in the source root.
#[must_use]
pub fn site_filter(template_suffix: &str) -> CompositeFilter {
    CompositeFilter::new()
        .and(EditorArtifactFilter::default())
        .and(PageSuffixFilter::new(template_suffix))
}
