//! Three-tier template lookup.
//!
//! A template name is looked up in the source root first, then in
//! `_partials/`, then in `_layouts/`. The first tier containing a regular
//! file with that name wins. Names without the template suffix get it
//! appended, so `{% extends "base" %}` finds `_layouts/base.html`.

use std::fmt;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use sg_core::WatchedRole;

use crate::error::PageError;

/// One of the directories searched for templates, in search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateTier {
    /// The source root (page templates).
    Root,
    /// The `_partials/` directory.
    Partials,
    /// The `_layouts/` directory.
    Layouts,
}

impl TemplateTier {
    /// All tiers in search order.
    pub const SEARCH_ORDER: [Self; 3] = [Self::Root, Self::Partials, Self::Layouts];

    /// The watched role whose directory backs this tier.
    #[inline]
    #[must_use]
    pub const fn role(self) -> WatchedRole {
        match self {
            Self::Root => WatchedRole::Pages,
            Self::Partials => WatchedRole::Partials,
            Self::Layouts => WatchedRole::Layouts,
        }
    }
}

impl fmt::Display for TemplateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role().label())
    }
}

/// A resolved template: its normalized name and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateHandle {
    name: String,
    tier: TemplateTier,
    path: Utf8PathBuf,
}

impl TemplateHandle {
    /// Creates a handle.
    #[must_use]
    pub fn new(name: impl Into<String>, tier: TemplateTier, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            tier,
            path: path.into(),
        }
    }

    /// The template name with the suffix applied.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tier the template was found in.
    #[inline]
    #[must_use]
    pub const fn tier(&self) -> TemplateTier {
        self.tier
    }

    /// The template file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// Maps template names to files under a source root.
///
/// # Examples
///
/// ```no_run
/// use sg_pages::{TemplateResolver, TemplateTier};
/// use camino::Utf8Path;
///
/// let resolver = TemplateResolver::new(Utf8Path::new("www"), ".html");
/// let handle = resolver.resolve("base")?;
/// assert_eq!(handle.name(), "base.html");
/// assert_eq!(handle.tier(), TemplateTier::Layouts);
/// # Ok::<(), sg_pages::PageError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateResolver {
    root: Utf8PathBuf,
    suffix: String,
}

impl TemplateResolver {
    /// Creates a resolver for templates under `root` ending with `suffix`.
    #[must_use]
    pub fn new(root: &Utf8Path, suffix: impl Into<String>) -> Self {
        Self {
            root: root.to_owned(),
            suffix: suffix.into(),
        }
    }

    /// The source root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The template suffix, including the leading dot.
    #[inline]
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Appends the suffix unless `name` already ends with it.
    #[must_use]
    pub fn normalize(&self, name: &str) -> String {
        if name.ends_with(&self.suffix) {
            name.to_owned()
        } else {
            format!("{name}{}", self.suffix)
        }
    }

    /// The directory backing `tier`.
    #[must_use]
    pub fn tier_dir(&self, tier: TemplateTier) -> Utf8PathBuf {
        sg_core::paths::join(&self.root, &[tier.role().dir_name().unwrap_or_default()])
    }

    /// Resolves `name` through the tiers.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidName`] for empty or absolute names and
    /// names containing `..`, and [`PageError::TemplateNotFound`] when no tier
    /// has the file.
    pub fn resolve(&self, name: &str) -> Result<TemplateHandle, PageError> {
        if !is_valid_name(name) {
            return Err(PageError::InvalidName(name.to_owned()));
        }
        let name = self.normalize(name);
        self.lookup(&name)
            .ok_or(PageError::TemplateNotFound { name })
    }

    /// Like [`resolve`](Self::resolve), but maps every failure to `None`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TemplateHandle> {
        self.resolve(name).ok()
    }

    fn lookup(&self, name: &str) -> Option<TemplateHandle> {
        TemplateTier::SEARCH_ORDER.into_iter().find_map(|tier| {
            let path = self.tier_dir(tier).join(name);
            path.is_file().then(|| TemplateHandle::new(name, tier, path))
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && Utf8Path::new(name)
            .components()
            .all(|component| matches!(component, Utf8Component::Normal(_)))
}
