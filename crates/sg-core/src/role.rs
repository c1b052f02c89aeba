//! Watched directory roles.
//!
//! Every directory the generator cares about has exactly one [`WatchedRole`].
//! The role decides which rebuild action a change in that directory triggers:
//! template roles rebuild pages, asset roles resynchronize their own subtree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The static classification of a watched source directory.
///
/// The role-to-directory mapping is fixed: [`Pages`](Self::Pages) is the
/// source root itself, every other role is a fixed subdirectory of it.
///
/// # Examples
///
/// ```
/// use sg_core::WatchedRole;
///
/// assert_eq!(WatchedRole::Css.dir_name(), Some("css"));
/// assert_eq!(WatchedRole::Pages.dir_name(), None);
/// assert!(WatchedRole::Layouts.is_template());
/// assert!(WatchedRole::Img.is_asset());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedRole {
    /// Top-level page templates in the source root.
    Pages,
    /// Layout templates in `_layouts/`.
    Layouts,
    /// Partial templates in `_partials/`.
    Partials,
    /// Stylesheets in `css/`.
    Css,
    /// Scripts in `js/`.
    Js,
    /// Images in `img/`.
    Img,
}

impl WatchedRole {
    /// All roles, in registration order.
    pub const ALL: [Self; 6] = [
        Self::Pages,
        Self::Layouts,
        Self::Partials,
        Self::Css,
        Self::Js,
        Self::Img,
    ];

    /// The static asset roles, in the order a full sync visits them.
    pub const ASSETS: [Self; 3] = [Self::Css, Self::Img, Self::Js];

    /// Returns the directory name under the source root, or `None` for
    /// [`Pages`](Self::Pages), which is bound to the root itself.
    #[inline]
    #[must_use]
    pub const fn dir_name(self) -> Option<&'static str> {
        match self {
            Self::Pages => None,
            Self::Layouts => Some("_layouts"),
            Self::Partials => Some("_partials"),
            Self::Css => Some("css"),
            Self::Js => Some("js"),
            Self::Img => Some("img"),
        }
    }

    /// Looks up the role bound to a directory name directly under the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use sg_core::WatchedRole;
    ///
    /// assert_eq!(WatchedRole::from_dir_name("_partials"), Some(WatchedRole::Partials));
    /// assert_eq!(WatchedRole::from_dir_name("fonts"), None);
    /// ```
    #[must_use]
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.dir_name() == Some(name))
    }

    /// Returns `true` for roles whose changes require a page rebuild.
    #[inline]
    #[must_use]
    pub const fn is_template(self) -> bool {
        matches!(self, Self::Pages | Self::Layouts | Self::Partials)
    }

    /// Returns `true` for static asset roles that are mirrored verbatim.
    #[inline]
    #[must_use]
    pub const fn is_asset(self) -> bool {
        !self.is_template()
    }

    /// Returns `true` if the role's directory is watched recursively.
    ///
    /// Only the source root is watched flat: its subdirectories belong to
    /// other roles.
    #[inline]
    #[must_use]
    pub const fn is_recursive(self) -> bool {
        !matches!(self, Self::Pages)
    }

    /// Returns a short human-readable label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Layouts => "layouts",
            Self::Partials => "partials",
            Self::Css => "css",
            Self::Js => "js",
            Self::Img => "img",
        }
    }
}

impl fmt::Display for WatchedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_dir_names_are_unique() {
        let names: Vec<_> = WatchedRole::ALL.iter().filter_map(|r| r.dir_name()).collect();
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_from_dir_name_roundtrip() {
        for role in WatchedRole::ALL {
            if let Some(name) = role.dir_name() {
                assert_eq!(WatchedRole::from_dir_name(name), Some(role));
            }
        }
        assert_eq!(WatchedRole::from_dir_name(""), None);
        assert_eq!(WatchedRole::from_dir_name("layouts"), None);
    }

    #[test]
    fn test_template_and_asset_partition() {
        let templates: Vec<_> = WatchedRole::ALL.into_iter().filter(|r| r.is_template()).collect();
        assert_eq!(
            templates,
            vec![WatchedRole::Pages, WatchedRole::Layouts, WatchedRole::Partials]
        );
        assert!(WatchedRole::ASSETS.iter().all(|r| r.is_asset()));
    }

    #[test]
    fn test_only_pages_is_flat() {
        assert!(!WatchedRole::Pages.is_recursive());
        assert!(WatchedRole::Css.is_recursive());
        assert!(WatchedRole::Layouts.is_recursive());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&WatchedRole::Img).unwrap(), r#""img""#);
        let role: WatchedRole = serde_json::from_str(r#""partials""#).unwrap();
        assert_eq!(role, WatchedRole::Partials);
        assert_eq!(WatchedRole::Js.to_string(), "js");
    }
}
