//! The validated source/destination pair a generator works on.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::ConfigError;
use crate::paths;
use crate::role::WatchedRole;

/// A site: one source tree rendered and mirrored into one destination tree.
///
/// Construction validates that the source root exists and is a directory;
/// after that the value is immutable. The source root is stored canonicalized
/// so that paths reported by the filesystem watcher can be classified by
/// prefix. The destination root is made absolute but may not exist yet.
///
/// # Examples
///
/// ```no_run
/// use sg_core::{Site, WatchedRole};
///
/// let site = Site::new("www", "public")?;
/// assert!(site.role_dir(WatchedRole::Css).ends_with("css"));
/// # Ok::<(), sg_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    source_root: Utf8PathBuf,
    destination_root: Utf8PathBuf,
}

impl Site {
    /// Validates the roots and creates a site.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingDirectory`] if the source root does not exist
    /// - [`ConfigError::NotADirectory`] if it exists but is not a directory
    /// - [`ConfigError::InvalidPath`] if the destination is the source root or
    ///   lies inside one of the watched subdirectories
    pub fn new(
        source_root: impl Into<Utf8PathBuf>,
        destination_root: impl Into<Utf8PathBuf>,
    ) -> Result<Self, ConfigError> {
        let source_root = source_root.into();
        if !source_root.exists() {
            return Err(ConfigError::MissingDirectory(source_root));
        }
        if !source_root.is_dir() {
            return Err(ConfigError::NotADirectory(source_root));
        }
        let source_root = source_root.canonicalize_utf8()?;
        let destination_root = absolute(destination_root.into())?;

        let site = Self {
            source_root,
            destination_root,
        };
        site.check_destination()?;
        Ok(site)
    }

    /// The canonical source root.
    #[inline]
    #[must_use]
    pub fn source_root(&self) -> &Utf8Path {
        &self.source_root
    }

    /// The destination root.
    #[inline]
    #[must_use]
    pub fn destination_root(&self) -> &Utf8Path {
        &self.destination_root
    }

    /// Returns the source directory bound to `role`.
    #[must_use]
    pub fn role_dir(&self, role: WatchedRole) -> Utf8PathBuf {
        paths::join(&self.source_root, &[role.dir_name().unwrap_or_default()])
    }

    /// Returns the destination directory mirrored from an asset role's source
    /// directory, or `None` for template roles.
    #[must_use]
    pub fn asset_destination(&self, role: WatchedRole) -> Option<Utf8PathBuf> {
        if !role.is_asset() {
            return None;
        }
        role.dir_name()
            .map(|name| paths::join(&self.destination_root, &[name]))
    }

    /// Classifies an absolute path under the source root by role.
    ///
    /// The first path component below the root decides: a role directory
    /// name maps to that role, any other direct child of the root belongs to
    /// [`WatchedRole::Pages`]. Paths nested in unrelated subdirectories, and
    /// paths outside the root, are not classified.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sg_core::{Site, WatchedRole};
    ///
    /// let site = Site::new("www", "public")?;
    /// let root = site.source_root();
    /// assert_eq!(site.classify(&root.join("css/a/b.css")), Some(WatchedRole::Css));
    /// assert_eq!(site.classify(&root.join("index.html")), Some(WatchedRole::Pages));
    /// assert_eq!(site.classify(&root.join("drafts/x.html")), None);
    /// # Ok::<(), sg_core::ConfigError>(())
    /// ```
    #[must_use]
    pub fn classify(&self, path: &Utf8Path) -> Option<WatchedRole> {
        let relative = paths::relative_to(path, &self.source_root)?;
        let mut components = relative.components();
        let Some(first) = components.next() else {
            return Some(WatchedRole::Pages);
        };
        if let Some(role) = WatchedRole::from_dir_name(first.as_str()) {
            return Some(role);
        }
        components.next().is_none().then_some(WatchedRole::Pages)
    }

    fn check_destination(&self) -> Result<(), ConfigError> {
        if self.destination_root == self.source_root {
            return Err(ConfigError::InvalidPath {
                path: self.destination_root.clone(),
                reason: "destination must differ from the source directory".to_owned(),
            });
        }
        if let Some(role) = self.classify(&self.destination_root) {
            if role != WatchedRole::Pages {
                return Err(ConfigError::InvalidPath {
                    path: self.destination_root.clone(),
                    reason: format!("destination must not be inside the {role} directory"),
                });
            }
        }
        Ok(())
    }
}

fn absolute(path: Utf8PathBuf) -> Result<Utf8PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path);
    }
    let absolute = std::path::absolute(path.as_std_path())?;
    Utf8PathBuf::from_path_buf(absolute).map_err(|p| ConfigError::InvalidPath {
        path,
        reason: format!("absolute form '{}' is not valid UTF-8", p.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir is UTF-8")
    }

    #[test]
    fn test_site_requires_existing_source() {
        let temp = TempDir::new().unwrap();
        let missing = utf8(&temp).join("nope");
        let err = Site::new(missing.clone(), utf8(&temp).join("out")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDirectory(p) if p == missing));
    }

    #[test]
    fn test_site_rejects_file_source() {
        let temp = TempDir::new().unwrap();
        let file = utf8(&temp).join("index.html");
        std::fs::write(&file, "x").unwrap();
        let err = Site::new(file, utf8(&temp).join("out")).unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory(_)));
    }

    #[test]
    fn test_site_rejects_destination_equal_to_source() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp).canonicalize_utf8().unwrap();
        let err = Site::new(root.clone(), root).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
    }

    #[test]
    fn test_site_rejects_destination_inside_asset_dir() {
        let temp = TempDir::new().unwrap();
        let root = utf8(&temp).canonicalize_utf8().unwrap();
        let err = Site::new(root.clone(), root.join("css").join("out")).unwrap_err();
        assert!(err.to_string().contains("css"));
    }

    #[test]
    fn test_role_dirs_and_asset_destinations() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let site = Site::new(utf8(&source), utf8(&dest)).unwrap();

        assert_eq!(site.role_dir(WatchedRole::Pages), site.source_root());
        assert_eq!(site.role_dir(WatchedRole::Layouts), site.source_root().join("_layouts"));
        assert_eq!(
            site.asset_destination(WatchedRole::Js),
            Some(site.destination_root().join("js"))
        );
        assert_eq!(site.asset_destination(WatchedRole::Partials), None);
    }

    #[test]
    fn test_classify_paths() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let site = Site::new(utf8(&source), utf8(&dest)).unwrap();
        let root = site.source_root().to_owned();

        assert_eq!(site.classify(&root), Some(WatchedRole::Pages));
        assert_eq!(site.classify(&root.join("about.html")), Some(WatchedRole::Pages));
        assert_eq!(site.classify(&root.join("_layouts/base.html")), Some(WatchedRole::Layouts));
        assert_eq!(site.classify(&root.join("_partials")), Some(WatchedRole::Partials));
        assert_eq!(site.classify(&root.join("img/icons/x.svg")), Some(WatchedRole::Img));
        assert_eq!(site.classify(&root.join("drafts/post.html")), None);
        assert_eq!(site.classify(Utf8Path::new("/definitely/elsewhere.css")), None);
    }
}
