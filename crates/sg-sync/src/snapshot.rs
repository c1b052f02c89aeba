//! Point-in-time listings of a directory tree.
//!
//! A [`TreeSnapshot`] maps every regular file below a root, by path relative
//! to that root, to its [`FileSignature`]. Entries that are neither files nor
//! directories (unfollowed symlinks, sockets, pipes) are listed separately.
//! Snapshots are recomputed on every sync and never persisted.

use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use sg_core::{FxHashMap, FxHashSet};

use crate::error::SyncError;

/// The cheap identity of a file used to detect changes: length and
/// modification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileSignature {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileSignature {
    /// Creates a signature from its parts.
    #[inline]
    #[must_use]
    pub const fn new(len: u64, modified: Option<SystemTime>) -> Self {
        Self { len, modified }
    }

    /// Reads the signature of a file from its metadata.
    #[must_use]
    pub fn from_metadata(metadata: &std::fs::Metadata) -> Self {
        Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        }
    }

    /// File length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` for a zero-length file.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Last modification time, if the platform reports one.
    #[inline]
    #[must_use]
    pub const fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

/// Regular files, subdirectories, and other entries found below one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    files: FxHashMap<Utf8PathBuf, FileSignature>,
    dirs: FxHashSet<Utf8PathBuf>,
    others: FxHashSet<Utf8PathBuf>,
}

impl TreeSnapshot {
    /// Walks `root` recursively and records every entry below it.
    ///
    /// A missing root yields an empty snapshot. Hidden files are included and
    /// ignore files are not honored: the tree is mirrored as it is on disk.
    /// Symbolic links are recorded as [`others`](Self::others) and not
    /// descended into unless `follow_links` is set.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Walk`] if an entry cannot be read and
    /// [`SyncError::NonUtf8Path`] for paths that are not UTF-8.
    pub fn capture(root: &Utf8Path, follow_links: bool) -> Result<Self, SyncError> {
        let mut snapshot = Self::default();
        if !root.is_dir() {
            return Ok(snapshot);
        }

        let walker = WalkBuilder::new(root)
            // Mirror everything: no .gitignore, no hidden-file filtering
            .standard_filters(false)
            .follow_links(follow_links)
            .build();

        for result in walker {
            let entry = result?;
            if entry.depth() == 0 {
                continue;
            }
            let Some(file_type) = entry.file_type() else {
                continue;
            };

            let path = entry.path();
            let utf8_path =
                Utf8Path::from_path(path).ok_or_else(|| SyncError::NonUtf8Path(path.to_owned()))?;
            let Ok(relative) = utf8_path.strip_prefix(root) else {
                continue;
            };

            if file_type.is_dir() {
                snapshot.dirs.insert(relative.to_owned());
            } else if file_type.is_file() {
                let metadata = entry.metadata()?;
                snapshot
                    .files
                    .insert(relative.to_owned(), FileSignature::from_metadata(&metadata));
            } else {
                snapshot.others.insert(relative.to_owned());
            }
        }

        Ok(snapshot)
    }

    /// Records a file. Used to build snapshots by hand.
    pub fn insert_file(&mut self, relative: impl Into<Utf8PathBuf>, signature: FileSignature) {
        self.files.insert(relative.into(), signature);
    }

    /// Records a directory. Used to build snapshots by hand.
    pub fn insert_dir(&mut self, relative: impl Into<Utf8PathBuf>) {
        self.dirs.insert(relative.into());
    }

    /// Records an entry that is neither a file nor a directory.
    pub fn insert_other(&mut self, relative: impl Into<Utf8PathBuf>) {
        self.others.insert(relative.into());
    }

    /// Files by relative path.
    #[inline]
    #[must_use]
    pub const fn files(&self) -> &FxHashMap<Utf8PathBuf, FileSignature> {
        &self.files
    }

    /// Relative paths of all subdirectories.
    #[inline]
    #[must_use]
    pub const fn dirs(&self) -> &FxHashSet<Utf8PathBuf> {
        &self.dirs
    }

    /// Relative paths of entries that are neither regular files nor
    /// directories.
    #[inline]
    #[must_use]
    pub const fn others(&self) -> &FxHashSet<Utf8PathBuf> {
        &self.others
    }

    /// Number of regular files.
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
