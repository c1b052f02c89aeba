//! Error types for the sg-sync crate.

use camino::Utf8PathBuf;

/// Errors that can occur while synchronizing two directory trees.
///
/// # Error Recovery Strategy
///
/// - **Walk errors** ([`SyncError::Walk`]): Fatal for this call, a tree could
///   not be read at all
/// - **File operation errors** ([`SyncError::Copy`], [`SyncError::Remove`],
///   [`SyncError::CreateDir`], [`SyncError::Stamp`]): Abort this call; the
///   next sync of the same trees recomputes the plan and may succeed
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Failed to walk a directory tree.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// The source path exists but is not a directory.
    #[error("source '{0}' is not a directory")]
    NotADirectory(Utf8PathBuf),

    /// Failed to copy a file into the destination tree.
    #[error("failed to copy {from} to {path}: {source}")]
    Copy {
        /// The source file.
        from: Utf8PathBuf,
        /// The destination file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove an orphaned file or directory.
    #[error("failed to remove {path}: {source}")]
    Remove {
        /// The path that could not be removed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a destination directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to copy the modification time onto a copied file.
    #[error("failed to set modification time of {path}: {source}")]
    Stamp {
        /// The copied file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl SyncError {
    /// Creates a new [`SyncError::Copy`] error.
    #[inline]
    pub fn copy(
        from: impl Into<Utf8PathBuf>,
        path: impl Into<Utf8PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Copy {
            from: from.into(),
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`SyncError::Remove`] error.
    #[inline]
    pub fn remove(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Remove {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`SyncError::CreateDir`] error.
    #[inline]
    pub fn create_dir(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`SyncError::Stamp`] error.
    #[inline]
    pub fn stamp(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Stamp {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if a later sync of the same trees may succeed.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Copy { .. } | Self::Remove { .. } | Self::CreateDir { .. } | Self::Stamp { .. }
        )
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the destination-side path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Copy { path, .. }
            | Self::Remove { path, .. }
            | Self::CreateDir { path, .. }
            | Self::Stamp { path, .. }
            | Self::NotADirectory(path) => Some(path),
            Self::Walk(_) | Self::NonUtf8Path(_) => None,
        }
    }
}
