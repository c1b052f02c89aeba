//! Error types for the sg-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while registering and maintaining directory watches.

use camino::Utf8PathBuf;
use sg_core::WatchedRole;

/// Errors that can occur during file watching operations.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal when registering the
///   source root, otherwise the role is left unwatched
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal - the source root
///   must exist
/// - **Directory gone** ([`WatchError::DirectoryGone`]): Recoverable - the role
///   is dropped and the remaining roles keep being watched
///
/// # Examples
///
/// ```
/// use sg_watcher::WatchError;
/// use sg_core::WatchedRole;
/// use camino::Utf8PathBuf;
///
/// let err = WatchError::DirectoryGone {
///     role: WatchedRole::Img,
///     path: Utf8PathBuf::from("www/img"),
/// };
/// assert!(err.is_recoverable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The specified path does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// A watched role directory disappeared; its watch was dropped.
    #[error("{role} directory '{path}' is no longer accessible, watch dropped")]
    DirectoryGone {
        /// The role whose watch was dropped.
        role: WatchedRole,
        /// The directory that disappeared.
        path: Utf8PathBuf,
    },
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns `true` if watching can continue for the other roles.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::DirectoryGone { .. })
    }

    /// Returns `true` if this error is fatal (watching should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) | Self::DirectoryGone { path, .. } => Some(path),
            Self::Notify(_) => None,
        }
    }
}
