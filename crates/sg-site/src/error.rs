//! Error types for the sg-site crate.

use camino::Utf8PathBuf;
use sg_core::{ConfigError, WatchedRole};
use sg_pages::PageError;
use sg_sync::SyncError;
use sg_watcher::WatchError;

/// Errors raised while generating or watching a site.
///
/// # Error Recovery Strategy
///
/// - **Config** ([`SiteError::Config`]): Fatal - reported before any work
/// - **Pages** / **Sync**: In one-shot mode the build stops; in watch mode
///   only the current dispatch is abandoned
/// - **Watch** ([`SiteError::Watch`]): Fatal at startup, otherwise per the
///   wrapped [`WatchError`]
/// - **Task** ([`SiteError::Task`]): A dispatch panicked or was cancelled by
///   the runtime
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SiteError {
    /// Invalid configuration or source directory.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rendering pages failed.
    #[error("page build failed: {0}")]
    Pages(#[from] PageError),

    /// Synchronizing one asset directory failed.
    #[error("{role} sync failed: {source}")]
    Sync {
        /// The asset role being synchronized.
        role: WatchedRole,
        /// The underlying error.
        #[source]
        source: SyncError,
    },

    /// Setting up or maintaining watches failed.
    #[error("watcher error: {0}")]
    Watch(#[from] WatchError),

    /// A blocking dispatch task did not complete.
    #[error("dispatch task failed: {0}")]
    Task(String),
}

impl SiteError {
    /// Wraps a [`SyncError`] raised while synchronizing `role`.
    #[inline]
    #[must_use]
    pub const fn sync(role: WatchedRole, source: SyncError) -> Self {
        Self::Sync { role, source }
    }

    /// Returns `true` if the watch loop can carry on after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Pages(e) => e.is_recoverable(),
            Self::Sync { source, .. } => source.is_recoverable(),
            Self::Watch(e) => e.is_recoverable(),
            Self::Config(_) | Self::Task(_) => false,
        }
    }

    /// Returns `true` if this error should stop the program.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Config(e) => e.path(),
            Self::Pages(e) => e.path(),
            Self::Sync { source, .. } => source.path(),
            Self::Watch(e) => e.path(),
            Self::Task(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display_names_role() {
        let err = SiteError::sync(
            WatchedRole::Css,
            SyncError::NotADirectory(Utf8PathBuf::from("www/css")),
        );
        assert_eq!(err.to_string(), "css sync failed: source 'www/css' is not a directory");
        assert_eq!(err.path().map(|p| p.as_str()), Some("www/css"));
    }

    #[test]
    fn test_config_error_is_fatal() {
        let err = SiteError::from(ConfigError::MissingDirectory(Utf8PathBuf::from("www")));
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "source directory 'www' does not exist");
    }

    #[test]
    fn test_recoverable_delegates() {
        let err = SiteError::from(PageError::TemplateNotFound {
            name: "a.html".to_owned(),
        });
        assert!(err.is_recoverable());
        assert!(SiteError::Task("panicked".to_owned()).is_fatal());
    }
}
