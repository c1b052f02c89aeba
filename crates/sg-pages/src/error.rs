//! Error types for the sg-pages crate.

use camino::Utf8PathBuf;

/// Errors that can occur while resolving, rendering, or writing pages.
///
/// # Error Recovery Strategy
///
/// - **Per-page errors** (not found, render, read, write): recoverable; with
///   [`ErrorPolicy::Continue`](sg_core::ErrorPolicy::Continue) the build moves
///   on to the next page
/// - **Build-level errors** (listing the source, creating the destination,
///   invalid names): fatal for the build
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No tier contains a template with this name.
    #[error("template '{name}' not found in the page, partial, or layout directories")]
    TemplateNotFound {
        /// The requested template name, with the suffix applied.
        name: String,
    },

    /// The template name escapes the source tree.
    #[error("invalid template name '{0}'")]
    InvalidName(String),

    /// The template engine failed to compile or render a template.
    #[error("failed to render '{name}': {source}")]
    Render {
        /// The page being rendered.
        name: String,
        /// The engine error, including its location when known.
        #[source]
        source: minijinja::Error,
    },

    /// Failed to list the source directory.
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        /// The directory that could not be listed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the destination directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a rendered page.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The output file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl PageError {
    /// Creates a new [`PageError::Render`] error.
    #[inline]
    pub fn render(name: impl Into<String>, source: minijinja::Error) -> Self {
        Self::Render {
            name: name.into(),
            source,
        }
    }

    /// Creates a new [`PageError::Write`] error.
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the error concerns a single page and the build can
    /// continue with the others.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound { .. } | Self::Render { .. } | Self::Write { .. }
        )
    }

    /// Returns `true` if this error is fatal for the build.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::ReadDir { path, .. }
            | Self::CreateDir { path, .. }
            | Self::Write { path, .. } => Some(path),
            Self::TemplateNotFound { .. }
            | Self::InvalidName(_)
            | Self::Render { .. }
            | Self::NonUtf8Path(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_not_found_is_recoverable() {
        let err = PageError::TemplateNotFound {
            name: "base.html".to_owned(),
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("base.html"));
        assert!(err.path().is_none());
    }

    #[test]
    fn test_write_error_has_path() {
        let err = PageError::write("_site/index.html", io::Error::other("disk full"));
        assert!(err.is_recoverable());
        assert_eq!(err.path().map(|p| p.as_str()), Some("_site/index.html"));
    }

    #[test]
    fn test_create_dir_is_fatal() {
        let err = PageError::CreateDir {
            path: Utf8PathBuf::from("_site"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn test_render_error_display() {
        let source = minijinja::Error::new(minijinja::ErrorKind::UndefinedError, "title is undefined");
        let err = PageError::render("about.html", source);
        assert!(err.to_string().starts_with("failed to render 'about.html'"));
    }
}
