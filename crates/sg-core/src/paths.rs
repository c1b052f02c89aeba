//! Path joining helpers.

use camino::{Utf8Path, Utf8PathBuf};

/// Joins `segments` onto `base`, in order.
///
/// Empty segments are skipped so callers can pass optional components
/// without branching.
///
/// # Examples
///
/// ```
/// use sg_core::paths::join;
/// use camino::Utf8Path;
///
/// let path = join(Utf8Path::new("www"), &["css", "", "site.css"]);
/// assert_eq!(path.as_str(), "www/css/site.css");
/// ```
#[must_use]
pub fn join<S: AsRef<str>>(base: &Utf8Path, segments: &[S]) -> Utf8PathBuf {
    let mut path = base.to_owned();
    for segment in segments {
        let segment = segment.as_ref();
        if !segment.is_empty() {
            path.push(segment);
        }
    }
    path
}

/// Returns `path` relative to `root`, or `None` if `path` is outside `root`.
#[must_use]
pub fn relative_to<'a>(path: &'a Utf8Path, root: &Utf8Path) -> Option<&'a Utf8Path> {
    path.strip_prefix(root).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_segments() {
        assert_eq!(join(Utf8Path::new("a"), &["b", "c"]).as_str(), "a/b/c");
        assert_eq!(join(Utf8Path::new("a"), &[] as &[&str]).as_str(), "a");
        assert_eq!(join(Utf8Path::new("a"), &["", "c"]).as_str(), "a/c");
    }

    #[test]
    fn test_relative_to() {
        let root = Utf8Path::new("/site/www");
        assert_eq!(
            relative_to(Utf8Path::new("/site/www/css/a.css"), root).map(Utf8Path::as_str),
            Some("css/a.css")
        );
        assert_eq!(relative_to(Utf8Path::new("/elsewhere/a.css"), root), None);
    }
}
