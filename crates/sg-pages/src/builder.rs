//! Rendering every page of a source directory.

use std::fmt;
use std::fs;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use sg_core::{BuildConfig, ErrorPolicy};
use tracing::{debug, warn};

use crate::engine::{Context, MiniJinjaEngine, TemplateEngine};
use crate::error::PageError;
use crate::resolver::TemplateResolver;

/// A page that failed while the build continued.
#[derive(Debug)]
pub struct PageFailure {
    /// File name of the page.
    pub page: String,
    /// Why it failed.
    pub error: PageError,
}

/// What one build rendered.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// File names of the pages written, in build order.
    pub rendered: Vec<String>,
    /// Pages that failed under [`ErrorPolicy::Continue`].
    pub failures: Vec<PageFailure>,
    /// Wall-clock time of the build.
    pub elapsed: Duration,
}

impl BuildReport {
    /// Returns `true` if every discovered page was written.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages rendered, {} failed in {:.1?}",
            self.rendered.len(),
            self.failures.len(),
            self.elapsed
        )
    }
}

/// Renders the top-level templates of a directory into a destination.
///
/// The builder owns its engine, and therefore the engine's render cache.
/// Nothing else holds template state: [`invalidate_cache`](Self::invalidate_cache)
/// is the only way to make changed layouts or partials visible.
///
/// # Examples
///
/// ```no_run
/// use sg_pages::PageBuilder;
/// use sg_core::BuildConfig;
/// use camino::Utf8Path;
///
/// let source = Utf8Path::new("www");
/// let mut builder = PageBuilder::for_source(source, &BuildConfig::default());
/// let report = builder.rebuild(source, Utf8Path::new("_site"))?;
/// println!("{report}");
/// # Ok::<(), sg_pages::PageError>(())
/// ```
#[derive(Debug)]
pub struct PageBuilder<E = MiniJinjaEngine> {
    engine: E,
    context: Context,
    suffix: String,
    policy: ErrorPolicy,
}

impl PageBuilder<MiniJinjaEngine> {
    /// Creates a builder with a [`MiniJinjaEngine`] rooted at `source_root`.
    #[must_use]
    pub fn for_source(source_root: &Utf8Path, config: &BuildConfig) -> Self {
        let resolver = TemplateResolver::new(source_root, config.template_suffix.clone());
        let engine = MiniJinjaEngine::new(resolver, config.strict_undefined);
        Self::new(engine, config)
    }
}

impl<E: TemplateEngine> PageBuilder<E> {
    /// Creates a builder around `engine`, taking the suffix, error policy and
    /// default variables from `config`.
    #[must_use]
    pub fn new(engine: E, config: &BuildConfig) -> Self {
        Self {
            engine,
            context: config.variables.clone(),
            suffix: config.template_suffix.clone(),
            policy: config.on_error,
        }
    }

    /// Replaces the variables every page is rendered with.
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// The engine.
    #[inline]
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The render context.
    #[inline]
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Lists the page templates directly in `source_dir`, sorted by name.
    ///
    /// Only regular files whose names end with the template suffix count.
    /// Subdirectories are never entered.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::ReadDir`] if the directory cannot be listed.
    pub fn discover_pages(&self, source_dir: &Utf8Path) -> Result<Vec<String>, PageError> {
        let read_dir_error = |source| PageError::ReadDir {
            path: source_dir.to_owned(),
            source,
        };

        let mut pages = Vec::new();
        for entry in fs::read_dir(source_dir).map_err(read_dir_error)? {
            let entry = entry.map_err(read_dir_error)?;
            let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(PageError::NonUtf8Path)?;
            let Some(name) = path.file_name() else {
                continue;
            };
            if name.len() > self.suffix.len() && name.ends_with(&self.suffix) && path.is_file() {
                pages.push(name.to_owned());
            }
        }
        pages.sort_unstable();
        Ok(pages)
    }

    /// Renders every page in `source_dir` into `destination_dir`.
    ///
    /// Each output file is truncated and rewritten. With
    /// [`ErrorPolicy::Abort`] the first failing page ends the build; with
    /// [`ErrorPolicy::Continue`] failures are logged and collected in the
    /// report.
    ///
    /// # Errors
    ///
    /// Returns the first page error under [`ErrorPolicy::Abort`], and
    /// build-level errors (listing the source, creating the destination)
    /// under either policy.
    pub fn build(
        &self,
        source_dir: &Utf8Path,
        destination_dir: &Utf8Path,
    ) -> Result<BuildReport, PageError> {
        let started = Instant::now();
        let pages = self.discover_pages(source_dir)?;
        fs::create_dir_all(destination_dir).map_err(|source| PageError::CreateDir {
            path: destination_dir.to_owned(),
            source,
        })?;

        let mut report = BuildReport::default();
        for page in pages {
            match self.build_page(&page, destination_dir) {
                Ok(()) => {
                    debug!(page = %page, "Rendered page");
                    report.rendered.push(page);
                }
                Err(error) => match self.policy {
                    ErrorPolicy::Abort => return Err(error),
                    ErrorPolicy::Continue => {
                        warn!(page = %page, error = %error, "Page failed, continuing");
                        report.failures.push(PageFailure { page, error });
                    }
                },
            }
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    /// Drops the engine's cached templates.
    pub fn invalidate_cache(&mut self) {
        self.engine.invalidate_cache();
    }

    /// Invalidates the cache, then builds.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn rebuild(
        &mut self,
        source_dir: &Utf8Path,
        destination_dir: &Utf8Path,
    ) -> Result<BuildReport, PageError> {
        self.invalidate_cache();
        self.build(source_dir, destination_dir)
    }

    fn build_page(&self, page: &str, destination_dir: &Utf8Path) -> Result<(), PageError> {
        let template = self.engine.resolve(page)?;
        let output = self.engine.render(&template, &self.context)?;
        let path = destination_dir.join(page);
        fs::write(&path, output).map_err(|e| PageError::write(path, e))
    }
}
