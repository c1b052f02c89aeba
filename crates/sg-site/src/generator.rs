//! One-shot and continuous site generation.

use std::sync::Arc;

use parking_lot::Mutex;
use sg_core::{Config, Site};
use sg_watcher::{SiteWatcher, WatchSource, site_filter};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::builder::{GenerateReport, SiteBuilder};
use crate::error::SiteError;
use crate::watch_loop::{LoopOutcome, LoopStats, WatchLoop};

/// Composes page rendering, asset synchronization, and watching for one
/// site.
///
/// # Examples
///
/// ```no_run
/// use sg_core::Config;
/// use sg_site::SiteGenerator;
///
/// let generator = SiteGenerator::new(Config::default())?;
/// let report = generator.generate()?;
/// println!("{report}");
/// # Ok::<(), sg_site::SiteError>(())
/// ```
#[derive(Debug)]
pub struct SiteGenerator {
    config: Config,
    site: Site,
    builder: Arc<Mutex<SiteBuilder>>,
}

impl SiteGenerator {
    /// Validates `config` and the source directory.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Config`] if an option is invalid or the source
    /// root is not an existing directory.
    pub fn new(config: Config) -> Result<Self, SiteError> {
        config.validate()?;
        let site = Site::new(config.site.source.clone(), config.site.destination.clone())?;
        let builder = SiteBuilder::new(site.clone(), &config);
        info!(
            source = %site.source_root(),
            destination = %site.destination_root(),
            "Site configured"
        );
        Ok(Self {
            config,
            site,
            builder: Arc::new(Mutex::new(builder)),
        })
    }

    /// The validated site.
    #[inline]
    #[must_use]
    pub const fn site(&self) -> &Site {
        &self.site
    }

    /// The configuration in use.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Renders every page and mirrors every asset directory once.
    ///
    /// # Errors
    ///
    /// Returns the first page or sync error.
    pub fn generate(&self) -> Result<GenerateReport, SiteError> {
        let report = self.builder.lock().generate()?;
        info!(
            pages = report.pages.rendered.len(),
            failed = report.pages.failures.len(),
            elapsed = ?report.elapsed,
            "Site generated"
        );
        Ok(report)
    }

    /// Watches the source tree and rebuilds on change until `cancel` fires.
    ///
    /// Watches are registered first. With `watch.initial_build` set, a full
    /// generation then runs; changes made meanwhile are queued and handled by
    /// the loop. A failed initial build is logged and watching continues.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Watch`] if the source root cannot be watched.
    pub async fn generate_on_file_change(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(LoopOutcome, LoopStats), SiteError> {
        let filter = site_filter(&self.config.build.template_suffix);
        let watcher = SiteWatcher::new(&self.site, filter)?;
        self.watch_after_initial_build(watcher, cancel).await
    }

    /// Runs the optional initial build, then the watch loop over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Task`] if the initial build task panicked.
    pub async fn watch_after_initial_build<S: WatchSource>(
        &self,
        source: S,
        cancel: &CancellationToken,
    ) -> Result<(LoopOutcome, LoopStats), SiteError> {
        if self.config.watch.initial_build {
            let builder = Arc::clone(&self.builder);
            match tokio::task::spawn_blocking(move || builder.lock().generate()).await {
                Ok(Ok(report)) => info!(pages = report.pages.rendered.len(), "Initial build done"),
                Ok(Err(e)) => error!(error = %e, "Initial build failed"),
                Err(e) => return Err(SiteError::Task(e.to_string())),
            }
        }

        Ok(self.watch_with(source, cancel).await)
    }

    /// Runs the watch loop over any signal source.
    pub async fn watch_with<S: WatchSource>(
        &self,
        source: S,
        cancel: &CancellationToken,
    ) -> (LoopOutcome, LoopStats) {
        WatchLoop::new(source, Arc::clone(&self.builder), &self.config.watch)
            .run(cancel)
            .await
    }
}
