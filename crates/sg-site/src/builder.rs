//! Executes rebuild actions against one site.

use std::fmt;
use std::time::{Duration, Instant};

use sg_core::{Config, Site, WatchedRole};
use sg_pages::{BuildReport, PageBuilder};
use sg_sync::{DirectorySynchronizer, SyncReport};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::error::SiteError;
use crate::router::Dispatch;

/// Per-role results of synchronizing the asset directories.
pub type AssetReports = SmallVec<[(WatchedRole, SyncReport); 3]>;

/// What a full generation did.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// The page build.
    pub pages: BuildReport,
    /// One entry per asset role, in [`WatchedRole::ASSETS`] order.
    pub assets: AssetReports,
    /// Wall-clock time of the whole generation.
    pub elapsed: Duration,
}

impl fmt::Display for GenerateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pages: {}", self.pages)?;
        for (role, report) in &self.assets {
            writeln!(f, "{role}: {report}")?;
        }
        write!(f, "generated in {:.1?}", self.elapsed)
    }
}

/// The result of one executed [`Dispatch`].
#[derive(Debug)]
pub enum DispatchReport {
    /// Pages were rebuilt.
    Pages(BuildReport),
    /// One asset directory was synchronized.
    Assets(WatchedRole, SyncReport),
    /// Everything was regenerated.
    Full(GenerateReport),
}

/// Owns the page builder and the synchronizer of a site.
///
/// All writes to the destination tree go through this type. The watch loop
/// shares it with the blocking pool behind a mutex and runs one dispatch at
/// a time.
#[derive(Debug)]
pub struct SiteBuilder {
    site: Site,
    pages: PageBuilder,
    sync: DirectorySynchronizer,
}

impl SiteBuilder {
    /// Creates a builder for `site` with the build and sync sections of
    /// `config`.
    #[must_use]
    pub fn new(site: Site, config: &Config) -> Self {
        let pages = PageBuilder::for_source(site.source_root(), &config.build);
        Self {
            site,
            pages,
            sync: DirectorySynchronizer::new(&config.sync),
        }
    }

    /// The site.
    #[inline]
    #[must_use]
    pub const fn site(&self) -> &Site {
        &self.site
    }

    /// Renders every page, then mirrors every asset directory.
    ///
    /// # Errors
    ///
    /// Returns the first page or sync error; later steps do not run.
    pub fn generate(&mut self) -> Result<GenerateReport, SiteError> {
        let started = Instant::now();
        let pages = self.rebuild_pages()?;
        let assets = self.sync_all_assets()?;
        Ok(GenerateReport {
            pages,
            assets,
            elapsed: started.elapsed(),
        })
    }

    /// Invalidates the render cache and renders every page of the source
    /// root.
    ///
    /// # Errors
    ///
    /// See [`PageBuilder::build`].
    pub fn rebuild_pages(&mut self) -> Result<BuildReport, SiteError> {
        let report = self
            .pages
            .rebuild(self.site.source_root(), self.site.destination_root())?;
        info!(
            rendered = report.rendered.len(),
            failed = report.failures.len(),
            elapsed = ?report.elapsed,
            "Pages rebuilt"
        );
        Ok(report)
    }

    /// Synchronizes the destination directory of one asset role.
    ///
    /// Template roles have no destination directory; for them this does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Sync`] naming the role.
    pub fn sync_role(&self, role: WatchedRole) -> Result<SyncReport, SiteError> {
        let Some(destination) = self.site.asset_destination(role) else {
            debug!(role = %role, "Not an asset role, nothing to sync");
            return Ok(SyncReport::default());
        };
        let report = self
            .sync
            .sync(&self.site.role_dir(role), &destination)
            .map_err(|e| SiteError::sync(role, e))?;
        info!(
            role = %role,
            copied = report.copied,
            deleted = report.deleted,
            unchanged = report.unchanged,
            elapsed = ?report.elapsed,
            "Assets synchronized"
        );
        Ok(report)
    }

    /// Synchronizes every asset role.
    ///
    /// # Errors
    ///
    /// Stops at the first failing role.
    pub fn sync_all_assets(&self) -> Result<AssetReports, SiteError> {
        WatchedRole::ASSETS
            .into_iter()
            .map(|role| self.sync_role(role).map(|report| (role, report)))
            .collect()
    }

    /// Runs one dispatch.
    ///
    /// # Errors
    ///
    /// Propagates the page or sync error of the action.
    pub fn execute(&mut self, dispatch: Dispatch) -> Result<DispatchReport, SiteError> {
        debug!(dispatch = %dispatch, "Executing dispatch");
        match dispatch {
            Dispatch::RebuildPages => self.rebuild_pages().map(DispatchReport::Pages),
            Dispatch::SyncAssets(role) => self
                .sync_role(role)
                .map(|report| DispatchReport::Assets(role, report)),
            Dispatch::FullResync => self.generate().map(DispatchReport::Full),
        }
    }
}
