//! One-way directory tree synchronization for sitegen.
//!
//! This crate mirrors a source directory onto a destination directory
//! without wiping the destination first. Only the files that differ are
//! copied and only the orphans are deleted, so a sync over unchanged trees
//! touches nothing.
//!
//! # Overview
//!
//! The main entry point is [`DirectorySynchronizer`], which combines:
//!
//! - [`TreeSnapshot`]: recursive listing of both trees, with a
//!   [`FileSignature`] (length, modification time) per file
//! - [`SyncPlan`]: pure diff of the two snapshots
//! - [`SyncReport`]: counts and timing of what was applied
//!
//! # Algorithm
//!
//! ```text
//! source ──walk──► TreeSnapshot ─┐
//!                                ├─► SyncPlan::diff ─► delete orphans
//! dest ────walk──► TreeSnapshot ─┘                     prune empty dirs
//!                                                      copy (rayon) + stamp mtime
//! ```
//!
//! Every copied file receives the source file's modification time. A second
//! run therefore sees equal signatures and performs no work, even when a
//! source file was replaced by an older one.
//!
//! # Examples
//!
//! ```no_run
//! use sg_sync::DirectorySynchronizer;
//! use camino::Utf8Path;
//!
//! let synchronizer = DirectorySynchronizer::default();
//! let report = synchronizer.sync(Utf8Path::new("www/css"), Utf8Path::new("_site/css"))?;
//! println!("{report}");
//! # Ok::<(), sg_sync::SyncError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod plan;
pub mod report;
pub mod snapshot;

use std::fs;
use std::io;
use std::time::{Instant, SystemTime};

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use sg_core::SyncConfig;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

pub use error::SyncError;
pub use plan::SyncPlan;
pub use report::SyncReport;
pub use snapshot::{FileSignature, TreeSnapshot};

/// Reconciles one source directory tree onto one destination tree.
///
/// The synchronizer holds no state between calls; every [`sync`](Self::sync)
/// walks both trees afresh. Side effects are confined to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectorySynchronizer {
    follow_links: bool,
    parallel: bool,
}

impl Default for DirectorySynchronizer {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl DirectorySynchronizer {
    /// Creates a synchronizer from configuration.
    #[must_use]
    pub const fn new(config: &SyncConfig) -> Self {
        Self {
            follow_links: config.follow_links,
            parallel: config.parallel,
        }
    }

    /// Configures whether copies run on the rayon thread pool.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Configures whether symbolic links in the source are followed.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Makes the regular files under `destination_dir` equal to those under
    /// `source_dir`.
    ///
    /// If `source_dir` does not exist the call does nothing and returns an
    /// empty report. Otherwise the destination root is created if needed.
    ///
    /// # Errors
    ///
    /// Returns the first [`SyncError`] encountered. Work already applied is
    /// not rolled back; the next call recomputes the plan from disk.
    pub fn sync(
        &self,
        source_dir: &Utf8Path,
        destination_dir: &Utf8Path,
    ) -> Result<SyncReport, SyncError> {
        let started = Instant::now();

        if !source_dir.exists() {
            debug!(source = %source_dir, "Source directory missing, nothing to sync");
            return Ok(SyncReport::default());
        }
        if !source_dir.is_dir() {
            return Err(SyncError::NotADirectory(source_dir.to_owned()));
        }

        let source = TreeSnapshot::capture(source_dir, self.follow_links)?;
        let destination = TreeSnapshot::capture(destination_dir, false)?;
        let plan = SyncPlan::diff(&source, &destination);

        debug!(
            source = %source_dir,
            destination = %destination_dir,
            copies = plan.copies().len(),
            deletes = plan.deletes().len(),
            prune = plan.prune_dirs().len(),
            "Computed sync plan"
        );

        fs::create_dir_all(destination_dir)
            .map_err(|e| SyncError::create_dir(destination_dir, e))?;

        for relative in plan.deletes() {
            let path = destination_dir.join(relative);
            fs::remove_file(&path).map_err(|e| SyncError::remove(&path, e))?;
            trace!(path = %path, "Deleted orphaned file");
        }

        let mut directories_removed = 0;
        for relative in plan.prune_dirs() {
            if remove_dir_if_empty(&destination_dir.join(relative))? {
                directories_removed += 1;
            }
        }

        let copy_one = |relative: &Utf8PathBuf| {
            let modified = source.files().get(relative).and_then(FileSignature::modified);
            copy_file(
                &source_dir.join(relative),
                &destination_dir.join(relative),
                modified,
            )
        };
        if self.parallel {
            plan.copies().par_iter().try_for_each(copy_one)?;
        } else {
            plan.copies().iter().try_for_each(copy_one)?;
        }

        Ok(SyncReport {
            copied: plan.copies().len(),
            deleted: plan.deletes().len(),
            unchanged: plan.unchanged(),
            directories_removed,
            elapsed: started.elapsed(),
        })
    }
}

/// Removes `path` if it is an empty directory. Returns whether it was removed.
fn remove_dir_if_empty(path: &Utf8Path) -> Result<bool, SyncError> {
    let mut entries = fs::read_dir(path).map_err(|e| SyncError::remove(path, e))?;
    if entries.next().is_some() {
        debug!(path = %path, "Directory not empty, keeping it");
        return Ok(false);
    }
    fs::remove_dir(path).map_err(|e| SyncError::remove(path, e))?;
    trace!(path = %path, "Pruned empty directory");
    Ok(true)
}

/// Replaces `to` with a copy of `from`.
///
/// The bytes land in a temporary sibling that is then renamed over `to`;
/// the existing destination entry is never opened for writing.
fn copy_file(
    from: &Utf8Path,
    to: &Utf8Path,
    modified: Option<SystemTime>,
) -> Result<(), SyncError> {
    let parent = to.parent().unwrap_or(Utf8Path::new("."));
    fs::create_dir_all(parent).map_err(|e| SyncError::create_dir(parent, e))?;

    let mut source = fs::File::open(from).map_err(|e| SyncError::copy(from, to, e))?;
    let permissions = source
        .metadata()
        .map_err(|e| SyncError::copy(from, to, e))?
        .permissions();

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| SyncError::copy(from, to, e))?;
    io::copy(&mut source, staged.as_file_mut()).map_err(|e| SyncError::copy(from, to, e))?;
    if let Some(modified) = modified {
        staged
            .as_file()
            .set_modified(modified)
            .map_err(|e| SyncError::stamp(to, e))?;
    }
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(|e| SyncError::copy(from, to, e))?;
    staged
        .persist(to)
        .map_err(|e| SyncError::copy(from, to, e.error))?;

    trace!(from = %from, to = %to, "Copied file");
    Ok(())
}
