//! Summary of one synchronization run.

use std::fmt;
use std::time::Duration;

/// What a call to [`DirectorySynchronizer::sync`](crate::DirectorySynchronizer::sync)
/// did.
///
/// # Examples
///
/// ```
/// use sg_sync::SyncReport;
///
/// let report = SyncReport::default();
/// assert!(report.is_noop());
/// assert_eq!(report.total_files(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files copied into the destination.
    pub copied: usize,
    /// Orphaned destination files deleted.
    pub deleted: usize,
    /// Files already up to date.
    pub unchanged: usize,
    /// Emptied destination directories removed.
    pub directories_removed: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl SyncReport {
    /// Returns `true` if the run changed nothing in the destination.
    #[inline]
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.copied == 0 && self.deleted == 0 && self.directories_removed == 0
    }

    /// Number of files present in the source after the run.
    #[inline]
    #[must_use]
    pub const fn total_files(&self) -> usize {
        self.copied + self.unchanged
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} copied, {} deleted, {} unchanged, {} directories removed in {:.1?}",
            self.copied, self.deleted, self.unchanged, self.directories_removed, self.elapsed
        )
    }
}
