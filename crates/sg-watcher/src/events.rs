//! Event types for change notifications.
//!
//! # Event Flow
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//! notify backend thread
//!        │  classify path by role, filter noise
//!        ▼
//!   WatchSignal::Change(ChangeEvent)   or   WatchSignal::Overflow
//!        │
//!        ▼
//!   bounded mpsc channel ──► watch loop drains a ChangeBatch
//! ```

use std::time::Instant;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use sg_core::WatchedRole;
use smallvec::SmallVec;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The path appeared (created or renamed into place).
    Created,
    /// The contents or metadata changed.
    Modified,
    /// The path disappeared (deleted or renamed away).
    Deleted,
}

/// A change to one path inside a watched role directory.
///
/// # Examples
///
/// ```
/// use sg_watcher::{ChangeEvent, ChangeKind};
/// use sg_core::WatchedRole;
/// use camino::Utf8PathBuf;
///
/// let event = ChangeEvent::new(WatchedRole::Css, ChangeKind::Modified, Utf8PathBuf::from("www/css/site.css"));
/// assert_eq!(event.file_name(), Some("site.css"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The role of the directory the path belongs to.
    pub role: WatchedRole,

    /// What happened.
    pub kind: ChangeKind,

    /// The absolute path that changed.
    pub path: Utf8PathBuf,

    /// When the event was received.
    ///
    /// Uses [`Instant`] for monotonic timing, suitable for measuring
    /// elapsed time but not for wall-clock display.
    pub timestamp: Instant,
}

impl ChangeEvent {
    /// Creates an event stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new(role: WatchedRole, kind: ChangeKind, path: Utf8PathBuf) -> Self {
        Self::with_timestamp(role, kind, path, Instant::now())
    }

    /// Creates an event with a specific timestamp.
    #[inline]
    #[must_use]
    pub const fn with_timestamp(
        role: WatchedRole,
        kind: ChangeKind,
        path: Utf8PathBuf,
        timestamp: Instant,
    ) -> Self {
        Self {
            role,
            kind,
            path,
            timestamp,
        }
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// What the watch subsystem delivers to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSignal {
    /// A classified, filtered change.
    Change(ChangeEvent),

    /// Events were lost: the queue was full or the backend asked for a
    /// rescan. `role` is set when the loss is known to concern one role.
    Overflow {
        /// The affected role, if known.
        role: Option<WatchedRole>,
    },
}

impl WatchSignal {
    /// The role this signal concerns, if any.
    #[inline]
    #[must_use]
    pub const fn role(&self) -> Option<WatchedRole> {
        match self {
            Self::Change(event) => Some(event.role),
            Self::Overflow { role } => *role,
        }
    }

    /// Returns `true` for overflow markers.
    #[inline]
    #[must_use]
    pub const fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }
}

impl From<ChangeEvent> for WatchSignal {
    fn from(event: ChangeEvent) -> Self {
        Self::Change(event)
    }
}

/// The signals drained in one wake-up of the watch loop.
///
/// Uses [`SmallVec`] with inline storage for up to 8 signals, avoiding heap
/// allocation in the common case of a single save.
///
/// # Examples
///
/// ```
/// use sg_watcher::{ChangeBatch, ChangeEvent, ChangeKind, WatchSignal};
/// use sg_core::WatchedRole;
/// use camino::Utf8PathBuf;
///
/// let mut batch = ChangeBatch::new();
/// batch.push(ChangeEvent::new(WatchedRole::Js, ChangeKind::Created, Utf8PathBuf::from("www/js/a.js")).into());
/// batch.push(WatchSignal::Overflow { role: None });
///
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.overflow_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ChangeBatch {
    /// The signals in delivery order.
    pub signals: SmallVec<[WatchSignal; 8]>,

    /// When the first signal of the batch arrived.
    pub received_at: Instant,
}

impl ChangeBatch {
    /// Creates a new empty batch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            signals: SmallVec::new(),
            received_at: Instant::now(),
        }
    }

    /// Creates a batch from signals.
    #[inline]
    #[must_use]
    pub fn from_signals(signals: impl IntoIterator<Item = WatchSignal>) -> Self {
        Self {
            signals: signals.into_iter().collect(),
            received_at: Instant::now(),
        }
    }

    /// Adds a signal to the batch.
    #[inline]
    pub fn push(&mut self, signal: WatchSignal) {
        self.signals.push(signal);
    }

    /// Returns the number of signals in this batch.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Returns `true` if the batch contains no signals.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Returns an iterator over the signals.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &WatchSignal> {
        self.signals.iter()
    }

    /// Returns an iterator over the change events only.
    pub fn changes(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.signals.iter().filter_map(|signal| match signal {
            WatchSignal::Change(event) => Some(event),
            WatchSignal::Overflow { .. } => None,
        })
    }

    /// Number of overflow markers.
    #[must_use]
    pub fn overflow_count(&self) -> usize {
        self.signals.iter().filter(|s| s.is_overflow()).count()
    }

    /// The roles mentioned in the batch, deduplicated in first-seen order.
    #[must_use]
    pub fn roles(&self) -> SmallVec<[WatchedRole; 6]> {
        let mut roles = SmallVec::new();
        for role in self.signals.iter().filter_map(WatchSignal::role) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        roles
    }

    /// Returns the unique changed paths in this batch.
    #[must_use]
    pub fn unique_paths(&self) -> Vec<&Utf8PathBuf> {
        let mut paths: Vec<&Utf8PathBuf> = self.changes().map(|e| &e.path).collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

impl Default for ChangeBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for ChangeBatch {
    type Item = WatchSignal;
    type IntoIter = smallvec::IntoIter<[WatchSignal; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeBatch {
    type Item = &'a WatchSignal;
    type IntoIter = std::slice::Iter<'a, WatchSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}

impl FromIterator<WatchSignal> for ChangeBatch {
    fn from_iter<T: IntoIterator<Item = WatchSignal>>(iter: T) -> Self {
        Self::from_signals(iter)
    }
}

/// Summary statistics for a batch, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBatchStats {
    /// Total number of signals in the batch.
    pub total_signals: usize,

    /// Number of change events.
    pub changes: usize,

    /// Number of overflow markers.
    pub overflows: usize,

    /// Number of unique paths affected.
    pub unique_paths: usize,

    /// Roles mentioned, in first-seen order.
    pub roles: Vec<WatchedRole>,
}

impl EventBatchStats {
    /// Computes statistics for a batch.
    #[must_use]
    pub fn from_batch(batch: &ChangeBatch) -> Self {
        Self {
            total_signals: batch.len(),
            changes: batch.changes().count(),
            overflows: batch.overflow_count(),
            unique_paths: batch.unique_paths().len(),
            roles: batch.roles().into_vec(),
        }
    }
}
