//! The diff between two tree snapshots.
//!
//! ```text
//!   source snapshot        destination snapshot
//!   ┌──────────────┐       ┌──────────────┐
//!   │ a.css  (3,t1)│       │ a.css  (3,t1)│   equal signature ─► unchanged
//!   │ b.css  (9,t2)│       │ b.css  (7,t0)│   signature differs ─► copy
//!   │ c.css  (1,t3)│       │              │   source only ─────► copy
//!   │              │       │ old/d.css    │   destination only ─► delete
//!   │              │       │ old/         │   dir not in source ► prune
//!   └──────────────┘       └──────────────┘
//! ```
//!
//! [`SyncPlan::diff`] is pure: it touches no files, so every decision can be
//! tested from hand-built snapshots.

use camino::Utf8PathBuf;

use crate::snapshot::TreeSnapshot;

/// The operations that make a destination tree equal to a source tree.
///
/// All paths are relative to the respective roots. Copies and deletes are
/// sorted; directories to prune are ordered deepest first so that a parent is
/// visited after its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    copies: Vec<Utf8PathBuf>,
    deletes: Vec<Utf8PathBuf>,
    prune_dirs: Vec<Utf8PathBuf>,
    unchanged: usize,
}

impl SyncPlan {
    /// Compares two snapshots.
    ///
    /// A file is copied when it is missing from the destination or when its
    /// length or modification time differs. A destination file absent from
    /// the source is deleted, and so is every destination entry that is
    /// neither a file nor a directory. A destination directory absent from
    /// the source is scheduled for pruning.
    #[must_use]
    pub fn diff(source: &TreeSnapshot, destination: &TreeSnapshot) -> Self {
        let mut plan = Self::default();

        for (relative, signature) in source.files() {
            match destination.files().get(relative) {
                Some(existing) if existing == signature => plan.unchanged += 1,
                _ => plan.copies.push(relative.clone()),
            }
        }

        plan.deletes = destination
            .files()
            .keys()
            .filter(|relative| !source.files().contains_key(*relative))
            .chain(destination.others())
            .cloned()
            .collect();

        plan.prune_dirs = destination
            .dirs()
            .iter()
            .filter(|relative| !source.dirs().contains(*relative))
            .cloned()
            .collect();

        plan.copies.sort_unstable();
        plan.deletes.sort_unstable();
        plan.prune_dirs.sort_unstable_by(|a, b| {
            let depth = |p: &Utf8PathBuf| p.components().count();
            depth(b).cmp(&depth(a)).then_with(|| a.cmp(b))
        });

        plan
    }

    /// Files to copy from source to destination.
    #[inline]
    #[must_use]
    pub fn copies(&self) -> &[Utf8PathBuf] {
        &self.copies
    }

    /// Destination files to delete.
    #[inline]
    #[must_use]
    pub fn deletes(&self) -> &[Utf8PathBuf] {
        &self.deletes
    }

    /// Destination directories to remove once empty, deepest first.
    #[inline]
    #[must_use]
    pub fn prune_dirs(&self) -> &[Utf8PathBuf] {
        &self.prune_dirs
    }

    /// Number of files already up to date.
    #[inline]
    #[must_use]
    pub const fn unchanged(&self) -> usize {
        self.unchanged
    }

    /// Returns `true` if applying the plan would touch nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty() && self.deletes.is_empty() && self.prune_dirs.is_empty()
    }
}
