//! Maps a batch of watch signals to rebuild actions.
//!
//! ```text
//! Change(Pages | Layouts | Partials) ──► RebuildPages
//! Change(Css)                        ──► SyncAssets(Css)
//! Change(Js)                         ──► SyncAssets(Js)
//! Change(Img)                        ──► SyncAssets(Img)
//! Overflow                           ──► (ignored) | FullResync
//! ```

use std::fmt;

use sg_core::{OverflowPolicy, WatchedRole};
use sg_watcher::{ChangeBatch, WatchSignal};
use smallvec::SmallVec;

/// One rebuild action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dispatch {
    /// Invalidate the render cache and render every page.
    RebuildPages,
    /// Resynchronize one asset directory.
    SyncAssets(WatchedRole),
    /// Rebuild pages and resynchronize every asset directory.
    FullResync,
}

impl Dispatch {
    /// The dispatch a change in `role` calls for.
    #[inline]
    #[must_use]
    pub const fn for_role(role: WatchedRole) -> Self {
        match role {
            WatchedRole::Pages | WatchedRole::Layouts | WatchedRole::Partials => {
                Self::RebuildPages
            }
            WatchedRole::Css | WatchedRole::Js | WatchedRole::Img => Self::SyncAssets(role),
        }
    }
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RebuildPages => f.write_str("rebuild pages"),
            Self::SyncAssets(role) => write!(f, "sync {role}"),
            Self::FullResync => f.write_str("full resync"),
        }
    }
}

/// Routes change batches according to the overflow policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeRouter {
    on_overflow: OverflowPolicy,
}

impl ChangeRouter {
    /// Creates a router.
    #[must_use]
    pub const fn new(on_overflow: OverflowPolicy) -> Self {
        Self { on_overflow }
    }

    /// The overflow policy.
    #[must_use]
    pub const fn on_overflow(&self) -> OverflowPolicy {
        self.on_overflow
    }

    /// The deduplicated dispatches for `batch`, in first-seen order.
    ///
    /// A full resync covers every other action, so a batch that calls for
    /// one yields only that.
    #[must_use]
    pub fn route(&self, batch: &ChangeBatch) -> SmallVec<[Dispatch; 4]> {
        let mut dispatches = SmallVec::new();
        for signal in batch {
            let dispatch = match signal {
                WatchSignal::Change(event) => Dispatch::for_role(event.role),
                WatchSignal::Overflow { .. } => match self.on_overflow {
                    OverflowPolicy::Ignore => continue,
                    OverflowPolicy::FullResync => {
                        dispatches.clear();
                        dispatches.push(Dispatch::FullResync);
                        return dispatches;
                    }
                },
            };
            if !dispatches.contains(&dispatch) {
                dispatches.push(dispatch);
            }
        }
        dispatches
    }
}
