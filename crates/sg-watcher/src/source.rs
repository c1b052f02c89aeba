//! The seam between change producers and the watch loop.

use sg_core::{Site, WatchedRole};
use smallvec::SmallVec;
use tokio::sync::mpsc;

use crate::error::WatchError;
use crate::events::WatchSignal;
use crate::registry::{NoopRegistrar, RoleRegistry};

/// A stream of watch signals plus control over per-role registrations.
///
/// [`SiteWatcher`](crate::SiteWatcher) is the production source.
/// [`ChannelSource`] is fed by hand.
pub trait WatchSource: Send {
    /// The signal stream. Yields `None` once the producer is gone.
    fn events(&mut self) -> &mut mpsc::Receiver<WatchSignal>;

    /// Re-checks the registration of `role` after it produced signals.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::DirectoryGone`] when the role directory
    /// disappeared and its watch was dropped.
    fn rearm(&mut self, role: WatchedRole) -> Result<(), WatchError>;

    /// Roles currently watched.
    fn watched_roles(&self) -> SmallVec<[WatchedRole; 6]>;
}

/// A source fed through an [`mpsc::Sender`] instead of the filesystem.
///
/// Registration state is still tracked against the real directories, so a
/// role whose directory is removed is dropped the same way.
#[derive(Debug)]
pub struct ChannelSource {
    registry: RoleRegistry,
    events: mpsc::Receiver<WatchSignal>,
}

impl ChannelSource {
    /// Creates a source and the sender that feeds it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathNotFound`] if the source root is gone.
    pub fn new(
        site: &Site,
        capacity: usize,
    ) -> Result<(Self, mpsc::Sender<WatchSignal>), WatchError> {
        let (tx, events) = mpsc::channel(capacity.max(1));
        let registry = RoleRegistry::register_all(site, &mut NoopRegistrar)?;
        Ok((Self { registry, events }, tx))
    }
}

impl WatchSource for ChannelSource {
    fn events(&mut self) -> &mut mpsc::Receiver<WatchSignal> {
        &mut self.events
    }

    fn rearm(&mut self, role: WatchedRole) -> Result<(), WatchError> {
        self.registry.rearm(role, &mut NoopRegistrar)
    }

    fn watched_roles(&self) -> SmallVec<[WatchedRole; 6]> {
        self.registry.watched_roles()
    }
}
