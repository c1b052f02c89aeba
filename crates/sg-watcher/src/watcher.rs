//! The notify-backed watch source.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 notify backend thread                        │
//! │  ┌────────────────────┐   ┌──────────────┐   ┌────────────┐  │
//! │  │ RecommendedWatcher │ → │ translate    │ → │ Forwarder  │  │
//! │  │ (one watch / role) │   │ (event kind) │   │ (classify, │  │
//! │  └────────────────────┘   └──────────────┘   │  filter)   │  │
//! │                                              └─────┬──────┘  │
//! └────────────────────────────────────────────────────│─────────┘
//!                                 try_send / overflow  │
//!                                                      ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 async runtime (tokio)                        │
//! │   SiteWatcher ── mpsc::Receiver<WatchSignal> ──► watch loop  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The channel is bounded. When it is full the change is dropped and an
//! [`Overflow`](WatchSignal::Overflow) marker is queued in its place, so the
//! loop learns that events were lost instead of silently missing them.

use std::path::Path;

use camino::Utf8Path;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher};
use sg_core::{Site, WatchedRole};
use smallvec::{SmallVec, smallvec};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace, warn};

use crate::error::WatchError;
use crate::events::{ChangeEvent, ChangeKind, WatchSignal};
use crate::filter::FileFilter;
use crate::registry::RoleRegistry;
use crate::source::WatchSource;

/// Default channel capacity for watch signals.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Maps a backend event to the changes it describes.
///
/// Access events carry no change and map to nothing. A rename with both ends
/// known becomes a deletion of the old path and a creation of the new one.
#[must_use]
pub fn translate(event: &Event) -> SmallVec<[(ChangeKind, &Path); 2]> {
    let kind = match event.kind {
        EventKind::Access(_) => return SmallVec::new(),
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            ChangeKind::Created
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            ChangeKind::Deleted
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            return match event.paths.as_slice() {
                [from, to, ..] => smallvec![
                    (ChangeKind::Deleted, from.as_path()),
                    (ChangeKind::Created, to.as_path()),
                ],
                paths => paths
                    .iter()
                    .map(|path| (ChangeKind::Modified, path.as_path()))
                    .collect(),
            };
        }
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => ChangeKind::Modified,
    };
    event
        .paths
        .iter()
        .map(|path| (kind, path.as_path()))
        .collect()
}

/// Classifies, filters, and queues backend events for one site.
///
/// Runs on the notify backend thread.
pub(crate) struct Forwarder<F> {
    site: Site,
    filter: F,
    tx: mpsc::Sender<WatchSignal>,
}

impl<F: FileFilter> Forwarder<F> {
    pub(crate) const fn new(site: Site, filter: F, tx: mpsc::Sender<WatchSignal>) -> Self {
        Self { site, filter, tx }
    }

    pub(crate) fn handle(&self, result: notify::Result<Event>) {
        match result {
            Ok(event) => self.forward(&event),
            Err(error) => warn!(error = %error, "Watch backend error"),
        }
    }

    fn forward(&self, event: &Event) {
        if event.need_rescan() {
            debug!("Backend requested a rescan");
            self.send(WatchSignal::Overflow { role: None });
        }

        for (kind, path) in translate(event) {
            let Some(path) = Utf8Path::from_path(path) else {
                warn!(path = %path.display(), "Skipping non-UTF-8 path in watch event");
                continue;
            };
            let Some(role) = self.site.classify(path) else {
                trace!(path = %path, "Change outside watched directories");
                continue;
            };
            if !self.filter.should_process(role, path) {
                trace!(role = %role, path = %path, "Filtered out change");
                continue;
            }
            if !self.send(ChangeEvent::new(role, kind, path.to_owned()).into()) {
                break;
            }
        }
    }

    /// Queues a signal, replacing it with an overflow marker if the queue is
    /// full. Returns `false` once the receiver is gone.
    fn send(&self, signal: WatchSignal) -> bool {
        match self.tx.try_send(signal) {
            Ok(()) => true,
            Err(TrySendError::Full(signal)) => {
                let role = signal.role();
                warn!(role = ?role, "Watch queue full, dropping change");
                self.tx.blocking_send(WatchSignal::Overflow { role }).is_ok()
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Watch channel closed");
                false
            }
        }
    }
}

/// Watches every role directory of a site and streams classified changes.
///
/// Dropping the watcher stops the backend and closes the stream.
pub struct SiteWatcher {
    watcher: RecommendedWatcher,
    registry: RoleRegistry,
    events: mpsc::Receiver<WatchSignal>,
}

impl std::fmt::Debug for SiteWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteWatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl SiteWatcher {
    /// Starts watching `site` with the default queue capacity.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Notify`] if the backend cannot start, or if the
    /// source root cannot be watched.
    pub fn new<F: FileFilter>(site: &Site, filter: F) -> Result<Self, WatchError> {
        Self::with_capacity(site, filter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Starts watching `site` with a queue holding at most `capacity`
    /// signals.
    ///
    /// # Errors
    ///
    /// See [`SiteWatcher::new`].
    pub fn with_capacity<F: FileFilter>(
        site: &Site,
        filter: F,
        capacity: usize,
    ) -> Result<Self, WatchError> {
        let (tx, events) = mpsc::channel(capacity.max(1));
        let forwarder = Forwarder::new(site.clone(), filter, tx);
        let mut watcher =
            notify::recommended_watcher(move |result| forwarder.handle(result))?;
        let registry = RoleRegistry::register_all(site, &mut watcher)?;

        tracing::info!(
            source = %site.source_root(),
            roles = registry.watched_roles().len(),
            "Site watcher started"
        );

        Ok(Self {
            watcher,
            registry,
            events,
        })
    }

    /// The role registry.
    #[must_use]
    pub const fn registry(&self) -> &RoleRegistry {
        &self.registry
    }
}

impl WatchSource for SiteWatcher {
    fn events(&mut self) -> &mut mpsc::Receiver<WatchSignal> {
        &mut self.events
    }

    fn rearm(&mut self, role: WatchedRole) -> Result<(), WatchError> {
        self.registry.rearm(role, &mut self.watcher)
    }

    fn watched_roles(&self) -> SmallVec<[WatchedRole; 6]> {
        self.registry.watched_roles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AcceptAllFilter, site_filter};
    use camino::Utf8PathBuf;
    use notify::event::{AccessKind, CreateKind, DataChange, Flag, RemoveKind};
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn site() -> (TempDir, Site) {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        std::fs::create_dir(root.join("css")).unwrap();
        let site = Site::new(root.clone(), root.join("_site")).unwrap();
        (temp, site)
    }

    fn event(kind: EventKind, paths: &[PathBuf]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(path.clone()))
    }

    fn drain(rx: &mut mpsc::Receiver<WatchSignal>) -> Vec<WatchSignal> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_translate_kinds() {
        let a = PathBuf::from("/a");
        let b = PathBuf::from("/b");

        let created = event(EventKind::Create(CreateKind::File), &[a.clone()]);
        assert_eq!(translate(&created).as_slice(), [(ChangeKind::Created, a.as_path())]);

        let removed = event(EventKind::Remove(RemoveKind::Any), &[a.clone()]);
        assert_eq!(translate(&removed)[0].0, ChangeKind::Deleted);

        let written = event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), &[a.clone()]);
        assert_eq!(translate(&written)[0].0, ChangeKind::Modified);

        let read = event(EventKind::Access(AccessKind::Any), &[a.clone()]);
        assert!(translate(&read).is_empty());

        let renamed = event(EventKind::Modify(ModifyKind::Name(RenameMode::Both)), &[a.clone(), b.clone()]);
        assert_eq!(
            translate(&renamed).as_slice(),
            [(ChangeKind::Deleted, a.as_path()), (ChangeKind::Created, b.as_path())]
        );
    }

    #[test]
    fn test_forwarder_classifies_and_filters() {
        let (_temp, site) = site();
        let root = site.source_root().to_owned();
        let (tx, mut rx) = mpsc::channel(16);
        let forwarder = Forwarder::new(site, site_filter(".html"), tx);

        forwarder.handle(Ok(event(
            EventKind::Create(CreateKind::File),
            &[
                root.join("index.html").into_std_path_buf(),
                root.join("notes.txt").into_std_path_buf(),
                root.join("css/site.css").into_std_path_buf(),
                root.join("css/.site.css.swp").into_std_path_buf(),
                root.join("drafts/x.html").into_std_path_buf(),
            ],
        )));

        let roles: Vec<_> = drain(&mut rx).iter().filter_map(WatchSignal::role).collect();
        assert_eq!(roles, [WatchedRole::Pages, WatchedRole::Css]);
    }

    #[test]
    fn test_forwarder_rescan_is_overflow() {
        let (_temp, site) = site();
        let (tx, mut rx) = mpsc::channel(4);
        let forwarder = Forwarder::new(site, AcceptAllFilter, tx);

        forwarder.handle(Ok(Event::new(EventKind::Other).set_flag(Flag::Rescan)));

        assert_eq!(drain(&mut rx), [WatchSignal::Overflow { role: None }]);
    }

    #[test]
    fn test_forwarder_full_queue_reports_overflow() {
        let (_temp, site) = site();
        let root = site.source_root().to_owned();
        let (tx, mut rx) = mpsc::channel(1);
        let forwarder = Forwarder::new(site, AcceptAllFilter, tx);

        let first = event(EventKind::Create(CreateKind::File), &[root.join("css/a.css").into()]);
        forwarder.handle(Ok(first));

        // The queue is full; the overflow marker waits for room
        let handle = std::thread::spawn(move || {
            let second = event(EventKind::Create(CreateKind::File), &[root.join("css/b.css").into()]);
            forwarder.handle(Ok(second));
        });
        let first = rx.blocking_recv().unwrap();
        handle.join().unwrap();
        let second = rx.blocking_recv().unwrap();

        assert!(matches!(first, WatchSignal::Change(ref e) if e.path.ends_with("a.css")));
        assert_eq!(second, WatchSignal::Overflow { role: Some(WatchedRole::Css) });
    }

    #[test]
    fn test_site_watcher_requires_watchable_root() {
        let (temp, site) = site();
        drop(temp);
        let err = SiteWatcher::new(&site, AcceptAllFilter).unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_site_watcher_receives_changes() {
        let (_temp, site) = site();
        let mut watcher = SiteWatcher::new(&site, site_filter(".html")).unwrap();
        assert_eq!(
            watcher.watched_roles().as_slice(),
            [WatchedRole::Pages, WatchedRole::Css]
        );

        // Backends may deliver the first write late; keep touching the file.
        let target = site.source_root().join("css/site.css");
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        let mut attempt = 0_u32;
        let received = loop {
            assert!(tokio::time::Instant::now() < deadline, "no css change observed");
            attempt += 1;
            std::fs::write(&target, format!("body {{}} /* {attempt} */")).unwrap();

            let wait = tokio::time::timeout(Duration::from_millis(500), watcher.events().recv());
            match wait.await {
                Ok(Some(WatchSignal::Change(change))) if change.role == WatchedRole::Css => {
                    break change;
                }
                Ok(Some(_)) | Err(_) => {}
                Ok(None) => panic!("watch channel closed"),
            }
        };

        assert_eq!(received.path, target);
        assert_ne!(received.kind, ChangeKind::Deleted);
    }
}
