//! Per-role watch registrations.
//!
//! Each [`WatchedRole`] gets one registration on its directory. A role whose
//! directory is missing at startup stays [`Missing`](RoleState::Missing) and
//! is registered later if the directory appears. A role whose directory
//! disappears after registration is [`Dropped`](RoleState::Dropped) for good.
//!
//! ```text
//!            dir exists                dir gone
//!   Missing ───────────► Watching ───────────► Dropped
//!      ▲  │ (rearm)                  (rearm)
//!      └──┘ still missing
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use sg_core::{FxHashMap, Site, WatchedRole};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::error::WatchError;

/// Registration state of one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleState {
    /// The role directory is watched.
    Watching,
    /// The directory did not exist when last checked.
    Missing,
    /// The directory disappeared after being watched; never retried.
    Dropped,
}

/// The backend that installs and removes directory watches.
pub trait Registrar {
    /// Starts watching `dir`.
    fn watch(&mut self, dir: &Utf8Path, recursive: bool) -> Result<(), WatchError>;

    /// Stops watching `dir`. Failures are ignored: the directory is usually
    /// gone already.
    fn unwatch(&mut self, dir: &Utf8Path);
}

impl Registrar for RecommendedWatcher {
    fn watch(&mut self, dir: &Utf8Path, recursive: bool) -> Result<(), WatchError> {
        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        Watcher::watch(self, dir.as_std_path(), mode)?;
        Ok(())
    }

    fn unwatch(&mut self, dir: &Utf8Path) {
        if let Err(error) = Watcher::unwatch(self, dir.as_std_path()) {
            debug!(path = %dir, error = %error, "Unwatch failed");
        }
    }
}

/// A registrar that installs nothing, for sources fed by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRegistrar;

impl Registrar for NoopRegistrar {
    fn watch(&mut self, _dir: &Utf8Path, _recursive: bool) -> Result<(), WatchError> {
        Ok(())
    }

    fn unwatch(&mut self, _dir: &Utf8Path) {}
}

/// Tracks the registration state of every role of a site.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    dirs: FxHashMap<WatchedRole, Utf8PathBuf>,
    states: FxHashMap<WatchedRole, RoleState>,
}

impl RoleRegistry {
    /// Registers one watch per role: the source root flat, the role
    /// subdirectories recursively.
    ///
    /// Missing subdirectories, and subdirectories the backend refuses, are
    /// reported and left [`Missing`](RoleState::Missing).
    ///
    /// # Errors
    ///
    /// Fails only if the source root itself cannot be watched.
    pub fn register_all<R: Registrar>(
        site: &Site,
        registrar: &mut R,
    ) -> Result<Self, WatchError> {
        let mut registry = Self {
            dirs: WatchedRole::ALL
                .into_iter()
                .map(|role| (role, site.role_dir(role)))
                .collect(),
            states: FxHashMap::default(),
        };

        for role in WatchedRole::ALL {
            let dir = registry.dir(role).to_owned();
            let state = if !dir.is_dir() {
                if role == WatchedRole::Pages {
                    return Err(WatchError::path_not_found(dir));
                }
                warn!(role = %role, path = %dir, "Directory missing, not watching it");
                RoleState::Missing
            } else {
                match registrar.watch(&dir, role.is_recursive()) {
                    Ok(()) => {
                        debug!(role = %role, path = %dir, "Watching");
                        RoleState::Watching
                    }
                    Err(error) if role == WatchedRole::Pages => return Err(error),
                    Err(error) => {
                        warn!(
                            role = %role,
                            path = %dir,
                            error = %error,
                            "Failed to watch directory"
                        );
                        RoleState::Missing
                    }
                }
            };
            registry.states.insert(role, state);
        }

        Ok(registry)
    }

    /// The directory bound to `role`.
    #[must_use]
    pub fn dir(&self, role: WatchedRole) -> &Utf8Path {
        self.dirs.get(&role).map_or(Utf8Path::new(""), Utf8PathBuf::as_path)
    }

    /// The state of `role`.
    #[must_use]
    pub fn state(&self, role: WatchedRole) -> RoleState {
        self.states.get(&role).copied().unwrap_or(RoleState::Missing)
    }

    /// Roles currently watched, in registration order.
    #[must_use]
    pub fn watched_roles(&self) -> SmallVec<[WatchedRole; 6]> {
        WatchedRole::ALL
            .into_iter()
            .filter(|role| self.state(*role) == RoleState::Watching)
            .collect()
    }

    /// Re-checks `role` after it produced events.
    ///
    /// A watched role whose directory is gone is unwatched and dropped. A
    /// missing role whose directory now exists is registered.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::DirectoryGone`] when the role was just dropped,
    /// or the backend error when a newly appeared directory cannot be watched.
    pub fn rearm<R: Registrar>(
        &mut self,
        role: WatchedRole,
        registrar: &mut R,
    ) -> Result<(), WatchError> {
        let dir = self.dir(role).to_owned();
        match self.state(role) {
            RoleState::Dropped => Ok(()),
            RoleState::Watching if dir.is_dir() => Ok(()),
            RoleState::Watching => {
                registrar.unwatch(&dir);
                self.states.insert(role, RoleState::Dropped);
                Err(WatchError::DirectoryGone { role, path: dir })
            }
            RoleState::Missing if dir.is_dir() => {
                registrar.watch(&dir, role.is_recursive())?;
                self.states.insert(role, RoleState::Watching);
                info!(role = %role, path = %dir, "Directory appeared, now watching it");
                Ok(())
            }
            RoleState::Missing => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Records calls instead of watching.
    #[derive(Default)]
    struct Recorder {
        watched: Vec<(Utf8PathBuf, bool)>,
        unwatched: Vec<Utf8PathBuf>,
        refuse: Option<&'static str>,
    }

    impl Registrar for Recorder {
        fn watch(&mut self, dir: &Utf8Path, recursive: bool) -> Result<(), WatchError> {
            if self.refuse.is_some_and(|name| dir.ends_with(name)) {
                return Err(WatchError::path_not_found(dir));
            }
            self.watched.push((dir.to_owned(), recursive));
            Ok(())
        }

        fn unwatch(&mut self, dir: &Utf8Path) {
            self.unwatched.push(dir.to_owned());
        }
    }

    fn site_with(dirs: &[&str]) -> (TempDir, Site) {
        let source = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(source.path().to_path_buf()).unwrap();
        for dir in dirs {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
        let site = Site::new(root.clone(), root.join("_site")).unwrap();
        (source, site)
    }

    #[test]
    fn test_register_all_modes() {
        let (_temp, site) = site_with(&["_layouts", "_partials", "css", "js", "img"]);
        let mut recorder = Recorder::default();

        let registry = RoleRegistry::register_all(&site, &mut recorder).unwrap();

        assert_eq!(registry.watched_roles().len(), 6);
        assert_eq!(recorder.watched[0], (site.source_root().to_owned(), false));
        assert!(recorder.watched[1..].iter().all(|(_, recursive)| *recursive));
    }

    #[test]
    fn test_missing_dirs_are_not_fatal() {
        let (_temp, site) = site_with(&["css"]);
        let mut recorder = Recorder::default();

        let registry = RoleRegistry::register_all(&site, &mut recorder).unwrap();

        assert_eq!(
            registry.watched_roles().as_slice(),
            [WatchedRole::Pages, WatchedRole::Css]
        );
        assert_eq!(registry.state(WatchedRole::Img), RoleState::Missing);
    }

    #[test]
    fn test_refused_subdirectory_degrades_to_missing() {
        let (_temp, site) = site_with(&["js"]);
        let mut recorder = Recorder {
            refuse: Some("js"),
            ..Recorder::default()
        };

        let registry = RoleRegistry::register_all(&site, &mut recorder).unwrap();
        assert_eq!(registry.state(WatchedRole::Js), RoleState::Missing);
    }

    #[test]
    fn test_rearm_drops_gone_directory_once() {
        let (_temp, site) = site_with(&["img"]);
        let mut recorder = Recorder::default();
        let mut registry = RoleRegistry::register_all(&site, &mut recorder).unwrap();

        std::fs::remove_dir(site.role_dir(WatchedRole::Img)).unwrap();
        let err = registry.rearm(WatchedRole::Img, &mut recorder).unwrap_err();
        assert!(matches!(err, WatchError::DirectoryGone { role: WatchedRole::Img, .. }));
        assert_eq!(registry.state(WatchedRole::Img), RoleState::Dropped);
        assert_eq!(recorder.unwatched.len(), 1);

        // Dropped roles are never re-registered, even if the directory returns
        std::fs::create_dir(site.role_dir(WatchedRole::Img)).unwrap();
        registry.rearm(WatchedRole::Img, &mut recorder).unwrap();
        assert_eq!(registry.state(WatchedRole::Img), RoleState::Dropped);
    }

    #[test]
    fn test_rearm_registers_appeared_directory() {
        let (_temp, site) = site_with(&[]);
        let mut recorder = Recorder::default();
        let mut registry = RoleRegistry::register_all(&site, &mut recorder).unwrap();
        assert_eq!(registry.state(WatchedRole::Css), RoleState::Missing);

        std::fs::create_dir(site.role_dir(WatchedRole::Css)).unwrap();
        registry.rearm(WatchedRole::Css, &mut recorder).unwrap();

        assert_eq!(registry.state(WatchedRole::Css), RoleState::Watching);
        assert_eq!(recorder.watched.last().unwrap().0, site.role_dir(WatchedRole::Css));
    }
}
