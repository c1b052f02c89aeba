//! Per-role filesystem watching with async event streaming.
//!
//! This crate watches the directories of a [`Site`](sg_core::Site), one
//! registration per [`WatchedRole`](sg_core::WatchedRole), and streams
//! classified changes to an async consumer.
//!
//! # Overview
//!
//! - The source root is watched flat, every role subdirectory recursively
//! - Each change is classified by role and filtered on the backend thread
//! - Signals travel over a bounded channel; a full channel produces an
//!   [`Overflow`](WatchSignal::Overflow) marker instead of blocking silently
//! - Role directories that vanish are dropped, the rest keep being watched
//!
//! # Architecture
//!
//! ```text
//! RecommendedWatcher ──► Forwarder ──► mpsc ──► WatchSource::events()
//!         ▲                                            │
//!         │            RoleRegistry::rearm(role) ◄─────┘ (after each batch)
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use sg_core::Site;
//! use sg_watcher::{SiteWatcher, WatchSource, site_filter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let site = Site::new("www", "_site")?;
//! let mut watcher = SiteWatcher::new(&site, site_filter(".html"))?;
//!
//! while let Some(signal) = watcher.events().recv().await {
//!     println!("{signal:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! ```
//! use sg_watcher::WatchError;
//!
//! fn handle_watch_error(err: WatchError) {
//!     if err.is_fatal() {
//!         eprintln!("Fatal watcher error: {err}");
//!     } else {
//!         eprintln!("Warning: {err}");
//!     }
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod filter;
pub mod registry;
pub mod source;
pub mod watcher;

// Re-export error types
pub use error::WatchError;

// Re-export event types
pub use events::{ChangeBatch, ChangeEvent, ChangeKind, EventBatchStats, WatchSignal};

// Re-export filter types
pub use filter::{
    AcceptAllFilter, CompositeFilter, EditorArtifactFilter, FileFilter, PageSuffixFilter,
    site_filter,
};

// Re-export registration and source types
pub use registry::{NoopRegistrar, Registrar, RoleRegistry, RoleState};
pub use source::{ChannelSource, WatchSource};
pub use watcher::{DEFAULT_CHANNEL_CAPACITY, SiteWatcher, translate};
