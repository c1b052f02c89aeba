//! Change routing, the watch loop, and the site generator.
//!
//! This crate ties the workspace together:
//!
//! - [`SiteBuilder`] owns the page builder and the synchronizer and executes
//!   one [`Dispatch`] at a time
//! - [`ChangeRouter`] turns a [`ChangeBatch`](sg_watcher::ChangeBatch) into
//!   deduplicated dispatches by role
//! - [`WatchLoop`] waits for batches, dispatches on the blocking pool, and
//!   re-arms roles
//! - [`SiteGenerator`] offers the one-shot and continuous modes
//!
//! # Data Flow
//!
//! ```text
//! SiteWatcher ──► WatchLoop ──► ChangeRouter ──► Dispatch
//!                                                   │
//!                    ┌──────────────────────────────┼───────────────────┐
//!                    ▼                              ▼                   ▼
//!             PageBuilder::rebuild     DirectorySynchronizer::sync   generate()
//!             (RebuildPages)           (SyncAssets(role))            (FullResync)
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use sg_core::Config;
//! use sg_site::SiteGenerator;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), sg_site::SiteError> {
//! let generator = SiteGenerator::new(Config::default())?;
//! let cancel = CancellationToken::new();
//! let (outcome, stats) = generator.generate_on_file_change(&cancel).await?;
//! println!("{outcome:?}: {stats}");
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod generator;
pub mod router;
pub mod watch_loop;

pub use builder::{AssetReports, DispatchReport, GenerateReport, SiteBuilder};
pub use error::SiteError;
pub use generator::SiteGenerator;
pub use router::{ChangeRouter, Dispatch};
pub use watch_loop::{LoopOutcome, LoopStats, WatchLoop};
