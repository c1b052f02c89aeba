//! Core types, configuration, and errors for sitegen.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Site`] - the validated pair of source and destination roots
//! - [`WatchedRole`] - the fixed classification of source directories
//! - [`Config`] and its sections for build, watch, and sync behavior
//! - [`ConfigError`] for configuration and startup failures
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)
//! - [`paths`] helpers for joining path segments
//!
//! # Crate Dependencies
//!
//! ```text
//! sg-cli ──► sg-site ──► sg-pages ───► sg-core
//!                    ├─► sg-sync ────►
//!                    └─► sg-watcher ─►
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod paths;
pub mod role;
pub mod site;

pub use config::{
    BuildConfig, Config, ErrorPolicy, OverflowPolicy, SiteConfig, SyncConfig, WatchConfig,
};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet};
pub use role::WatchedRole;
pub use site::Site;
