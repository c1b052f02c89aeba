//! Configuration structures for sitegen.
//!
//! This module provides configuration types for all components:
//!
//! - [`SiteConfig`] - Source and destination roots
//! - [`BuildConfig`] - Page rendering (template suffix, error policy, context)
//! - [`WatchConfig`] - Watch loop settings (debouncing, overflow handling)
//! - [`SyncConfig`] - Directory synchronization settings
//! - [`Config`] - Root configuration combining all settings
//!
//! Every section implements [`Default`] and is `#[serde(default)]`, so a
//! configuration file only needs the keys it changes.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the page builder does when one page fails to render or write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first failing page and return its error.
    #[default]
    Abort,
    /// Log the failure, keep rendering the remaining pages, and report all
    /// failures at the end.
    Continue,
}

/// What the watch loop does when the event queue overflows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Log and drop the overflow marker; some incremental updates may be missed.
    #[default]
    Ignore,
    /// Rebuild all pages and resynchronize every asset directory.
    FullResync,
}

/// Source and destination roots.
///
/// # Examples
///
/// ```
/// use sg_core::SiteConfig;
///
/// let config = SiteConfig::default();
/// assert_eq!(config.source, ".");
/// assert_eq!(config.destination, "_site");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding templates and static assets.
    pub source: Utf8PathBuf,

    /// Directory receiving rendered pages and mirrored assets.
    pub destination: Utf8PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: Utf8PathBuf::from("."),
            destination: Utf8PathBuf::from("_site"),
        }
    }
}

/// Configuration for page rendering.
///
/// # Examples
///
/// ```
/// use sg_core::{BuildConfig, ErrorPolicy};
///
/// let config = BuildConfig::default();
/// assert_eq!(config.template_suffix, ".html");
/// assert_eq!(config.on_error, ErrorPolicy::Abort);
/// assert!(config.variables.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// File name suffix identifying templates, including the leading dot.
    pub template_suffix: String,

    /// Behavior when a single page fails.
    pub on_error: ErrorPolicy,

    /// Treat undefined template variables as render errors.
    pub strict_undefined: bool,

    /// Variables available to every page. Empty by default.
    pub variables: serde_json::Map<String, serde_json::Value>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            template_suffix: ".html".to_owned(),
            on_error: ErrorPolicy::Abort,
            strict_undefined: false,
            variables: serde_json::Map::new(),
        }
    }
}

/// Configuration for the watch loop.
///
/// # Examples
///
/// ```
/// use sg_core::{OverflowPolicy, WatchConfig};
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 100);
/// assert_eq!(config.on_overflow, OverflowPolicy::Ignore);
/// assert!(config.initial_build);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    ///
    /// Events arriving within this window after the first one are handled as
    /// a single batch.
    pub debounce_ms: u64,

    /// Reaction to event queue overflow.
    pub on_overflow: OverflowPolicy,

    /// Run a full build before entering the watch loop.
    pub initial_build: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            on_overflow: OverflowPolicy::Ignore,
            initial_build: true,
        }
    }
}

/// Configuration for directory synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether to follow symbolic links in the source tree.
    pub follow_links: bool,

    /// Copy changed files on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            parallel: true,
        }
    }
}

/// Root configuration for sitegen.
///
/// Loaded from a JSON file or constructed programmatically; command-line
/// flags are applied on top by the binary.
///
/// # Examples
///
/// ```
/// use sg_core::Config;
///
/// let config = Config::default();
/// config.validate().unwrap();
///
/// let json = serde_json::to_string_pretty(&config).unwrap();
/// assert!(json.contains("template_suffix"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source and destination roots.
    pub site: SiteConfig,

    /// Page rendering configuration.
    pub build: BuildConfig,

    /// Watch loop configuration.
    pub watch: WatchConfig,

    /// Directory synchronization configuration.
    pub sync: SyncConfig,
}

impl Config {
    /// Reads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it is not valid JSON for this schema, and
    /// [`ConfigError::InvalidOption`] if validation fails.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] naming the first bad option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let suffix = &self.build.template_suffix;
        if suffix.is_empty() {
            return Err(ConfigError::invalid_option(
                "build.template_suffix",
                "must not be empty",
            ));
        }
        if !suffix.starts_with('.') || suffix.len() < 2 {
            return Err(ConfigError::invalid_option(
                "build.template_suffix",
                format!("'{suffix}' must start with a dot followed by an extension"),
            ));
        }
        if suffix.contains(['/', '\\']) {
            return Err(ConfigError::invalid_option(
                "build.template_suffix",
                "must not contain path separators",
            ));
        }
        Ok(())
    }
}
