//! Page rendering for sitegen.
//!
//! This crate turns the top-level template files of a source directory into
//! output pages. Rendering itself is delegated to a [`TemplateEngine`]; the
//! bundled [`MiniJinjaEngine`] is backed by `minijinja`.
//!
//! # Overview
//!
//! - [`PageBuilder`]: discovers pages, renders them, writes the output, and
//!   owns the engine's render cache
//! - [`TemplateEngine`]: resolve / render / invalidate interface
//! - [`TemplateResolver`]: three-tier lookup (root, `_partials/`, `_layouts/`)
//! - [`BuildReport`]: pages written and failures collected
//!
//! # Template Lookup
//!
//! ```text
//! name ──normalize──► "base.html"
//!                        │
//!        ┌───────────────┼────────────────┐
//!        ▼               ▼                ▼
//!   <root>/base.html  _partials/base.html  _layouts/base.html
//!        first regular file found wins
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use sg_pages::PageBuilder;
//! use sg_core::BuildConfig;
//! use camino::Utf8Path;
//!
//! let builder = PageBuilder::for_source(Utf8Path::new("www"), &BuildConfig::default());
//! let report = builder.build(Utf8Path::new("www"), Utf8Path::new("_site"))?;
//! assert!(report.is_success());
//! # Ok::<(), sg_pages::PageError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod builder;
pub mod engine;
pub mod error;
pub mod resolver;

pub use builder::{BuildReport, PageBuilder, PageFailure};
pub use engine::{Context, MiniJinjaEngine, TemplateEngine};
pub use error::PageError;
pub use resolver::{TemplateHandle, TemplateResolver, TemplateTier};
