//! The rendering engine interface and its minijinja implementation.

use std::fs;

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use tracing::trace;

use crate::error::PageError;
use crate::resolver::{TemplateHandle, TemplateResolver};

/// Variables available to a template while it renders.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// A template engine with an explicit render cache.
///
/// Implementations may cache compiled templates between renders. The cache
/// must stay valid until [`invalidate_cache`](Self::invalidate_cache) is
/// called; after that, the next render observes the files on disk.
pub trait TemplateEngine: Send {
    /// Finds the template for `name`.
    fn resolve(&self, name: &str) -> Result<TemplateHandle, PageError>;

    /// Renders a resolved template with `context`.
    fn render(&self, template: &TemplateHandle, context: &Context) -> Result<String, PageError>;

    /// Drops every cached template.
    fn invalidate_cache(&mut self);
}

/// A [`TemplateEngine`] backed by a [`minijinja::Environment`].
///
/// Templates are loaded lazily through a [`TemplateResolver`], so
/// `{% extends %}`, `{% include %}` and `{% import %}` see the same
/// root → `_partials` → `_layouts` lookup as the page builder. Loaded
/// templates stay in the environment until the cache is invalidated.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    resolver: TemplateResolver,
}

impl MiniJinjaEngine {
    /// Creates an engine loading templates through `resolver`.
    ///
    /// With `strict_undefined`, referencing an undefined variable is a render
    /// error instead of an empty string.
    #[must_use]
    pub fn new(resolver: TemplateResolver, strict_undefined: bool) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        // Output is emitted verbatim, no HTML escaping.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        if strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }

        let loader = resolver.clone();
        env.set_loader(move |name| load_source(&loader, name));

        Self { env, resolver }
    }

    /// The resolver used for lookups.
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }
}

impl std::fmt::Debug for MiniJinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniJinjaEngine")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn resolve(&self, name: &str) -> Result<TemplateHandle, PageError> {
        self.resolver.resolve(name)
    }

    fn render(&self, template: &TemplateHandle, context: &Context) -> Result<String, PageError> {
        let compiled = self
            .env
            .get_template(template.name())
            .map_err(|e| PageError::render(template.name(), e))?;
        compiled
            .render(context)
            .map_err(|e| PageError::render(template.name(), e))
    }

    fn invalidate_cache(&mut self) {
        trace!("Clearing template cache");
        self.env.clear_templates();
    }
}

fn load_source(
    resolver: &TemplateResolver,
    name: &str,
) -> Result<Option<String>, minijinja::Error> {
    let Some(handle) = resolver.find(name) else {
        return Ok(None);
    };
    trace!(name, tier = %handle.tier(), path = %handle.path(), "Loading template");
    fs::read_to_string(handle.path()).map(Some).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("failed to read template {}", handle.path()),
        )
        .with_source(e)
    })
}
