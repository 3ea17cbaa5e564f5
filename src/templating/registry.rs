//! Partial resolution and the in-process partial registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Locals;
use crate::builder::JsonBuilder;
use crate::core::error::find_similar;
use crate::core::{JstreamerError, Result};

/// A partial template program.
///
/// Rendering runs the program as a builder block against a scope the caller
/// has already opened, with `locals` bound.
pub trait PartialTemplate: Send + Sync {
    fn render(&self, json: &mut JsonBuilder<'_>, locals: &Locals) -> Result<()>;
}

impl<F> PartialTemplate for F
where
    F: Fn(&mut JsonBuilder<'_>, &Locals) -> Result<()> + Send + Sync,
{
    fn render(&self, json: &mut JsonBuilder<'_>, locals: &Locals) -> Result<()> {
        self(json, locals)
    }
}

/// Turns a partial name into its template program.
///
/// Hosts with their own template storage implement this; [`PartialRegistry`]
/// is the bundled in-memory implementation.
pub trait PartialResolver: Send + Sync {
    /// # Errors
    ///
    /// [`JstreamerError::PartialNotFound`] when no template has this name.
    fn resolve(&self, name: &str) -> Result<Arc<dyn PartialTemplate>>;
}

/// Partials registered by name.
///
/// Names follow the file convention of partial templates: a leading
/// underscore on the last path segment is optional, so `posts/_summary` and
/// `posts/summary` name the same partial.
#[derive(Clone, Default)]
pub struct PartialRegistry {
    templates: HashMap<String, Arc<dyn PartialTemplate>>,
}

impl PartialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure as partial `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, template: F) -> &mut Self
    where
        F: Fn(&mut JsonBuilder<'_>, &Locals) -> Result<()> + Send + Sync + 'static,
    {
        self.register_template(name, Arc::new(template))
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: &str, template: F) -> Self
    where
        F: Fn(&mut JsonBuilder<'_>, &Locals) -> Result<()> + Send + Sync + 'static,
    {
        self.register(name, template);
        self
    }

    /// Register an already boxed template program.
    pub fn register_template(
        &mut self,
        name: &str,
        template: Arc<dyn PartialTemplate>,
    ) -> &mut Self {
        let name = normalize_partial_name(name);
        tracing::debug!("Registered partial '{}'", name);
        self.templates.insert(name, template);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(&normalize_partial_name(name))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered names, normalized.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl PartialResolver for PartialRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn PartialTemplate>> {
        let normalized = normalize_partial_name(name);
        self.templates.get(&normalized).cloned().ok_or_else(|| JstreamerError::PartialNotFound {
            name: name.to_string(),
            suggestions: find_similar(&normalized, self.names()),
        })
    }
}

impl fmt::Debug for PartialRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("PartialRegistry").field("partials", &names).finish()
    }
}

/// Strip the optional leading underscore of the last path segment.
fn normalize_partial_name(name: &str) -> String {
    match name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/{}", dir, file.strip_prefix('_').unwrap_or(file)),
        None => name.strip_prefix('_').unwrap_or(name).to_string(),
    }
}
