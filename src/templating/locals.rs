//! Local bindings and call options for partial rendering.

use std::fmt;

use serde_json::{Map, Value};

use crate::core::{JstreamerError, Result};

/// Named values a partial is rendered with.
///
/// In collection mode the current element is bound under the `as` name,
/// alongside any other locals the caller passed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locals {
    values: Map<String, Value>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding, replacing any previous value under `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Like [`get`](Self::get), but a missing binding is an error.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::MissingLocal`] when nothing is bound under `name`.
    pub fn require(&self, name: &str) -> Result<&Value> {
        self.values.get(name).ok_or_else(|| JstreamerError::MissingLocal {
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Locals {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// The local name a collection element is bound to (the `as` option).
///
/// Built from `&str` or `String`; both resolve identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding(String);

impl Binding {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Binding {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Binding {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&String> for Binding {
    fn from(name: &String) -> Self {
        Self(name.clone())
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options of a partial call.
///
/// Used both with a positional name ([`JsonBuilder::partial`]) and on its own
/// with the name set through [`PartialOptions::named`]
/// ([`JsonBuilder::partial_with`]). When a collection is present, even an
/// absent one (`None`), the partial renders once per element into an array,
/// with each element bound under the `as` binding or, without one, under the
/// partial's own name (`posts/_summary` binds `summary`). Otherwise it renders
/// once with the locals.
///
/// [`JsonBuilder::partial`]: crate::builder::JsonBuilder::partial
/// [`JsonBuilder::partial_with`]: crate::builder::JsonBuilder::partial_with
#[derive(Debug, Clone, Default)]
pub struct PartialOptions {
    pub(crate) partial: Option<String>,
    pub(crate) collection: Option<Option<Vec<Value>>>,
    pub(crate) binding: Option<Binding>,
    pub(crate) locals: Locals,
}

impl PartialOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options naming the partial to render.
    pub fn named(partial: impl Into<String>) -> Self {
        Self::new().partial(partial)
    }

    #[must_use]
    pub fn partial(mut self, partial: impl Into<String>) -> Self {
        self.partial = Some(partial.into());
        self
    }

    /// Render once per element. `None` renders an empty array.
    #[must_use]
    pub fn collection<I>(mut self, items: Option<I>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.collection = Some(items.map(|items| items.into_iter().map(Into::into).collect()));
        self
    }

    /// The local name each collection element is bound to.
    #[must_use]
    pub fn as_binding(mut self, binding: impl Into<Binding>) -> Self {
        self.binding = Some(binding.into());
        self
    }

    /// Add a local passed to every render of the partial.
    #[must_use]
    pub fn local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(name, value);
        self
    }

    #[must_use]
    pub fn locals(mut self, locals: Locals) -> Self {
        self.locals = locals;
        self
    }
}
