//! Partial templates.
//!
//! A partial is a named builder block resolved through the renderer's
//! [`PartialResolver`]. It runs in a fresh child scope, so it inherits the
//! caller's key format and nil handling, and its result is spliced into the
//! caller's position: the whole document, an array element or an attribute
//! value.
//!
//! # Scalar and collection mode
//!
//! - **Scalar**: [`JsonBuilder::render_partial`] runs the partial once with the
//!   given [`Locals`].
//! - **Collection**: [`JsonBuilder::render_partial_collection`] runs it once per
//!   element, binding the element under the `as` name, and collects the
//!   results into an array. An absent collection gives an empty array.
//!
//! [`JsonBuilder::partial`] and [`JsonBuilder::partial_with`] pick the mode
//! from [`PartialOptions`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use jstreamer::document::Renderer;
//! use jstreamer::templating::{PartialOptions, PartialRegistry};
//! use serde_json::json;
//!
//! let partials = PartialRegistry::new().with("_post", |json, locals| {
//!     let post = locals.require("post")?;
//!     json.object(|json| json.extract(post, &["id", "title"]))
//! });
//! let renderer = Renderer::default().with_partials(partials);
//!
//! let posts = vec![json!({"id": 1, "title": "First"}), json!({"id": 2, "title": "Second"})];
//! let out = renderer.render(|json| {
//!     json.partial("post", PartialOptions::new().collection(Some(posts)).as_binding("post"))
//! })?;
//! assert_eq!(out, r#"[{"id":1,"title":"First"},{"id":2,"title":"Second"}]"#);
//! # Ok::<(), jstreamer::core::JstreamerError>(())
//! ```

mod locals;
mod registry;

pub use locals::{Binding, Locals, PartialOptions};
pub use registry::{PartialRegistry, PartialResolver, PartialTemplate};

use serde::Serialize;
use serde_json::Value;

use crate::builder::{JsonBuilder, Node};
use crate::core::{JstreamerError, Result};

impl JsonBuilder<'_> {
    /// Render partial `name` once with `locals` and return its node.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::PartialNotFound`] when the resolver does not know
    /// `name`; otherwise whatever the partial returns.
    pub fn render_partial(&mut self, name: &str, locals: &Locals) -> Result<Node> {
        let template = self.renderer().partials().resolve(name)?;
        tracing::debug!("Rendering partial '{}' at depth {}", name, self.depth());
        self.capture(|json| template.render(json, locals))
    }

    /// Render partial `name` once per element of `collection`, in order,
    /// with the element bound under `binding`.
    ///
    /// `None` renders an empty array.
    pub fn render_partial_collection<I, T>(
        &mut self,
        name: &str,
        collection: Option<I>,
        binding: impl Into<Binding>,
    ) -> Result<Node>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let items = collection.map(to_values).transpose()?;
        self.render_collection(name, items, &binding.into(), &Locals::new())
    }

    fn render_collection(
        &mut self,
        name: &str,
        items: Option<Vec<Value>>,
        binding: &Binding,
        base: &Locals,
    ) -> Result<Node> {
        let Some(items) = items else {
            tracing::debug!("Partial '{}' given no collection, rendering []", name);
            return Ok(Node::empty_array());
        };

        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            let mut locals = base.clone();
            locals.insert(binding.as_str(), item);
            elements.push(self.render_partial(name, &locals)?.into_value());
        }
        Ok(Node::from(Value::Array(elements)))
    }

    /// Splice an array of partial renders into the current scope.
    ///
    /// Used for a whole-document array; `None` leaves the document `[]`.
    pub fn array_of_partials<I, T>(
        &mut self,
        collection: Option<I>,
        name: &str,
        binding: impl Into<Binding>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let node = self.render_partial_collection(name, collection, binding)?;
        self.merge_node(node)
    }

    /// Set attribute `key` to an array of partial renders.
    pub fn set_array_of_partials<I, T>(
        &mut self,
        key: &str,
        collection: Option<I>,
        name: &str,
        binding: impl Into<Binding>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let node = self.render_partial_collection(name, collection, binding)?;
        self.set_node(key, node)
    }

    /// Render partial `name` with `options` and splice the result into the
    /// current scope.
    pub fn partial(&mut self, name: &str, options: PartialOptions) -> Result<()> {
        self.partial_with(options.partial(name))
    }

    /// Like [`partial`](Self::partial), with the name taken from the options.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::MissingPartialName`] when the options carry no name.
    pub fn partial_with(&mut self, options: PartialOptions) -> Result<()> {
        let node = self.render_partial_options(options)?;
        self.merge_node(node)
    }

    /// Set attribute `key` to the result of a partial call.
    pub fn set_partial(&mut self, key: &str, options: PartialOptions) -> Result<()> {
        let node = self.render_partial_options(options)?;
        self.set_node(key, node)
    }

    /// Append the result of a partial call to the current array scope.
    pub fn append_partial(&mut self, options: PartialOptions) -> Result<()> {
        let node = self.render_partial_options(options)?;
        self.append_node(node)
    }

    /// Render a partial call to a node without attaching it.
    ///
    /// A call with a collection renders in collection mode. Without an `as`
    /// binding the element is bound under the partial's own name, so
    /// `posts/_summary` binds `summary`.
    pub fn render_partial_options(&mut self, options: PartialOptions) -> Result<Node> {
        let PartialOptions {
            partial,
            collection,
            binding,
            locals,
        } = options;
        let name = partial.ok_or(JstreamerError::MissingPartialName)?;

        match collection {
            Some(items) => {
                let binding = binding.unwrap_or_else(|| default_binding(&name));
                self.render_collection(&name, items, &binding, &locals)
            }
            None => self.render_partial(&name, &locals),
        }
    }
}

fn to_values<I, T>(items: I) -> Result<Vec<Value>>
where
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    items.into_iter().map(|item| serde_json::to_value(item).map_err(Into::into)).collect()
}

fn default_binding(name: &str) -> Binding {
    let file = name.rsplit('/').next().unwrap_or(name);
    Binding::from(file.strip_prefix('_').unwrap_or(file))
}
