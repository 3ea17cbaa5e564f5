//! Scope-stack JSON builder.
//!
//! [`JsonBuilder`] owns the stack of open scopes for one render. Templates are
//! plain closures that receive the builder explicitly:
//!
//! ```rust,no_run
//! use jstreamer::document::Renderer;
//!
//! let renderer = Renderer::default();
//! let json = renderer.render(|json| {
//!     json.object(|json| {
//!         json.key_format("upcase", &[] as &[&str])?;
//!         json.set("level1", "one")?;
//!         json.push_child_object("level2", |json| {
//!             json.object(|json| json.set("value", "two"))
//!         })
//!     })
//! })?;
//!
//! assert_eq!(json, r#"{"LEVEL1":"one","LEVEL2":{"VALUE":"two"}}"#);
//! # Ok::<(), jstreamer::core::JstreamerError>(())
//! ```
//!
//! # Shapes
//!
//! Every scope starts undetermined and commits to one shape on the first call
//! that implies one: [`set`](JsonBuilder::set) and [`object`](JsonBuilder::object)
//! make it an object, [`append`](JsonBuilder::append) and
//! [`array`](JsonBuilder::array) an array. A call implying the other shape
//! fails with [`JstreamerError::ShapeConflict`](crate::core::JstreamerError::ShapeConflict).
//!
//! # Inheritance
//!
//! Key format and nil handling live on the scope. A nested scope copies them
//! from its parent at the moment it is opened, so configuring a scope affects
//! everything opened beneath it afterwards and nothing opened before.
//!
//! Partial rendering and fragment caching add more methods to [`JsonBuilder`];
//! see [`crate::templating`] and [`crate::cache`].

mod node;
mod scope;

pub use node::{AttributeSource, Node};
pub use scope::Shape;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::core::{JstreamerError, Result};
use crate::document::Renderer;
use crate::key_format::KeyFormat;
use scope::Scope;

/// Builds one JSON tree through nested scopes.
///
/// Created by [`Renderer::builder`]; one builder serves exactly one render.
pub struct JsonBuilder<'r> {
    renderer: &'r Renderer,
    root: Scope,
    stack: Vec<Scope>,
}

impl<'r> JsonBuilder<'r> {
    pub(crate) fn new(renderer: &'r Renderer) -> Self {
        let root = Scope::new(
            Arc::new(renderer.default_key_format().clone()),
            renderer.config().ignore_nil,
        );
        Self {
            renderer,
            root,
            stack: Vec::new(),
        }
    }

    /// The renderer whose collaborators this builder uses.
    pub const fn renderer(&self) -> &'r Renderer {
        self.renderer
    }

    fn current(&mut self) -> &mut Scope {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    fn current_ref(&self) -> &Scope {
        self.stack.last().unwrap_or(&self.root)
    }

    /// Shape of the scope currently being built.
    pub fn shape(&self) -> Shape {
        self.current_ref().shape()
    }

    /// Nesting depth; the root scope is depth 0.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Install a key format on the current scope by strategy name.
    ///
    /// Applies to keys set from now on in this scope and in every scope opened
    /// beneath it, until one of them installs its own.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::UnknownKeyStrategy`] or
    /// [`JstreamerError::InvalidKeyStrategyArgument`] when the strategy
    /// cannot be resolved.
    pub fn key_format<S: AsRef<str>>(&mut self, strategy: &str, args: &[S]) -> Result<()> {
        let format = KeyFormat::parse(strategy, args)?;
        self.set_key_format(format);
        Ok(())
    }

    /// Install an already resolved key format on the current scope.
    pub fn set_key_format(&mut self, format: KeyFormat) {
        tracing::debug!("Key format set to {} at depth {}", format, self.depth());
        self.current().set_key_format(format);
    }

    /// Skip attributes whose value is `null` in this scope and its descendants.
    pub fn ignore_nil(&mut self, ignore: bool) {
        self.current().set_ignore_nil(ignore);
    }

    /// The display form of `name` under the current key format.
    pub fn format_key(&self, name: &str) -> String {
        self.current_ref().key_format().apply(name)
    }

    /// Commit the current scope to object shape and run `block` in it.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::ShapeConflict`] when the scope already holds an
    /// array or a value; otherwise whatever `block` returns.
    pub fn object<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.current().open_object("open an object")?;
        block(self)
    }

    /// Commit the current scope to array shape and run `block` in it.
    pub fn array<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.current().open_array("open an array")?;
        block(self)
    }

    /// Set attribute `name` on the current object scope.
    ///
    /// The key goes through the active key format; `value` is converted with
    /// serde, so a [`Node`] built by a nested block is stored as-is. Setting
    /// an existing key replaces its value in place.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::ShapeConflict`] when the scope is an array or value,
    /// [`JstreamerError::Serialization`] when `value` has no JSON form.
    pub fn set<T: Serialize>(&mut self, name: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set_value(name, value)
    }

    /// Set attribute `name` to a finished node without re-encoding it.
    pub fn set_node(&mut self, name: &str, node: Node) -> Result<()> {
        self.set_value(name, node.into_value())
    }

    fn set_value(&mut self, name: &str, value: Value) -> Result<()> {
        let scope = self.current();
        if value.is_null() && scope.ignore_nil() {
            return Ok(());
        }
        let key = scope.key_format().apply(name);
        scope.insert(key, value)
    }

    /// Copy the named attributes of `source` onto the current object scope.
    ///
    /// Attributes the source does not have are set to `null`.
    pub fn extract<S>(&mut self, source: &S, names: &[&str]) -> Result<()>
    where
        S: AttributeSource + ?Sized,
    {
        for name in names {
            let value = source.attribute(name).unwrap_or(Value::Null);
            self.set_value(name, value)?;
        }
        Ok(())
    }

    /// Merge a JSON object's entries or a JSON array's elements into the
    /// current scope.
    ///
    /// Object keys go through the active key format. `null` is a no-op.
    pub fn merge<T: Serialize>(&mut self, value: T) -> Result<()> {
        match serde_json::to_value(value)? {
            Value::Null => Ok(()),
            Value::Object(entries) => {
                // Commit the shape even when there is nothing to copy.
                self.current().open_object("merge an object")?;
                for (key, value) in entries {
                    self.set_value(&key, value)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                self.current().open_array("merge an array")?.extend(items);
                Ok(())
            }
            _ => Err(JstreamerError::shape_conflict("merge a scalar value", self.shape())),
        }
    }

    /// Splice a finished node into the current scope, keys verbatim.
    pub(crate) fn merge_node(&mut self, node: Node) -> Result<()> {
        self.current().merge_node(node)
    }

    /// Append `value` to the current array scope.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::ShapeConflict`] when the scope is an object or value.
    pub fn append<T: Serialize>(&mut self, value: T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.current().push(value)
    }

    /// Append a finished node without re-encoding it.
    pub fn append_node(&mut self, node: Node) -> Result<()> {
        self.current().push(node.into_value())
    }

    /// Make the current scope an array of the given values.
    pub fn array_values<I, T>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        self.current().open_array("open an array")?;
        for item in items {
            self.append(item)?;
        }
        Ok(())
    }

    /// Make the current scope an array with one element per item, each built
    /// by `block` in its own scope.
    pub fn array_from<I, T, F>(&mut self, items: I, mut block: F) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T) -> Result<()>,
    {
        self.current().open_array("open an array")?;
        for item in items {
            let node = self.capture(|json| block(json, item))?;
            self.append_node(node)?;
        }
        Ok(())
    }

    /// Run `block` in a nested scope and set its result as attribute `name`.
    pub fn push_child_object<F>(&mut self, name: &str, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let node = self.capture(block)?;
        self.set_node(name, node)
    }

    /// Run `block` in a nested scope and append its result to the current
    /// array scope.
    pub fn push_child_array<F>(&mut self, block: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let node = self.capture(block)?;
        self.append_node(node)
    }

    /// Run `block` in a fresh nested scope and return what it built, without
    /// attaching it anywhere.
    ///
    /// The nested scope inherits the current key format and nil handling.
    /// The scope is popped even when `block` fails.
    pub fn capture<F>(&mut self, block: F) -> Result<Node>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let child = self.current_ref().child();
        self.stack.push(child);
        let outcome = block(self);
        let scope = self.stack.pop();
        outcome?;
        Ok(scope.map(Scope::into_node).unwrap_or_default())
    }

    /// Resolve the current scope to `null`, discarding anything built in it.
    pub fn null(&mut self) {
        self.current().set_null();
    }

    /// Finish the render and return the root node.
    ///
    /// An untouched root resolves to `null`.
    pub fn result(self) -> Node {
        self.root.into_node()
    }
}
