//! Open scopes on the builder stack.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::Node;
use crate::core::{JstreamerError, Result};
use crate::key_format::KeyFormat;

/// The shape a scope is committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Nothing has been written yet.
    Undetermined,
    /// Attributes have been set.
    Object,
    /// Elements have been appended.
    Array,
    /// A scalar or `null` was spliced in whole.
    Value,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undetermined => "undetermined",
            Self::Object => "an object",
            Self::Array => "an array",
            Self::Value => "a value",
        })
    }
}

#[derive(Debug)]
enum Body {
    Undetermined,
    Object(Map<String, Value>),
    Array(Vec<Value>),
    Value(Value),
}

/// One node under construction plus the settings its descendants inherit.
#[derive(Debug)]
pub(crate) struct Scope {
    body: Body,
    key_format: Arc<KeyFormat>,
    ignore_nil: bool,
}

impl Scope {
    pub(crate) fn new(key_format: Arc<KeyFormat>, ignore_nil: bool) -> Self {
        Self {
            body: Body::Undetermined,
            key_format,
            ignore_nil,
        }
    }

    /// A fresh scope inheriting this scope's key format and nil handling.
    pub(crate) fn child(&self) -> Self {
        Self::new(Arc::clone(&self.key_format), self.ignore_nil)
    }

    pub(crate) const fn shape(&self) -> Shape {
        match self.body {
            Body::Undetermined => Shape::Undetermined,
            Body::Object(_) => Shape::Object,
            Body::Array(_) => Shape::Array,
            Body::Value(_) => Shape::Value,
        }
    }

    pub(crate) fn key_format(&self) -> &KeyFormat {
        &self.key_format
    }

    pub(crate) fn set_key_format(&mut self, key_format: KeyFormat) {
        self.key_format = Arc::new(key_format);
    }

    pub(crate) const fn ignore_nil(&self) -> bool {
        self.ignore_nil
    }

    pub(crate) fn set_ignore_nil(&mut self, ignore_nil: bool) {
        self.ignore_nil = ignore_nil;
    }

    /// Commit to object shape and return the entries.
    pub(crate) fn open_object(&mut self, operation: &'static str) -> Result<&mut Map<String, Value>> {
        if matches!(self.body, Body::Undetermined) {
            self.body = Body::Object(Map::new());
        }
        let shape = self.shape();
        match &mut self.body {
            Body::Object(map) => Ok(map),
            _ => Err(JstreamerError::shape_conflict(operation, shape)),
        }
    }

    /// Commit to array shape and return the elements.
    pub(crate) fn open_array(&mut self, operation: &'static str) -> Result<&mut Vec<Value>> {
        if matches!(self.body, Body::Undetermined) {
            self.body = Body::Array(Vec::new());
        }
        let shape = self.shape();
        match &mut self.body {
            Body::Array(items) => Ok(items),
            _ => Err(JstreamerError::shape_conflict(operation, shape)),
        }
    }

    /// Insert an already formatted key. Last write wins.
    pub(crate) fn insert(&mut self, key: String, value: Value) -> Result<()> {
        self.open_object("set an attribute")?.insert(key, value);
        Ok(())
    }

    pub(crate) fn push(&mut self, value: Value) -> Result<()> {
        self.open_array("append an element")?.push(value);
        Ok(())
    }

    /// Discard whatever was built and resolve to `null`.
    pub(crate) fn set_null(&mut self) {
        self.body = Body::Value(Value::Null);
    }

    /// Splice a finished node into this scope.
    ///
    /// Object keys are taken verbatim: they were formatted when the node was
    /// built. `null` leaves the scope untouched.
    pub(crate) fn merge_node(&mut self, node: Node) -> Result<()> {
        match node.into_value() {
            Value::Null => Ok(()),
            Value::Object(entries) => {
                let map = self.open_object("merge an object")?;
                for (key, value) in entries {
                    map.insert(key, value);
                }
                Ok(())
            }
            Value::Array(items) => {
                self.open_array("merge an array")?.extend(items);
                Ok(())
            }
            scalar => match self.body {
                Body::Undetermined | Body::Value(_) => {
                    self.body = Body::Value(scalar);
                    Ok(())
                }
                _ => Err(JstreamerError::shape_conflict("merge a scalar value", self.shape())),
            },
        }
    }

    pub(crate) fn into_node(self) -> Node {
        Node::from(match self.body {
            Body::Undetermined => Value::Null,
            Body::Object(map) => Value::Object(map),
            Body::Array(items) => Value::Array(items),
            Body::Value(value) => value,
        })
    }
}
