//! Built JSON trees and the attribute lookup used by `extract`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Shape;
use crate::core::Result;

/// A built JSON tree.
///
/// A node is a scalar (`null`, boolean, number, string), an object whose keys
/// keep insertion order, or an array. Nodes serialize transparently, so a node
/// handed back to [`JsonBuilder::set`](super::JsonBuilder::set) or
/// [`JsonBuilder::append`](super::JsonBuilder::append) is spliced in as-is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(Value);

impl Node {
    /// The `null` node.
    pub const fn null() -> Self {
        Self(Value::Null)
    }

    /// An array with no elements.
    pub const fn empty_array() -> Self {
        Self(Value::Array(Vec::new()))
    }

    /// Convert any serializable value into a node.
    ///
    /// # Errors
    ///
    /// Returns [`JstreamerError::Serialization`](crate::core::JstreamerError::Serialization)
    /// when `value` cannot be represented as JSON (e.g. a map with non-string keys).
    pub fn from_serialize<T: Serialize>(value: T) -> Result<Self> {
        Ok(Self(serde_json::to_value(value)?))
    }

    /// Decode a node from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(text)?))
    }

    /// Encode this node as compact JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Encode this node as indented JSON text.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    /// The shape a scope takes when this node is merged into it.
    pub const fn shape(&self) -> Shape {
        match &self.0 {
            Value::Null => Shape::Undetermined,
            Value::Object(_) => Shape::Object,
            Value::Array(_) => Shape::Array,
            _ => Shape::Value,
        }
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Array elements, if this node is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        self.0.as_array().map(Vec::as_slice)
    }

    /// Object entries, if this node is an object.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// Look up a key of an object node.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        node.0
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Read named attributes off an arbitrary source.
///
/// [`JsonBuilder::extract`](super::JsonBuilder::extract) goes through this
/// trait rather than a fixed type, so application records can expose exactly
/// the attributes a template may copy. JSON objects implement it by key
/// lookup.
pub trait AttributeSource {
    /// The value of attribute `name`, or `None` when the source has no such
    /// attribute.
    fn attribute(&self, name: &str) -> Option<Value>;
}

impl AttributeSource for Value {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(name)).cloned()
    }
}

impl AttributeSource for Map<String, Value> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl AttributeSource for Node {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.0.attribute(name)
    }
}

impl<T: AttributeSource + ?Sized> AttributeSource for &T {
    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }
}
