//! Cache key expressions, fragment naming and key derivation.
//!
//! A cache call names its fragment with a [`CacheKeyExpr`]. The renderer's
//! [`FragmentNamer`] may decorate the expression (typically with a digest of
//! the template source), the optional version is appended, and the result is
//! expanded into a flat string under the configured namespace:
//!
//! ```text
//! jstreamer/posts/show/3f9a.../posts/1-20240101/v2
//! ^namespace ^------namer-----^ ^--key-------^ ^version
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::CacheOptions;
use crate::constants::{CACHE_KEY_SEPARATOR, TEMPLATE_DIGEST_LENGTH};
use crate::core::Result;

/// A record that knows its own cache identity.
pub trait Cacheable {
    /// Stable identity, e.g. `posts/1`.
    fn cache_key(&self) -> String;

    /// Changes whenever the record does, e.g. an update timestamp.
    fn cache_version(&self) -> Option<String> {
        None
    }
}

/// The expression a fragment is cached under.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheKeyExpr {
    /// Used verbatim.
    Text(String),
    /// Expanded from its JSON form.
    Structured(Value),
    /// Parts joined with `/`.
    List(Vec<CacheKeyExpr>),
}

impl CacheKeyExpr {
    /// The identity and version signature of `record`.
    pub fn record<C: Cacheable + ?Sized>(record: &C) -> Self {
        match record.cache_version() {
            Some(version) => Self::Text(format!("{}-{}", record.cache_key(), version)),
            None => Self::Text(record.cache_key()),
        }
    }

    /// A structured key from any serializable value.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::Structured(serde_json::to_value(value)?))
    }

    /// Flatten into the string form used as a store key.
    ///
    /// Lists and arrays join their parts with `/`; objects become `k=v`
    /// pairs sorted by key and joined with `&`.
    pub fn expand(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => expand_value(value),
            Self::List(parts) => join_parts(parts.iter().map(Self::expand)),
        }
    }
}

fn expand_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => join_parts(items.iter().map(expand_value)),
        Value::Object(map) => {
            let mut pairs: Vec<_> =
                map.iter().map(|(key, value)| format!("{}={}", key, expand_value(value))).collect();
            pairs.sort_unstable();
            pairs.join("&")
        }
    }
}

fn join_parts(parts: impl Iterator<Item = String>) -> String {
    parts.filter(|part| !part.is_empty()).collect::<Vec<_>>().join(CACHE_KEY_SEPARATOR)
}

impl fmt::Display for CacheKeyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expand())
    }
}

impl From<&str> for CacheKeyExpr {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CacheKeyExpr {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for CacheKeyExpr {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<Vec<CacheKeyExpr>> for CacheKeyExpr {
    fn from(parts: Vec<CacheKeyExpr>) -> Self {
        Self::List(parts)
    }
}

/// Names fragments for the store.
///
/// Both capabilities are optional: a namer provides the current one, the
/// legacy one or neither. Returning `None` means "not provided".
pub trait FragmentNamer: Send + Sync {
    /// Current capability. Receives the caller's options unchanged.
    fn cache_fragment_name(
        &self,
        _key: &CacheKeyExpr,
        _options: &CacheOptions,
    ) -> Option<CacheKeyExpr> {
        None
    }

    /// Legacy capability. Always mixes in the digest.
    fn fragment_name_with_digest(&self, _key: &CacheKeyExpr) -> Option<CacheKeyExpr> {
        None
    }
}

/// Uses keys as given.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNamer;

impl FragmentNamer for PlainNamer {}

/// A template name plus the digest of its source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateDigest {
    template: String,
    digest: String,
}

impl TemplateDigest {
    fn new(template: &str, source: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(TEMPLATE_DIGEST_LENGTH);
        Self {
            template: template.to_string(),
            digest,
        }
    }

    fn prefix(&self, key: &CacheKeyExpr) -> CacheKeyExpr {
        CacheKeyExpr::List(vec![
            CacheKeyExpr::Text(self.template.clone()),
            CacheKeyExpr::Text(self.digest.clone()),
            key.clone(),
        ])
    }
}

/// Current-capability namer: `template/digest/key`, or the bare key with
/// `skip_digest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDigestNamer(TemplateDigest);

impl TemplateDigestNamer {
    pub fn new(template: &str, source: &str) -> Self {
        Self(TemplateDigest::new(template, source))
    }

    pub fn digest(&self) -> &str {
        &self.0.digest
    }
}

impl FragmentNamer for TemplateDigestNamer {
    fn cache_fragment_name(
        &self,
        key: &CacheKeyExpr,
        options: &CacheOptions,
    ) -> Option<CacheKeyExpr> {
        if options.skip_digest { Some(key.clone()) } else { Some(self.0.prefix(key)) }
    }
}

/// Legacy-capability namer: always `template/digest/key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDigestNamer(TemplateDigest);

impl LegacyDigestNamer {
    pub fn new(template: &str, source: &str) -> Self {
        Self(TemplateDigest::new(template, source))
    }
}

impl FragmentNamer for LegacyDigestNamer {
    fn fragment_name_with_digest(&self, key: &CacheKeyExpr) -> Option<CacheKeyExpr> {
        Some(self.0.prefix(key))
    }
}

/// Derive the store key for `key`.
///
/// The namer's current capability is probed first, then the legacy one; with
/// neither the key is used as-is. `options.version` is appended and the
/// expansion is prefixed with `namespace` unless it is empty.
pub fn derive_cache_key(
    namer: &dyn FragmentNamer,
    namespace: &str,
    key: &CacheKeyExpr,
    options: &CacheOptions,
) -> String {
    let named = if let Some(named) = namer.cache_fragment_name(key, options) {
        named
    } else if let Some(named) = namer.fragment_name_with_digest(key) {
        tracing::debug!("Fragment namer has no current capability, used legacy digest naming");
        named
    } else {
        key.clone()
    };

    let mut parts = Vec::with_capacity(3);
    if !namespace.is_empty() {
        parts.push(CacheKeyExpr::Text(namespace.to_string()));
    }
    parts.push(named);
    if let Some(version) = &options.version {
        parts.push(CacheKeyExpr::Text(version.clone()));
    }
    CacheKeyExpr::List(parts).expand()
}
