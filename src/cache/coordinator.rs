//! Fragment caching on the builder.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{CacheKeyExpr, CacheOptions, CacheStore, derive_cache_key};
use crate::builder::{JsonBuilder, Node};
use crate::core::Result;

/// How a cache call was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheOutcome {
    Hit,
    Miss,
    Bypassed,
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypassed => "BYPASSED",
        })
    }
}

impl<'r> JsonBuilder<'r> {
    /// Cache what `block` builds under `key`.
    ///
    /// On a hit the stored fragment is merged into the current scope and
    /// `block` does not run. On a miss `block` runs in a child scope and the
    /// result is stored, then merged. With caching disabled or no store
    /// attached, `block` still runs in a child scope and is merged, so
    /// settings it changes never reach the current scope.
    ///
    /// Store failures are logged and treated as misses.
    ///
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use jstreamer::cache::{CacheOptions, MemoryStore};
    /// use jstreamer::document::Renderer;
    ///
    /// let renderer = Renderer::default().with_cache_store(Arc::new(MemoryStore::new()));
    /// let json = renderer.render(|json| {
    ///     json.object(|json| {
    ///         json.cache("cachekey", CacheOptions::new(), |json| json.set("name", "Cache"))
    ///     })
    /// })?;
    /// assert_eq!(json, r#"{"name":"Cache"}"#);
    /// # Ok::<(), jstreamer::core::JstreamerError>(())
    /// ```
    pub fn cache<F>(
        &mut self,
        key: impl Into<CacheKeyExpr>,
        options: CacheOptions,
        block: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let key = key.into();
        let Some(store) = self.active_store() else {
            debug!("Fragment '{}': {}", key, CacheOutcome::Bypassed);
            let node = self.capture(block)?;
            return self.merge_node(node);
        };

        let cache_key = self.cache_key_for(&key, &options);
        let expires_in = self.expires_in(&options);
        let node = self.fetch_or_build(store, &cache_key, expires_in, block)?;
        self.merge_node(node)
    }

    /// [`cache`](Self::cache) when `condition` holds; otherwise build `block`
    /// in a child scope without touching the store.
    pub fn cache_if<F>(
        &mut self,
        condition: bool,
        key: impl Into<CacheKeyExpr>,
        options: CacheOptions,
        block: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let key: CacheKeyExpr = key.into();
        if condition {
            self.cache(key, options, block)
        } else {
            debug!("Fragment '{}': {} (condition false)", key, CacheOutcome::Bypassed);
            let node = self.capture(block)?;
            self.merge_node(node)
        }
    }

    /// Build an array with one cached element per item.
    ///
    /// Each element is cached under its serialized value, followed by
    /// `key(item)` when `key` is given. With a store that supports
    /// batched access, all keys are read in one call and all misses are
    /// written in one call. Otherwise each element goes through the
    /// single-key path. With caching disabled the elements are built
    /// directly. The array always follows the order of `collection`; `None`
    /// renders an empty array.
    ///
    /// # Errors
    ///
    /// Only errors from `block` or from serializing an element key. Store
    /// failures are logged and the affected elements rebuilt.
    pub fn cache_collection<I, T, F>(
        &mut self,
        collection: Option<I>,
        options: CacheOptions,
        key: Option<&dyn Fn(&T) -> CacheKeyExpr>,
        mut block: F,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        let Some(collection) = collection else {
            return self.merge_node(Node::empty_array());
        };
        let items: Vec<T> = collection.into_iter().collect();

        let Some(store) = self.active_store() else {
            debug!("Collection of {} elements: {}", items.len(), CacheOutcome::Bypassed);
            return self.array_from(items.iter(), |json, item| block(json, item));
        };

        let keys = items
            .iter()
            .map(|item| -> Result<String> {
                let identity = CacheKeyExpr::from_serialize(item)?;
                let expr = match key {
                    Some(key) => CacheKeyExpr::List(vec![identity, key(item)]),
                    None => identity,
                };
                Ok(self.cache_key_for(&expr, &options))
            })
            .collect::<Result<Vec<_>>>()?;
        let expires_in = self.expires_in(&options);

        let Some(multi) = store.as_multi() else {
            debug!("Cache store has no multi-key access, caching {} elements one by one", items.len());
            let mut elements = Vec::with_capacity(items.len());
            for (item, cache_key) in items.iter().zip(&keys) {
                let node =
                    self.fetch_or_build(store, cache_key, expires_in, |json| block(json, item))?;
                elements.push(node.into_value());
            }
            return self.merge_node(Node::from(Value::Array(elements)));
        };

        let fetched = multi.read_multi(&keys).unwrap_or_else(|err| {
            warn!("Batched cache read of {} keys failed, rebuilding all: {}", keys.len(), err);
            HashMap::new()
        });
        debug!("Batched cache read: {} of {} keys present", fetched.len(), keys.len());

        let mut pending = Vec::new();
        let mut elements = Vec::with_capacity(items.len());
        for (item, cache_key) in items.iter().zip(keys) {
            let cached = fetched.get(&cache_key).and_then(|text| decode_fragment(&cache_key, text));
            let node = match cached {
                Some(node) => {
                    debug!("Fragment '{}': {}", cache_key, CacheOutcome::Hit);
                    node
                }
                None => {
                    debug!("Fragment '{}': {}", cache_key, CacheOutcome::Miss);
                    let node = self.capture(|json| block(json, item))?;
                    if let Some(text) = encode_fragment(&cache_key, &node) {
                        pending.push((cache_key, text));
                    }
                    node
                }
            };
            elements.push(node.into_value());
        }

        if !pending.is_empty() {
            let count = pending.len();
            for (cache_key, err) in multi.write_multi(pending, expires_in) {
                warn!("Failed to write fragment '{}': {}", cache_key, err);
            }
            debug!("Batched cache write of {} fragments", count);
        }

        self.merge_node(Node::from(Value::Array(elements)))
    }

    /// The store to use, or `None` when caching is off for this renderer.
    fn active_store(&self) -> Option<&'r dyn CacheStore> {
        let renderer = self.renderer();
        if renderer.config().perform_caching { renderer.cache_store() } else { None }
    }

    fn cache_key_for(&self, key: &CacheKeyExpr, options: &CacheOptions) -> String {
        let renderer = self.renderer();
        derive_cache_key(renderer.fragment_namer(), &renderer.config().cache_namespace, key, options)
    }

    fn expires_in(&self, options: &CacheOptions) -> Option<Duration> {
        options.expires_in.or_else(|| self.renderer().config().default_expires_in())
    }

    /// Single-key path: read, or build in a child scope and write.
    fn fetch_or_build<F>(
        &mut self,
        store: &dyn CacheStore,
        cache_key: &str,
        expires_in: Option<Duration>,
        block: F,
    ) -> Result<Node>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let cached = match store.read(cache_key) {
            Ok(found) => found.and_then(|text| decode_fragment(cache_key, &text)),
            Err(err) => {
                warn!("Cache read of '{}' failed, rebuilding: {}", cache_key, err);
                None
            }
        };
        if let Some(node) = cached {
            debug!("Fragment '{}': {}", cache_key, CacheOutcome::Hit);
            return Ok(node);
        }

        debug!("Fragment '{}': {}", cache_key, CacheOutcome::Miss);
        let node = self.capture(block)?;
        if let Some(text) = encode_fragment(cache_key, &node) {
            if let Err(err) = store.write(cache_key, &text, expires_in) {
                warn!("Failed to write fragment '{}': {}", cache_key, err);
            }
        }
        Ok(node)
    }
}

fn decode_fragment(cache_key: &str, text: &str) -> Option<Node> {
    Node::from_json(text)
        .inspect_err(|err| warn!("Discarding undecodable fragment '{}': {}", cache_key, err))
        .ok()
}

fn encode_fragment(cache_key: &str, node: &Node) -> Option<String> {
    node.to_json()
        .inspect_err(|err| warn!("Not caching fragment '{}': {}", cache_key, err))
        .ok()
}
