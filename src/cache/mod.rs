//! Fragment caching of rendered sub-trees.
//!
//! Three builder calls cache what a block builds:
//!
//! - [`JsonBuilder::cache`](crate::builder::JsonBuilder::cache) caches one
//!   fragment under one key.
//! - [`JsonBuilder::cache_if`](crate::builder::JsonBuilder::cache_if) does the
//!   same only when a condition holds.
//! - [`JsonBuilder::cache_collection`](crate::builder::JsonBuilder::cache_collection)
//!   caches one element per item of a collection, with a batched read and
//!   write when the store supports it.
//!
//! # Outcomes
//!
//! Each call is served as one of:
//!
//! - **HIT**: the stored fragment is decoded and merged into the current
//!   scope; the block does not run.
//! - **MISS**: the block runs in a child scope, its result is encoded and
//!   written, then merged.
//! - **BYPASSED**: caching is disabled in [`RenderConfig`], the renderer has
//!   no store, or a `cache_if` condition is false. The block runs in a child
//!   scope and is merged as on a miss, but the store is not touched.
//!
//! Store failures are logged with `tracing::warn!` and handled as misses; a
//! fragment that fails to decode is handled the same way.
//!
//! # Keys
//!
//! Keys are [`CacheKeyExpr`]s turned into store keys by [`derive_cache_key`]
//! through the renderer's [`FragmentNamer`]. A `cache_collection` element is
//! always keyed by its own serialized value; a `key` callable only adds a
//! component after it. Fragments are stored as compact
//! JSON text, so a hit reproduces the exact keys of the original render
//! regardless of the key format active at the call site.
//!
//! [`RenderConfig`]: crate::config::RenderConfig

mod coordinator;
mod key;
mod options;
mod store;

pub use key::{
    CacheKeyExpr, Cacheable, FragmentNamer, LegacyDigestNamer, PlainNamer, TemplateDigestNamer,
    derive_cache_key,
};
pub use options::CacheOptions;
pub use store::{CacheStore, CacheStoreError, MemoryStore, MultiKeyCacheStore, StoreStats};
