//! jstreamer - declarative JSON document builder
//!
//! Templates are closures that drive a [`JsonBuilder`](builder::JsonBuilder)
//! through nested scopes. On top of plain tree construction the crate offers:
//!
//! - **Key formatting**: a naming strategy set on a scope applies to every key
//!   set beneath it, including keys set by partials and cached blocks
//! - **Partials**: named, reusable template blocks rendered once or once per
//!   collection element
//! - **Fragment caching**: sub-trees cached as JSON text under derived keys,
//!   with a batched multi-key path for collections
//!
//! # Core Modules
//!
//! - [`builder`] - Scope stack, tree nodes and the attribute/array operations
//! - [`key_format`] - Key naming strategies and their chaining
//! - [`templating`] - Partial resolution, locals and collection rendering
//! - [`cache`] - Cache stores, key derivation and the cache coordinator
//! - [`document`] - The [`Renderer`](document::Renderer) that owns the document root
//!
//! ## Supporting Modules
//! - [`config`] - Renderer settings, loadable from TOML
//! - [`core`] - Error type and result alias
//! - [`constants`] - Cache key layout and suggestion thresholds
//!
//! # Example
//!
//! ```rust,no_run
//! use jstreamer::document::Renderer;
//!
//! let json = Renderer::default().render(|json| {
//!     json.object(|json| {
//!         json.key_format("camelize", &["lower"])?;
//!         json.set("camel_style", "for JS")
//!     })
//! })?;
//! assert_eq!(json, r#"{"camelStyle":"for JS"}"#);
//! # Ok::<(), jstreamer::core::JstreamerError>(())
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing`: cache outcomes, partial scopes and key
//! derivation at `debug`, swallowed cache store failures at `warn`.

pub mod builder;
pub mod cache;
pub mod config;
pub mod constants;
pub mod core;
pub mod document;
pub mod key_format;
pub mod templating;

// test_utils is available for tests and when the test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::{JsonBuilder, Node};
pub use crate::core::{JstreamerError, Result};
pub use document::Renderer;
