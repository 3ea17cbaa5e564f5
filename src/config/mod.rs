//! Configuration for jstreamer renderers.
//!
//! A [`RenderConfig`] holds the settings every render of a
//! [`Renderer`](crate::document::Renderer) shares: whether fragment caching is
//! on, the cache key namespace, the default key format and nil handling, and
//! the default lifetime of cache entries.
//!
//! Settings are usually built in code. They can also be read from a TOML file:
//!
//! ```toml
//! perform_caching = false
//! cache_namespace = "views"
//!
//! [[key_format]]
//! strategy = "camelize"
//! args = ["lower"]
//! ```
//!
//! # Modules
//!
//! - `render` - [`RenderConfig`] and its async load/save helpers
//! - `parser` - Generic synchronous TOML parsing with path context
//!
//! # Examples
//!
//! ```rust,no_run
//! use jstreamer::config::RenderConfig;
//! use jstreamer::document::Renderer;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Falls back to $JSTREAMER_CONFIG_PATH, then to defaults
//! let config = RenderConfig::load_with_optional(None).await?;
//! let renderer = Renderer::new(config)?;
//! # Ok(())
//! # }
//! ```

mod parser;
mod render;

pub use parser::parse_config;
pub use render::{CONFIG_PATH_ENV, KeyFormatStep, RenderConfig};
