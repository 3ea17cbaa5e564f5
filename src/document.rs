//! Document rendering.
//!
//! A [`Renderer`] bundles a [`RenderConfig`] with the collaborators a render
//! needs (partial resolver, cache store and fragment namer). Each call to
//! [`render`](Renderer::render) creates a fresh [`JsonBuilder`], runs the
//! template block against its root scope and serializes the resulting tree.
//!
//! A renderer is immutable once built and can be shared between threads; every
//! render owns its own scope stack.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jstreamer::cache::MemoryStore;
//! use jstreamer::config::RenderConfig;
//! use jstreamer::document::Renderer;
//! use jstreamer::templating::PartialRegistry;
//!
//! let partials = PartialRegistry::new()
//!     .with("_partial", |json, _| json.object(|json| json.set("content", "hello")));
//!
//! let renderer = Renderer::new(RenderConfig::default())?
//!     .with_partials(partials)
//!     .with_cache_store(Arc::new(MemoryStore::new()));
//!
//! assert_eq!(renderer.render_template("partial", &Default::default())?, r#"{"content":"hello"}"#);
//! # Ok::<(), jstreamer::core::JstreamerError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use crate::builder::{JsonBuilder, Node};
use crate::cache::{CacheStore, FragmentNamer, PlainNamer};
use crate::config::RenderConfig;
use crate::core::Result;
use crate::key_format::KeyFormat;
use crate::templating::{Locals, PartialRegistry, PartialResolver};

/// Renders builder blocks into JSON documents.
#[derive(Clone)]
pub struct Renderer {
    config: RenderConfig,
    default_key_format: KeyFormat,
    partials: Arc<dyn PartialResolver>,
    cache: Option<Arc<dyn CacheStore>>,
    namer: Arc<dyn FragmentNamer>,
}

impl Renderer {
    /// A renderer with no partials, no cache store and plain fragment naming.
    ///
    /// # Errors
    ///
    /// Whatever [`RenderConfig::validate`] reports.
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        let default_key_format = config.key_format()?;
        Ok(Self {
            config,
            default_key_format,
            partials: Arc::new(PartialRegistry::new()),
            cache: None,
            namer: Arc::new(PlainNamer),
        })
    }

    #[must_use]
    pub fn with_partials(mut self, partials: impl PartialResolver + 'static) -> Self {
        self.partials = Arc::new(partials);
        self
    }

    /// Share a resolver between renderers.
    #[must_use]
    pub fn with_partial_resolver(mut self, partials: Arc<dyn PartialResolver>) -> Self {
        self.partials = partials;
        self
    }

    #[must_use]
    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(store);
        self
    }

    #[must_use]
    pub fn with_fragment_namer(mut self, namer: Arc<dyn FragmentNamer>) -> Self {
        self.namer = namer;
        self
    }

    /// Toggle the caching-enabled flag.
    #[must_use]
    pub fn with_perform_caching(mut self, enabled: bool) -> Self {
        self.config.perform_caching = enabled;
        self
    }

    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Key format installed on the root scope of every render.
    pub const fn default_key_format(&self) -> &KeyFormat {
        &self.default_key_format
    }

    pub fn partials(&self) -> &dyn PartialResolver {
        self.partials.as_ref()
    }

    pub fn cache_store(&self) -> Option<&dyn CacheStore> {
        self.cache.as_deref()
    }

    pub fn fragment_namer(&self) -> &dyn FragmentNamer {
        self.namer.as_ref()
    }

    /// Whether cache calls will consult a store.
    pub fn caching_enabled(&self) -> bool {
        self.config.perform_caching && self.cache.is_some()
    }

    /// A builder over a fresh root scope.
    pub fn builder(&self) -> JsonBuilder<'_> {
        JsonBuilder::new(self)
    }

    /// Run `block` against a fresh document and return the tree.
    pub fn render_node<F>(&self, block: F) -> Result<Node>
    where
        F: FnOnce(&mut JsonBuilder<'_>) -> Result<()>,
    {
        let mut json = self.builder();
        block(&mut json)?;
        Ok(json.result())
    }

    /// Run `block` against a fresh document and serialize it as compact JSON.
    ///
    /// An untouched document renders as `null`.
    pub fn render<F>(&self, block: F) -> Result<String>
    where
        F: FnOnce(&mut JsonBuilder<'_>) -> Result<()>,
    {
        self.render_node(block)?.to_json()
    }

    /// Like [`render`](Self::render), indented.
    pub fn render_pretty<F>(&self, block: F) -> Result<String>
    where
        F: FnOnce(&mut JsonBuilder<'_>) -> Result<()>,
    {
        self.render_node(block)?.to_json_pretty()
    }

    /// Render partial `name` as the whole document.
    pub fn render_template(&self, name: &str, locals: &Locals) -> Result<String> {
        let template = self.partials.resolve(name)?;
        tracing::debug!("Rendering template '{}' as document", name);
        self.render(|json| template.render(json, locals))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        let config = RenderConfig::default();
        Self {
            default_key_format: KeyFormat::identity(),
            config,
            partials: Arc::new(PartialRegistry::new()),
            cache: None,
            namer: Arc::new(PlainNamer),
        }
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("default_key_format", &self.default_key_format.to_string())
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
