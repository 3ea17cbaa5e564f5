//! Test utilities for jstreamer
//!
//! This module provides utilities for writing tests: logging setup and the
//! blog-post fixtures shared by the unit and integration suites.
//!
//! Only compiled for tests or with the `test-utils` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use jstreamer::document::Renderer;
//! use jstreamer::test_utils::{blog_post_collection, fixture_partials, init_test_logging};
//!
//! init_test_logging(None);
//! let renderer = Renderer::default().with_partials(fixture_partials());
//! let json = renderer.render(|json| {
//!     json.array_of_partials(Some(blog_post_collection()), "blog_post", "blog_post")
//! })?;
//! # Ok::<(), jstreamer::core::JstreamerError>(())
//! ```

pub mod fixtures;

pub use fixtures::{
    BlogPost, Collection, assert_collection_rendered, blog_post_collection, collection_collection,
    fixture_partials,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Initializes the tracing subscriber once regardless of how many times it is
/// called. Uses `level` when given, otherwise `RUST_LOG`; with neither,
/// logging stays off.
///
/// ```bash
/// RUST_LOG=jstreamer=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
