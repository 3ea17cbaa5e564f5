//! Integration test suite for jstreamer
//!
//! End-to-end tests that drive complete renders through the public API:
//! renderer, builder, partial registry and cache stores together.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=jstreamer=debug cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **rendering**: Document shapes and nesting
//! - **key_format**: Key format configuration and propagation
//! - **partials**: Scalar and collection partials, both call syntaxes
//! - **caching**: `cache`, `cache_if`, `cache_collection` and fragment naming
//! - **render_config**: Loading renderer settings from TOML

mod caching;
mod key_format;
mod partials;
mod render_config;
mod rendering;
