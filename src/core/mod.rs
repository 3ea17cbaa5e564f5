//! Core types shared by every jstreamer layer.
//!
//! At the moment this is the error taxonomy; see [`error`] for the variants
//! and how each one is meant to be handled.

pub mod error;

pub use error::{JstreamerError, Result};
