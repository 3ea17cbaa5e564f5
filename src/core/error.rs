//! Error handling for jstreamer
//!
//! This module provides the error type shared by the builder, key formatting,
//! partial and configuration layers. The error system follows two rules:
//! 1. **Strongly-typed errors** for the failures a caller can act on
//!    (shape conflicts, unknown strategies, unknown partials)
//! 2. **Readable messages** with close-match suggestions where a name was
//!    mistyped
//!
//! # Error Categories
//!
//! - **Tree shape**: [`JstreamerError::ShapeConflict`] - an attribute set on an
//!   array scope, or an element appended to an object scope
//! - **Key formatting**: [`JstreamerError::UnknownKeyStrategy`],
//!   [`JstreamerError::InvalidKeyStrategyArgument`]
//! - **Partials**: [`JstreamerError::PartialNotFound`],
//!   [`JstreamerError::MissingPartialName`], [`JstreamerError::MissingLocal`]
//! - **Encoding**: [`JstreamerError::Serialization`] from [`serde_json::Error`]
//! - **Configuration**: [`JstreamerError::ConfigError`]
//!
//! Cache store failures are deliberately absent: they are recovered inside the
//! cache coordinator and never surface as a render failure (see
//! [`crate::cache::CacheStoreError`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use jstreamer::core::JstreamerError;
//! use jstreamer::key_format::KeyFormat;
//!
//! match KeyFormat::parse("camelise", &[] as &[&str]) {
//!     Ok(_) => unreachable!(),
//!     Err(e) => {
//!         assert!(matches!(e, JstreamerError::UnknownKeyStrategy { .. }));
//!         eprintln!("{}", e.format_with_context());
//!     }
//! }
//! ```

use strsim::levenshtein;
use thiserror::Error;

use crate::builder::Shape;
use crate::constants::{MAX_SUGGESTIONS, SIMILARITY_THRESHOLD_PERCENT};

/// Result alias used by every fallible builder operation.
pub type Result<T, E = JstreamerError> = std::result::Result<T, E>;

/// The main error type for jstreamer operations
#[derive(Error, Debug)]
pub enum JstreamerError {
    /// A call implied a shape the current scope is not committed to.
    ///
    /// Raised when an attribute is set on an array scope, an element is
    /// appended to an object scope, or a fragment of one shape is merged into
    /// a scope of another. Not recovered.
    #[error("Cannot {operation} on a scope that is already {shape}")]
    ShapeConflict {
        /// The builder operation that was attempted (e.g. "set attribute")
        operation: &'static str,
        /// The shape the scope was already committed to
        shape: Shape,
    },

    /// A key format strategy name is not one of the built-in strategies.
    #[error("Unknown key format strategy: '{name}'")]
    UnknownKeyStrategy {
        /// The strategy name as given
        name: String,
        /// Built-in strategy names close to `name`
        suggestions: Vec<String>,
    },

    /// A key format strategy received an argument it does not understand.
    #[error("Invalid argument '{argument}' for key format strategy '{strategy}'")]
    InvalidKeyStrategyArgument {
        /// The strategy that rejected the argument
        strategy: String,
        /// The rejected argument
        argument: String,
    },

    /// The partial resolver has no template under this name.
    #[error("Partial not found: '{name}'")]
    PartialNotFound {
        /// The requested partial name
        name: String,
        /// Registered partial names close to `name`
        suggestions: Vec<String>,
    },

    /// A partial asked for a local it was not rendered with.
    #[error("Local '{name}' is not bound in this partial")]
    MissingLocal {
        /// The local name the partial required
        name: String,
    },

    /// Partial options were rendered without a partial name.
    #[error("No partial name given: pass a name or set `partial` in the options")]
    MissingPartialName,

    /// A value could not be converted to or from JSON.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Any other failure raised from inside a template block.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JstreamerError {
    /// Build a [`JstreamerError::ShapeConflict`].
    pub(crate) const fn shape_conflict(operation: &'static str, shape: Shape) -> Self {
        Self::ShapeConflict {
            operation,
            shape,
        }
    }

    /// Close-match suggestions attached to this error, if any.
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::UnknownKeyStrategy {
                suggestions,
                ..
            }
            | Self::PartialNotFound {
                suggestions,
                ..
            } => suggestions,
            _ => &[],
        }
    }

    /// Generate a multi-line message with suggestions for display.
    pub fn format_with_context(&self) -> String {
        let mut msg = format!("ERROR: {self}\n");

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            msg.push_str("\nDid you mean one of these?\n");
            for suggestion in suggestions {
                msg.push_str(&format!("  - {suggestion}\n"));
            }
        }

        if let Self::ShapeConflict {
            shape,
            ..
        } = self
        {
            msg.push_str(&format!(
                "\nSUGGESTION: a scope holds one shape only. This scope is {shape}; \
                 open a child scope to nest a different shape.\n"
            ));
        }

        msg
    }
}

/// Find up to [`MAX_SUGGESTIONS`] names in `available` close to `target`.
///
/// Candidates are ranked by Levenshtein distance and kept only when the
/// distance is within [`SIMILARITY_THRESHOLD_PERCENT`] of the target length.
pub(crate) fn find_similar<'a, I>(target: &str, available: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<_> =
        available.into_iter().map(|name| (name.to_string(), levenshtein(target, name))).collect();

    scored.sort_by(|(a_name, a_dist), (b_name, b_dist)| {
        a_dist.cmp(b_dist).then_with(|| a_name.cmp(b_name))
    });

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(MAX_SUGGESTIONS)
        .map(|(name, _)| name)
        .collect()
}
