//! Key formatting for built JSON objects.
//!
//! A [`KeyFormat`] maps the raw attribute name a template uses to the key that
//! ends up in the document. It is installed on a builder scope with
//! [`JsonBuilder::key_format`](crate::builder::JsonBuilder::key_format) and is
//! inherited by every scope opened beneath it, including scopes created by
//! partials and cached blocks, until a descendant installs its own.
//!
//! # Strategies
//!
//! | Name         | Arguments            | `camel_style` becomes |
//! |--------------|----------------------|-----------------------|
//! | `identity`   | none                 | `camel_style`         |
//! | `upcase`     | none                 | `CAMEL_STYLE`         |
//! | `downcase`   | none                 | `camel_style`         |
//! | `camelize`   | `upper` (default)    | `CamelStyle`          |
//! | `camelize`   | `lower`              | `camelStyle`          |
//! | `underscore` | none                 | `camel_style`         |
//! | `dasherize`  | none                 | `camel-style`         |
//!
//! Several strategies can be chained with [`KeyFormat::then`]; they apply
//! left to right.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jstreamer::key_format::KeyFormat;
//!
//! let format = KeyFormat::parse("camelize", &["lower"])?;
//! assert_eq!(format.apply("camel_style"), "camelStyle");
//! # Ok::<(), jstreamer::core::JstreamerError>(())
//! ```

mod case;

use std::fmt;

use crate::core::error::find_similar;
use crate::core::{JstreamerError, Result};

/// Names accepted by [`KeyTransform::parse`].
pub const STRATEGY_NAMES: &[&str] =
    &["identity", "upcase", "downcase", "camelize", "underscore", "dasherize"];

/// Case of the first segment produced by `camelize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialCase {
    /// `camel_style` → `CamelStyle`
    #[default]
    Upper,
    /// `camel_style` → `camelStyle`
    Lower,
}

/// A single key-naming strategy with its arguments resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransform {
    /// Keys pass through unchanged.
    Identity,
    /// Keys are upper-cased.
    Upcase,
    /// Keys are lower-cased.
    Downcase,
    /// `snake_case` keys become `CamelCase` or `camelCase`.
    Camelize(InitialCase),
    /// `CamelCase` or `dashed-keys` become `snake_case`.
    Underscore,
    /// Underscores become dashes.
    Dasherize,
}

impl KeyTransform {
    /// Resolve a strategy name and its arguments.
    ///
    /// # Errors
    ///
    /// - [`JstreamerError::UnknownKeyStrategy`] when `strategy` is not one of
    ///   [`STRATEGY_NAMES`]
    /// - [`JstreamerError::InvalidKeyStrategyArgument`] when an argument is not
    ///   understood by the strategy
    pub fn parse<S: AsRef<str>>(strategy: &str, args: &[S]) -> Result<Self> {
        let transform = match strategy {
            "identity" => Self::Identity,
            "upcase" => Self::Upcase,
            "downcase" => Self::Downcase,
            "underscore" => Self::Underscore,
            "dasherize" => Self::Dasherize,
            "camelize" => {
                let mut initial = InitialCase::default();
                for arg in args {
                    initial = match arg.as_ref() {
                        "lower" => InitialCase::Lower,
                        "upper" => InitialCase::Upper,
                        other => {
                            return Err(JstreamerError::InvalidKeyStrategyArgument {
                                strategy: strategy.to_string(),
                                argument: other.to_string(),
                            });
                        }
                    };
                }
                return Ok(Self::Camelize(initial));
            }
            _ => {
                return Err(JstreamerError::UnknownKeyStrategy {
                    name: strategy.to_string(),
                    suggestions: find_similar(strategy, STRATEGY_NAMES.iter().copied()),
                });
            }
        };

        if let Some(arg) = args.first() {
            return Err(JstreamerError::InvalidKeyStrategyArgument {
                strategy: strategy.to_string(),
                argument: arg.as_ref().to_string(),
            });
        }

        Ok(transform)
    }

    /// Apply this strategy to one key.
    pub fn apply(&self, key: &str) -> String {
        match self {
            Self::Identity => key.to_string(),
            Self::Upcase => key.to_uppercase(),
            Self::Downcase => key.to_lowercase(),
            Self::Camelize(initial) => case::camelize(key, *initial),
            Self::Underscore => case::underscore(key),
            Self::Dasherize => key.replace('_', "-"),
        }
    }

    /// The strategy name this transform was parsed from.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Upcase => "upcase",
            Self::Downcase => "downcase",
            Self::Camelize(_) => "camelize",
            Self::Underscore => "underscore",
            Self::Dasherize => "dasherize",
        }
    }
}

/// An ordered chain of [`KeyTransform`]s.
///
/// The empty chain is the identity format.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyFormat {
    transforms: Vec<KeyTransform>,
}

impl KeyFormat {
    /// The format that leaves keys unchanged.
    pub const fn identity() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// Parse a single-strategy format.
    ///
    /// # Errors
    ///
    /// See [`KeyTransform::parse`].
    pub fn parse<S: AsRef<str>>(strategy: &str, args: &[S]) -> Result<Self> {
        Ok(Self::from(KeyTransform::parse(strategy, args)?))
    }

    /// Append another strategy, applied after the existing ones.
    #[must_use]
    pub fn then(mut self, transform: KeyTransform) -> Self {
        if transform != KeyTransform::Identity {
            self.transforms.push(transform);
        }
        self
    }

    /// Transform a raw key into its display form.
    pub fn apply(&self, key: &str) -> String {
        let mut iter = self.transforms.iter();
        let Some(first) = iter.next() else {
            return key.to_string();
        };
        iter.fold(first.apply(key), |acc, transform| transform.apply(&acc))
    }

    /// Whether this format leaves every key unchanged.
    pub fn is_identity(&self) -> bool {
        self.transforms.is_empty()
    }

    /// The strategies in application order.
    pub fn transforms(&self) -> &[KeyTransform] {
        &self.transforms
    }
}

impl From<KeyTransform> for KeyFormat {
    fn from(transform: KeyTransform) -> Self {
        Self::identity().then(transform)
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.transforms.is_empty() {
            return f.write_str("identity");
        }
        let names: Vec<_> = self.transforms.iter().map(KeyTransform::name).collect();
        f.write_str(&names.join(" + "))
    }
}
