//! Generic configuration parsing utilities.
//!
//! Synchronous counterpart of [`RenderConfig::load_from`](super::RenderConfig::load_from)
//! for any `DeserializeOwned` type, with the file path attached to every
//! error.
//!
//! Example error output:
//! ```text
//! Failed to parse config file: /path/to/jstreamer.toml
//! Caused by:
//!     invalid type: string "yes", expected a boolean
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use jstreamer::config::{RenderConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: RenderConfig = parse_config(Path::new("jstreamer.toml"))?;
/// println!("Caching enabled: {}", config.perform_caching);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails when the file cannot be read or its content does not deserialize
/// into `T`. Unlike `RenderConfig::load_from` no validation is applied.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
