//! Renderer settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::{CACHE_KEY_SEPARATOR, DEFAULT_CACHE_NAMESPACE};
use crate::core::JstreamerError;
use crate::key_format::{KeyFormat, KeyTransform};

/// Environment variable naming a config file for [`RenderConfig::load_with_optional`].
pub const CONFIG_PATH_ENV: &str = "JSTREAMER_CONFIG_PATH";

/// One strategy of the default key format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFormatStep {
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl KeyFormatStep {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Settings shared by every render of a [`Renderer`](crate::document::Renderer).
///
/// ```toml
/// perform_caching = true
/// cache_namespace = "views"
/// ignore_nil = false
/// default_expires_in_secs = 300
///
/// [[key_format]]
/// strategy = "camelize"
/// args = ["lower"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether cache calls consult the store at all.
    pub perform_caching: bool,
    /// Prefix of every store key. Empty means no prefix.
    pub cache_namespace: String,
    /// Initial nil handling of the root scope.
    pub ignore_nil: bool,
    /// Key format installed on the root scope, applied in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_format: Vec<KeyFormatStep>,
    /// Lifetime of cache entries written without an explicit `expires_in`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_expires_in_secs: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            perform_caching: true,
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            ignore_nil: false,
            key_format: Vec::new(),
            default_expires_in_secs: None,
        }
    }
}

impl RenderConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid TOML or does not
    /// pass [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read render config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse render config from {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid render config in {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path`, or from [`CONFIG_PATH_ENV`] when `path` is `None`.
    ///
    /// Defaults are returned when neither names an existing file.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        match path {
            Some(path) if path.exists() => Self::load_from(&path).await,
            Some(path) => {
                tracing::debug!("No render config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Write as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize render config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write render config to {}", path.display()))
    }

    /// Check that the settings can be used by a renderer.
    ///
    /// # Errors
    ///
    /// [`JstreamerError::ConfigError`] for a namespace with surrounding
    /// separators or whitespace; the key format's own error when a strategy
    /// does not resolve.
    pub fn validate(&self) -> crate::core::Result<()> {
        let namespace = &self.cache_namespace;
        if namespace.starts_with(CACHE_KEY_SEPARATOR) || namespace.ends_with(CACHE_KEY_SEPARATOR) {
            return Err(JstreamerError::ConfigError {
                message: format!(
                    "cache_namespace '{namespace}' must not start or end with '{CACHE_KEY_SEPARATOR}'"
                ),
            });
        }
        if namespace.chars().any(char::is_whitespace) {
            return Err(JstreamerError::ConfigError {
                message: format!("cache_namespace '{namespace}' must not contain whitespace"),
            });
        }
        self.key_format().map(|_| ())
    }

    /// The configured default key format.
    pub fn key_format(&self) -> crate::core::Result<KeyFormat> {
        self.key_format.iter().try_fold(KeyFormat::identity(), |format, step| {
            Ok(format.then(KeyTransform::parse(&step.strategy, &step.args)?))
        })
    }

    pub fn default_expires_in(&self) -> Option<Duration> {
        self.default_expires_in_secs.map(Duration::from_secs)
    }
}
