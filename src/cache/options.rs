//! Per-call cache options.

use std::time::Duration;

/// Options of a `cache`, `cache_if` or `cache_collection` call.
///
/// The options reach the [`FragmentNamer`](super::FragmentNamer) unchanged;
/// `version` is appended to the derived key and `expires_in` is handed to the
/// store with every write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Do not mix a template digest into the key.
    pub skip_digest: bool,
    /// Generation string appended to the key.
    pub version: Option<String>,
    /// Entry lifetime. Falls back to the configured default.
    pub expires_in: Option<Duration>,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn skip_digest(mut self, skip: bool) -> Self {
        self.skip_digest = skip;
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub const fn expires_in(mut self, ttl: Duration) -> Self {
        self.expires_in = Some(ttl);
        self
    }
}
