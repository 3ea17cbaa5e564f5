//! Global constants used throughout the jstreamer codebase.
//!
//! Cache key layout and suggestion thresholds live here so the cache and
//! error modules agree on them.

/// Namespace prefixed to every expanded cache key unless configured otherwise.
pub const DEFAULT_CACHE_NAMESPACE: &str = "jstreamer";

/// Separator between the parts of an expanded cache key.
pub const CACHE_KEY_SEPARATOR: &str = "/";

/// Number of hex characters of a template digest kept in fragment names.
pub const TEMPLATE_DIGEST_LENGTH: usize = 32;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
/// This represents a 50% similarity threshold for name suggestions.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Maximum number of "did you mean" suggestions attached to an error.
pub const MAX_SUGGESTIONS: usize = 3;
