//! Cache configuration.

use std::time::Duration;

/// Configuration for result-cache persistence.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Minimum quiet period between a mutation and the write it
    /// triggers. Batches the burst of recordings that follows a fresh
    /// session into a single write.
    pub debounce: Duration,

    /// Master switch. When false every cache operation is a no-op and
    /// nothing is read or written.
    pub enabled: bool,
}

impl CacheConfig {
    /// Defaults: two-second debounce, enabled unless the
    /// `LODE_DISABLE_CACHE` environment variable is set (to anything).
    pub fn new() -> Self {
        Self {
            debounce: Duration::from_secs(2),
            enabled: std::env::var_os("LODE_DISABLE_CACHE").is_none(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}
