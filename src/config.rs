//! Configuration for the list store.

use serde::{Deserialize, Serialize};

/// Configuration for the store and its table client.
///
/// Region, endpoint and timeout are overrides on top of the ambient AWS
/// configuration; left unset, the client uses whatever the environment
/// resolved. Passed explicitly to the constructor so tests and local
/// setups can point at a substitute backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Table holding all list rows.
    pub table_name: String,
    /// Region override.
    pub region: Option<String>,
    /// Endpoint override (e.g. DynamoDB Local).
    pub endpoint: Option<String>,
    /// Per-operation timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Preview cache tuning.
    pub preview_cache: PreviewCacheConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: "AppData".to_string(),
            region: None,
            endpoint: None,
            timeout_ms: None,
            preview_cache: PreviewCacheConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table name.
    #[must_use]
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Set a region override.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set an endpoint override.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the per-operation timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set preview cache tuning.
    #[must_use]
    pub const fn with_preview_cache(mut self, preview_cache: PreviewCacheConfig) -> Self {
        self.preview_cache = preview_cache;
        self
    }
}

/// Tuning for the first-items preview cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreviewCacheConfig {
    /// Whether preview caching is enabled.
    pub enabled: bool,
    /// TTL for cached previews (seconds).
    pub ttl_seconds: u64,
    /// Maximum number of cached lists.
    pub max_entries: usize,
}

impl Default for PreviewCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 60,
            max_entries: 256,
        }
    }
}

impl PreviewCacheConfig {
    /// A config with caching turned off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            ttl_seconds: 0,
            max_entries: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.table_name, "AppData");
        assert!(config.region.is_none());
        assert!(config.endpoint.is_none());
        assert!(config.preview_cache.enabled);
    }

    #[test]
    fn test_config_builder() {
        let config = StoreConfig::new()
            .with_table_name("ListData")
            .with_region("eu-central-1")
            .with_endpoint("http://localhost:8000")
            .with_timeout_ms(5000);

        assert_eq!(config.table_name, "ListData");
        assert_eq!(config.region.as_deref(), Some("eu-central-1"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.timeout_ms, Some(5000));
    }
}
