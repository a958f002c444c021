//! First-items previews.
//!
//! The main screen of the app shows the first few entries of every list
//! without opening it. That is a distinct capability with its own access
//! pattern (tiny limited reads, once per list per screen), so it lives
//! behind its own trait instead of widening the core store surface;
//! callers that only persist lists never see it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::config::PreviewCacheConfig;
use crate::error::StoreResult;
use crate::model::ListItem;

/// Capability to fetch the first entries of a list without loading it
/// fully.
#[async_trait]
pub trait ListPreviews {
    /// First `take` non-blank items of `(user_id, list_id)`, in list
    /// order.
    ///
    /// Results may be served from a short-lived cache; a preview cached
    /// for a smaller `take` can satisfy a larger one with fewer items.
    ///
    /// # Errors
    /// Same failure surface as [`crate::store::ListStore::load`].
    async fn first_items(
        &self,
        user_id: &str,
        list_id: &str,
        take: usize,
    ) -> StoreResult<Vec<ListItem>>;
}

/// Cache entry with an absolute expiry.
#[derive(Clone)]
struct CacheEntry {
    items: Vec<ListItem>,
    expires_at: Instant,
}

/// Bounded TTL cache for list previews, keyed by `(user_id, list_id)`.
pub struct PreviewCache {
    config: PreviewCacheConfig,
    entries: Arc<DashMap<(String, String), CacheEntry>>,
}

impl PreviewCache {
    /// Create a cache with the given tuning.
    #[must_use]
    pub fn new(config: PreviewCacheConfig) -> Self {
        Self {
            config,
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Get a cached preview, dropping it if expired.
    #[must_use]
    pub fn get(&self, user_id: &str, list_id: &str) -> Option<Vec<ListItem>> {
        if !self.config.enabled {
            return None;
        }

        let key = (user_id.to_string(), list_id.to_string());
        self.entries.get(&key).and_then(|entry| {
            if entry.expires_at <= Instant::now() {
                drop(entry);
                self.entries.remove(&key);
                None
            } else {
                Some(entry.items.clone())
            }
        })
    }

    /// Cache a preview.
    pub fn set(&self, user_id: &str, list_id: &str, items: &[ListItem]) {
        if !self.config.enabled {
            return;
        }

        self.enforce_max_entries();

        let ttl = Duration::from_secs(self.config.ttl_seconds);
        self.entries.insert(
            (user_id.to_string(), list_id.to_string()),
            CacheEntry {
                items: items.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop the cached preview of one list.
    ///
    /// Called on every save and delete so previews never outlive the
    /// data they summarize.
    pub fn invalidate(&self, user_id: &str, list_id: &str) {
        self.entries
            .remove(&(user_id.to_string(), list_id.to_string()));
    }

    fn enforce_max_entries(&self) {
        if self.entries.len() < self.config.max_entries {
            return;
        }

        // Expired entries first; if still at capacity, start over.
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        if self.entries.len() >= self.config.max_entries {
            self.entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(texts: &[&str]) -> Vec<ListItem> {
        texts.iter().map(|t| ListItem::new(*t, false)).collect()
    }

    #[test]
    fn test_set_get_invalidate() {
        let cache = PreviewCache::new(PreviewCacheConfig::default());
        assert!(cache.get("u1", "l1").is_none());

        cache.set("u1", "l1", &items(&["Milk", "Eggs"]));
        assert_eq!(cache.get("u1", "l1"), Some(items(&["Milk", "Eggs"])));
        assert!(cache.get("u1", "l2").is_none());

        cache.invalidate("u1", "l1");
        assert!(cache.get("u1", "l1").is_none());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = PreviewCache::new(PreviewCacheConfig::disabled());
        cache.set("u1", "l1", &items(&["Milk"]));
        assert!(cache.get("u1", "l1").is_none());
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let config = PreviewCacheConfig {
            enabled: true,
            ttl_seconds: 0,
            max_entries: 16,
        };
        let cache = PreviewCache::new(config);
        cache.set("u1", "l1", &items(&["Milk"]));
        assert!(cache.get("u1", "l1").is_none());
    }

    #[test]
    fn test_max_entries_bound() {
        let config = PreviewCacheConfig {
            enabled: true,
            ttl_seconds: 3600,
            max_entries: 4,
        };
        let cache = PreviewCache::new(config);
        for i in 0..10 {
            cache.set("u1", &format!("l{i}"), &items(&["x"]));
        }
        assert!(cache.entries.len() <= 4);
    }
}
