use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::entities::screener::ScreenPage;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(350);
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Cache performance statistics
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped for age or capacity
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Clone)]
struct CachedPage {
    page: ScreenPage,
    cached_at: Instant,
}

/// Bounded LRU of screen results with a fixed time-to-live
pub struct ScreenCache {
    entries: Arc<Mutex<LruCache<String, CachedPage>>>,
    stats: Arc<Mutex<CacheStats>>,
    ttl: Duration,
}

impl ScreenCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        ScreenCache {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            stats: Arc::new(Mutex::new(CacheStats::default())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for the key; expired entries are dropped on access
    pub async fn get(&self, key: &str) -> Option<ScreenPage> {
        let mut entries = self.entries.lock().await;
        let mut stats = self.stats.lock().await;

        let fresh = match entries.get(key) {
            Some(cached) if cached.cached_at.elapsed() < self.ttl => Some(cached.page.clone()),
            Some(_) => {
                entries.pop(key);
                stats.evictions += 1;
                debug!(cache_key = %key, "Expired screen result evicted");
                None
            }
            None => None,
        };

        match fresh {
            Some(page) => {
                stats.hits += 1;
                Some(page)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    pub async fn insert(&self, key: String, page: ScreenPage) {
        let mut entries = self.entries.lock().await;
        let displaced = entries.push(
            key.clone(),
            CachedPage {
                page,
                cached_at: Instant::now(),
            },
        );
        if let Some((evicted_key, _)) = displaced {
            if evicted_key != key {
                self.stats.lock().await.evictions += 1;
                debug!(cache_key = %evicted_key, "Least recently used screen result evicted");
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.lock().await.clone()
    }

    pub async fn reset_stats(&self) {
        *self.stats.lock().await = CacheStats::default();
    }
}

impl Default for ScreenCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_CAPACITY)
    }
}
