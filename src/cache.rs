use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use crate::bucket::Histogram;
use crate::metrics::CACHE_SIZE;
use crate::models::SearchOptions;

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub histogram: Histogram,
    pub created_at: Instant,
}

impl CacheEntry {
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            created_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

// Drop entries older than ttl and refresh the size gauge
pub fn evict_expired(cache: &DashMap<String, CacheEntry>, ttl: Duration) {
    cache.retain(|_, entry| entry.is_fresh(ttl));
    CACHE_SIZE.set(cache.len() as f64);
}

// Create a cache key (hash of location + time range)
pub fn make_cache_key(options: &SearchOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(options.longitude.to_bits().to_be_bytes());
    hasher.update(options.latitude.to_bits().to_be_bytes());
    hasher.update(&options.from_date);
    // separator so ("1","23") and ("12","3") differ
    hasher.update([0u8]);
    hasher.update(&options.to_date);
    format!("{:x}", hasher.finalize())
}
