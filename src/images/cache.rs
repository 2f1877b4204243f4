//! In-memory cache of generated patterns
//!
//! Entries live for a fixed TTL from insertion and are evicted lazily by the
//! lookup that finds them expired.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

/// Cache key: prompt and requested dimensions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}

impl CacheKey {
    pub fn new(prompt: &str, width: u32, height: u32) -> Self {
        Self {
            prompt: prompt.to_string(),
            width,
            height,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ai::{}::{}x{}", self.prompt, self.width, self.height)
    }
}

#[derive(Debug)]
struct CacheEntry {
    data: Vec<u8>,
    inserted_at: Instant,
}

/// Concurrent TTL cache of encoded images
#[derive(Debug)]
pub struct PatternCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl PatternCache {
    /// Create an empty cache whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Look up an unexpired entry, evicting it if its TTL has passed
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.data.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock; another task may have refreshed it
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(key);
                debug!("Evicted expired cache entry {}", key);
                None
            }
            None => None,
        }
    }

    /// Store bytes under `key`, replacing any previous entry
    pub async fn insert(&self, key: CacheKey, data: Vec<u8>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                data,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired ones included until looked up
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
