//! Key/value cache used for recommendation results
//!
//! ```text
//! CacheService                  <- typed JSON, best-effort
//!   └── Arc<dyn CacheBackend>
//!         ├── RedisCache        <- ConnectionManager, SCAN for patterns
//!         ├── MemoryCache       <- DashMap with per-entry expiry
//!         └── NoOpCache         <- always miss
//! ```
//!
//! Cache failures are logged and never surface to callers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::CacheConfig;

const SCAN_BATCH_SIZE: usize = 100;
const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

#[async_trait]
pub trait CacheBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete every key matching a glob pattern, returning how many were removed
    async fn clear_pattern(&self, pattern: &str) -> CacheResult<u64>;
}

// ============================================================================
// Redis
// ============================================================================

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn clear_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let removed: u64 = conn.del(&keys).await?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(deleted)
    }
}

// ============================================================================
// In-process
// ============================================================================

/// In-process cache for local development and tests
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            let (value, expires_at) = entry.value();
            if *expires_at > now {
                return Ok(Some(value.clone()));
            }
        }
        self.entries.remove_if(key, |_, (_, expires_at)| *expires_at <= now);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        // Prune expired entries on every write
        let now = Instant::now();
        self.entries.retain(|_, (_, expires_at)| *expires_at > now);
        self.entries
            .insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(())
    }

    async fn clear_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let before = self.entries.len();
        self.entries.retain(|key, _| !glob_match(pattern, key));
        Ok(before.saturating_sub(self.entries.len()) as u64)
    }
}

/// Redis-style glob supporting `*` and `?`
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|c| *c == '*')
}

// ============================================================================
// Disabled
// ============================================================================

pub struct NoOpCache;

#[async_trait]
impl CacheBackend for NoOpCache {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn clear_pattern(&self, _pattern: &str) -> CacheResult<u64> {
        Ok(0)
    }
}

// ============================================================================
// Service
// ============================================================================

#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
    default_ttl: Duration,
}

impl CacheService {
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: Duration) -> Self {
        Self { backend, default_ttl }
    }

    /// Build the configured backend. An unreachable Redis degrades to no caching.
    pub async fn connect(config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        let backend: Arc<dyn CacheBackend> = match config.backend.as_str() {
            "redis" => {
                let url = config.redis_url();
                match tokio::time::timeout(REDIS_CONNECT_TIMEOUT, RedisCache::connect(&url)).await {
                    Ok(Ok(cache)) => {
                        tracing::info!(
                            "Connected to Redis at {}:{}/{}",
                            config.host,
                            config.port,
                            config.db
                        );
                        Arc::new(cache)
                    },
                    Ok(Err(e)) => {
                        tracing::warn!("Redis unavailable ({}), caching disabled", e);
                        Arc::new(NoOpCache)
                    },
                    Err(_) => {
                        tracing::warn!(
                            "Redis connect timed out after {:?}, caching disabled",
                            REDIS_CONNECT_TIMEOUT
                        );
                        Arc::new(NoOpCache)
                    },
                }
            },
            "memory" => Arc::new(MemoryCache::new()),
            _ => Arc::new(NoOpCache),
        };

        tracing::info!("Cache backend: {}", backend.name());
        Self::new(backend, ttl)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache get {} failed: {}", key, e);
                return None;
            },
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            },
        }
    }

    /// Store a value under the service's default TTL
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Cache set {} skipped: {}", key, CacheError::from(e));
                return;
            },
        };

        if let Err(e) = self.backend.set(key, &raw, self.default_ttl).await {
            tracing::warn!("Cache set {} failed: {}", key, e);
        }
    }

    pub async fn clear_pattern(&self, pattern: &str) -> u64 {
        match self.backend.clear_pattern(pattern).await {
            Ok(deleted) => {
                tracing::debug!("Cleared {} cache keys matching {}", deleted, pattern);
                deleted
            },
            Err(e) => {
                tracing::warn!("Cache clear {} failed: {}", pattern, e);
                0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_service(ttl: Duration) -> CacheService {
        CacheService::new(Arc::new(MemoryCache::new()), ttl)
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("recommendations:*", "recommendations:genre=any:limit=10"));
        assert!(glob_match("recommendations:*", "recommendations:"));
        assert!(!glob_match("recommendations:*", "books:1"));
        assert!(glob_match("a?c", "abc"));
        assert!(glob_match("*:limit=*", "recommendations:genre=x:limit=5"));
        assert!(!glob_match("abc", "abcd"));
    }

    #[tokio::test]
    async fn test_memory_roundtrip_and_overwrite() {
        let cache = memory_service(Duration::from_secs(60));
        cache.set_json("k", &vec![1, 2, 3]).await;

        let value: Option<Vec<i32>> = cache.get_json("k").await;
        assert_eq!(value, Some(vec![1, 2, 3]));

        cache.set_json("k", &vec![4]).await;
        let value: Option<Vec<i32>> = cache.get_json("k").await;
        assert_eq!(value, Some(vec![4]));
    }

    #[tokio::test]
    async fn test_memory_entries_expire() {
        let cache = memory_service(Duration::from_millis(20));
        cache.set_json("k", "v").await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        let value: Option<String> = cache.get_json("k").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_memory_set_prunes_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("stale:a", "1", Duration::from_millis(10)).await.unwrap();
        cache.set("stale:b", "2", Duration::from_millis(10)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        cache.set("fresh", "3", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.entries.len(), 1);
        assert!(cache.entries.contains_key("fresh"));
    }

    #[tokio::test]
    async fn test_clear_pattern_only_removes_matches() {
        let cache = memory_service(Duration::from_secs(60));
        cache.set_json("recommendations:genre=any:limit=10", &1).await;
        cache.set_json("recommendations:genre=sci-fi:limit=5", &2).await;
        cache.set_json("other:key", &3).await;

        assert_eq!(cache.clear_pattern("recommendations:*").await, 2);
        assert_eq!(cache.get_json::<i32>("other:key").await, Some(3));
        assert_eq!(cache.get_json::<i32>("recommendations:genre=any:limit=10").await, None);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = memory_service(Duration::from_secs(60));
        cache.set_json("k", "not a number").await;
        assert_eq!(cache.get_json::<i64>("k").await, None);
    }

    #[tokio::test]
    async fn test_noop_always_misses() {
        let cache = CacheService::new(Arc::new(NoOpCache), Duration::from_secs(60));
        cache.set_json("k", &1).await;
        assert_eq!(cache.get_json::<i32>("k").await, None);
        assert_eq!(cache.clear_pattern("*").await, 0);
        assert_eq!(cache.backend_name(), "none");
    }

    #[tokio::test]
    async fn test_connect_falls_back_when_redis_unreachable() {
        let config = CacheConfig {
            backend: "redis".to_string(),
            host: "127.0.0.1".to_string(),
            port: 1,
            ..CacheConfig::default()
        };
        let cache = CacheService::connect(&config).await;
        assert_eq!(cache.backend_name(), "none");

        let config = CacheConfig { backend: "memory".to_string(), ..CacheConfig::default() };
        assert_eq!(CacheService::connect(&config).await.backend_name(), "memory");
    }
}
