use std::future::Future;

use analysis_core::AnalysisCache;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

pub const DEFAULT_TTL_SECS: i64 = 300; // 5 minutes

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Time-to-live cache keyed by request, one entry per key.
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl_secs: i64,
}

impl<V: Clone + Send + Sync> TtlCache<V> {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_secs,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        (Utc::now() - entry.cached_at).num_seconds() < self.ttl_secs
    }

    /// Drop stale entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let now = Utc::now();
        self.entries
            .retain(|_, entry| (now - entry.cached_at).num_seconds() < self.ttl_secs);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone + Send + Sync> AnalysisCache<V> for TtlCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        self.is_fresh(&entry).then(|| entry.data.clone())
    }

    fn put(&self, key: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data: value,
                cached_at: Utc::now(),
            },
        );
    }
}

/// Return the fresh entry for `key`, or run `fetch` and store its result.
///
/// Errors are passed through and never cached.
pub async fn get_or_fetch<V, C, F, Fut, E>(cache: &C, key: &str, fetch: F) -> Result<V, E>
where
    V: Clone,
    C: AnalysisCache<V> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(data) = cache.get(key) {
        tracing::debug!("Cache hit for {}", key);
        return Ok(data);
    }

    let data = fetch().await?;
    cache.put(key, data.clone());
    Ok(data)
}

/// `method:k1=v1:k2=v2` with parameters sorted by name, so argument order
/// never produces two keys for the same request.
pub fn cache_key(method: &str, params: &[(&str, String)]) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1)));

    let mut key = method.to_string();
    for (name, value) in sorted {
        key.push(':');
        key.push_str(name);
        key.push('=');
        key.push_str(value);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cache_key_is_order_independent() {
        let a = cache_key("bars", &[("symbol", "AAPL".into()), ("days", "365".into())]);
        let b = cache_key("bars", &[("days", "365".into()), ("symbol", "AAPL".into())]);
        assert_eq!(a, b);
        assert_eq!(a, "bars:days=365:symbol=AAPL");
        assert_eq!(cache_key("fundamentals", &[]), "fundamentals");
    }

    #[test]
    fn test_put_then_get() {
        let cache: TtlCache<u32> = TtlCache::new(DEFAULT_TTL_SECS);
        assert_eq!(cache.get("k"), None);
        cache.put("k", 7u32);
        assert_eq!(cache.get("k"), Some(7));
    }

    #[test]
    fn test_zero_ttl_never_serves() {
        let cache = TtlCache::new(0);
        cache.put("k", 1u32);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_purge_expired() {
        let cache = TtlCache::new(60);
        cache.put("fresh", 1u32);
        cache.entries.insert(
            "stale".to_string(),
            CacheEntry {
                data: 2,
                cached_at: Utc::now() - Duration::seconds(120),
            },
        );
        assert_eq!(cache.get("stale"), None);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_calls_producer_once() {
        let cache: TtlCache<u32> = TtlCache::new(DEFAULT_TTL_SECS);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<u32, String> = get_or_fetch(&cache, "k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            })
            .await;
            assert_eq!(value, Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: TtlCache<u32> = TtlCache::new(DEFAULT_TTL_SECS);
        let failed: Result<u32, String> = get_or_fetch(&cache, "k", || async { Err("down".to_string()) }).await;
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let ok: Result<u32, String> = get_or_fetch(&cache, "k", || async { Ok(5) }).await;
        assert_eq!(ok, Ok(5));
    }
}
