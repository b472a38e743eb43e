//! TTL cache store over a [`KeyValueStore`].
//!
//! Every public operation absorbs store and serde failures: a broken entry
//! reads as a miss, a failed write is logged and counted. Callers can treat
//! the store as infallible.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use labbook_core::{CacheConfig, TtlTier};

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, EntryHeader};
use super::error::CacheError;
use super::kv::{KeyValueStore, MemoryStore};
use super::traits::CacheStats;

/// What a `cleanup()` pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Entries past their TTL.
    pub expired: usize,
    /// Entries that could not be parsed.
    pub corrupted: usize,
    /// Entries removed to get back under `max_entries`.
    pub evicted: usize,
}

impl CleanupReport {
    pub fn total(&self) -> usize {
        self.expired + self.corrupted + self.evicted
    }
}

#[derive(Debug, Default)]
struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
    errors: AtomicU64,
}

impl CacheMetrics {
    fn bump(counter: &AtomicU64, by: usize) {
        counter.fetch_add(by as u64, Ordering::Relaxed);
    }
}

/// Namespaced TTL cache.
///
/// Physical keys are `config.namespace + logical key`; anything else in the
/// backing store is never read, counted, or removed.
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    metrics: CacheMetrics,
}

impl CacheStore {
    /// Create a cache over `store` using the wall clock.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    /// Create a cache with an explicit clock.
    ///
    /// An invalid `config` is replaced by `CacheConfig::default()`.
    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid cache config, using defaults");
                CacheConfig::default()
            }
        };
        Self {
            store,
            clock,
            config,
            metrics: CacheMetrics::default(),
        }
    }

    /// Create a cache over a fresh unbounded [`MemoryStore`].
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// TTL configured for `tier`.
    pub fn ttl_for(&self, tier: TtlTier) -> Duration {
        self.config.ttl_for(tier)
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.config.namespace, key)
    }

    /// Store `data` under `key`, then run `cleanup()`.
    ///
    /// Returns whether the entry was written. A `false` has already been
    /// logged and counted.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, data: &T, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let entry = CacheEntry::new(data, self.clock.now_millis(), ttl);
        let physical = self.physical_key(key);

        let written = match serde_json::to_string(&entry)
            .map_err(|e| CacheError::Serialization(e.to_string()))
            .and_then(|raw| self.store.set_item(&physical, &raw))
        {
            Ok(()) => true,
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(key = %key, error = %e, "Failed to write cache entry");
                false
            }
        };

        self.sweep(written.then_some(physical.as_str()));
        written
    }

    /// Read the live value under `key`.
    ///
    /// Expired and undecodable entries are deleted and read as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let physical = self.physical_key(key);
        let raw = match self.store.get_item(&physical) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.record_miss(key);
                return None;
            }
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(key = %key, error = %e, "Failed to read cache entry");
                self.record_miss(key);
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                self.remove_physical(&physical);
                self.record_miss(key);
                return None;
            }
        };

        if !entry.is_live(self.clock.now_millis()) {
            CacheMetrics::bump(&self.metrics.expirations, 1);
            self.remove_physical(&physical);
            self.record_miss(key);
            return None;
        }

        CacheMetrics::bump(&self.metrics.hits, 1);
        tracing::trace!(key = %key, "Cache hit");
        Some(entry.data)
    }

    fn record_miss(&self, key: &str) {
        CacheMetrics::bump(&self.metrics.misses, 1);
        tracing::trace!(key = %key, "Cache miss");
    }

    /// Whether a live entry exists under `key`. Applies the same expiry
    /// check as `get` without decoding the payload.
    pub fn has(&self, key: &str) -> bool {
        let physical = self.physical_key(key);
        let raw = match self.store.get_item(&physical) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(key = %key, error = %e, "Failed to read cache entry");
                return false;
            }
        };

        match EntryHeader::parse(&raw) {
            Ok(header) if header.is_live(self.clock.now_millis()) => true,
            Ok(_) => {
                CacheMetrics::bump(&self.metrics.expirations, 1);
                self.remove_physical(&physical);
                false
            }
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                self.remove_physical(&physical);
                false
            }
        }
    }

    /// Remove `key`. Removing an absent key is a no-op.
    pub fn delete(&self, key: &str) {
        self.remove_physical(&self.physical_key(key));
    }

    /// Returns whether this call removed the key. A key already gone, for
    /// instance taken by a concurrent cleanup, counts as not removed.
    fn remove_physical(&self, physical: &str) -> bool {
        match self.store.remove_item(physical) {
            Ok(removed) => removed,
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(key = %physical, error = %e, "Failed to remove cache entry");
                false
            }
        }
    }

    /// Physical keys carrying this cache's namespace.
    fn namespaced_keys(&self) -> Vec<String> {
        match self.store.keys_with_prefix(&self.config.namespace) {
            Ok(keys) => keys,
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(error = %e, "Failed to enumerate cache keys");
                Vec::new()
            }
        }
    }

    /// Read the raw value of a physical key, absorbing errors.
    fn raw_value(&self, physical: &str) -> Option<String> {
        match self.store.get_item(physical) {
            Ok(raw) => raw,
            Err(e) => {
                CacheMetrics::bump(&self.metrics.errors, 1);
                tracing::warn!(key = %physical, error = %e, "Failed to read cache entry");
                None
            }
        }
    }

    /// Delete expired and corrupted entries, then enforce the size ceiling.
    pub fn cleanup(&self) -> CleanupReport {
        self.sweep(None)
    }

    /// `cleanup`, keeping `just_written` ahead of entries written in the
    /// same millisecond.
    fn sweep(&self, just_written: Option<&str>) -> CleanupReport {
        let now = self.clock.now_millis();
        let mut report = CleanupReport::default();

        for physical in self.namespaced_keys() {
            let Some(raw) = self.raw_value(&physical) else {
                continue;
            };
            match EntryHeader::parse(&raw) {
                Ok(header) if header.is_live(now) => {}
                Ok(_) => {
                    if self.remove_physical(&physical) {
                        report.expired += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(key = %physical, error = %e, "Discarding undecodable cache entry");
                    if self.remove_physical(&physical) {
                        report.corrupted += 1;
                    }
                }
            }
        }

        CacheMetrics::bump(&self.metrics.expirations, report.expired);
        CacheMetrics::bump(&self.metrics.errors, report.corrupted);
        report.evicted = self.evict_oldest(just_written);

        if report.total() > 0 {
            tracing::debug!(
                expired = report.expired,
                corrupted = report.corrupted,
                evicted = report.evicted,
                "Cache cleanup removed entries"
            );
        }
        report
    }

    /// Delete the oldest-written entries until at most `max_entries` remain.
    ///
    /// Ordering is by write time, not by last read. Entries whose header
    /// cannot be read sort before everything else. Returns the number
    /// evicted.
    pub fn enforce_max_size(&self) -> usize {
        self.evict_oldest(None)
    }

    /// Among equal write times, `just_written` sorts last so a `set` never
    /// evicts its own entry while an older one of the same millisecond stays.
    fn evict_oldest(&self, just_written: Option<&str>) -> usize {
        let keys = self.namespaced_keys();
        if keys.len() <= self.config.max_entries {
            return 0;
        }

        let mut entries: Vec<(String, i64)> = keys
            .into_iter()
            .map(|physical| {
                let written_at = self
                    .raw_value(&physical)
                    .and_then(|raw| EntryHeader::parse(&raw).ok())
                    .map(|header| header.written_at)
                    .unwrap_or(i64::MIN);
                (physical, written_at)
            })
            .collect();
        entries.sort_by_key(|(physical, written_at)| {
            (*written_at, Some(physical.as_str()) == just_written)
        });

        let excess = entries.len() - self.config.max_entries;
        let evicted = entries
            .iter()
            .take(excess)
            .filter(|(physical, _)| self.remove_physical(physical))
            .count();

        CacheMetrics::bump(&self.metrics.evictions, evicted);
        tracing::debug!(
            evicted,
            max_entries = self.config.max_entries,
            "Evicted oldest cache entries"
        );
        evicted
    }

    /// Delete every entry whose logical key starts with `prefix`.
    pub fn delete_matching(&self, prefix: &str) -> usize {
        let physical_prefix = self.physical_key(prefix);
        let removed = self
            .namespaced_keys()
            .iter()
            .filter(|physical| physical.starts_with(&physical_prefix))
            .filter(|physical| self.remove_physical(physical))
            .count();
        tracing::debug!(prefix = %prefix, removed, "Cleared cache entries by prefix");
        removed
    }

    /// Delete every namespaced entry. Other data in the store is untouched.
    pub fn clear(&self) -> usize {
        let removed = self
            .namespaced_keys()
            .iter()
            .filter(|physical| self.remove_physical(physical))
            .count();
        tracing::debug!(removed, "Cleared cache");
        removed
    }

    /// Snapshot of the current contents and lifetime counters.
    pub fn stats(&self) -> CacheStats {
        let mut total_items = 0;
        let mut total_size = 0;
        for physical in self.namespaced_keys() {
            if let Some(raw) = self.raw_value(&physical) {
                total_items += 1;
                total_size += raw.len();
            }
        }

        CacheStats {
            total_items,
            total_size,
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            expirations: self.metrics.expirations.load(Ordering::Relaxed),
            evictions: self.metrics.evictions.load(Ordering::Relaxed),
            errors: self.metrics.errors.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;

    const NS: &str = "labbook_cache_";

    struct Harness {
        kv: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        cache: CacheStore,
    }

    fn harness(config: CacheConfig) -> Harness {
        let kv = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = CacheStore::with_clock(kv.clone(), clock.clone(), config);
        Harness { kv, clock, cache }
    }

    fn raw_entry(written_at: i64, ttl: i64) -> String {
        format!(r#"{{"data":"v","timestamp":{},"ttl":{}}}"#, written_at, ttl)
    }

    #[test]
    fn test_set_then_get() {
        let h = harness(CacheConfig::default());
        assert!(h.cache.set("records:all", &vec![1, 2, 3], None));
        assert_eq!(h.cache.get::<Vec<i32>>("records:all"), Some(vec![1, 2, 3]));
        assert!(h.kv.contains("labbook_cache_records:all").unwrap());
    }

    #[test]
    fn test_default_ttl_applies() {
        let h = harness(CacheConfig::default().with_default_ttl(Duration::from_secs(10)));
        h.cache.set("k", "v", None);
        h.clock.advance(Duration::from_secs(10));
        assert!(h.cache.has("k"));
        h.clock.advance(Duration::from_millis(1));
        assert!(!h.cache.has("k"));
    }

    #[test]
    fn test_expired_entry_is_deleted_on_read() {
        let h = harness(CacheConfig::default());
        h.cache.set("k", "v", Some(Duration::from_millis(100)));

        h.clock.advance(Duration::from_millis(100));
        assert_eq!(h.cache.get::<String>("k"), Some("v".to_string()));

        h.clock.advance(Duration::from_millis(1));
        assert_eq!(h.cache.get::<String>("k"), None);
        assert!(!h.kv.contains("labbook_cache_k").unwrap());
        assert_eq!(h.cache.stats().expirations, 1);
    }

    #[test]
    fn test_corrupted_entry_reads_as_miss_and_is_deleted() {
        let h = harness(CacheConfig::default());
        h.kv.set_item("labbook_cache_records:all", "{not json").unwrap();

        assert_eq!(h.cache.get::<Vec<i32>>("records:all"), None);
        assert!(!h.kv.contains("labbook_cache_records:all").unwrap());

        let stats = h.cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_wrong_shape_reads_as_miss() {
        let h = harness(CacheConfig::default());
        h.cache.set("k", "text", None);
        assert_eq!(h.cache.get::<Vec<u32>>("k"), None);
        assert!(!h.cache.has("k"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let h = harness(CacheConfig::default());
        h.cache.set("k", &1, None);
        h.cache.delete("k");
        h.cache.delete("k");
        assert!(!h.cache.has("k"));
    }

    #[test]
    fn test_hit_and_miss_counters() {
        let h = harness(CacheConfig::default());
        assert_eq!(h.cache.get::<i32>("k"), None);
        h.cache.set("k", &7, None);
        assert_eq!(h.cache.get::<i32>("k"), Some(7));
        assert_eq!(h.cache.get::<i32>("k"), Some(7));

        let stats = h.cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_cleanup_removes_expired_and_corrupted() {
        let h = harness(CacheConfig::default());
        h.kv.set_item(&format!("{}a", NS), &raw_entry(0, 10)).unwrap();
        h.kv.set_item(&format!("{}b", NS), "garbage").unwrap();
        h.kv.set_item(&format!("{}c", NS), &raw_entry(1_000_000, 60_000)).unwrap();

        let report = h.cache.cleanup();
        assert_eq!(
            report,
            CleanupReport {
                expired: 1,
                corrupted: 1,
                evicted: 0
            }
        );
        assert_eq!(h.kv.len().unwrap(), 1);
        assert!(h.cache.has("c"));
    }

    #[test]
    fn test_enforce_max_size_drops_oldest_writes() {
        let h = harness(CacheConfig::default().with_max_entries(3));
        for (i, written_at) in [500, 100, 400, 200, 300].iter().enumerate() {
            h.kv.set_item(&format!("{}k{}", NS, i), &raw_entry(*written_at, i64::MAX))
                .unwrap();
        }

        assert_eq!(h.cache.enforce_max_size(), 2);
        // written_at 100 (k1) and 200 (k3) are the oldest
        assert!(!h.kv.contains(&format!("{}k1", NS)).unwrap());
        assert!(!h.kv.contains(&format!("{}k3", NS)).unwrap());
        assert_eq!(h.kv.len().unwrap(), 3);
        assert_eq!(h.cache.stats().evictions, 2);
    }

    #[test]
    fn test_set_keeps_store_under_ceiling() {
        let h = harness(CacheConfig::default().with_max_entries(2));
        for key in ["a", "b", "c"] {
            h.cache.set(key, key, None);
            h.clock.advance(Duration::from_millis(1));
        }
        assert!(!h.cache.has("a"));
        assert!(h.cache.has("b"));
        assert!(h.cache.has("c"));
    }

    #[test]
    fn test_set_never_evicts_its_own_write_on_timestamp_tie() {
        let h = harness(CacheConfig::default().with_max_entries(2));
        // Frozen clock: every entry shares one written_at
        assert!(h.cache.set("b", "b", None));
        assert!(h.cache.set("c", "c", None));
        assert!(h.cache.set("a", "a", None));

        assert!(h.cache.has("a"));
        assert_eq!(h.cache.stats().total_items, 2);
        assert_eq!(h.cache.stats().evictions, 1);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let h = harness(CacheConfig::default().with_max_entries(0));
        assert_eq!(h.cache.config(), &CacheConfig::default());

        assert!(h.cache.set("k", &1, None));
        assert!(h.cache.has("k"));
    }

    #[test]
    fn test_concurrent_eviction_counts_each_key_once() {
        let h = harness(CacheConfig::default().with_max_entries(2));
        for i in 0..10 {
            h.kv.set_item(&format!("{}k{}", NS, i), &raw_entry(i, i64::MAX))
                .unwrap();
        }

        let evicted: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| h.cache.enforce_max_size()))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).sum()
        });

        assert_eq!(h.kv.len().unwrap(), 2);
        assert_eq!(evicted, 8);
        assert_eq!(h.cache.stats().evictions, 8);
    }

    #[test]
    fn test_remove_reports_only_present_keys() {
        let h = harness(CacheConfig::default());
        h.cache.set("k", &1, None);
        let physical = format!("{}k", NS);

        assert!(h.cache.remove_physical(&physical));
        assert!(!h.cache.remove_physical(&physical));
        assert_eq!(h.cache.clear(), 0);
    }

    #[test]
    fn test_non_namespaced_data_is_never_touched() {
        let h = harness(CacheConfig::default().with_max_entries(1));
        h.kv.set_item("user_settings", "garbage that is not an entry").unwrap();
        h.cache.set("a", &1, None);
        h.cache.set("b", &2, None);

        let stats = h.cache.stats();
        assert_eq!(stats.total_items, 1);

        h.cache.clear();
        assert_eq!(
            h.kv.get_item("user_settings").unwrap().as_deref(),
            Some("garbage that is not an entry")
        );
        assert_eq!(h.kv.len().unwrap(), 1);
    }

    #[test]
    fn test_delete_matching_prefix() {
        let h = harness(CacheConfig::default());
        h.cache.set("records:all", &1, None);
        h.cache.set("records:id:x", &2, None);
        h.cache.set("notes:all", &3, None);

        assert_eq!(h.cache.delete_matching("records:"), 2);
        assert!(!h.cache.has("records:all"));
        assert!(h.cache.has("notes:all"));
    }

    #[test]
    fn test_stats_total_size_is_serialized_bytes() {
        let h = harness(CacheConfig::default());
        h.cache.set("k", "v", None);
        let raw = h.kv.get_item("labbook_cache_k").unwrap().unwrap();
        let stats = h.cache.stats();
        assert_eq!(stats.total_items, 1);
        assert_eq!(stats.total_size, raw.len());
    }

    #[test]
    fn test_quota_exceeded_write_is_absorbed() {
        let kv = Arc::new(MemoryStore::with_quota(64));
        let cache = CacheStore::new(kv.clone(), CacheConfig::default());
        let big = "x".repeat(256);

        assert!(!cache.set("big", &big, None));
        assert_eq!(cache.get::<String>("big"), None);
        assert_eq!(cache.stats().errors, 1);
    }

    #[test]
    fn test_custom_namespace() {
        let kv = Arc::new(MemoryStore::new());
        let cache = CacheStore::new(kv.clone(), CacheConfig::default().with_namespace("other_"));
        cache.set("k", &1, None);
        assert!(kv.contains("other_k").unwrap());
        assert!(!kv.contains("labbook_cache_k").unwrap());
    }
}
