//! Key-value store boundary.
//!
//! The cache store only ever talks to its backing storage through
//! [`KeyValueStore`], a synchronous string-to-string map with index-based
//! enumeration. Every method may fail; callers in this crate catch and log.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::error::CacheError;

/// Synchronous string key-value store.
///
/// Index-based enumeration (`len` + `key(index)`) is the only way to discover
/// keys. Indices are only stable while the store is not mutated, so callers
/// collect keys first and mutate afterwards.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove `key`. Returns whether it was present; removing an absent key
    /// is not an error.
    fn remove_item(&self, key: &str) -> Result<bool, CacheError>;

    /// Number of keys in the store, cache and non-cache alike.
    fn len(&self) -> Result<usize, CacheError>;

    /// Key at position `index`, or `None` past the end.
    fn key(&self, index: usize) -> Result<Option<String>, CacheError>;

    fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }

    /// Collect every key starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let len = self.len()?;
        let mut keys = Vec::new();
        for index in 0..len {
            match self.key(index)? {
                Some(key) if key.starts_with(prefix) => keys.push(key),
                Some(_) => {}
                None => break,
            }
        }
        Ok(keys)
    }
}

/// In-memory store with an optional byte quota.
///
/// The quota counts key plus value bytes across all keys, so a full store
/// rejects writes the way a browser session store does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes once `quota_bytes` would be exceeded.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes held (keys plus values).
    pub fn used_bytes(&self) -> Result<usize, CacheError> {
        let items = self.items.read()?;
        Ok(items.iter().map(|(k, v)| k.len() + v.len()).sum())
    }

    /// Whether `key` is physically present, regardless of its contents.
    pub fn contains(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.items.read()?.contains_key(key))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.items.read()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut items = self.items.write()?;
        if let Some(quota) = self.quota_bytes {
            let current: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = current + key.len() + value.len();
            if needed > quota {
                return Err(CacheError::QuotaExceeded(format!(
                    "{} bytes needed, quota is {}",
                    needed, quota
                )));
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.items.write()?.remove(key).is_some())
    }

    fn len(&self) -> Result<usize, CacheError> {
        Ok(self.items.read()?.len())
    }

    fn key(&self, index: usize) -> Result<Option<String>, CacheError> {
        Ok(self.items.read()?.keys().nth(index).cloned())
    }
}
