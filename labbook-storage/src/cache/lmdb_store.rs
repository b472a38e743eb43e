//! LMDB-backed key-value store.
//!
//! Uses the heed crate (Rust bindings for LMDB) to keep the session cache in a
//! memory-mapped file instead of process memory. Keys and values are UTF-8
//! strings, matching the [`KeyValueStore`] contract.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses:
//! - Read transactions for `get_item`, `len` and `key`
//! - Write transactions for `set_item` and `remove_item`

use std::path::Path;

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};

use super::error::CacheError;
use super::kv::KeyValueStore;

/// LMDB-backed string store.
///
/// # Example
///
/// ```ignore
/// use labbook_storage::cache::{CacheStore, LmdbStore};
///
/// let store = LmdbStore::open("/tmp/labbook-cache", 64)?;
/// let cache = CacheStore::new(Arc::new(store), CacheConfig::default());
/// ```
pub struct LmdbStore {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Str, Str>,
}

impl LmdbStore {
    /// Open (or create) an LMDB store.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the map; writes past it fail with
    ///   [`CacheError::QuotaExceeded`]
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, CacheError> {
        let map_size = max_size_mb.checked_mul(1024 * 1024).ok_or_else(|| {
            CacheError::Store(format!("map size of {} MiB overflows usize", max_size_mb))
        })?;
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path.as_ref())
        }?;

        let mut wtxn = env.write_txn()?;
        let db: Database<Str, Str> = env.create_database(&mut wtxn, None)?;
        wtxn.commit()?;

        Ok(Self { env, db })
    }
}

impl KeyValueStore for LmdbStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        let rtxn = self.env.read_txn()?;
        let value = self.db.get(&rtxn, key)?.map(str::to_owned);
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut wtxn = self.env.write_txn()?;
        self.db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<bool, CacheError> {
        let mut wtxn = self.env.write_txn()?;
        let removed = self.db.delete(&mut wtxn, key)?;
        wtxn.commit()?;
        Ok(removed)
    }

    fn len(&self) -> Result<usize, CacheError> {
        let rtxn = self.env.read_txn()?;
        let len = self.db.len(&rtxn)?;
        Ok(len as usize)
    }

    fn key(&self, index: usize) -> Result<Option<String>, CacheError> {
        let rtxn = self.env.read_txn()?;
        let mut iter = self.db.iter(&rtxn)?;
        match iter.nth(index) {
            Some(entry) => {
                let (key, _) = entry?;
                Ok(Some(key.to_owned()))
            }
            None => Ok(None),
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        // One transaction instead of one per index.
        let rtxn = self.env.read_txn()?;
        let mut keys = Vec::new();
        for entry in self.db.prefix_iter(&rtxn, prefix)? {
            let (key, _) = entry?;
            keys.push(key.to_owned());
        }
        Ok(keys)
    }
}
