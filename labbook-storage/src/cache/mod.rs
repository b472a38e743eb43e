//! Read-through cache layer.
//!
//! A TTL cache over a synchronous key-value store, plus the invalidation
//! rules that keep cached collections and aggregates consistent with the
//! authoritative repositories.
//!
//! # Layout
//!
//! - [`KeyValueStore`] is the only I/O boundary. [`MemoryStore`] and
//!   [`LmdbStore`] implement it.
//! - [`CacheStore`] adds namespacing, per-entry TTL, a size ceiling and
//!   counters on top. It never returns an error.
//! - [`CacheKey`] renders the logical keys, [`Invalidator`] deletes the keys a
//!   mutation makes stale.
//! - [`CachedRepository`] is the cache-aside decorator; the per-kind modules
//!   add the extra queries each entity kind needs.
//! - [`CacheManager`] and [`CacheLayer`] tie the facades together.
//!
//! # Example
//!
//! ```ignore
//! let cache = Arc::new(CacheStore::in_memory(CacheConfig::default()));
//! let layer = CacheLayer::new(Arc::new(MockStorage::new()), cache);
//!
//! let record = layer.records().create(draft)?;
//! // Served from the cache on the second call
//! let all = layer.records().get_all()?;
//! let all = layer.records().get_all()?;
//! ```

pub mod clock;
pub mod entry;
pub mod error;
pub mod facade;
pub mod invalidation;
pub mod keys;
pub mod kv;
pub mod layer;
pub mod lmdb_store;
pub mod manager;
pub mod notes;
pub mod plans;
pub mod projects;
pub mod records;
pub mod samples;
pub mod sops;
pub mod store;
pub mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EntryHeader};
pub use error::CacheError;
pub use facade::CachedRepository;
pub use invalidation::{stale_keys, ChangeEvent, Invalidator, Parents};
pub use keys::{CacheKey, KeyShape};
pub use kv::{KeyValueStore, MemoryStore};
pub use layer::{CacheLayer, LabStorage};
pub use lmdb_store::LmdbStore;
pub use manager::{CacheManager, CacheTarget, PreloadReport};
pub use notes::CachedNoteRepository;
pub use plans::CachedPlanRepository;
pub use projects::CachedProjectRepository;
pub use records::CachedRecordRepository;
pub use samples::CachedSampleRepository;
pub use sops::CachedSopRepository;
pub use store::{CacheStore, CleanupReport};
pub use traits::{CacheStats, CacheableEntity};
