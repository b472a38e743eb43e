//! Cache manager.
//!
//! Owns the list of cached facades and runs the cross-kind operations:
//! preload, clear-all, stats and cleanup.

use std::fmt;
use std::sync::Arc;

use labbook_core::{EntityKind, LabError, LabResult, StorageError};

use super::facade::CachedRepository;
use super::store::{CacheStore, CleanupReport};
use super::traits::{CacheStats, CacheableEntity};
use crate::Repository;

/// A cached facade the manager can warm and clear.
pub trait CacheTarget: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Load `E:all` into the cache. Returns the number of entities loaded.
    fn warm(&self) -> LabResult<usize>;

    /// Drop every cached key of this kind.
    fn invalidate_all(&self) -> usize;
}

impl<E, R> CacheTarget for CachedRepository<E, R>
where
    E: CacheableEntity,
    R: Repository<E>,
{
    fn kind(&self) -> EntityKind {
        E::kind()
    }

    fn warm(&self) -> LabResult<usize> {
        CachedRepository::warm(self)
    }

    fn invalidate_all(&self) -> usize {
        CachedRepository::invalidate_all(self)
    }
}

/// Outcome of a preload. One failing kind never prevents the others.
#[derive(Debug, Default)]
pub struct PreloadReport {
    /// Kinds loaded, with their entity counts.
    pub warmed: Vec<(EntityKind, usize)>,
    /// Kinds whose repository failed.
    pub failed: Vec<(EntityKind, LabError)>,
}

impl PreloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn warmed_kinds(&self) -> Vec<EntityKind> {
        self.warmed.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn failed_kinds(&self) -> Vec<EntityKind> {
        self.failed.iter().map(|(kind, _)| *kind).collect()
    }
}

/// Cross-kind operations over one shared [`CacheStore`].
pub struct CacheManager {
    cache: Arc<CacheStore>,
    targets: Vec<Arc<dyn CacheTarget>>,
}

impl CacheManager {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self {
            cache,
            targets: Vec::new(),
        }
    }

    pub fn register(&mut self, target: Arc<dyn CacheTarget>) {
        self.targets.push(target);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_target(mut self, target: Arc<dyn CacheTarget>) -> Self {
        self.register(target);
        self
    }

    pub fn kinds(&self) -> Vec<EntityKind> {
        self.targets.iter().map(|t| t.kind()).collect()
    }

    /// Warm `E:all` for every registered kind, one scoped thread per kind.
    pub fn preload(&self) -> PreloadReport {
        let results: Vec<(EntityKind, LabResult<usize>)> = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .targets
                .iter()
                .map(|target| {
                    let target = target.as_ref();
                    (target.kind(), scope.spawn(move || target.warm()))
                })
                .collect();

            handles
                .into_iter()
                .map(|(kind, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(LabError::Storage(StorageError::Unavailable {
                            reason: format!("preload worker for {} panicked", kind),
                        }))
                    });
                    (kind, result)
                })
                .collect()
        });

        let mut report = PreloadReport::default();
        for (kind, result) in results {
            match result {
                Ok(count) => report.warmed.push((kind, count)),
                Err(e) => {
                    tracing::warn!(kind = %kind, error = %e, "Cache preload failed");
                    report.failed.push((kind, e));
                }
            }
        }

        tracing::info!(
            warmed = report.warmed.len(),
            failed = report.failed.len(),
            "Cache preload finished"
        );
        report
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cleanup(&self) -> CleanupReport {
        self.cache.cleanup()
    }

    /// Invalidate every registered kind. Returns the number of keys removed.
    pub fn clear_all(&self) -> usize {
        self.targets.iter().map(|t| t.invalidate_all()).sum()
    }

    /// Remove every namespaced entry, registered kind or not.
    pub fn flush(&self) -> usize {
        self.cache.clear()
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("kinds", &self.kinds())
            .finish_non_exhaustive()
    }
}
