//! Cache-aside decorator over an authoritative repository.
//!
//! Reads consult the cache first and populate it on a miss. Writes go to the
//! repository first; only after it succeeds are stale keys invalidated and
//! the fresh entity cached. Repository errors pass through untouched and a
//! failed write changes nothing in the cache.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use labbook_core::{EntityId, EntityKind, LabResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::invalidation::{ChangeEvent, Invalidator};
use super::keys::CacheKey;
use super::store::CacheStore;
use super::traits::CacheableEntity;
use crate::Repository;

/// Caching wrapper with the same contract as the repository it wraps.
pub struct CachedRepository<E, R>
where
    E: CacheableEntity,
    R: Repository<E>,
{
    repo: Arc<R>,
    cache: Arc<CacheStore>,
    invalidator: Invalidator,
    ttl: Duration,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> CachedRepository<E, R>
where
    E: CacheableEntity,
    R: Repository<E>,
{
    /// Wrap `repo`, caching with the TTL tier of `E`'s kind.
    pub fn new(repo: Arc<R>, cache: Arc<CacheStore>) -> Self {
        let ttl = cache.ttl_for(E::kind().ttl_tier());
        Self {
            invalidator: Invalidator::new(cache.clone()),
            repo,
            cache,
            ttl,
            _entity: PhantomData,
        }
    }

    /// Override the tier TTL for every entry this facade writes.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn kind(&self) -> EntityKind {
        E::kind()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    /// Serve `key` from the cache, or compute it with `load` and cache the result.
    pub(crate) fn cached<T, F>(&self, key: &CacheKey, load: F) -> LabResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> LabResult<T>,
    {
        if let Some(hit) = self.cache.get::<T>(key.as_str()) {
            return Ok(hit);
        }
        let value = load()?;
        self.cache.set(key.as_str(), &value, Some(self.ttl));
        Ok(value)
    }

    pub fn get_all(&self) -> LabResult<Vec<E>> {
        self.cached(&CacheKey::all(E::kind()), || self.repo.get_all())
    }

    /// Missing entities are not cached, so a later create is seen at once.
    pub fn get_by_id(&self, id: EntityId) -> LabResult<Option<E>> {
        let key = CacheKey::by_id(E::kind(), id);
        if let Some(hit) = self.cache.get::<E>(key.as_str()) {
            return Ok(Some(hit));
        }
        let found = self.repo.get_by_id(id)?;
        if let Some(entity) = &found {
            self.cache.set(key.as_str(), entity, Some(self.ttl));
        }
        Ok(found)
    }

    pub fn get_by_parent(&self, project_id: EntityId) -> LabResult<Vec<E>> {
        self.cached(&CacheKey::by_parent(E::kind(), project_id), || {
            self.repo.get_by_parent(project_id)
        })
    }

    pub fn create(&self, draft: E::Draft) -> LabResult<E> {
        let created = self.repo.create(draft)?;
        self.invalidator.on_created(&created);
        self.store_entity(&created);
        Ok(created)
    }

    pub fn update(&self, id: EntityId, patch: E::Patch) -> LabResult<Option<E>> {
        let before = self.repo.get_by_id(id)?;
        let updated = self.repo.update(id, patch)?;
        if let Some(after) = &updated {
            self.invalidator.on_updated(before.as_ref(), after);
            self.store_entity(after);
        }
        Ok(updated)
    }

    pub fn delete(&self, id: EntityId) -> LabResult<bool> {
        let before = self.repo.get_by_id(id)?;
        let deleted = self.repo.delete(id)?;
        if deleted {
            match &before {
                Some(entity) => {
                    self.invalidator.on_deleted(entity);
                }
                None => {
                    // Parents unknown; drop what the id alone identifies
                    self.invalidator
                        .on_change(&ChangeEvent::new(E::kind()).with_id(id));
                }
            }
        }
        Ok(deleted)
    }

    fn store_entity(&self, entity: &E) {
        let key = CacheKey::by_id(E::kind(), entity.entity_id());
        self.cache.set(key.as_str(), entity, Some(self.ttl));
    }

    /// Populate `E:all` from the repository, bypassing any cached value.
    pub fn warm(&self) -> LabResult<usize> {
        let all = self.repo.get_all()?;
        self.cache
            .set(CacheKey::all(E::kind()).as_str(), &all, Some(self.ttl));
        Ok(all.len())
    }

    /// Drop every cached key of this kind.
    pub fn invalidate_all(&self) -> usize {
        self.invalidator.invalidate_kind(E::kind())
    }
}

impl<E, R> Clone for CachedRepository<E, R>
where
    E: CacheableEntity,
    R: Repository<E>,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            cache: self.cache.clone(),
            invalidator: self.invalidator.clone(),
            ttl: self.ttl,
            _entity: PhantomData,
        }
    }
}

impl<E, R> std::fmt::Debug for CachedRepository<E, R>
where
    E: CacheableEntity,
    R: Repository<E>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRepository")
            .field("kind", &E::kind())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
