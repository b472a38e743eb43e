//! Invalidation orchestration.
//!
//! A write to the authoritative repository turns into a [`ChangeEvent`];
//! [`stale_keys`] maps that event to every cache key whose value could now be
//! wrong, and [`Invalidator`] deletes them. Updates and deletes carry the
//! pre-mutation parents so collections under an old parent are dropped too.

use std::collections::BTreeSet;
use std::sync::Arc;

use labbook_core::{EntityId, EntityKind};

use super::keys::{CacheKey, KeyShape};
use super::store::CacheStore;
use super::traits::CacheableEntity;

/// Parent dimensions an entity can be grouped by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Parents {
    /// Owning project.
    pub project: Option<EntityId>,
    /// Experiment record a note is attached to.
    pub related_record: Option<EntityId>,
}

/// A mutation of one entity kind, as seen by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: EntityKind,
    pub id: Option<EntityId>,
    pub parents: Parents,
}

impl ChangeEvent {
    /// Event with no id and no parents. Only `E:all` goes stale.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            id: None,
            parents: Parents::default(),
        }
    }

    /// Event describing the current state of `entity`.
    pub fn for_entity<E: CacheableEntity>(entity: &E) -> Self {
        Self {
            kind: E::kind(),
            id: Some(entity.entity_id()),
            parents: entity.parents(),
        }
    }

    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_project(mut self, project_id: EntityId) -> Self {
        self.parents.project = Some(project_id);
        self
    }

    pub fn with_related_record(mut self, record_id: EntityId) -> Self {
        self.parents.related_record = Some(record_id);
        self
    }
}

/// Every key that could be stale after `event`.
pub fn stale_keys(event: &ChangeEvent) -> BTreeSet<CacheKey> {
    let kind = event.kind;
    let mut keys = BTreeSet::new();
    keys.insert(CacheKey::all(kind));

    if let Some(id) = event.id {
        keys.insert(CacheKey::by_id(kind, id));
        match kind {
            EntityKind::Sample => {
                keys.insert(CacheKey::sample_history(id));
            }
            EntityKind::Project => {
                keys.insert(CacheKey::stats(EntityKind::Project, id));
            }
            _ => {}
        }
    }

    if let Some(project) = event.parents.project {
        keys.insert(CacheKey::by_parent(kind, project));
        keys.insert(CacheKey::stats(kind, project));
        // Project stats count every child kind
        if kind.is_project_scoped() {
            keys.insert(CacheKey::stats(EntityKind::Project, project));
        }
    }

    if let Some(record) = event.parents.related_record {
        keys.insert(CacheKey::new(kind, KeyShape::ByRecord(record)));
    }

    keys
}

/// Deletes stale keys from a shared [`CacheStore`].
#[derive(Debug, Clone)]
pub struct Invalidator {
    cache: Arc<CacheStore>,
}

impl Invalidator {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    /// Invalidate the keys of one event. Returns the number of keys targeted.
    pub fn on_change(&self, event: &ChangeEvent) -> usize {
        self.evict(event.kind, stale_keys(event))
    }

    pub fn on_created<E: CacheableEntity>(&self, entity: &E) -> usize {
        self.on_change(&ChangeEvent::for_entity(entity))
    }

    /// Invalidate for both the pre- and post-update state, so a moved entity
    /// leaves no stale collection under its old parents.
    pub fn on_updated<E: CacheableEntity>(&self, before: Option<&E>, after: &E) -> usize {
        let mut keys = stale_keys(&ChangeEvent::for_entity(after));
        if let Some(before) = before {
            keys.extend(stale_keys(&ChangeEvent::for_entity(before)));
        }
        self.evict(E::kind(), keys)
    }

    /// Invalidate using the entity's last known parents.
    pub fn on_deleted<E: CacheableEntity>(&self, entity: &E) -> usize {
        self.on_change(&ChangeEvent::for_entity(entity))
    }

    /// Drop every cached key of `kind`.
    pub fn invalidate_kind(&self, kind: EntityKind) -> usize {
        let removed = self.cache.delete_matching(&CacheKey::kind_prefix(kind));
        tracing::debug!(kind = %kind, removed, "Invalidated entity kind");
        removed
    }

    fn evict(&self, kind: EntityKind, keys: BTreeSet<CacheKey>) -> usize {
        for key in &keys {
            self.cache.delete(key.as_str());
        }
        tracing::debug!(kind = %kind, keys = keys.len(), "Invalidated cache keys");
        keys.len()
    }
}
