//! Cache traits and statistics.
//!
//! Defines what the cache needs to know about an entity in order to key it
//! and to invalidate everything that aggregates over it.

use labbook_core::{
    EntityId, EntityKind, ExperimentNote, ExperimentPlan, ExperimentRecord, NoteDraft, NotePatch,
    PlanDraft, PlanPatch, Project, ProjectDraft, ProjectPatch, RecordDraft, RecordPatch, Sample,
    SampleDraft, SamplePatch, Sop, SopDraft, SopPatch,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::invalidation::Parents;

// ============================================================================
// CACHEABLE ENTITY TRAIT
// ============================================================================

/// Trait for entities that can be cached.
///
/// The cache stores whole snapshots, so entities must round-trip through
/// serde. `Draft` and `Patch` are the create and update payloads the
/// authoritative repository accepts for this kind.
pub trait CacheableEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Draft: Send;
    type Patch: Send;

    /// Get the entity kind.
    fn kind() -> EntityKind;

    /// Get the entity's unique ID.
    fn entity_id(&self) -> EntityId;

    /// Owning project, if any.
    fn project_id(&self) -> Option<EntityId>;

    /// Every parent dimension cached collections are keyed by.
    fn parents(&self) -> Parents {
        Parents {
            project: self.project_id(),
            related_record: None,
        }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of namespaced entries currently in the store.
    pub total_items: usize,
    /// Sum of serialized entry lengths in bytes.
    pub total_size: usize,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Entries removed because their TTL elapsed.
    pub expirations: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
    /// Absorbed store and decoding failures.
    pub errors: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// IMPLEMENTATIONS FOR LABBOOK ENTITIES
// ============================================================================

impl CacheableEntity for Project {
    type Draft = ProjectDraft;
    type Patch = ProjectPatch;

    fn kind() -> EntityKind {
        EntityKind::Project
    }

    fn entity_id(&self) -> EntityId {
        self.project_id
    }

    fn project_id(&self) -> Option<EntityId> {
        // A project is not scoped by another project
        None
    }
}

impl CacheableEntity for ExperimentRecord {
    type Draft = RecordDraft;
    type Patch = RecordPatch;

    fn kind() -> EntityKind {
        EntityKind::Record
    }

    fn entity_id(&self) -> EntityId {
        self.record_id
    }

    fn project_id(&self) -> Option<EntityId> {
        self.project_id
    }
}

impl CacheableEntity for ExperimentNote {
    type Draft = NoteDraft;
    type Patch = NotePatch;

    fn kind() -> EntityKind {
        EntityKind::Note
    }

    fn entity_id(&self) -> EntityId {
        self.note_id
    }

    fn project_id(&self) -> Option<EntityId> {
        self.project_id
    }

    fn parents(&self) -> Parents {
        Parents {
            project: self.project_id,
            related_record: self.related_record_id,
        }
    }
}

impl CacheableEntity for Sop {
    type Draft = SopDraft;
    type Patch = SopPatch;

    fn kind() -> EntityKind {
        EntityKind::Sop
    }

    fn entity_id(&self) -> EntityId {
        self.sop_id
    }

    fn project_id(&self) -> Option<EntityId> {
        self.project_id
    }
}

impl CacheableEntity for ExperimentPlan {
    type Draft = PlanDraft;
    type Patch = PlanPatch;

    fn kind() -> EntityKind {
        EntityKind::Plan
    }

    fn entity_id(&self) -> EntityId {
        self.plan_id
    }

    fn project_id(&self) -> Option<EntityId> {
        self.project_id
    }
}

impl CacheableEntity for Sample {
    type Draft = SampleDraft;
    type Patch = SamplePatch;

    fn kind() -> EntityKind {
        EntityKind::Sample
    }

    fn entity_id(&self) -> EntityId {
        self.sample_id
    }

    fn project_id(&self) -> Option<EntityId> {
        self.project_id
    }
}
