//! Labbook Core - Entity Types
//!
//! Pure data structures for the laboratory record-keeping domain, plus the
//! shared error and configuration types. All other crates depend on this.

pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;

pub use config::{CacheConfig, DEFAULT_NAMESPACE};
pub use entities::{
    percent, ExperimentNote, ExperimentPlan, ExperimentRecord, NoteDraft, NotePatch, PlanDraft,
    PlanPatch, PlanStats, PlanStep, Project, ProjectDraft, ProjectPatch, ProjectStats,
    RecordDraft, RecordPatch, Sample, SampleDraft, SampleHistory, SamplePatch, Sop, SopDraft,
    SopPatch,
};
pub use enums::{
    EntityKind, PlanStatus, ProjectStatus, RecordStatus, SampleAction, SampleStatus, TtlTier,
};
pub use error::{ConfigError, LabError, LabResult, StorageError, ValidationError};
pub use identity::{new_entity_id, now, DurationMs, EntityId, Timestamp};
