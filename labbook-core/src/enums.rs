//! Enum types for labbook entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY KINDS
// ============================================================================

/// Entity kind discriminator. Each kind owns one cache key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Project,
    Record,
    Note,
    Sop,
    Plan,
    Sample,
}

impl EntityKind {
    /// Every entity kind, in preload order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Project,
        EntityKind::Record,
        EntityKind::Note,
        EntityKind::Sop,
        EntityKind::Plan,
        EntityKind::Sample,
    ];

    /// Namespace segment used as the first component of every cache key.
    pub fn namespace(&self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Record => "records",
            EntityKind::Note => "notes",
            EntityKind::Sop => "sops",
            EntityKind::Plan => "plans",
            EntityKind::Sample => "samples",
        }
    }

    /// TTL tier for cached collections of this kind.
    ///
    /// Records and notes are edited constantly; SOPs almost never change.
    pub fn ttl_tier(&self) -> TtlTier {
        match self {
            EntityKind::Record | EntityKind::Note => TtlTier::Short,
            EntityKind::Project | EntityKind::Plan | EntityKind::Sample => TtlTier::Medium,
            EntityKind::Sop => TtlTier::Long,
        }
    }

    /// Whether entities of this kind can belong to a project.
    pub fn is_project_scoped(&self) -> bool {
        !matches!(self, EntityKind::Project)
    }
}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            EntityKind::Project => "Project",
            EntityKind::Record => "Record",
            EntityKind::Note => "Note",
            EntityKind::Sop => "Sop",
            EntityKind::Plan => "Plan",
            EntityKind::Sample => "Sample",
        };
        write!(f, "{}", value)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "project" | "projects" => Ok(EntityKind::Project),
            "record" | "records" | "experimentrecord" => Ok(EntityKind::Record),
            "note" | "notes" | "experimentnote" => Ok(EntityKind::Note),
            "sop" | "sops" => Ok(EntityKind::Sop),
            "plan" | "plans" | "experimentplan" => Ok(EntityKind::Plan),
            "sample" | "samples" => Ok(EntityKind::Sample),
            _ => Err(format!("Invalid EntityKind: {}", s)),
        }
    }
}

/// Cache lifetime tier. The concrete durations live in `CacheConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TtlTier {
    Short,
    Medium,
    Long,
}

// ============================================================================
// DOMAIN STATUS ENUMS
// ============================================================================

/// Lifecycle of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Archived,
}

/// Progress of an experiment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Failed,
}

/// Progress of an experiment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

/// Availability of a physical sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    #[default]
    Available,
    InUse,
    Depleted,
    Disposed,
}

/// What happened to a sample in a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleAction {
    Created,
    Updated,
    Used,
    Moved,
    Disposed,
}

impl fmt::Display for SampleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SampleAction::Created => "created",
            SampleAction::Updated => "updated",
            SampleAction::Used => "used",
            SampleAction::Moved => "moved",
            SampleAction::Disposed => "disposed",
        };
        write!(f, "{}", value)
    }
}
