//! Core entity structures
//!
//! Every entity is owned by an authoritative repository. The cache layer only
//! ever stores whole snapshots of these types.

use crate::{
    EntityId, PlanStatus, ProjectStatus, RecordStatus, SampleAction, SampleStatus, Timestamp,
    ValidationError,
};
use serde::{Deserialize, Serialize};

fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn require_patch_text(field: &str, value: Option<&String>) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

fn require_quantity(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "quantity".to_string(),
            reason: format!("must be a finite, non-negative number, got {}", value),
        });
    }
    Ok(())
}

// ============================================================================
// PROJECT
// ============================================================================

/// Project - top-level container every other entity may belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create payload for projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

/// Update payload for projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patch_text("name", self.name.as_ref())
    }
}

/// Aggregate counters for a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub project_id: EntityId,
    pub record_count: usize,
    pub note_count: usize,
    pub sop_count: usize,
    pub plan_count: usize,
    pub sample_count: usize,
    pub completed_plan_count: usize,
    /// Completed plans as a percentage of all plans (0 when there are none).
    pub completion_percent: u32,
}

// ============================================================================
// EXPERIMENT RECORD
// ============================================================================

/// A single experiment write-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub record_id: EntityId,
    pub project_id: Option<EntityId>,
    pub title: String,
    pub content: String,
    pub status: RecordStatus,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create payload for experiment records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub project_id: Option<EntityId>,
    pub title: String,
    pub content: String,
    pub status: RecordStatus,
    pub tags: Vec<String>,
}

impl RecordDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

/// Update payload for experiment records.
///
/// `project_id: Some(None)` detaches the record from its project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub project_id: Option<Option<EntityId>>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<RecordStatus>,
    pub tags: Option<Vec<String>>,
}

impl RecordPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patch_text("title", self.title.as_ref())
    }
}

// ============================================================================
// EXPERIMENT NOTE
// ============================================================================

/// Free-form note, optionally attached to a project and to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentNote {
    pub note_id: EntityId,
    pub project_id: Option<EntityId>,
    pub related_record_id: Option<EntityId>,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub project_id: Option<EntityId>,
    pub related_record_id: Option<EntityId>,
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    pub project_id: Option<Option<EntityId>>,
    pub related_record_id: Option<Option<EntityId>>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NotePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patch_text("title", self.title.as_ref())
    }
}

// ============================================================================
// SOP
// ============================================================================

/// Standard operating procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sop {
    pub sop_id: EntityId,
    pub project_id: Option<EntityId>,
    pub title: String,
    pub version: String,
    pub category: Option<String>,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SopDraft {
    pub project_id: Option<EntityId>,
    pub title: String,
    pub version: String,
    pub category: Option<String>,
    pub content: String,
}

impl SopDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("version", &self.version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SopPatch {
    pub project_id: Option<Option<EntityId>>,
    pub title: Option<String>,
    pub version: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

impl SopPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patch_text("title", self.title.as_ref())?;
        require_patch_text("version", self.version.as_ref())
    }
}

// ============================================================================
// EXPERIMENT PLAN
// ============================================================================

/// One checklist step of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub description: String,
    pub completed: bool,
}

impl PlanStep {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            completed: false,
        }
    }
}

/// Planned experiment with a step checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    pub plan_id: EntityId,
    pub project_id: Option<EntityId>,
    pub title: String,
    pub objective: Option<String>,
    pub steps: Vec<PlanStep>,
    pub status: PlanStatus,
    pub planned_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ExperimentPlan {
    pub fn is_completed(&self) -> bool {
        self.status == PlanStatus::Completed
    }

    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.completed).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub project_id: Option<EntityId>,
    pub title: String,
    pub objective: Option<String>,
    pub steps: Vec<PlanStep>,
    pub planned_date: Option<Timestamp>,
}

impl PlanDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        for step in &self.steps {
            require_text("steps.description", &step.description)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPatch {
    pub project_id: Option<Option<EntityId>>,
    pub title: Option<String>,
    pub objective: Option<String>,
    pub steps: Option<Vec<PlanStep>>,
    pub status: Option<PlanStatus>,
    pub planned_date: Option<Option<Timestamp>>,
}

impl PlanPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patch_text("title", self.title.as_ref())?;
        if let Some(steps) = &self.steps {
            for step in steps {
                require_text("steps.description", &step.description)?;
            }
        }
        Ok(())
    }
}

/// Completion summary over a set of plans.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanStats {
    pub total_plans: usize,
    pub completed_plans: usize,
    pub total_steps: usize,
    pub completed_steps: usize,
    /// Completed steps as a percentage of all steps (0 when there are none).
    pub completion_percent: u32,
}

impl PlanStats {
    pub fn from_plans(plans: &[ExperimentPlan]) -> Self {
        let total_steps: usize = plans.iter().map(|p| p.steps.len()).sum();
        let completed_steps: usize = plans.iter().map(|p| p.completed_steps()).sum();
        Self {
            total_plans: plans.len(),
            completed_plans: plans.iter().filter(|p| p.is_completed()).count(),
            total_steps,
            completed_steps,
            completion_percent: percent(completed_steps, total_steps),
        }
    }
}

/// Integer percentage, rounded down. Zero when `total` is zero.
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((part * 100) / total) as u32
    }
}

// ============================================================================
// SAMPLE
// ============================================================================

/// Physical sample tracked in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub sample_id: EntityId,
    pub project_id: Option<EntityId>,
    pub name: String,
    pub sample_type: String,
    pub quantity: f64,
    pub unit: String,
    pub location: Option<String>,
    pub status: SampleStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleDraft {
    pub project_id: Option<EntityId>,
    pub name: String,
    pub sample_type: String,
    pub quantity: f64,
    pub unit: String,
    pub location: Option<String>,
}

impl SampleDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplePatch {
    pub project_id: Option<Option<EntityId>>,
    pub name: Option<String>,
    pub sample_type: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub status: Option<SampleStatus>,
}

impl SamplePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patch_text("name", self.name.as_ref())?;
        match self.quantity {
            Some(q) => require_quantity(q),
            None => Ok(()),
        }
    }
}

/// One entry of a sample's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleHistory {
    pub history_id: EntityId,
    pub sample_id: EntityId,
    pub action: SampleAction,
    pub description: String,
    pub recorded_at: Timestamp,
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_percent_is_bounded(total in 0usize..10_000, part_seed in any::<usize>()) {
            let part = if total == 0 { 0 } else { part_seed % (total + 1) };
            let p = percent(part, total);
            prop_assert!(p <= 100);
            prop_assert_eq!(p == 100, total > 0 && part == total);
        }

        #[test]
        fn prop_draft_without_title_is_rejected(blank in "[ \t]{0,4}") {
            let draft = RecordDraft {
                title: blank,
                ..Default::default()
            };
            prop_assert!(draft.validate().is_err());
        }
    }
}
