//! Cached experiment plans and their completion stats.

use labbook_core::{EntityId, EntityKind, ExperimentPlan, LabResult, PlanStats};

use super::facade::CachedRepository;
use super::keys::CacheKey;
use crate::Repository;

/// Plans facade. Medium TTL tier.
pub type CachedPlanRepository<R> = CachedRepository<ExperimentPlan, R>;

impl<R: Repository<ExperimentPlan>> CachedRepository<ExperimentPlan, R> {
    /// Plans belonging to `project_id`.
    pub fn get_by_project(&self, project_id: EntityId) -> LabResult<Vec<ExperimentPlan>> {
        self.get_by_parent(project_id)
    }

    /// Completion summary over the plans of `project_id`.
    pub fn get_stats(&self, project_id: EntityId) -> LabResult<PlanStats> {
        self.cached(&CacheKey::stats(EntityKind::Plan, project_id), || {
            let plans = self.get_by_parent(project_id)?;
            Ok(PlanStats::from_plans(&plans))
        })
    }
}
