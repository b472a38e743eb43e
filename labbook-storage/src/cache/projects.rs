//! Cached projects and their cross-kind stats.

use labbook_core::{EntityId, EntityKind, LabResult, Project, ProjectStats};

use super::facade::CachedRepository;
use super::keys::CacheKey;
use crate::ProjectRepository;

/// Projects facade. Medium TTL tier.
pub type CachedProjectRepository<R> = CachedRepository<Project, R>;

impl<R: ProjectRepository> CachedRepository<Project, R> {
    /// Aggregate counters for `project_id`, cached under `projects:stats:<id>`.
    ///
    /// Every child kind's writes invalidate this key, so a cached value never
    /// outlives a change to the project's contents.
    pub fn get_stats(&self, project_id: EntityId) -> LabResult<ProjectStats> {
        self.cached(&CacheKey::stats(EntityKind::Project, project_id), || {
            self.repository().stats(project_id)
        })
    }
}
