//! The full cache layer over one authoritative storage object.

use std::sync::Arc;

use labbook_core::{ExperimentNote, ExperimentPlan, ExperimentRecord, Sop};

use super::facade::CachedRepository;
use super::manager::CacheManager;
use super::notes::CachedNoteRepository;
use super::plans::CachedPlanRepository;
use super::projects::CachedProjectRepository;
use super::records::CachedRecordRepository;
use super::samples::CachedSampleRepository;
use super::sops::CachedSopRepository;
use super::store::CacheStore;
use crate::{ProjectRepository, Repository, SampleRepository};

/// Storage that serves every entity kind.
pub trait LabStorage:
    ProjectRepository
    + Repository<ExperimentRecord>
    + Repository<ExperimentNote>
    + Repository<Sop>
    + Repository<ExperimentPlan>
    + SampleRepository
    + 'static
{
}

impl<S> LabStorage for S where
    S: ProjectRepository
        + Repository<ExperimentRecord>
        + Repository<ExperimentNote>
        + Repository<Sop>
        + Repository<ExperimentPlan>
        + SampleRepository
        + 'static
{
}

/// Six cached facades and a manager sharing one [`CacheStore`].
///
/// # Example
///
/// ```ignore
/// use labbook_storage::{CacheLayer, CacheStore, MockStorage};
///
/// let layer = CacheLayer::new(
///     Arc::new(MockStorage::new()),
///     Arc::new(CacheStore::in_memory(CacheConfig::default())),
/// );
/// layer.manager().preload();
/// let records = layer.records().get_all()?;
/// ```
pub struct CacheLayer<S: LabStorage> {
    storage: Arc<S>,
    cache: Arc<CacheStore>,
    projects: Arc<CachedProjectRepository<S>>,
    records: Arc<CachedRecordRepository<S>>,
    notes: Arc<CachedNoteRepository<S>>,
    sops: Arc<CachedSopRepository<S>>,
    plans: Arc<CachedPlanRepository<S>>,
    samples: Arc<CachedSampleRepository<S>>,
    manager: CacheManager,
}

impl<S: LabStorage> CacheLayer<S> {
    pub fn new(storage: Arc<S>, cache: Arc<CacheStore>) -> Self {
        let projects: Arc<CachedProjectRepository<S>> =
            Arc::new(CachedRepository::new(storage.clone(), cache.clone()));
        let records: Arc<CachedRecordRepository<S>> =
            Arc::new(CachedRepository::new(storage.clone(), cache.clone()));
        let notes: Arc<CachedNoteRepository<S>> =
            Arc::new(CachedRepository::new(storage.clone(), cache.clone()));
        let sops: Arc<CachedSopRepository<S>> =
            Arc::new(CachedRepository::new(storage.clone(), cache.clone()));
        let plans: Arc<CachedPlanRepository<S>> =
            Arc::new(CachedRepository::new(storage.clone(), cache.clone()));
        let samples: Arc<CachedSampleRepository<S>> =
            Arc::new(CachedRepository::new(storage.clone(), cache.clone()));

        let manager = CacheManager::new(cache.clone())
            .with_target(projects.clone())
            .with_target(records.clone())
            .with_target(notes.clone())
            .with_target(sops.clone())
            .with_target(plans.clone())
            .with_target(samples.clone());

        Self {
            storage,
            cache,
            projects,
            records,
            notes,
            sops,
            plans,
            samples,
            manager,
        }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn projects(&self) -> &CachedProjectRepository<S> {
        &self.projects
    }

    pub fn records(&self) -> &CachedRecordRepository<S> {
        &self.records
    }

    pub fn notes(&self) -> &CachedNoteRepository<S> {
        &self.notes
    }

    pub fn sops(&self) -> &CachedSopRepository<S> {
        &self.sops
    }

    pub fn plans(&self) -> &CachedPlanRepository<S> {
        &self.plans
    }

    pub fn samples(&self) -> &CachedSampleRepository<S> {
        &self.samples
    }

    pub fn manager(&self) -> &CacheManager {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::keys::CacheKey;
    use crate::MockStorage;
    use labbook_core::{CacheConfig, EntityKind, ProjectDraft, RecordDraft};

    fn layer() -> CacheLayer<MockStorage> {
        CacheLayer::new(
            Arc::new(MockStorage::new()),
            Arc::new(CacheStore::in_memory(CacheConfig::default())),
        )
    }

    #[test]
    fn test_manager_knows_every_kind() {
        let layer = layer();
        assert_eq!(layer.manager().kinds(), EntityKind::ALL.to_vec());
    }

    #[test]
    fn test_record_write_refreshes_project_stats() {
        let layer = layer();
        let project = layer
            .projects()
            .create(ProjectDraft {
                name: "Microscopy".to_string(),
                description: None,
            })
            .unwrap();
        let stats = layer.projects().get_stats(project.project_id).unwrap();
        assert_eq!(stats.record_count, 0);

        layer
            .records()
            .create(RecordDraft {
                project_id: Some(project.project_id),
                title: "Slide 4".to_string(),
                ..Default::default()
            })
            .unwrap();

        let stats = layer.projects().get_stats(project.project_id).unwrap();
        assert_eq!(stats.record_count, 1);
    }

    #[test]
    fn test_preload_then_flush() {
        let layer = layer();
        let report = layer.manager().preload();
        assert!(report.is_complete());
        for kind in EntityKind::ALL {
            assert!(layer.cache().has(CacheKey::all(kind).as_str()));
        }

        assert_eq!(layer.manager().flush(), 6);
        assert_eq!(layer.cache().stats().total_items, 0);
    }
}
