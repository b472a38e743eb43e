//! Cached samples and their history.

use labbook_core::{EntityId, LabResult, Sample, SampleHistory};

use super::facade::CachedRepository;
use super::keys::CacheKey;
use crate::SampleRepository;

/// Samples facade. Medium TTL tier.
pub type CachedSampleRepository<R> = CachedRepository<Sample, R>;

impl<R: SampleRepository> CachedRepository<Sample, R> {
    /// Samples belonging to `project_id`.
    pub fn get_by_project(&self, project_id: EntityId) -> LabResult<Vec<Sample>> {
        self.get_by_parent(project_id)
    }

    /// History of `sample_id`, cached under `samples:history:<id>`.
    pub fn get_history(&self, sample_id: EntityId) -> LabResult<Vec<SampleHistory>> {
        self.cached(&CacheKey::sample_history(sample_id), || {
            self.repository().history(sample_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::MockStorage;
    use labbook_core::{CacheConfig, SampleAction, SampleDraft, SamplePatch};
    use std::sync::Arc;

    fn facade() -> CachedSampleRepository<MockStorage> {
        CachedRepository::new(
            Arc::new(MockStorage::new()),
            Arc::new(CacheStore::in_memory(CacheConfig::default())),
        )
    }

    fn draft() -> SampleDraft {
        SampleDraft {
            name: "Lysate".to_string(),
            sample_type: "cell lysate".to_string(),
            quantity: 10.0,
            unit: "ml".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_history_refreshes_after_update() {
        let samples = facade();
        let sample = samples.create(draft()).unwrap();
        assert_eq!(samples.get_history(sample.sample_id).unwrap().len(), 1);

        samples
            .update(
                sample.sample_id,
                SamplePatch {
                    quantity: Some(4.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let history = samples.get_history(sample.sample_id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action, SampleAction::Used);
    }

    #[test]
    fn test_history_refreshes_after_delete() {
        let samples = facade();
        let sample = samples.create(draft()).unwrap();
        samples.get_history(sample.sample_id).unwrap();

        assert!(samples.delete(sample.sample_id).unwrap());
        let history = samples.get_history(sample.sample_id).unwrap();
        assert_eq!(history.last().map(|h| h.action), Some(SampleAction::Disposed));
    }

    #[test]
    fn test_get_by_project() {
        let samples = facade();
        let project = labbook_core::new_entity_id();
        samples
            .create(SampleDraft {
                project_id: Some(project),
                ..draft()
            })
            .unwrap();
        samples.create(draft()).unwrap();
        assert_eq!(samples.get_by_project(project).unwrap().len(), 1);
    }
}
