//! Cached experiment records.

use labbook_core::{EntityId, ExperimentRecord, LabResult};

use super::facade::CachedRepository;
use crate::Repository;

/// Records facade. Short TTL tier.
pub type CachedRecordRepository<R> = CachedRepository<ExperimentRecord, R>;

impl<R: Repository<ExperimentRecord>> CachedRepository<ExperimentRecord, R> {
    /// Records belonging to `project_id`.
    pub fn get_by_project(&self, project_id: EntityId) -> LabResult<Vec<ExperimentRecord>> {
        self.get_by_parent(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::MockStorage;
    use labbook_core::{new_entity_id, CacheConfig, RecordDraft, RecordPatch};
    use std::sync::Arc;

    #[test]
    fn test_get_by_project_sees_move() {
        let storage = Arc::new(MockStorage::new());
        let cache = Arc::new(CacheStore::in_memory(CacheConfig::default()));
        let records: CachedRecordRepository<MockStorage> = CachedRepository::new(storage, cache);
        let (a, b) = (new_entity_id(), new_entity_id());

        let record = records
            .create(RecordDraft {
                project_id: Some(a),
                title: "Calibration".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(records.get_by_project(a).unwrap().len(), 1);
        assert!(records.get_by_project(b).unwrap().is_empty());

        records
            .update(
                record.record_id,
                RecordPatch {
                    project_id: Some(Some(b)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(records.get_by_project(a).unwrap().is_empty());
        assert_eq!(records.get_by_project(b).unwrap().len(), 1);
    }
}
