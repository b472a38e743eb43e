//! Cached experiment notes.
//!
//! Notes are grouped along two parent dimensions: the owning project and the
//! experiment record they are attached to.

use labbook_core::{EntityId, ExperimentNote, LabResult};

use super::facade::CachedRepository;
use super::keys::CacheKey;
use crate::Repository;

/// Notes facade. Short TTL tier.
pub type CachedNoteRepository<R> = CachedRepository<ExperimentNote, R>;

impl<R: Repository<ExperimentNote>> CachedRepository<ExperimentNote, R> {
    /// Notes belonging to `project_id`.
    pub fn get_by_project(&self, project_id: EntityId) -> LabResult<Vec<ExperimentNote>> {
        self.get_by_parent(project_id)
    }

    /// Notes attached to `record_id`, filtered from `get_all`.
    pub fn get_by_record(&self, record_id: EntityId) -> LabResult<Vec<ExperimentNote>> {
        self.cached(&CacheKey::notes_by_record(record_id), || {
            Ok(self
                .get_all()?
                .into_iter()
                .filter(|n| n.related_record_id == Some(record_id))
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::MockStorage;
    use labbook_core::{new_entity_id, CacheConfig, NoteDraft, NotePatch};
    use std::sync::Arc;

    fn facade() -> (CachedNoteRepository<MockStorage>, Arc<CacheStore>) {
        let cache = Arc::new(CacheStore::in_memory(CacheConfig::default()));
        (
            CachedRepository::new(Arc::new(MockStorage::new()), cache.clone()),
            cache,
        )
    }

    #[test]
    fn test_get_by_record_is_cached() {
        let (notes, cache) = facade();
        let record = new_entity_id();
        notes
            .create(NoteDraft {
                related_record_id: Some(record),
                title: "pH drift".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(notes.get_by_record(record).unwrap().len(), 1);
        assert!(cache.has(CacheKey::notes_by_record(record).as_str()));
    }

    #[test]
    fn test_related_record_move_refreshes_both_records() {
        let (notes, _cache) = facade();
        let (r1, r2) = (new_entity_id(), new_entity_id());
        let note = notes
            .create(NoteDraft {
                related_record_id: Some(r1),
                title: "Precipitate".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(notes.get_by_record(r1).unwrap().len(), 1);
        assert!(notes.get_by_record(r2).unwrap().is_empty());

        notes
            .update(
                note.note_id,
                NotePatch {
                    related_record_id: Some(Some(r2)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(notes.get_by_record(r1).unwrap().is_empty());
        assert_eq!(notes.get_by_record(r2).unwrap().len(), 1);
    }

    #[test]
    fn test_detach_from_project() {
        let (notes, _cache) = facade();
        let project = new_entity_id();
        let note = notes
            .create(NoteDraft {
                project_id: Some(project),
                title: "Loose end".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(notes.get_by_project(project).unwrap().len(), 1);

        notes
            .update(
                note.note_id,
                NotePatch {
                    project_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(notes.get_by_project(project).unwrap().is_empty());
    }
}
