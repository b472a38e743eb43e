//! Labbook Storage - Repository Traits, Mock Implementation and Cache Layer
//!
//! Defines the authoritative repository contract for labbook entities, an
//! in-memory implementation of it, and the read-through cache that wraps any
//! implementation.

pub mod cache;

pub use cache::{
    stale_keys, CacheEntry, CacheError, CacheKey, CacheLayer, CacheManager, CacheStats,
    CacheStore, CacheTarget, CacheableEntity, CachedNoteRepository, CachedPlanRepository,
    CachedProjectRepository, CachedRecordRepository, CachedRepository, CachedSampleRepository,
    CachedSopRepository, ChangeEvent, CleanupReport, Clock, Invalidator, KeyShape,
    KeyValueStore, LabStorage, LmdbStore, ManualClock, MemoryStore, Parents, PreloadReport,
    SystemClock,
};

use labbook_core::{
    new_entity_id, now, percent, EntityId, EntityKind, ExperimentNote, ExperimentPlan,
    ExperimentRecord, LabError, LabResult, NoteDraft, NotePatch, PlanDraft, PlanPatch,
    PlanStatus, Project, ProjectDraft, ProjectPatch, ProjectStats, RecordDraft, RecordPatch,
    Sample, SampleAction, SampleDraft, SampleHistory, SamplePatch, SampleStatus, Sop, SopDraft,
    SopPatch, StorageError,
};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// REPOSITORY TRAITS
// ============================================================================

/// Authoritative CRUD repository for one entity kind.
///
/// Implementations own the data: they assign ids and timestamps, validate
/// drafts and patches, and are the only source of domain errors a caller of
/// the cache layer ever sees.
pub trait Repository<E: CacheableEntity>: Send + Sync {
    /// Every entity of this kind.
    fn get_all(&self) -> LabResult<Vec<E>>;

    /// A single entity, or `None` if it does not exist.
    fn get_by_id(&self, id: EntityId) -> LabResult<Option<E>>;

    /// Entities belonging to `project_id`.
    ///
    /// The default filters `get_all`; implementations with an index should
    /// override it.
    fn get_by_parent(&self, project_id: EntityId) -> LabResult<Vec<E>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|e| e.project_id() == Some(project_id))
            .collect())
    }

    /// Create an entity from a validated draft.
    fn create(&self, draft: E::Draft) -> LabResult<E>;

    /// Apply `patch`. Returns `None` if no entity has `id`.
    fn update(&self, id: EntityId, patch: E::Patch) -> LabResult<Option<E>>;

    /// Delete by id. Returns whether anything was deleted.
    fn delete(&self, id: EntityId) -> LabResult<bool>;
}

/// Project repository with the cross-kind aggregate.
pub trait ProjectRepository: Repository<Project> {
    /// Counters over every entity kind belonging to `project_id`.
    fn stats(&self, project_id: EntityId) -> LabResult<ProjectStats>;
}

/// Sample repository with the audit trail.
pub trait SampleRepository: Repository<Sample> {
    /// History entries of `sample_id`, oldest first.
    fn history(&self, sample_id: EntityId) -> LabResult<Vec<SampleHistory>>;
}

// ============================================================================
// MOCK STORAGE
// ============================================================================

type Table<E> = RwLock<BTreeMap<EntityId, E>>;

fn read_table<E>(table: &Table<E>) -> LabResult<RwLockReadGuard<'_, BTreeMap<EntityId, E>>> {
    table
        .read()
        .map_err(|_| LabError::Storage(StorageError::LockPoisoned))
}

fn write_table<E>(table: &Table<E>) -> LabResult<RwLockWriteGuard<'_, BTreeMap<EntityId, E>>> {
    table
        .write()
        .map_err(|_| LabError::Storage(StorageError::LockPoisoned))
}

fn all_of<E: Clone>(table: &Table<E>) -> LabResult<Vec<E>> {
    Ok(read_table(table)?.values().cloned().collect())
}

fn one_of<E: Clone>(table: &Table<E>, id: EntityId) -> LabResult<Option<E>> {
    Ok(read_table(table)?.get(&id).cloned())
}

fn insert_into<E: CacheableEntity>(table: &Table<E>, entity: E) -> LabResult<E> {
    let mut rows = write_table(table)?;
    let id = entity.entity_id();
    if rows.contains_key(&id) {
        return Err(LabError::Storage(StorageError::InsertFailed {
            kind: E::kind(),
            reason: "already exists".to_string(),
        }));
    }
    rows.insert(id, entity.clone());
    Ok(entity)
}

fn modify_in<E: Clone>(
    table: &Table<E>,
    id: EntityId,
    apply: impl FnOnce(&mut E),
) -> LabResult<Option<E>> {
    let mut rows = write_table(table)?;
    Ok(rows.get_mut(&id).map(|row| {
        apply(row);
        row.clone()
    }))
}

fn remove_from<E>(table: &Table<E>, id: EntityId) -> LabResult<bool> {
    Ok(write_table(table)?.remove(&id).is_some())
}

fn count_in<E: CacheableEntity>(table: &Table<E>, project_id: EntityId) -> LabResult<usize> {
    Ok(read_table(table)?
        .values()
        .filter(|e| e.project_id() == Some(project_id))
        .count())
}

/// In-memory authoritative storage for every entity kind.
///
/// Rows are kept in id order; ids are time-ordered, so listings come back
/// in creation order.
#[derive(Debug, Default)]
pub struct MockStorage {
    projects: Table<Project>,
    records: Table<ExperimentRecord>,
    notes: Table<ExperimentNote>,
    sops: Table<Sop>,
    plans: Table<ExperimentPlan>,
    samples: Table<Sample>,
    sample_history: RwLock<BTreeMap<EntityId, Vec<SampleHistory>>>,
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) -> LabResult<()> {
        write_table(&self.projects)?.clear();
        write_table(&self.records)?.clear();
        write_table(&self.notes)?.clear();
        write_table(&self.sops)?.clear();
        write_table(&self.plans)?.clear();
        write_table(&self.samples)?.clear();
        write_table(&self.sample_history)?.clear();
        Ok(())
    }

    /// Get count of stored entities of `kind`.
    pub fn count(&self, kind: EntityKind) -> LabResult<usize> {
        Ok(match kind {
            EntityKind::Project => read_table(&self.projects)?.len(),
            EntityKind::Record => read_table(&self.records)?.len(),
            EntityKind::Note => read_table(&self.notes)?.len(),
            EntityKind::Sop => read_table(&self.sops)?.len(),
            EntityKind::Plan => read_table(&self.plans)?.len(),
            EntityKind::Sample => read_table(&self.samples)?.len(),
        })
    }

    fn append_history(
        &self,
        sample_id: EntityId,
        action: SampleAction,
        description: impl Into<String>,
    ) -> LabResult<()> {
        write_table(&self.sample_history)?
            .entry(sample_id)
            .or_default()
            .push(SampleHistory {
                history_id: new_entity_id(),
                sample_id,
                action,
                description: description.into(),
                recorded_at: now(),
            });
        Ok(())
    }
}

// === Project Operations ===

impl Repository<Project> for MockStorage {
    fn get_all(&self) -> LabResult<Vec<Project>> {
        all_of(&self.projects)
    }

    fn get_by_id(&self, id: EntityId) -> LabResult<Option<Project>> {
        one_of(&self.projects, id)
    }

    fn get_by_parent(&self, _project_id: EntityId) -> LabResult<Vec<Project>> {
        // Projects are not nested
        Ok(Vec::new())
    }

    fn create(&self, draft: ProjectDraft) -> LabResult<Project> {
        draft.validate()?;
        let timestamp = now();
        insert_into(
            &self.projects,
            Project {
                project_id: new_entity_id(),
                name: draft.name,
                description: draft.description,
                status: Default::default(),
                created_at: timestamp,
                updated_at: timestamp,
            },
        )
    }

    fn update(&self, id: EntityId, patch: ProjectPatch) -> LabResult<Option<Project>> {
        patch.validate()?;
        modify_in(&self.projects, id, |p| {
            if let Some(name) = patch.name {
                p.name = name;
            }
            if let Some(description) = patch.description {
                p.description = Some(description);
            }
            if let Some(status) = patch.status {
                p.status = status;
            }
            p.updated_at = now();
        })
    }

    fn delete(&self, id: EntityId) -> LabResult<bool> {
        remove_from(&self.projects, id)
    }
}

impl ProjectRepository for MockStorage {
    fn stats(&self, project_id: EntityId) -> LabResult<ProjectStats> {
        if !read_table(&self.projects)?.contains_key(&project_id) {
            return Err(LabError::Storage(StorageError::NotFound {
                kind: EntityKind::Project,
                id: project_id,
            }));
        }

        let (plan_count, completed_plan_count) = {
            let plans = read_table(&self.plans)?;
            let in_project: Vec<&ExperimentPlan> = plans
                .values()
                .filter(|p| p.project_id == Some(project_id))
                .collect();
            let completed = in_project
                .iter()
                .filter(|p| p.status == PlanStatus::Completed)
                .count();
            (in_project.len(), completed)
        };

        Ok(ProjectStats {
            project_id,
            record_count: count_in(&self.records, project_id)?,
            note_count: count_in(&self.notes, project_id)?,
            sop_count: count_in(&self.sops, project_id)?,
            plan_count,
            sample_count: count_in(&self.samples, project_id)?,
            completed_plan_count,
            completion_percent: percent(completed_plan_count, plan_count),
        })
    }
}

// === Record Operations ===

impl Repository<ExperimentRecord> for MockStorage {
    fn get_all(&self) -> LabResult<Vec<ExperimentRecord>> {
        all_of(&self.records)
    }

    fn get_by_id(&self, id: EntityId) -> LabResult<Option<ExperimentRecord>> {
        one_of(&self.records, id)
    }

    fn create(&self, draft: RecordDraft) -> LabResult<ExperimentRecord> {
        draft.validate()?;
        let timestamp = now();
        insert_into(
            &self.records,
            ExperimentRecord {
                record_id: new_entity_id(),
                project_id: draft.project_id,
                title: draft.title,
                content: draft.content,
                status: draft.status,
                tags: draft.tags,
                created_at: timestamp,
                updated_at: timestamp,
            },
        )
    }

    fn update(&self, id: EntityId, patch: RecordPatch) -> LabResult<Option<ExperimentRecord>> {
        patch.validate()?;
        modify_in(&self.records, id, |r| {
            if let Some(project_id) = patch.project_id {
                r.project_id = project_id;
            }
            if let Some(title) = patch.title {
                r.title = title;
            }
            if let Some(content) = patch.content {
                r.content = content;
            }
            if let Some(status) = patch.status {
                r.status = status;
            }
            if let Some(tags) = patch.tags {
                r.tags = tags;
            }
            r.updated_at = now();
        })
    }

    fn delete(&self, id: EntityId) -> LabResult<bool> {
        remove_from(&self.records, id)
    }
}

// === Note Operations ===

impl Repository<ExperimentNote> for MockStorage {
    fn get_all(&self) -> LabResult<Vec<ExperimentNote>> {
        all_of(&self.notes)
    }

    fn get_by_id(&self, id: EntityId) -> LabResult<Option<ExperimentNote>> {
        one_of(&self.notes, id)
    }

    fn create(&self, draft: NoteDraft) -> LabResult<ExperimentNote> {
        draft.validate()?;
        let timestamp = now();
        insert_into(
            &self.notes,
            ExperimentNote {
                note_id: new_entity_id(),
                project_id: draft.project_id,
                related_record_id: draft.related_record_id,
                title: draft.title,
                content: draft.content,
                created_at: timestamp,
                updated_at: timestamp,
            },
        )
    }

    fn update(&self, id: EntityId, patch: NotePatch) -> LabResult<Option<ExperimentNote>> {
        patch.validate()?;
        modify_in(&self.notes, id, |n| {
            if let Some(project_id) = patch.project_id {
                n.project_id = project_id;
            }
            if let Some(related_record_id) = patch.related_record_id {
                n.related_record_id = related_record_id;
            }
            if let Some(title) = patch.title {
                n.title = title;
            }
            if let Some(content) = patch.content {
                n.content = content;
            }
            n.updated_at = now();
        })
    }

    fn delete(&self, id: EntityId) -> LabResult<bool> {
        remove_from(&self.notes, id)
    }
}

// === SOP Operations ===

impl Repository<Sop> for MockStorage {
    fn get_all(&self) -> LabResult<Vec<Sop>> {
        all_of(&self.sops)
    }

    fn get_by_id(&self, id: EntityId) -> LabResult<Option<Sop>> {
        one_of(&self.sops, id)
    }

    fn create(&self, draft: SopDraft) -> LabResult<Sop> {
        draft.validate()?;
        let timestamp = now();
        insert_into(
            &self.sops,
            Sop {
                sop_id: new_entity_id(),
                project_id: draft.project_id,
                title: draft.title,
                version: draft.version,
                category: draft.category,
                content: draft.content,
                created_at: timestamp,
                updated_at: timestamp,
            },
        )
    }

    fn update(&self, id: EntityId, patch: SopPatch) -> LabResult<Option<Sop>> {
        patch.validate()?;
        modify_in(&self.sops, id, |s| {
            if let Some(project_id) = patch.project_id {
                s.project_id = project_id;
            }
            if let Some(title) = patch.title {
                s.title = title;
            }
            if let Some(version) = patch.version {
                s.version = version;
            }
            if let Some(category) = patch.category {
                s.category = Some(category);
            }
            if let Some(content) = patch.content {
                s.content = content;
            }
            s.updated_at = now();
        })
    }

    fn delete(&self, id: EntityId) -> LabResult<bool> {
        remove_from(&self.sops, id)
    }
}

// === Plan Operations ===

impl Repository<ExperimentPlan> for MockStorage {
    fn get_all(&self) -> LabResult<Vec<ExperimentPlan>> {
        all_of(&self.plans)
    }

    fn get_by_id(&self, id: EntityId) -> LabResult<Option<ExperimentPlan>> {
        one_of(&self.plans, id)
    }

    fn create(&self, draft: PlanDraft) -> LabResult<ExperimentPlan> {
        draft.validate()?;
        let timestamp = now();
        insert_into(
            &self.plans,
            ExperimentPlan {
                plan_id: new_entity_id(),
                project_id: draft.project_id,
                title: draft.title,
                objective: draft.objective,
                steps: draft.steps,
                status: Default::default(),
                planned_date: draft.planned_date,
                created_at: timestamp,
                updated_at: timestamp,
            },
        )
    }

    fn update(&self, id: EntityId, patch: PlanPatch) -> LabResult<Option<ExperimentPlan>> {
        patch.validate()?;
        modify_in(&self.plans, id, |p| {
            if let Some(project_id) = patch.project_id {
                p.project_id = project_id;
            }
            if let Some(title) = patch.title {
                p.title = title;
            }
            if let Some(objective) = patch.objective {
                p.objective = Some(objective);
            }
            if let Some(steps) = patch.steps {
                p.steps = steps;
            }
            if let Some(status) = patch.status {
                p.status = status;
            }
            if let Some(planned_date) = patch.planned_date {
                p.planned_date = planned_date;
            }
            p.updated_at = now();
        })
    }

    fn delete(&self, id: EntityId) -> LabResult<bool> {
        remove_from(&self.plans, id)
    }
}

// === Sample Operations ===

/// History action recorded for a sample update.
fn classify_sample_update(before: &Sample, after: &Sample) -> SampleAction {
    if after.status == SampleStatus::Disposed && before.status != SampleStatus::Disposed {
        SampleAction::Disposed
    } else if after.location != before.location {
        SampleAction::Moved
    } else if after.quantity < before.quantity {
        SampleAction::Used
    } else {
        SampleAction::Updated
    }
}

impl Repository<Sample> for MockStorage {
    fn get_all(&self) -> LabResult<Vec<Sample>> {
        all_of(&self.samples)
    }

    fn get_by_id(&self, id: EntityId) -> LabResult<Option<Sample>> {
        one_of(&self.samples, id)
    }

    fn create(&self, draft: SampleDraft) -> LabResult<Sample> {
        draft.validate()?;
        let timestamp = now();
        let sample = insert_into(
            &self.samples,
            Sample {
                sample_id: new_entity_id(),
                project_id: draft.project_id,
                name: draft.name,
                sample_type: draft.sample_type,
                quantity: draft.quantity,
                unit: draft.unit,
                location: draft.location,
                status: Default::default(),
                created_at: timestamp,
                updated_at: timestamp,
            },
        )?;
        self.append_history(
            sample.sample_id,
            SampleAction::Created,
            format!("Registered {} {} of {}", sample.quantity, sample.unit, sample.name),
        )?;
        Ok(sample)
    }

    fn update(&self, id: EntityId, patch: SamplePatch) -> LabResult<Option<Sample>> {
        patch.validate()?;
        let mut action = SampleAction::Updated;
        let updated = modify_in(&self.samples, id, |s| {
            let before = s.clone();
            if let Some(project_id) = patch.project_id {
                s.project_id = project_id;
            }
            if let Some(name) = patch.name {
                s.name = name;
            }
            if let Some(sample_type) = patch.sample_type {
                s.sample_type = sample_type;
            }
            if let Some(quantity) = patch.quantity {
                s.quantity = quantity;
            }
            if let Some(unit) = patch.unit {
                s.unit = unit;
            }
            if let Some(location) = patch.location {
                s.location = Some(location);
            }
            if let Some(status) = patch.status {
                s.status = status;
            }
            s.updated_at = now();
            action = classify_sample_update(&before, s);
        })?;

        if let Some(sample) = &updated {
            self.append_history(sample.sample_id, action, format!("Sample {}", action))?;
        }
        Ok(updated)
    }

    fn delete(&self, id: EntityId) -> LabResult<bool> {
        let removed = remove_from(&self.samples, id)?;
        if removed {
            self.append_history(id, SampleAction::Disposed, "Sample deleted")?;
        }
        Ok(removed)
    }
}

impl SampleRepository for MockStorage {
    fn history(&self, sample_id: EntityId) -> LabResult<Vec<SampleHistory>> {
        Ok(read_table(&self.sample_history)?
            .get(&sample_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use labbook_core::{PlanStep, ValidationError};

    fn make_project(storage: &MockStorage) -> Project {
        Repository::<Project>::create(
            storage,
            ProjectDraft {
                name: "Protein folding".to_string(),
                description: None,
            },
        )
        .unwrap()
    }

    fn make_record(storage: &MockStorage, project_id: Option<EntityId>) -> ExperimentRecord {
        Repository::<ExperimentRecord>::create(
            storage,
            RecordDraft {
                project_id,
                title: "Run 1".to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn make_sample(storage: &MockStorage) -> Sample {
        Repository::<Sample>::create(
            storage,
            SampleDraft {
                name: "Buffer A".to_string(),
                sample_type: "buffer".to_string(),
                quantity: 50.0,
                unit: "ml".to_string(),
                location: Some("Fridge 1".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    // ========================================================================
    // CRUD Tests
    // ========================================================================

    #[test]
    fn test_record_create_get() {
        let storage = MockStorage::new();
        let record = make_record(&storage, None);

        let retrieved = Repository::<ExperimentRecord>::get_by_id(&storage, record.record_id).unwrap();
        assert_eq!(retrieved, Some(record));
        assert_eq!(storage.count(EntityKind::Record).unwrap(), 1);
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let storage = MockStorage::new();
        let result = Repository::<ExperimentRecord>::create(&storage, RecordDraft::default());
        assert_eq!(
            result,
            Err(LabError::Validation(ValidationError::required("title")))
        );
        assert_eq!(storage.count(EntityKind::Record).unwrap(), 0);
    }

    #[test]
    fn test_update_missing_returns_none() {
        let storage = MockStorage::new();
        let result = Repository::<ExperimentRecord>::update(
            &storage,
            new_entity_id(),
            RecordPatch::default(),
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_moves_record_between_projects() {
        let storage = MockStorage::new();
        let a = make_project(&storage);
        let b = make_project(&storage);
        let record = make_record(&storage, Some(a.project_id));

        let updated = Repository::<ExperimentRecord>::update(
            &storage,
            record.record_id,
            RecordPatch {
                project_id: Some(Some(b.project_id)),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.project_id, Some(b.project_id));
        assert!(Repository::<ExperimentRecord>::get_by_parent(&storage, a.project_id)
            .unwrap()
            .is_empty());
        assert_eq!(
            Repository::<ExperimentRecord>::get_by_parent(&storage, b.project_id)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_delete_reports_presence() {
        let storage = MockStorage::new();
        let record = make_record(&storage, None);
        assert!(Repository::<ExperimentRecord>::delete(&storage, record.record_id).unwrap());
        assert!(!Repository::<ExperimentRecord>::delete(&storage, record.record_id).unwrap());
    }

    #[test]
    fn test_get_all_in_creation_order() {
        let storage = MockStorage::new();
        let first = make_record(&storage, None);
        let second = make_record(&storage, None);
        let all = Repository::<ExperimentRecord>::get_all(&storage).unwrap();
        assert_eq!(all, vec![first, second]);
    }

    // ========================================================================
    // Project Stats Tests
    // ========================================================================

    #[test]
    fn test_project_stats_counts_children() {
        let storage = MockStorage::new();
        let project = make_project(&storage);
        let pid = Some(project.project_id);
        make_record(&storage, pid);
        make_record(&storage, None);

        let plan = Repository::<ExperimentPlan>::create(
            &storage,
            PlanDraft {
                project_id: pid,
                title: "Week 1".to_string(),
                steps: vec![PlanStep::new("Prepare")],
                ..Default::default()
            },
        )
        .unwrap();
        Repository::<ExperimentPlan>::create(
            &storage,
            PlanDraft {
                project_id: pid,
                title: "Week 2".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        Repository::<ExperimentPlan>::update(
            &storage,
            plan.plan_id,
            PlanPatch {
                status: Some(PlanStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();

        let stats = storage.stats(project.project_id).unwrap();
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.plan_count, 2);
        assert_eq!(stats.completed_plan_count, 1);
        assert_eq!(stats.completion_percent, 50);
        assert_eq!(stats.note_count, 0);
    }

    #[test]
    fn test_project_stats_unknown_project() {
        let storage = MockStorage::new();
        let id = new_entity_id();
        assert_eq!(
            storage.stats(id),
            Err(LabError::Storage(StorageError::NotFound {
                kind: EntityKind::Project,
                id,
            }))
        );
    }

    // ========================================================================
    // Sample History Tests
    // ========================================================================

    #[test]
    fn test_sample_history_trail() {
        let storage = MockStorage::new();
        let sample = make_sample(&storage);

        Repository::<Sample>::update(
            &storage,
            sample.sample_id,
            SamplePatch {
                quantity: Some(20.0),
                ..Default::default()
            },
        )
        .unwrap();
        Repository::<Sample>::update(
            &storage,
            sample.sample_id,
            SamplePatch {
                location: Some("Freezer 2".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        Repository::<Sample>::delete(&storage, sample.sample_id).unwrap();

        let actions: Vec<SampleAction> = storage
            .history(sample.sample_id)
            .unwrap()
            .into_iter()
            .map(|h| h.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                SampleAction::Created,
                SampleAction::Used,
                SampleAction::Moved,
                SampleAction::Disposed,
            ]
        );
    }

    #[test]
    fn test_sample_rejects_negative_quantity() {
        let storage = MockStorage::new();
        let sample = make_sample(&storage);
        let result = Repository::<Sample>::update(
            &storage,
            sample.sample_id,
            SamplePatch {
                quantity: Some(-1.0),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(LabError::Validation(_))));
        assert_eq!(storage.history(sample.sample_id).unwrap().len(), 1);
    }

    #[test]
    fn test_history_of_unknown_sample_is_empty() {
        let storage = MockStorage::new();
        assert!(storage.history(new_entity_id()).unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let storage = MockStorage::new();
        make_project(&storage);
        make_sample(&storage);
        storage.clear().unwrap();
        for kind in EntityKind::ALL {
            assert_eq!(storage.count(kind).unwrap(), 0);
        }
    }
}
