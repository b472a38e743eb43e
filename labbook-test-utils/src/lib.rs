//! Labbook Test Utilities
//!
//! Shared test infrastructure for the labbook workspace:
//! - Call-counting and failure-injecting repository wrapper
//! - Key-value stores that always fail
//! - Proptest generators for drafts and patches
//! - Fixtures for common scenarios
//! - Custom assertions for labbook results

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

// Re-export mock storage from its source crate
pub use labbook_storage::{
    CacheError, CacheStore, KeyValueStore, ManualClock, MemoryStore, MockStorage,
    ProjectRepository, Repository, SampleRepository,
};

// Re-export core types for convenience
pub use labbook_core::{
    CacheConfig, EntityId, EntityKind, ExperimentNote, ExperimentPlan, ExperimentRecord,
    LabError, LabResult, NoteDraft, NotePatch, PlanDraft, PlanPatch, PlanStatus, PlanStep,
    Project, ProjectDraft, ProjectPatch, ProjectStats, RecordDraft, RecordPatch, RecordStatus,
    Sample, SampleDraft, SampleHistory, SamplePatch, Sop, SopDraft, SopPatch, StorageError,
};

use labbook_storage::CacheableEntity;

// ============================================================================
// LOGGING
// ============================================================================

/// Install a test-friendly tracing subscriber. Safe to call from every test.
///
/// Honors `RUST_LOG`; defaults to `warn`.
pub fn init_test_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

// ============================================================================
// COUNTING REPOSITORY
// ============================================================================

/// Repository operation, for counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoCall {
    GetAll,
    GetById,
    GetByParent,
    Create,
    Update,
    Delete,
    Stats,
    History,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Wraps any repository, counting calls per (kind, operation) and failing
/// the operations it is told to fail.
#[derive(Debug)]
pub struct CountingRepository<R> {
    inner: Arc<R>,
    calls: Mutex<HashMap<(EntityKind, RepoCall), usize>>,
    failing: Mutex<HashSet<(EntityKind, RepoCall)>>,
}

impl<R> CountingRepository<R> {
    pub fn new(inner: Arc<R>) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn inner(&self) -> &Arc<R> {
        &self.inner
    }

    /// Number of `call`s made for `kind` so far.
    pub fn count(&self, kind: EntityKind, call: RepoCall) -> usize {
        lock(&self.calls).get(&(kind, call)).copied().unwrap_or(0)
    }

    /// Total calls across every kind and operation.
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    pub fn reset_counts(&self) {
        lock(&self.calls).clear();
    }

    /// Make every later `call` for `kind` fail with `StorageError::Unavailable`.
    pub fn fail_on(&self, kind: EntityKind, call: RepoCall) {
        lock(&self.failing).insert((kind, call));
    }

    pub fn fail_get_all(&self, kind: EntityKind) {
        self.fail_on(kind, RepoCall::GetAll);
    }

    pub fn heal(&self) {
        lock(&self.failing).clear();
    }

    fn record(&self, kind: EntityKind, call: RepoCall) -> LabResult<()> {
        *lock(&self.calls).entry((kind, call)).or_insert(0) += 1;
        if lock(&self.failing).contains(&(kind, call)) {
            return Err(LabError::Storage(StorageError::Unavailable {
                reason: format!("injected {:?} failure for {}", call, kind),
            }));
        }
        Ok(())
    }
}

impl<E, R> Repository<E> for CountingRepository<R>
where
    E: CacheableEntity,
    R: Repository<E>,
{
    fn get_all(&self) -> LabResult<Vec<E>> {
        self.record(E::kind(), RepoCall::GetAll)?;
        self.inner.get_all()
    }

    fn get_by_id(&self, id: EntityId) -> LabResult<Option<E>> {
        self.record(E::kind(), RepoCall::GetById)?;
        self.inner.get_by_id(id)
    }

    fn get_by_parent(&self, project_id: EntityId) -> LabResult<Vec<E>> {
        self.record(E::kind(), RepoCall::GetByParent)?;
        self.inner.get_by_parent(project_id)
    }

    fn create(&self, draft: E::Draft) -> LabResult<E> {
        self.record(E::kind(), RepoCall::Create)?;
        self.inner.create(draft)
    }

    fn update(&self, id: EntityId, patch: E::Patch) -> LabResult<Option<E>> {
        self.record(E::kind(), RepoCall::Update)?;
        self.inner.update(id, patch)
    }

    fn delete(&self, id: EntityId) -> LabResult<bool> {
        self.record(E::kind(), RepoCall::Delete)?;
        self.inner.delete(id)
    }
}

impl<R: ProjectRepository> ProjectRepository for CountingRepository<R> {
    fn stats(&self, project_id: EntityId) -> LabResult<ProjectStats> {
        self.record(EntityKind::Project, RepoCall::Stats)?;
        self.inner.stats(project_id)
    }
}

impl<R: SampleRepository> SampleRepository for CountingRepository<R> {
    fn history(&self, sample_id: EntityId) -> LabResult<Vec<SampleHistory>> {
        self.record(EntityKind::Sample, RepoCall::History)?;
        self.inner.history(sample_id)
    }
}

/// A counting wrapper over a fresh [`MockStorage`].
pub fn counting_mock() -> Arc<CountingRepository<MockStorage>> {
    Arc::new(CountingRepository::new(Arc::new(MockStorage::new())))
}

// ============================================================================
// FAILING STORES
// ============================================================================

/// Key-value store on which every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore {
    quota: bool,
}

impl FailingStore {
    /// Fails with `CacheError::Store`.
    pub fn unavailable() -> Self {
        Self { quota: false }
    }

    /// Fails with `CacheError::QuotaExceeded`.
    pub fn quota_exceeded() -> Self {
        Self { quota: true }
    }

    fn error(&self) -> CacheError {
        if self.quota {
            CacheError::QuotaExceeded("store is full".to_string())
        } else {
            CacheError::Store("store is unavailable".to_string())
        }
    }
}

impl KeyValueStore for FailingStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(self.error())
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Err(self.error())
    }

    fn remove_item(&self, _key: &str) -> Result<bool, CacheError> {
        Err(self.error())
    }

    fn len(&self) -> Result<usize, CacheError> {
        Err(self.error())
    }

    fn key(&self, _index: usize) -> Result<Option<String>, CacheError> {
        Err(self.error())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for labbook drafts and patches.

    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate an entity kind.
    pub fn arb_entity_kind() -> impl Strategy<Value = EntityKind> {
        proptest::sample::select(EntityKind::ALL.to_vec())
    }

    /// Non-empty, human-looking title.
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9 ]{0,23}"
    }

    pub fn arb_record_status() -> impl Strategy<Value = RecordStatus> {
        prop_oneof![
            Just(RecordStatus::Draft),
            Just(RecordStatus::InProgress),
            Just(RecordStatus::Completed),
            Just(RecordStatus::Failed),
        ]
    }

    /// Planned date within 2024.
    pub fn arb_planned_date() -> impl Strategy<Value = Option<labbook_core::Timestamp>> {
        proptest::option::of((0i64..366).prop_map(|day| {
            Utc.timestamp_opt(1_704_067_200 + day * 86_400, 0)
                .single()
                .unwrap_or_else(Utc::now)
        }))
    }

    /// A valid record draft optionally assigned to one of `projects`.
    pub fn arb_record_draft(projects: Vec<EntityId>) -> impl Strategy<Value = RecordDraft> {
        (
            proptest::option::of(proptest::sample::select(non_empty(projects))),
            arb_title(),
            arb_record_status(),
            proptest::collection::vec("[a-z]{1,8}", 0..3),
        )
            .prop_map(|(project_id, title, status, tags)| RecordDraft {
                project_id,
                title,
                content: String::new(),
                status,
                tags,
            })
    }

    /// A valid plan draft with up to five steps.
    pub fn arb_plan_draft(projects: Vec<EntityId>) -> impl Strategy<Value = PlanDraft> {
        (
            proptest::option::of(proptest::sample::select(non_empty(projects))),
            arb_title(),
            proptest::collection::vec((arb_title(), any::<bool>()), 0..5),
            arb_planned_date(),
        )
            .prop_map(|(project_id, title, steps, planned_date)| PlanDraft {
                project_id,
                title,
                objective: None,
                steps: steps
                    .into_iter()
                    .map(|(description, completed)| PlanStep {
                        description,
                        completed,
                    })
                    .collect(),
                planned_date,
            })
    }

    /// A valid sample draft.
    pub fn arb_sample_draft(projects: Vec<EntityId>) -> impl Strategy<Value = SampleDraft> {
        (
            proptest::option::of(proptest::sample::select(non_empty(projects))),
            arb_title(),
            0.0f64..1_000.0,
        )
            .prop_map(|(project_id, name, quantity)| SampleDraft {
                project_id,
                name,
                sample_type: "reagent".to_string(),
                quantity,
                unit: "ml".to_string(),
                location: None,
            })
    }

    // `select` panics on an empty list
    fn non_empty(projects: Vec<EntityId>) -> Vec<EntityId> {
        if projects.is_empty() {
            vec![Uuid::nil()]
        } else {
            projects
        }
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built drafts and stores for common testing scenarios.

    use super::*;

    /// A cache over a fresh in-memory store and a manual clock at `start_millis`.
    pub fn cache_with_clock(
        config: CacheConfig,
        start_millis: i64,
    ) -> (Arc<CacheStore>, Arc<MemoryStore>, Arc<ManualClock>) {
        let kv = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start_millis));
        let cache = Arc::new(CacheStore::with_clock(kv.clone(), clock.clone(), config));
        (cache, kv, clock)
    }

    /// A cache over a fresh in-memory store with default settings.
    pub fn default_cache() -> Arc<CacheStore> {
        Arc::new(CacheStore::in_memory(CacheConfig::default()))
    }

    pub fn project_draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            name: name.to_string(),
            description: Some(format!("{} project", name)),
        }
    }

    pub fn record_draft(title: &str, project_id: Option<EntityId>) -> RecordDraft {
        RecordDraft {
            project_id,
            title: title.to_string(),
            content: "Observed as expected.".to_string(),
            status: RecordStatus::InProgress,
            tags: vec!["bench".to_string()],
        }
    }

    pub fn note_draft(
        title: &str,
        project_id: Option<EntityId>,
        related_record_id: Option<EntityId>,
    ) -> NoteDraft {
        NoteDraft {
            project_id,
            related_record_id,
            title: title.to_string(),
            content: "See attached gel image.".to_string(),
        }
    }

    pub fn sop_draft(title: &str, project_id: Option<EntityId>) -> SopDraft {
        SopDraft {
            project_id,
            title: title.to_string(),
            version: "1.0".to_string(),
            category: Some("safety".to_string()),
            content: "1. Put on gloves.".to_string(),
        }
    }

    pub fn plan_draft(title: &str, project_id: Option<EntityId>) -> PlanDraft {
        PlanDraft {
            project_id,
            title: title.to_string(),
            objective: Some("Reproduce figure 2".to_string()),
            steps: vec![PlanStep::new("Prepare media"), PlanStep::new("Inoculate")],
            planned_date: None,
        }
    }

    pub fn sample_draft(name: &str, project_id: Option<EntityId>) -> SampleDraft {
        SampleDraft {
            project_id,
            name: name.to_string(),
            sample_type: "reagent".to_string(),
            quantity: 100.0,
            unit: "ml".to_string(),
            location: Some("Shelf B".to_string()),
        }
    }

    /// Seed `n` records into `storage`, all in `project_id`.
    pub fn seed_records<R: Repository<ExperimentRecord>>(
        storage: &R,
        n: usize,
        project_id: Option<EntityId>,
    ) -> Vec<ExperimentRecord> {
        (0..n)
            .map(|i| {
                storage
                    .create(record_draft(&format!("Run {}", i + 1), project_id))
                    .unwrap_or_else(|e| panic!("seeding record {} failed: {}", i, e))
            })
            .collect()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for labbook-specific validation.

    use super::*;

    /// Assert that a LabResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &LabResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a LabResult is a Validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &LabResult<T>) {
        match result {
            Err(LabError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a LabResult is a Storage error.
    #[track_caller]
    pub fn assert_storage_error<T: std::fmt::Debug>(result: &LabResult<T>) {
        match result {
            Err(LabError::Storage(_)) => {}
            other => panic!("Expected Storage error, got: {:?}", other),
        }
    }

    /// Assert that a LabResult is a NotFound storage error for `kind`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &LabResult<T>, kind: EntityKind) {
        match result {
            Err(LabError::Storage(StorageError::NotFound { kind: k, .. })) => {
                assert_eq!(*k, kind, "Wrong entity kind in NotFound error");
            }
            other => panic!("Expected NotFound error for {:?}, got: {:?}", kind, other),
        }
    }

    /// Assert that a cache holds a live entry under `key`.
    #[track_caller]
    pub fn assert_cached(cache: &CacheStore, key: &str) {
        assert!(cache.has(key), "Expected live cache entry under {}", key);
    }

    /// Assert that a cache holds no live entry under `key`.
    #[track_caller]
    pub fn assert_not_cached(cache: &CacheStore, key: &str) {
        assert!(!cache.has(key), "Expected no cache entry under {}", key);
    }
}
