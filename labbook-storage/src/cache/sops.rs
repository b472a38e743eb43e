//! Cached standard operating procedures.

use labbook_core::{EntityId, LabResult, Sop};

use super::facade::CachedRepository;
use crate::Repository;

/// SOP facade. SOPs rarely change, so entries use the long TTL tier.
pub type CachedSopRepository<R> = CachedRepository<Sop, R>;

impl<R: Repository<Sop>> CachedRepository<Sop, R> {
    /// SOPs belonging to `project_id`.
    pub fn get_by_project(&self, project_id: EntityId) -> LabResult<Vec<Sop>> {
        self.get_by_parent(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::MockStorage;
    use labbook_core::{new_entity_id, CacheConfig, SopDraft, TtlTier};
    use std::sync::Arc;

    #[test]
    fn test_sops_use_long_tier() {
        let cache = Arc::new(CacheStore::in_memory(CacheConfig::default()));
        let sops: CachedSopRepository<MockStorage> =
            CachedRepository::new(Arc::new(MockStorage::new()), cache.clone());
        assert_eq!(sops.ttl(), cache.ttl_for(TtlTier::Long));
    }

    #[test]
    fn test_delete_drops_project_slice() {
        let cache = Arc::new(CacheStore::in_memory(CacheConfig::default()));
        let sops: CachedSopRepository<MockStorage> =
            CachedRepository::new(Arc::new(MockStorage::new()), cache);
        let project = new_entity_id();

        let sop = sops
            .create(SopDraft {
                project_id: Some(project),
                title: "Autoclave".to_string(),
                version: "2.1".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(sops.get_by_project(project).unwrap(), vec![sop.clone()]);

        assert!(sops.delete(sop.sop_id).unwrap());
        assert!(sops.get_by_project(project).unwrap().is_empty());
        assert_eq!(sops.get_by_id(sop.sop_id).unwrap(), None);
    }
}
