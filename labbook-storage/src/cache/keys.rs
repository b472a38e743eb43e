//! Cache key registry.
//!
//! Logical keys are `"<kind namespace>:<shape>"` strings. The namespace comes
//! from [`EntityKind::namespace`], so keys of different kinds can never
//! collide, and every id segment is a fixed-width hyphenated UUID, so two
//! different ids can never render to the same key.

use std::fmt;

use labbook_core::{EntityId, EntityKind};

/// What a key addresses within an entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyShape {
    /// Full collection snapshot.
    All,
    /// A single entity.
    Id(EntityId),
    /// Collection filtered to one project.
    ByParent(EntityId),
    /// Derived aggregate for one project.
    Stats(EntityId),
    /// Collection filtered to one related record (notes).
    ByRecord(EntityId),
    /// Derived history collection of one entity (samples).
    History(EntityId),
}

/// A logical cache key. The physical key adds the store namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    kind: EntityKind,
    shape: KeyShape,
    rendered: String,
}

impl CacheKey {
    pub fn new(kind: EntityKind, shape: KeyShape) -> Self {
        let ns = kind.namespace();
        let rendered = match shape {
            KeyShape::All => format!("{}:all", ns),
            KeyShape::Id(id) => format!("{}:id:{}", ns, id),
            KeyShape::ByParent(id) => format!("{}:byParent:{}", ns, id),
            KeyShape::Stats(id) => format!("{}:stats:{}", ns, id),
            KeyShape::ByRecord(id) => format!("{}:byRecord:{}", ns, id),
            KeyShape::History(id) => format!("{}:history:{}", ns, id),
        };
        Self {
            kind,
            shape,
            rendered,
        }
    }

    pub fn all(kind: EntityKind) -> Self {
        Self::new(kind, KeyShape::All)
    }

    pub fn by_id(kind: EntityKind, id: EntityId) -> Self {
        Self::new(kind, KeyShape::Id(id))
    }

    pub fn by_parent(kind: EntityKind, parent_id: EntityId) -> Self {
        Self::new(kind, KeyShape::ByParent(parent_id))
    }

    pub fn stats(kind: EntityKind, parent_id: EntityId) -> Self {
        Self::new(kind, KeyShape::Stats(parent_id))
    }

    /// Notes attached to one experiment record.
    pub fn notes_by_record(record_id: EntityId) -> Self {
        Self::new(EntityKind::Note, KeyShape::ByRecord(record_id))
    }

    /// History entries of one sample.
    pub fn sample_history(sample_id: EntityId) -> Self {
        Self::new(EntityKind::Sample, KeyShape::History(sample_id))
    }

    /// Prefix shared by every key of `kind`.
    pub fn kind_prefix(kind: EntityKind) -> String {
        format!("{}:", kind.namespace())
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn shape(&self) -> KeyShape {
        self.shape
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}
