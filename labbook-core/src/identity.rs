//! Identity types for labbook entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
///
/// Serialized as an RFC 3339 string at every repository boundary.
pub type Timestamp = DateTime<Utc>;

/// Duration in milliseconds, the unit of cache timestamps and TTLs.
pub type DurationMs = i64;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Current wall-clock time as a [`Timestamp`].
pub fn now() -> Timestamp {
    Utc::now()
}
