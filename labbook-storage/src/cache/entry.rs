//! Serialized cache entry format.
//!
//! Every physical value is a JSON object with exactly three fields:
//! `data` (the payload), `timestamp` (write time, Unix ms) and `ttl` (ms).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use labbook_core::DurationMs;

/// A cached payload plus its expiry metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    #[serde(rename = "timestamp")]
    pub written_at: i64,
    pub ttl: DurationMs,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, written_at: i64, ttl: Duration) -> Self {
        Self {
            data,
            written_at,
            ttl: duration_to_millis(ttl),
        }
    }

    /// Live iff `now - written_at <= ttl`.
    pub fn is_live(&self, now: i64) -> bool {
        is_live(self.written_at, self.ttl, now)
    }
}

/// The expiry metadata of an entry, read without decoding `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EntryHeader {
    #[serde(rename = "timestamp")]
    pub written_at: i64,
    pub ttl: DurationMs,
}

impl EntryHeader {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn is_live(&self, now: i64) -> bool {
        is_live(self.written_at, self.ttl, now)
    }
}

fn is_live(written_at: i64, ttl: DurationMs, now: i64) -> bool {
    now.saturating_sub(written_at) <= ttl
}

pub(crate) fn duration_to_millis(d: Duration) -> DurationMs {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
