//! Cache configuration
//!
//! A `CacheConfig` is fixed at construction of the cache store and never
//! changes for the lifetime of the session.

use crate::{ConfigError, TtlTier};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Namespace prepended to every physical cache key.
pub const DEFAULT_NAMESPACE: &str = "labbook_cache_";

/// Configuration for the cache store and the facades built on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Prefix separating cache entries from any other data in the same store.
    pub namespace: String,
    /// TTL used by `set` when the caller does not pass one.
    pub default_ttl: Duration,
    /// TTL for frequently edited kinds.
    pub short_ttl: Duration,
    /// TTL for most kinds.
    pub medium_ttl: Duration,
    /// TTL for rarely edited kinds.
    pub long_ttl: Duration,
    /// Ceiling on the number of namespaced entries kept in the store.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_ttl: Duration::from_secs(5 * 60),
            short_ttl: Duration::from_secs(60),
            medium_ttl: Duration::from_secs(5 * 60),
            long_ttl: Duration::from_secs(30 * 60),
            max_entries: 100,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set all three tier TTLs at once.
    pub fn with_tiers(mut self, short: Duration, medium: Duration, long: Duration) -> Self {
        self.short_ttl = short;
        self.medium_ttl = medium;
        self.long_ttl = long;
        self
    }

    /// Set the max entry count.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Resolve a tier to its configured duration.
    pub fn ttl_for(&self, tier: TtlTier) -> Duration {
        match tier {
            TtlTier::Short => self.short_ttl,
            TtlTier::Medium => self.medium_ttl,
            TtlTier::Long => self.long_ttl,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "namespace",
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_entries",
                reason: "must be > 0".to_string(),
            });
        }
        for (field, ttl) in [
            ("default_ttl_ms", self.default_ttl),
            ("short_ttl_ms", self.short_ttl),
            ("medium_ttl_ms", self.medium_ttl),
            ("long_ttl_ms", self.long_ttl),
        ] {
            if ttl.is_zero() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be > 0".to_string(),
                });
            }
        }
        if self.short_ttl > self.medium_ttl || self.medium_ttl > self.long_ttl {
            return Err(ConfigError::InvalidValue {
                field: "medium_ttl_ms",
                reason: "tiers must satisfy short <= medium <= long".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: CacheConfigFile =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = Self::from(file);
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&contents)
    }
}

/// On-disk representation; durations are integer milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CacheConfigFile {
    namespace: String,
    default_ttl_ms: u64,
    short_ttl_ms: u64,
    medium_ttl_ms: u64,
    long_ttl_ms: u64,
    max_entries: usize,
}

impl Default for CacheConfigFile {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            namespace: defaults.namespace,
            default_ttl_ms: defaults.default_ttl.as_millis() as u64,
            short_ttl_ms: defaults.short_ttl.as_millis() as u64,
            medium_ttl_ms: defaults.medium_ttl.as_millis() as u64,
            long_ttl_ms: defaults.long_ttl.as_millis() as u64,
            max_entries: defaults.max_entries,
        }
    }
}

impl From<CacheConfigFile> for CacheConfig {
    fn from(file: CacheConfigFile) -> Self {
        Self {
            namespace: file.namespace,
            default_ttl: Duration::from_millis(file.default_ttl_ms),
            short_ttl: Duration::from_millis(file.short_ttl_ms),
            medium_ttl: Duration::from_millis(file.medium_ttl_ms),
            long_ttl: Duration::from_millis(file.long_ttl_ms),
            max_entries: file.max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.max_entries, 100);
    }

    #[test]
    fn test_cache_config_builder() {
        let config = CacheConfig::new()
            .with_namespace("test_")
            .with_default_ttl(Duration::from_secs(10))
            .with_tiers(
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
            )
            .with_max_entries(5);

        assert_eq!(config.namespace, "test_");
        assert_eq!(config.default_ttl, Duration::from_secs(10));
        assert_eq!(config.ttl_for(TtlTier::Short), Duration::from_secs(1));
        assert_eq!(config.ttl_for(TtlTier::Medium), Duration::from_secs(2));
        assert_eq!(config.ttl_for(TtlTier::Long), Duration::from_secs(3));
        assert_eq!(config.max_entries, 5);
    }

    #[test]
    fn test_validate_rejects_zero_max_entries() {
        let config = CacheConfig::new().with_max_entries(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "max_entries",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_tiers() {
        let config = CacheConfig::new().with_tiers(
            Duration::from_secs(10),
            Duration::from_secs(5),
            Duration::from_secs(20),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial_keeps_defaults() {
        let config = CacheConfig::from_toml_str(
            r#"
            namespace = "lab_"
            max_entries = 250
            short_ttl_ms = 30000
            "#,
        )
        .unwrap();
        assert_eq!(config.namespace, "lab_");
        assert_eq!(config.max_entries, 250);
        assert_eq!(config.short_ttl, Duration::from_secs(30));
        assert_eq!(config.long_ttl, CacheConfig::default().long_ttl);
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        let err = CacheConfig::from_toml_str("max_size = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.toml");
        std::fs::write(&path, "default_ttl_ms = 1000\n").unwrap();
        let config = CacheConfig::from_path(&path).unwrap();
        assert_eq!(config.default_ttl, Duration::from_secs(1));

        let missing = CacheConfig::from_path(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
