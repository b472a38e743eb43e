//! Error types for labbook operations

use crate::EntityKind;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors raised by authoritative repositories.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {kind:?} with id {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("Insert failed for {kind:?}: {reason}")]
    InsertFailed { kind: EntityKind, reason: String },

    #[error("Update failed for {kind:?} with id {id}: {reason}")]
    UpdateFailed {
        kind: EntityKind,
        id: Uuid,
        reason: String,
    },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors for drafts and patches.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for a missing required field.
    pub fn required(field: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            field: field.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Failed to parse config TOML: {0}")]
    Parse(String),
}

/// Master error type for all labbook errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for labbook operations.
pub type LabResult<T> = Result<T, LabError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            kind: EntityKind::Record,
            id: Uuid::nil(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Record"));
    }

    #[test]
    fn test_validation_error_required() {
        let err = ValidationError::required("title");
        assert_eq!(
            err,
            ValidationError::RequiredFieldMissing {
                field: "title".to_string()
            }
        );
        assert_eq!(format!("{}", err), "Required field missing: title");
    }

    #[test]
    fn test_lab_error_from_conversions() {
        let err: LabError = ValidationError::required("name").into();
        assert!(matches!(err, LabError::Validation(_)));

        let err: LabError = StorageError::LockPoisoned.into();
        assert!(matches!(err, LabError::Storage(StorageError::LockPoisoned)));

        let err: LabError = ConfigError::Parse("bad".into()).into();
        assert!(format!("{}", err).starts_with("Config error"));
    }
}
