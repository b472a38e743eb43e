//! Errors internal to the cache layer.
//!
//! None of these ever reach a facade caller: the cache store absorbs them and
//! degrades to a miss or a no-op.

/// Error type for key-value store and entry (de)serialization failures.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store rejected or failed the operation.
    #[error("Store error: {0}")]
    Store(String),

    /// The backing store is full.
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<heed::Error> for CacheError {
    fn from(e: heed::Error) -> Self {
        match e {
            heed::Error::Mdb(heed::MdbError::MapFull) => CacheError::QuotaExceeded(e.to_string()),
            heed::Error::Io(io) => CacheError::Io(io),
            other => CacheError::Store(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for CacheError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        CacheError::Store("store lock poisoned".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CacheError::QuotaExceeded("4096 bytes".to_string());
        assert_eq!(err.to_string(), "Quota exceeded: 4096 bytes");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CacheError = io.into();
        assert!(matches!(err, CacheError::Io(_)));
    }
}
