//! Error types for the entity store.

use thiserror::Error;

use super::RecordKey;

/// Errors that can occur while reading or writing records.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record is stored under the key.
    #[error("Record not found: {key}")]
    RecordNotFound {
        /// The key that was looked up
        key: RecordKey,
    },

    /// The stored version differs from the one the write was based on.
    #[error("Version conflict on {key}: expected {expected}, found {found:?}")]
    VersionConflict {
        /// The record being written
        key: RecordKey,
        /// Version the writer read (0 for a new record)
        expected: u64,
        /// Version currently stored, if any
        found: Option<u64>,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// The data file was written in a format this build cannot read.
    #[error("Unsupported data file format {found}; expected {expected}")]
    UnsupportedFormat { found: u32, expected: u32 },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Check if this error indicates a record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::RecordNotFound { .. })
    }

    /// Check if this error is an optimistic concurrency failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            StoreError::FileIo { .. }
                | StoreError::SerializationFailed { .. }
                | StoreError::DeserializationFailed { .. }
                | StoreError::UnsupportedFormat { .. }
        )
    }

    /// Get the record key if this error is about a specific record.
    pub fn record_key(&self) -> Option<&RecordKey> {
        match self {
            StoreError::RecordNotFound { key } | StoreError::VersionConflict { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
