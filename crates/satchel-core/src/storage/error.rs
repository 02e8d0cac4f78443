//! # Satchel Storage System Errors
//!
//! Defines [`StorageSystemError`], the error enum of the storage layer.
//!
//! Variants fall into three groups: configuration errors raised before any
//! I/O is attempted (bad entry names, bad limits, no storage directory),
//! backend errors raised by the storage medium with the underlying cause
//! attached, and serialization errors wrapping the first [`CodecError`]
//! reported while encoding or decoding a named entry.
use std::path::PathBuf;
use thiserror::Error;

use crate::codec::error::CodecError;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("Invalid entry name: {reason}")]
    InvalidEntryName { reason: String },

    #[error("Invalid storage limit {0}: must be -1 (unlimited) or non-negative")]
    InvalidStorageLimit(i64),

    #[error("Storage directory is unspecified: the user home directory could not be determined")]
    DirectoryUnspecified,

    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),

    #[error("Backend '{backend}' failed to {operation} entry \"{name}\": {source}")]
    Backend {
        backend: String,
        operation: String,
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't create directory {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("save failed \"{name}\": {source}")]
    Encode {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("load failed \"{name}\": {source}")]
    Decode {
        name: String,
        #[source]
        source: CodecError,
    },
}

impl StorageSystemError {
    /// Helper for backend errors, ensuring the entry name is always included
    pub fn backend(
        source: std::io::Error,
        backend: impl Into<String>,
        operation: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        StorageSystemError::Backend {
            backend: backend.into(),
            operation: operation.into(),
            name: name.into(),
            source,
        }
    }

    /// True for errors raised by validation rather than by a storage medium
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StorageSystemError::InvalidEntryName { .. }
                | StorageSystemError::InvalidStorageLimit(_)
                | StorageSystemError::DirectoryUnspecified
                | StorageSystemError::InvalidConfig(_)
        )
    }

    /// True when the backend reported that the entry does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageSystemError::Backend { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
