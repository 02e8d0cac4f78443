//! # Satchel Core Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Each subsystem owns a typed error enum ([`StorageSystemError`] for the
//! storage layer, [`CodecError`] for the serialization pipeline); this module
//! folds them into a single type so callers can use `?` across subsystem
//! boundaries.
use std::result::Result as StdResult;

use crate::codec::error::CodecError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

/// Custom error type for satchel operations
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Serialization pipeline error raised outside of a named entry
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// True for validation failures that were raised before any I/O happened
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::StorageSystem(e) if e.is_configuration())
    }

    /// The storage error behind this error, if any
    pub fn as_storage(&self) -> Option<&StorageSystemError> {
        match self {
            Error::StorageSystem(e) => Some(e),
            _ => None,
        }
    }
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
