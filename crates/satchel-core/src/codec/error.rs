//! # Satchel Codec Errors
//!
//! Defines [`CodecError`], raised by the serialization pipeline. Encoding
//! and decoding stop at the first error; the error records where in the
//! object graph it happened so that a failed save or load can be traced back
//! to the offending value.
use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{message}{}", at(path))]
    Custom { path: String, message: String },

    #[error("non-finite float {value} cannot be stored{}", at(path))]
    NonFiniteFloat { path: String, value: f64 },

    #[error("map key must be a string or number{}", at(path))]
    KeyMustBeString { path: String },

    #[error("persistence delegate for '{type_name}' failed: {message}")]
    Delegate { type_name: String, message: String },

    #[error("no persistence delegate registered for '{0}'")]
    UnknownType(String),

    #[error("malformed instantiation record: {0}")]
    MalformedRecord(String),

    #[error("document format {found} is not compatible with {expected}")]
    IncompatibleFormat { found: String, expected: String },

    #[error("failed to render {format}: {message}")]
    Render { format: String, message: String },

    #[error("failed to parse {format}: {message}")]
    Parse { format: String, message: String },

    #[error("stored document does not match the requested type: {0}")]
    Shape(#[source] serde_json::Error),
}

fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at {}", path)
    }
}

impl CodecError {
    pub fn delegate(type_name: &str, message: impl Into<String>) -> Self {
        CodecError::Delegate {
            type_name: type_name.to_string(),
            message: message.into(),
        }
    }

    pub fn render(format: &str, e: impl Display) -> Self {
        CodecError::Render {
            format: format.to_string(),
            message: e.to_string(),
        }
    }

    pub fn parse(format: &str, e: impl Display) -> Self {
        CodecError::Parse {
            format: format.to_string(),
            message: e.to_string(),
        }
    }

    /// Attach a graph path to errors raised without one
    pub(crate) fn with_path(self, location: &str) -> Self {
        match self {
            CodecError::Custom { path, message } if path.is_empty() => CodecError::Custom {
                path: location.to_string(),
                message,
            },
            other => other,
        }
    }
}

impl serde::ser::Error for CodecError {
    fn custom<T: Display>(msg: T) -> Self {
        CodecError::Custom {
            path: String::new(),
            message: msg.to_string(),
        }
    }
}
