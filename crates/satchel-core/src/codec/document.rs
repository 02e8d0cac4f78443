use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::delegate::NULL_KEY;
use crate::codec::error::CodecError;
use crate::kernel::constants::DOCUMENT_FORMAT_VERSION;
use crate::storage::config::DataFormat;

/// Envelope every stored entry is wrapped in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub format: Version,
    pub root: Value,
}

impl Document {
    /// Wrap a graph with the current format version
    pub fn new(root: Value) -> Self {
        Self {
            format: current_version(),
            root,
        }
    }

    pub fn to_bytes(&self, format: DataFormat) -> Result<Vec<u8>, CodecError> {
        if !format.has_null() {
            let marked = Document {
                format: self.format.clone(),
                root: mark_nulls(self.root.clone()),
            };
            return format.render(&marked).map(String::into_bytes);
        }
        format.render(self).map(String::into_bytes)
    }

    /// Parse and check the format version
    pub fn from_bytes(bytes: &[u8], format: DataFormat) -> Result<Self, CodecError> {
        let text = std::str::from_utf8(bytes).map_err(|e| CodecError::parse(format.extension(), e))?;
        let mut document: Document = format.parse(text)?;
        let requirement = VersionReq::parse(&format!("^{}", DOCUMENT_FORMAT_VERSION))
            .map_err(|e| CodecError::parse("format version", e))?;
        if !requirement.matches(&document.format) {
            return Err(CodecError::IncompatibleFormat {
                found: document.format.to_string(),
                expected: DOCUMENT_FORMAT_VERSION.to_string(),
            });
        }
        if !format.has_null() {
            document.root = unmark_nulls(document.root);
        }
        Ok(document)
    }
}

/// Replace every null with a `{"$null": true}` object
fn mark_nulls(value: Value) -> Value {
    match value {
        Value::Null => {
            let mut marker = Map::new();
            marker.insert(NULL_KEY.to_string(), Value::Bool(true));
            Value::Object(marker)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(mark_nulls).collect()),
        Value::Object(fields) => Value::Object(fields.into_iter().map(|(k, v)| (k, mark_nulls(v))).collect()),
        scalar => scalar,
    }
}

fn unmark_nulls(value: Value) -> Value {
    match value {
        Value::Object(fields) if fields.len() == 1 && fields.contains_key(NULL_KEY) => Value::Null,
        Value::Array(items) => Value::Array(items.into_iter().map(unmark_nulls).collect()),
        Value::Object(fields) => Value::Object(fields.into_iter().map(|(k, v)| (k, unmark_nulls(v))).collect()),
        scalar => scalar,
    }
}

fn current_version() -> Version {
    Version::parse(DOCUMENT_FORMAT_VERSION).unwrap_or_else(|_| Version::new(1, 0, 0))
}
