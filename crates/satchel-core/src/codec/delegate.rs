use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::error::CodecError;
use crate::codec::fixes;

/// Key marking an object in the stored graph as an instantiation record
pub const RECORD_TYPE_KEY: &str = "$type";

/// Key of the object standing in for a null in formats without one
pub const NULL_KEY: &str = "$null";

/// Stored form of a key in a plain object.
///
/// Keys starting with `$` are reserved for records and markers, so one
/// more `$` is prefixed to any such key a bean writes.
pub fn escape_key(key: String) -> String {
    if key.starts_with('$') { format!("${}", key) } else { key }
}

/// Inverse of [`escape_key`]
pub fn unescape_key(key: String) -> String {
    match key.strip_prefix('$') {
        Some(rest) => rest.to_string(),
        None => key,
    }
}

/// A method call replayed on a freshly instantiated value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub call: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(call: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            call: call.into(),
            args,
        }
    }
}

/// How a delegated value is written: constructor arguments plus the
/// statements that bring the new instance into the original's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instantiation {
    #[serde(rename = "$type")]
    pub type_name: String,
    #[serde(rename = "new", default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(rename = "do", default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<Statement>,
}

impl Instantiation {
    pub fn new(type_name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            args,
            statements: Vec::new(),
        }
    }

    /// Append a statement, builder style
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Constructor argument `index`, or a delegate error naming what is missing
    pub fn arg(&self, index: usize) -> Result<&Value, CodecError> {
        self.args.get(index).ok_or_else(|| {
            CodecError::delegate(
                &self.type_name,
                format!("missing constructor argument {}", index),
            )
        })
    }
}

/// Strategy overriding how one value type is encoded and rebuilt.
///
/// `instantiate` receives the type's default structural encoding (with any
/// nested delegated values already turned into records) and describes how to
/// recreate it. `reconstruct` must evaluate such a record back into the
/// default structural encoding the type's `Deserialize` impl accepts.
pub trait PersistenceDelegate: Send + Sync + Debug {
    fn instantiate(&self, type_name: &str, default: Value) -> Result<Instantiation, CodecError>;

    fn reconstruct(&self, record: &Instantiation) -> Result<Value, CodecError>;
}

/// Mapping from serde type names to persistence delegates
#[derive(Debug, Clone, Default)]
pub struct DelegateRegistry {
    delegates: HashMap<String, Arc<dyn PersistenceDelegate>>,
}

impl DelegateRegistry {
    /// An empty registry; every type uses default structural encoding
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in fixes for the standard value types
    pub fn with_builtin_fixes(legacy_geometry_fix: bool) -> Self {
        let mut registry = Self::new();
        fixes::register_builtin_fixes(&mut registry, legacy_geometry_fix);
        registry
    }

    /// Register a delegate, returning the one it replaces
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        delegate: Arc<dyn PersistenceDelegate>,
    ) -> Option<Arc<dyn PersistenceDelegate>> {
        self.delegates.insert(type_name.into(), delegate)
    }

    pub fn remove(&mut self, type_name: &str) -> Option<Arc<dyn PersistenceDelegate>> {
        self.delegates.remove(type_name)
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn PersistenceDelegate>> {
        self.delegates.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.delegates.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.delegates.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }

    /// Add or shadow entries from another mapping
    pub fn extend(&mut self, delegates: HashMap<String, Arc<dyn PersistenceDelegate>>) {
        self.delegates.extend(delegates);
    }
}
