//! Built-in persistence delegates for the standard value types in
//! [`crate::values`].
use serde_json::{Map, Value};

use std::sync::Arc;

use crate::codec::delegate::{DelegateRegistry, Instantiation, PersistenceDelegate, Statement};
use crate::codec::error::CodecError;
use crate::values::{FILE_PATH_TYPE, LIST_MODEL_TYPE, LOCATOR_TYPE, RECT_TYPE, check_list_size};

/// Register the fixes every storage object starts with
pub fn register_builtin_fixes(registry: &mut DelegateRegistry, legacy_geometry_fix: bool) {
    registry.register(LIST_MODEL_TYPE, Arc::new(ListModelDelegate));
    registry.register(FILE_PATH_TYPE, Arc::new(PropertyDelegate::new(&["path"])));
    registry.register(LOCATOR_TYPE, Arc::new(StringFormDelegate::new("href")));
    if legacy_geometry_fix {
        registry.register(RECT_TYPE, Arc::new(PropertyDelegate::new(&["x", "y", "width", "height"])));
    }
}

fn as_object<'a>(type_name: &str, value: &'a Value) -> Result<&'a Map<String, Value>, CodecError> {
    value
        .as_object()
        .ok_or_else(|| CodecError::delegate(type_name, "expected a structured value"))
}

/// Rebuilds a value through a constructor taking the named properties, in order
#[derive(Debug, Clone)]
pub struct PropertyDelegate {
    properties: Vec<String>,
}

impl PropertyDelegate {
    pub fn new(properties: &[&str]) -> Self {
        Self {
            properties: properties.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PersistenceDelegate for PropertyDelegate {
    fn instantiate(&self, type_name: &str, default: Value) -> Result<Instantiation, CodecError> {
        let fields = as_object(type_name, &default)?;
        let args = self
            .properties
            .iter()
            .map(|property| {
                fields.get(property).cloned().ok_or_else(|| {
                    CodecError::delegate(type_name, format!("missing property '{}'", property))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Instantiation::new(type_name, args))
    }

    fn reconstruct(&self, record: &Instantiation) -> Result<Value, CodecError> {
        let mut fields = Map::new();
        for (index, property) in self.properties.iter().enumerate() {
            fields.insert(property.clone(), record.arg(index)?.clone());
        }
        Ok(Value::Object(fields))
    }
}

/// Rebuilds a value from its canonical string form alone
#[derive(Debug, Clone)]
pub struct StringFormDelegate {
    property: String,
}

impl StringFormDelegate {
    /// `property` names the field of the default encoding holding the string form
    pub fn new(property: &str) -> Self {
        Self {
            property: property.to_string(),
        }
    }
}

impl PersistenceDelegate for StringFormDelegate {
    fn instantiate(&self, type_name: &str, default: Value) -> Result<Instantiation, CodecError> {
        let form = match &default {
            Value::String(s) => s.clone(),
            other => as_object(type_name, other)?
                .get(&self.property)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    CodecError::delegate(type_name, format!("missing string property '{}'", self.property))
                })?,
        };
        Ok(Instantiation::new(type_name, vec![Value::String(form)]))
    }

    fn reconstruct(&self, record: &Instantiation) -> Result<Value, CodecError> {
        match record.arg(0)? {
            Value::String(form) => Ok(Value::String(form.clone())),
            _ => Err(CodecError::delegate(&record.type_name, "string form must be a string")),
        }
    }
}

/// Fix for [`ListModel`](crate::values::ListModel).
///
/// A list model is rebuilt by sizing it, which fills it with empty slots.
/// The record therefore carries `setSize`, then a `set` for every occupied
/// slot inside that size and an `add` for anything past it. The delegate
/// keeps its own copy of the rebuilt list in step with each statement it
/// emits and checks the result against the original.
#[derive(Debug, Clone, Default)]
pub struct ListModelDelegate;

impl PersistenceDelegate for ListModelDelegate {
    fn instantiate(&self, type_name: &str, default: Value) -> Result<Instantiation, CodecError> {
        let fields = as_object(type_name, &default)?;
        let elements = match fields.get("elements") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => return Err(CodecError::delegate(type_name, "elements must be a sequence")),
            None => &[],
        };
        let size = fields
            .get("size")
            .and_then(Value::as_u64)
            .ok_or_else(|| CodecError::delegate(type_name, "missing size"))?;
        let size = check_list_size(size, elements.len()).map_err(|e| CodecError::delegate(type_name, e))?;

        let mut record = Instantiation::new(type_name, Vec::new())
            .with_statement(Statement::new("setSize", vec![Value::from(size)]));
        let mut target = vec![Value::Null; size];

        for (index, element) in elements.iter().enumerate() {
            if index < size {
                if target[index] != *element {
                    record.statements.push(Statement::new("set", vec![Value::from(index), element.clone()]));
                    target[index] = element.clone();
                }
            } else {
                record.statements.push(Statement::new("add", vec![element.clone()]));
                target.push(element.clone());
            }
        }

        if target.len() < elements.len() || target[..elements.len()] != *elements {
            return Err(CodecError::delegate(type_name, "replayed list does not match the original"));
        }
        // The record must stay loadable: reconstruction bounds sizes by the statement count
        check_list_size(size as u64, record.statements.len()).map_err(|e| CodecError::delegate(type_name, e))?;
        Ok(record)
    }

    fn reconstruct(&self, record: &Instantiation) -> Result<Value, CodecError> {
        let type_name = record.type_name.as_str();
        let mut target: Vec<Value> = Vec::new();

        for statement in &record.statements {
            match (statement.call.as_str(), statement.args.as_slice()) {
                ("setSize", [size]) => {
                    let size = size
                        .as_u64()
                        .ok_or_else(|| CodecError::delegate(type_name, "setSize needs a count"))?;
                    let size = check_list_size(size, record.statements.len())
                        .map_err(|e| CodecError::delegate(type_name, e))?;
                    target.resize(size, Value::Null);
                }
                ("set", [index, value]) => {
                    let index = index
                        .as_u64()
                        .map(|i| i as usize)
                        .filter(|i| *i < target.len())
                        .ok_or_else(|| CodecError::delegate(type_name, "set index out of range"))?;
                    target[index] = value.clone();
                }
                ("add", [value]) => target.push(value.clone()),
                (call, _) => {
                    return Err(CodecError::delegate(
                        type_name,
                        format!("unsupported statement '{}'", call),
                    ));
                }
            }
        }

        let mut fields = Map::new();
        fields.insert("size".to_string(), Value::from(target.len()));
        fields.insert("elements".to_string(), Value::Array(target));
        Ok(Value::Object(fields))
    }
}
