use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::codec::delegate::{DelegateRegistry, Instantiation, RECORD_TYPE_KEY, unescape_key};
use crate::codec::error::CodecError;

/// Turn every instantiation record in `graph` back into the default
/// encoding of its type, innermost records first. Keys of plain objects
/// lose the escape the encoder gave them.
pub fn rebuild_graph(graph: Value, registry: &DelegateRegistry) -> Result<Value, CodecError> {
    match graph {
        Value::Array(items) => items
            .into_iter()
            .map(|item| rebuild_graph(item, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(fields) if fields.contains_key(RECORD_TYPE_KEY) => rebuild_record(fields, registry),
        Value::Object(fields) => fields
            .into_iter()
            .map(|(key, value)| rebuild_graph(value, registry).map(|value| (unescape_key(key), value)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        scalar => Ok(scalar),
    }
}

fn rebuild_record(fields: Map<String, Value>, registry: &DelegateRegistry) -> Result<Value, CodecError> {
    let mut record: Instantiation = serde_json::from_value(Value::Object(fields))
        .map_err(|e| CodecError::MalformedRecord(e.to_string()))?;

    record.args = record
        .args
        .into_iter()
        .map(|arg| rebuild_graph(arg, registry))
        .collect::<Result<_, _>>()?;
    for statement in &mut record.statements {
        let args = std::mem::take(&mut statement.args);
        statement.args = args
            .into_iter()
            .map(|arg| rebuild_graph(arg, registry))
            .collect::<Result<_, _>>()?;
    }

    let delegate = registry
        .get(&record.type_name)
        .ok_or_else(|| CodecError::UnknownType(record.type_name.clone()))?;
    delegate.reconstruct(&record)
}

/// Rebuild `graph` and deserialize it as `T`
pub fn decode_graph<T: DeserializeOwned>(graph: Value, registry: &DelegateRegistry) -> Result<T, CodecError> {
    let rebuilt = rebuild_graph(graph, registry)?;
    serde_json::from_value(rebuilt).map_err(CodecError::Shape)
}
