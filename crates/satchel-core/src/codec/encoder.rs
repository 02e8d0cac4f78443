//! Serde-driven object graph encoder.
//!
//! [`GraphEncoder`] walks any `Serialize` value into a [`serde_json::Value`]
//! graph held in memory. Every named type (struct, newtype, tuple struct,
//! unit struct or enum) is looked up in the [`DelegateRegistry`] once its
//! default structural encoding is known; registered types are replaced by
//! the instantiation record their delegate produces. Object keys starting
//! with `$` are escaped unless the object goes to a delegate, which sees
//! the keys as the bean wrote them.
//!
//! The walk stops at the first error, which carries the graph path of the
//! offending value (`root.items[2].path`).
use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

use crate::codec::delegate::{DelegateRegistry, escape_key};
use crate::codec::error::CodecError;

type Result<T> = std::result::Result<T, CodecError>;

/// Encode `value` into an object graph
pub fn encode_graph<T: Serialize + ?Sized>(value: &T, registry: &DelegateRegistry) -> Result<Value> {
    GraphEncoder::new(registry).encode(value)
}

pub struct GraphEncoder<'r> {
    registry: &'r DelegateRegistry,
    path: String,
}

impl<'r> GraphEncoder<'r> {
    pub fn new(registry: &'r DelegateRegistry) -> Self {
        Self {
            registry,
            path: "root".to_string(),
        }
    }

    fn child(&self, path: String) -> Self {
        Self {
            registry: self.registry,
            path,
        }
    }

    fn element(&self, index: usize) -> Self {
        self.child(format!("{}[{}]", self.path, index))
    }

    fn field(&self, key: &str) -> Self {
        self.child(format!("{}.{}", self.path, key))
    }

    /// Encode `value` at this encoder's path
    fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        let path = self.path.clone();
        value.serialize(self).map_err(|e| e.with_path(&path))
    }

    /// Hand the default encoding of a named type to its delegate, if any
    fn finish(&self, type_name: &'static str, default: Value) -> Result<Value> {
        let Some(delegate) = self.registry.get(type_name) else {
            return Ok(default);
        };
        let mut record = delegate.instantiate(type_name, default)?;
        // Records always carry the tag they were looked up by
        record.type_name = type_name.to_string();
        serde_json::to_value(&record).map_err(|e| CodecError::delegate(type_name, e.to_string()))
    }

    /// Finish an object built by this encoder
    fn finish_object(&self, type_name: Option<&'static str>, map: Map<String, Value>) -> Result<Value> {
        match type_name {
            Some(name) if self.registry.contains(name) => self.finish(name, Value::Object(map)),
            _ => Ok(Value::Object(map.into_iter().map(|(k, v)| (escape_key(k), v)).collect())),
        }
    }

    fn float(&self, value: f64) -> Result<Value> {
        Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| CodecError::NonFiniteFloat {
                path: self.path.clone(),
                value,
            })
    }

    fn map_key(&self, key: Value) -> Result<String> {
        match key {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(CodecError::KeyMustBeString {
                path: self.path.clone(),
            }),
        }
    }
}

fn tagged(variant: &'static str, value: Value) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert(variant.to_string(), value);
    object
}

impl<'r> ser::Serializer for GraphEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    type SerializeSeq = SeqEncoder<'r>;
    type SerializeTuple = SeqEncoder<'r>;
    type SerializeTupleStruct = SeqEncoder<'r>;
    type SerializeTupleVariant = VariantSeqEncoder<'r>;
    type SerializeMap = MapEncoder<'r>;
    type SerializeStruct = MapEncoder<'r>;
    type SerializeStructVariant = VariantMapEncoder<'r>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(v.into()))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        self.float(v)
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|b| Value::from(*b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        self.encode(value)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        self.finish(name, Value::Null)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        self.finish(name, Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, name: &'static str, value: &T) -> Result<Value> {
        let inner = self.child(self.path.clone()).encode(value)?;
        self.finish(name, inner)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let inner = self.field(variant).encode(value)?;
        self.finish_object(Some(name), tagged(variant, inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqEncoder<'r>> {
        Ok(SeqEncoder {
            encoder: self,
            name: None,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqEncoder<'r>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SeqEncoder<'r>> {
        Ok(SeqEncoder {
            encoder: self,
            name: Some(name),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqEncoder<'r>> {
        let inner = self.field(variant);
        Ok(VariantSeqEncoder {
            outer: self,
            name,
            variant,
            inner: SeqEncoder {
                encoder: inner,
                name: None,
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder<'r>> {
        Ok(MapEncoder {
            encoder: self,
            name: None,
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<MapEncoder<'r>> {
        Ok(MapEncoder {
            encoder: self,
            name: Some(name),
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<VariantMapEncoder<'r>> {
        let inner = self.field(variant);
        Ok(VariantMapEncoder {
            outer: self,
            name,
            variant,
            inner: MapEncoder {
                encoder: inner,
                name: None,
                map: Map::new(),
                next_key: None,
            },
        })
    }
}

pub struct SeqEncoder<'r> {
    encoder: GraphEncoder<'r>,
    name: Option<&'static str>,
    items: Vec<Value>,
}

impl<'r> SeqEncoder<'r> {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let item = self.encoder.element(self.items.len()).encode(value)?;
        self.items.push(item);
        Ok(())
    }

    fn done(self) -> Result<Value> {
        let value = Value::Array(self.items);
        match self.name {
            Some(name) => self.encoder.finish(name, value),
            None => Ok(value),
        }
    }
}

impl<'r> ser::SerializeSeq for SeqEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.done()
    }
}

impl<'r> ser::SerializeTuple for SeqEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.done()
    }
}

impl<'r> ser::SerializeTupleStruct for SeqEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.done()
    }
}

pub struct VariantSeqEncoder<'r> {
    outer: GraphEncoder<'r>,
    name: &'static str,
    variant: &'static str,
    inner: SeqEncoder<'r>,
}

impl<'r> ser::SerializeTupleVariant for VariantSeqEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.inner.push(value)
    }

    fn end(self) -> Result<Value> {
        let inner = self.inner.done()?;
        self.outer.finish_object(Some(self.name), tagged(self.variant, inner))
    }
}

pub struct MapEncoder<'r> {
    encoder: GraphEncoder<'r>,
    name: Option<&'static str>,
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl<'r> MapEncoder<'r> {
    fn insert<T: Serialize + ?Sized>(&mut self, key: String, value: &T) -> Result<()> {
        let value = self.encoder.field(&key).encode(value)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn done(self) -> Result<Value> {
        self.encoder.finish_object(self.name, self.map)
    }
}

impl<'r> ser::SerializeMap for MapEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        let key = self.encoder.child(self.encoder.path.clone()).encode(key)?;
        self.next_key = Some(self.encoder.map_key(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| <CodecError as ser::Error>::custom("map value serialized before its key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Value> {
        self.done()
    }
}

impl<'r> ser::SerializeStruct for MapEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value> {
        self.done()
    }
}

pub struct VariantMapEncoder<'r> {
    outer: GraphEncoder<'r>,
    name: &'static str,
    variant: &'static str,
    inner: MapEncoder<'r>,
}

impl<'r> ser::SerializeStructVariant for VariantMapEncoder<'r> {
    type Ok = Value;
    type Error = CodecError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.inner.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value> {
        let inner = self.inner.done()?;
        self.outer.finish_object(Some(self.name), tagged(self.variant, inner))
    }
}
