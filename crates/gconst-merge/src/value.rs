use std::collections::BTreeMap;

use gconst_types::Name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Dynamic record value model walked by the merge engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent optional, dynamic or variant slot.
    Null,
    Bool(bool),
    Int(i64),
    Nat(u64),
    Float(f64),
    #[serde(with = "serde_bytes")]
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<Value>),
    Map(ValueMap),
    Record(Record),
    Variant {
        tag: String,
        value: Option<Box<Value>>,
    },
    /// Populated "any" slot. The payload carries its own shape.
    Dynamic(Box<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl Value {
    /// Human-readable kind string used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Nat(_) => "nat",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Variant { .. } => "variant",
            Value::Dynamic(_) => "dynamic",
        }
    }

    /// Convenience helper to build a record from field/value pairs.
    pub fn record(
        type_name: impl Into<Name>,
        fields: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Self {
        Value::Record(Record::from_fields(type_name, fields))
    }

    pub fn dynamic(payload: Value) -> Self {
        Value::Dynamic(Box::new(payload))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// True when the value equals the zero value of its own variant. Records
    /// are zero when every field is.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Nat(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::Bytes(b) => b.is_empty(),
            Value::Text(t) => t.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            Value::Record(record) => record.fields.values().all(Value::is_zero),
            Value::Variant { .. } | Value::Dynamic(_) => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Nat(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

/// Instance of a named record type. Field order follows insertion; a field
/// missing from `fields` reads as the empty value of its declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub type_name: Name,
    pub fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<Name>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn from_fields(
        type_name: impl Into<Name>,
        fields: impl IntoIterator<Item = (impl Into<String>, Value)>,
    ) -> Self {
        let mut record = Self::new(type_name);
        for (name, value) in fields {
            record.fields.insert(name.into(), value);
        }
        record
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.get_mut(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }
}

/// Key type for maps (limited to the schema's comparable primitives).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueKey {
    Bool(bool),
    Int(i64),
    Nat(u64),
    Text(String),
}

impl From<&str> for ValueKey {
    fn from(value: &str) -> Self {
        ValueKey::Text(value.to_owned())
    }
}

pub type ValueMap = BTreeMap<ValueKey, Value>;
