//! Opaque record codec: schema-directed canonical CBOR.
//!
//! Records encode as maps keyed by field name. Empty fields are omitted, so a
//! reduced message only pays for what differs from the constant; decoding
//! starts from a fresh empty record and fills in what is present. A present
//! optional is always written, even when its payload is empty.

use std::collections::BTreeMap;

use gconst_cbor::{from_cbor, to_canonical_cbor};
use gconst_merge::shape::empty_record;
use gconst_merge::{Record, Value, ValueKey, ValueMap};
use gconst_types::{Name, SchemaIndex, TypeExpr, TypeMapKey};
use serde_cbor::value::Value as CborValue;
use thiserror::Error;

const TAG_KEY: &str = "$tag";
const TYPE_KEY: &str = "$type";
const VALUE_KEY: &str = "$value";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cbor: {0}")]
    Cbor(#[from] serde_cbor::Error),
    #[error("record type '{0}' is not defined in the schema")]
    UnknownRecord(Name),
    #[error("record '{record}' has no field '{field}'")]
    UnknownField { record: Name, field: String },
    #[error("{path}: expected {expected}, found {found}")]
    Shape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Encode `record` as canonical CBOR, omitting empty fields.
pub fn encode(schemas: &SchemaIndex, record: &Record) -> Result<Vec<u8>, CodecError> {
    let wire = record_to_wire(schemas, record, &record.type_name)?;
    Ok(to_canonical_cbor(&wire)?)
}

/// Decode bytes produced by [`encode`] into a dense record of `type_name`.
pub fn decode(schemas: &SchemaIndex, type_name: &str, bytes: &[u8]) -> Result<Record, CodecError> {
    let wire: CborValue = from_cbor(bytes)?;
    record_from_wire(schemas, type_name, wire, type_name)
}

fn shape(path: &str, expected: &'static str, found: &'static str) -> CodecError {
    CodecError::Shape {
        path: path.to_string(),
        expected,
        found,
    }
}

fn text(value: &str) -> CborValue {
    CborValue::Text(value.to_string())
}

fn record_to_wire(schemas: &SchemaIndex, record: &Record, path: &str) -> Result<CborValue, CodecError> {
    let def = schemas
        .get(&record.type_name)
        .ok_or_else(|| CodecError::UnknownRecord(record.type_name.clone()))?;
    let mut fields = BTreeMap::new();
    for (name, value) in &record.fields {
        let Some((_, field)) = def.field(name) else {
            return Err(CodecError::UnknownField {
                record: record.type_name.clone(),
                field: name.clone(),
            });
        };
        let field_path = format!("{path}.{name}");
        if let Some(wire) = sparse_to_wire(schemas, &field.ty, value, &field_path)? {
            fields.insert(text(name), wire);
        }
    }
    Ok(CborValue::Map(fields))
}

/// `None` when the field is empty and can be left off the wire.
fn sparse_to_wire(
    schemas: &SchemaIndex,
    ty: &TypeExpr,
    value: &Value,
    path: &str,
) -> Result<Option<CborValue>, CodecError> {
    let wire = value_to_wire(schemas, ty, value, path)?;
    let empty = match (ty, &wire) {
        (TypeExpr::Option(_) | TypeExpr::Variant(_) | TypeExpr::Dynamic, CborValue::Null) => true,
        (TypeExpr::Option(_) | TypeExpr::Variant(_) | TypeExpr::Dynamic, _) => false,
        (TypeExpr::Ref(_), CborValue::Map(fields)) => fields.is_empty(),
        _ => value.is_zero(),
    };
    Ok((!empty).then_some(wire))
}

fn value_to_wire(
    schemas: &SchemaIndex,
    ty: &TypeExpr,
    value: &Value,
    path: &str,
) -> Result<CborValue, CodecError> {
    let wire = match (ty, value) {
        (TypeExpr::Bool, Value::Bool(b)) => CborValue::Bool(*b),
        (TypeExpr::Int, Value::Int(i)) => CborValue::Integer(i128::from(*i)),
        (TypeExpr::Nat, Value::Nat(n)) => CborValue::Integer(i128::from(*n)),
        (TypeExpr::Float, Value::Float(f)) => CborValue::Float(*f),
        (TypeExpr::Text, Value::Text(t)) => text(t),
        (TypeExpr::Bytes, Value::Bytes(b)) => CborValue::Bytes(b.clone()),
        (TypeExpr::Ref(name), Value::Record(record)) => {
            if &record.type_name != name {
                return Err(CodecError::Shape {
                    path: path.to_string(),
                    expected: "record of the declared type",
                    found: "record of another type",
                });
            }
            record_to_wire(schemas, record, path)?
        }
        (TypeExpr::List(inner), Value::List(items)) => CborValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| value_to_wire(schemas, inner, item, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        (TypeExpr::Map(map), Value::Map(entries)) => {
            let mut out = BTreeMap::new();
            for (key, entry) in entries {
                let entry_path = format!("{path}[{key:?}]");
                out.insert(
                    key_to_wire(map.key, key, &entry_path)?,
                    value_to_wire(schemas, &map.value, entry, &entry_path)?,
                );
            }
            CborValue::Map(out)
        }
        (TypeExpr::Option(_) | TypeExpr::Variant(_) | TypeExpr::Dynamic, Value::Null) => {
            CborValue::Null
        }
        (TypeExpr::Option(inner), present) => value_to_wire(schemas, inner, present, path)?,
        (TypeExpr::Variant(cases), Value::Variant { tag, value }) => {
            let case = cases
                .get(tag)
                .ok_or_else(|| shape(path, "declared variant case", "unknown case"))?;
            let mut out = BTreeMap::from([(text(TAG_KEY), text(tag))]);
            if let Some(inner) = value {
                out.insert(text(VALUE_KEY), value_to_wire(schemas, case, inner, path)?);
            }
            CborValue::Map(out)
        }
        (TypeExpr::Dynamic, Value::Dynamic(payload)) => dynamic_to_wire(schemas, payload, path)?,
        (ty, other) => return Err(shape(path, ty.kind(), other.kind())),
    };
    Ok(wire)
}

/// Self-describing form used inside dynamic slots: `{"$type": .., "$value": ..}`.
fn dynamic_to_wire(schemas: &SchemaIndex, payload: &Value, path: &str) -> Result<CborValue, CodecError> {
    let (type_name, wire) = match payload {
        Value::Null => ("null", None),
        Value::Bool(b) => ("bool", Some(CborValue::Bool(*b))),
        Value::Int(i) => ("int", Some(CborValue::Integer(i128::from(*i)))),
        Value::Nat(n) => ("nat", Some(CborValue::Integer(i128::from(*n)))),
        Value::Float(f) => ("float", Some(CborValue::Float(*f))),
        Value::Text(t) => ("text", Some(text(t))),
        Value::Bytes(b) => ("bytes", Some(CborValue::Bytes(b.clone()))),
        Value::List(items) => (
            "list",
            Some(CborValue::Array(
                items
                    .iter()
                    .map(|item| dynamic_to_wire(schemas, item, path))
                    .collect::<Result<_, _>>()?,
            )),
        ),
        Value::Map(entries) => (
            "map",
            Some(CborValue::Array(
                entries
                    .iter()
                    .map(|(key, entry)| -> Result<CborValue, CodecError> {
                        Ok(CborValue::Array(vec![
                            dynamic_to_wire(schemas, &key_to_value(key), path)?,
                            dynamic_to_wire(schemas, entry, path)?,
                        ]))
                    })
                    .collect::<Result<_, _>>()?,
            )),
        ),
        Value::Variant { tag, value } => {
            let mut out = BTreeMap::from([(text(TAG_KEY), text(tag))]);
            if let Some(inner) = value {
                out.insert(text(VALUE_KEY), dynamic_to_wire(schemas, inner, path)?);
            }
            ("variant", Some(CborValue::Map(out)))
        }
        Value::Dynamic(inner) => ("dynamic", Some(dynamic_to_wire(schemas, inner, path)?)),
        Value::Record(record) => {
            let wire = record_to_wire(schemas, record, path)?;
            let mut out = BTreeMap::from([(text(TYPE_KEY), text(&record.type_name))]);
            out.insert(text(VALUE_KEY), wire);
            return Ok(CborValue::Map(out));
        }
    };
    let mut out = BTreeMap::from([(text(TYPE_KEY), text(type_name))]);
    if let Some(wire) = wire {
        out.insert(text(VALUE_KEY), wire);
    }
    Ok(CborValue::Map(out))
}

fn key_to_wire(ty: TypeMapKey, key: &ValueKey, path: &str) -> Result<CborValue, CodecError> {
    match (ty, key) {
        (TypeMapKey::Bool, ValueKey::Bool(b)) => Ok(CborValue::Bool(*b)),
        (TypeMapKey::Int, ValueKey::Int(i)) => Ok(CborValue::Integer(i128::from(*i))),
        (TypeMapKey::Nat, ValueKey::Nat(n)) => Ok(CborValue::Integer(i128::from(*n))),
        (TypeMapKey::Text, ValueKey::Text(t)) => Ok(text(t)),
        (ty, key) => Err(shape(path, key_type_kind(ty), key_to_value(key).kind())),
    }
}

fn key_to_value(key: &ValueKey) -> Value {
    match key {
        ValueKey::Bool(b) => Value::Bool(*b),
        ValueKey::Int(i) => Value::Int(*i),
        ValueKey::Nat(n) => Value::Nat(*n),
        ValueKey::Text(t) => Value::Text(t.clone()),
    }
}

fn key_type_kind(ty: TypeMapKey) -> &'static str {
    match ty {
        TypeMapKey::Bool => "bool",
        TypeMapKey::Int => "int",
        TypeMapKey::Nat => "nat",
        TypeMapKey::Text => "text",
    }
}

fn wire_kind(wire: &CborValue) -> &'static str {
    match wire {
        CborValue::Null => "null",
        CborValue::Bool(_) => "bool",
        CborValue::Integer(_) => "integer",
        CborValue::Float(_) => "float",
        CborValue::Bytes(_) => "bytes",
        CborValue::Text(_) => "text",
        CborValue::Array(_) => "array",
        CborValue::Map(_) => "map",
        _ => "tag",
    }
}

fn record_from_wire(
    schemas: &SchemaIndex,
    type_name: &str,
    wire: CborValue,
    path: &str,
) -> Result<Record, CodecError> {
    let def = schemas
        .get(type_name)
        .ok_or_else(|| CodecError::UnknownRecord(type_name.to_string()))?;
    let CborValue::Map(entries) = wire else {
        return Err(shape(path, "map", wire_kind(&wire)));
    };
    let mut record = empty_record(schemas, type_name);
    for (key, entry) in entries {
        let CborValue::Text(name) = key else {
            return Err(shape(path, "text field name", wire_kind(&key)));
        };
        let Some((_, field)) = def.field(&name) else {
            return Err(CodecError::UnknownField {
                record: type_name.to_string(),
                field: name,
            });
        };
        let field_path = format!("{path}.{name}");
        let value = value_from_wire(schemas, &field.ty, entry, &field_path)?;
        record.fields.insert(name, value);
    }
    Ok(record)
}

fn value_from_wire(
    schemas: &SchemaIndex,
    ty: &TypeExpr,
    wire: CborValue,
    path: &str,
) -> Result<Value, CodecError> {
    let value = match (ty, wire) {
        (TypeExpr::Bool, CborValue::Bool(b)) => Value::Bool(b),
        (TypeExpr::Int, CborValue::Integer(i)) => {
            Value::Int(i64::try_from(i).map_err(|_| shape(path, "int", "out of range integer"))?)
        }
        (TypeExpr::Nat, CborValue::Integer(n)) => {
            Value::Nat(u64::try_from(n).map_err(|_| shape(path, "nat", "out of range integer"))?)
        }
        (TypeExpr::Float, CborValue::Float(f)) => Value::Float(f),
        (TypeExpr::Text, CborValue::Text(t)) => Value::Text(t),
        (TypeExpr::Bytes, CborValue::Bytes(b)) => Value::Bytes(b),
        (TypeExpr::Ref(name), wire) => Value::Record(record_from_wire(schemas, name, wire, path)?),
        (TypeExpr::List(inner), CborValue::Array(items)) => Value::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| value_from_wire(schemas, inner, item, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        (TypeExpr::Map(map), CborValue::Map(entries)) => {
            let mut out = ValueMap::new();
            for (key, entry) in entries {
                let key = key_from_wire(map.key, key, path)?;
                let entry_path = format!("{path}[{key:?}]");
                out.insert(key, value_from_wire(schemas, &map.value, entry, &entry_path)?);
            }
            Value::Map(out)
        }
        (TypeExpr::Option(_) | TypeExpr::Variant(_) | TypeExpr::Dynamic, CborValue::Null) => {
            Value::Null
        }
        (TypeExpr::Option(inner), wire) => value_from_wire(schemas, inner, wire, path)?,
        (TypeExpr::Variant(cases), CborValue::Map(mut entries)) => {
            let tag = match entries.remove(&text(TAG_KEY)) {
                Some(CborValue::Text(tag)) => tag,
                _ => return Err(shape(path, "variant with $tag", "map without $tag")),
            };
            let case = cases
                .get(&tag)
                .ok_or_else(|| shape(path, "declared variant case", "unknown case"))?;
            let value = entries
                .remove(&text(VALUE_KEY))
                .map(|inner| value_from_wire(schemas, case, inner, path).map(Box::new))
                .transpose()?;
            Value::Variant { tag, value }
        }
        (TypeExpr::Dynamic, wire) => Value::Dynamic(Box::new(dynamic_from_wire(schemas, wire, path)?)),
        (ty, wire) => return Err(shape(path, ty.kind(), wire_kind(&wire))),
    };
    Ok(value)
}

fn dynamic_from_wire(schemas: &SchemaIndex, wire: CborValue, path: &str) -> Result<Value, CodecError> {
    let CborValue::Map(mut entries) = wire else {
        return Err(shape(path, "dynamic", wire_kind(&wire)));
    };
    let type_name = match entries.remove(&text(TYPE_KEY)) {
        Some(CborValue::Text(name)) => name,
        _ => return Err(shape(path, "dynamic with $type", "map without $type")),
    };
    let Some(inner) = entries.remove(&text(VALUE_KEY)) else {
        return match type_name.as_str() {
            "null" => Ok(Value::Null),
            _ => Err(shape(path, "dynamic with $value", "map without $value")),
        };
    };
    let value = match type_name.as_str() {
        "bool" => value_from_wire(schemas, &TypeExpr::Bool, inner, path)?,
        "int" => value_from_wire(schemas, &TypeExpr::Int, inner, path)?,
        "nat" => value_from_wire(schemas, &TypeExpr::Nat, inner, path)?,
        "float" => value_from_wire(schemas, &TypeExpr::Float, inner, path)?,
        "text" => value_from_wire(schemas, &TypeExpr::Text, inner, path)?,
        "bytes" => value_from_wire(schemas, &TypeExpr::Bytes, inner, path)?,
        "list" => {
            let CborValue::Array(items) = inner else {
                return Err(shape(path, "array", wire_kind(&inner)));
            };
            Value::List(
                items
                    .into_iter()
                    .map(|item| dynamic_from_wire(schemas, item, path))
                    .collect::<Result<_, _>>()?,
            )
        }
        "map" => {
            let CborValue::Array(pairs) = inner else {
                return Err(shape(path, "array", wire_kind(&inner)));
            };
            let mut out = ValueMap::new();
            for pair in pairs {
                let CborValue::Array(pair) = pair else {
                    return Err(shape(path, "key/value pair", wire_kind(&pair)));
                };
                let [key, entry]: [CborValue; 2] = pair
                    .try_into()
                    .map_err(|_| shape(path, "key/value pair", "array of another length"))?;
                let key = value_to_key(dynamic_from_wire(schemas, key, path)?, path)?;
                out.insert(key, dynamic_from_wire(schemas, entry, path)?);
            }
            Value::Map(out)
        }
        "variant" => {
            let CborValue::Map(mut fields) = inner else {
                return Err(shape(path, "variant", wire_kind(&inner)));
            };
            let tag = match fields.remove(&text(TAG_KEY)) {
                Some(CborValue::Text(tag)) => tag,
                _ => return Err(shape(path, "variant with $tag", "map without $tag")),
            };
            let value = fields
                .remove(&text(VALUE_KEY))
                .map(|inner| dynamic_from_wire(schemas, inner, path).map(Box::new))
                .transpose()?;
            Value::Variant { tag, value }
        }
        "dynamic" => Value::Dynamic(Box::new(dynamic_from_wire(schemas, inner, path)?)),
        record => Value::Record(record_from_wire(schemas, record, inner, path)?),
    };
    Ok(value)
}

fn key_from_wire(ty: TypeMapKey, wire: CborValue, path: &str) -> Result<ValueKey, CodecError> {
    let key = match (ty, wire) {
        (TypeMapKey::Bool, CborValue::Bool(b)) => ValueKey::Bool(b),
        (TypeMapKey::Int, CborValue::Integer(i)) => {
            ValueKey::Int(i64::try_from(i).map_err(|_| shape(path, "int", "out of range integer"))?)
        }
        (TypeMapKey::Nat, CborValue::Integer(n)) => {
            ValueKey::Nat(u64::try_from(n).map_err(|_| shape(path, "nat", "out of range integer"))?)
        }
        (TypeMapKey::Text, CborValue::Text(t)) => ValueKey::Text(t),
        (ty, wire) => return Err(shape(path, key_type_kind(ty), wire_kind(&wire))),
    };
    Ok(key)
}

fn value_to_key(value: Value, path: &str) -> Result<ValueKey, CodecError> {
    match value {
        Value::Bool(b) => Ok(ValueKey::Bool(b)),
        Value::Int(i) => Ok(ValueKey::Int(i)),
        Value::Nat(n) => Ok(ValueKey::Nat(n)),
        Value::Text(t) => Ok(ValueKey::Text(t)),
        other => Err(shape(path, "map key", other.kind())),
    }
}
