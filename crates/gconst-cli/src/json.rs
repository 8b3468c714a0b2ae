//! Schema-directed conversion between JSON documents and engine values.
//!
//! Records are JSON objects keyed by field name; fields left out take their
//! empty value. Bytes are standard base64 strings. Variants are
//! `{"$tag": .., "$value": ..}` and dynamic slots `{"$type": .., "$value": ..}`,
//! where `$type` is a primitive kind, `list`, `map`, `variant`, `dynamic` or a
//! record name.

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gconst_merge::shape::empty_record;
use gconst_merge::{Record, Value, ValueKey, ValueMap};
use gconst_types::{SchemaIndex, TypeExpr, TypeMapKey};
use serde_json::{Map as JsonMap, Value as JsonValue, json};

/// Parse `json` as a record of `type_name`.
pub fn record_from_json(schemas: &SchemaIndex, type_name: &str, json: &JsonValue) -> Result<Record> {
    read_record(schemas, type_name, json, type_name)
}

fn read_record(schemas: &SchemaIndex, type_name: &str, json: &JsonValue, path: &str) -> Result<Record> {
    let def = schemas
        .get(type_name)
        .ok_or_else(|| anyhow!("record type '{type_name}' is not defined in the schema"))?;
    let object = json
        .as_object()
        .ok_or_else(|| anyhow!("{path}: expected object for {type_name}"))?;
    let mut record = empty_record(schemas, type_name);
    for (name, field_json) in object {
        let (_, field) = def
            .field(name)
            .ok_or_else(|| anyhow!("{path}: {type_name} has no field '{name}'"))?;
        let field_path = format!("{path}.{name}");
        let value = read_value(schemas, &field.ty, field_json, &field_path)?;
        record.fields.insert(name.clone(), value);
    }
    Ok(record)
}

fn read_value(schemas: &SchemaIndex, ty: &TypeExpr, json: &JsonValue, path: &str) -> Result<Value> {
    let mismatch = || anyhow!("{path}: expected {}, found {json}", ty.kind());
    let value = match ty {
        TypeExpr::Bool => Value::Bool(json.as_bool().ok_or_else(mismatch)?),
        TypeExpr::Int => Value::Int(json.as_i64().ok_or_else(mismatch)?),
        TypeExpr::Nat => Value::Nat(json.as_u64().ok_or_else(mismatch)?),
        TypeExpr::Float => Value::Float(json.as_f64().ok_or_else(mismatch)?),
        TypeExpr::Text => Value::Text(json.as_str().ok_or_else(mismatch)?.to_string()),
        TypeExpr::Bytes => {
            let text = json.as_str().ok_or_else(mismatch)?;
            Value::Bytes(
                STANDARD
                    .decode(text)
                    .with_context(|| format!("{path}: bytes must be base64"))?,
            )
        }
        TypeExpr::Ref(name) => Value::Record(read_record(schemas, name, json, path)?),
        TypeExpr::List(inner) => Value::List(
            json.as_array()
                .ok_or_else(mismatch)?
                .iter()
                .enumerate()
                .map(|(i, item)| read_value(schemas, inner, item, &format!("{path}[{i}]")))
                .collect::<Result<_>>()?,
        ),
        TypeExpr::Map(map) => {
            let mut out = ValueMap::new();
            for (key, entry) in json.as_object().ok_or_else(mismatch)? {
                let entry_path = format!("{path}[{key}]");
                out.insert(
                    read_key(map.key, key, &entry_path)?,
                    read_value(schemas, &map.value, entry, &entry_path)?,
                );
            }
            Value::Map(out)
        }
        _ if json.is_null() => Value::Null,
        TypeExpr::Option(inner) => read_value(schemas, inner, json, path)?,
        TypeExpr::Variant(cases) => {
            let (tag, inner) = tagged(json, "$tag", path)?;
            let case = cases
                .get(&tag)
                .ok_or_else(|| anyhow!("{path}: unknown variant case '{tag}'"))?;
            let value = inner
                .map(|inner| read_value(schemas, case, inner, path).map(Box::new))
                .transpose()?;
            Value::Variant { tag, value }
        }
        TypeExpr::Dynamic => Value::dynamic(read_dynamic(schemas, json, path)?),
    };
    Ok(value)
}

/// Split `{"<key>": name, "$value": v}` into its parts.
fn tagged<'j>(json: &'j JsonValue, key: &str, path: &str) -> Result<(String, Option<&'j JsonValue>)> {
    let object = json
        .as_object()
        .ok_or_else(|| anyhow!("{path}: expected {{\"{key}\": .., \"$value\": ..}}"))?;
    let name = object
        .get(key)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| anyhow!("{path}: missing {key}"))?;
    Ok((name.to_string(), object.get("$value")))
}

fn read_dynamic(schemas: &SchemaIndex, json: &JsonValue, path: &str) -> Result<Value> {
    let (type_name, inner) = tagged(json, "$type", path)?;
    if type_name == "null" {
        return Ok(Value::Null);
    }
    let inner = inner.ok_or_else(|| anyhow!("{path}: dynamic {type_name} needs a $value"))?;
    let value = match type_name.as_str() {
        "bool" => read_value(schemas, &TypeExpr::Bool, inner, path)?,
        "int" => read_value(schemas, &TypeExpr::Int, inner, path)?,
        "nat" => read_value(schemas, &TypeExpr::Nat, inner, path)?,
        "float" => read_value(schemas, &TypeExpr::Float, inner, path)?,
        "text" => read_value(schemas, &TypeExpr::Text, inner, path)?,
        "bytes" => read_value(schemas, &TypeExpr::Bytes, inner, path)?,
        "list" => Value::List(
            inner
                .as_array()
                .ok_or_else(|| anyhow!("{path}: dynamic list needs an array"))?
                .iter()
                .map(|item| read_dynamic(schemas, item, path))
                .collect::<Result<_>>()?,
        ),
        "map" => {
            let pairs = inner
                .as_array()
                .ok_or_else(|| anyhow!("{path}: dynamic map needs an array of pairs"))?;
            let mut out = ValueMap::new();
            for pair in pairs {
                let pair = pair.as_array().map(Vec::as_slice).unwrap_or_default();
                let [key, entry] = pair else {
                    bail!("{path}: dynamic map entries are [key, value] pairs");
                };
                let key = match read_dynamic(schemas, key, path)? {
                    Value::Bool(b) => ValueKey::Bool(b),
                    Value::Int(i) => ValueKey::Int(i),
                    Value::Nat(n) => ValueKey::Nat(n),
                    Value::Text(t) => ValueKey::Text(t),
                    other => bail!("{path}: {} cannot be a map key", other.kind()),
                };
                out.insert(key, read_dynamic(schemas, entry, path)?);
            }
            Value::Map(out)
        }
        "variant" => {
            let (tag, value) = tagged(inner, "$tag", path)?;
            let value = value
                .map(|value| read_dynamic(schemas, value, path).map(Box::new))
                .transpose()?;
            Value::Variant { tag, value }
        }
        "dynamic" => Value::dynamic(read_dynamic(schemas, inner, path)?),
        record => Value::Record(read_record(schemas, record, inner, path)?),
    };
    Ok(value)
}

fn read_key(ty: TypeMapKey, key: &str, path: &str) -> Result<ValueKey> {
    let parsed = match ty {
        TypeMapKey::Text => ValueKey::Text(key.to_string()),
        TypeMapKey::Bool => ValueKey::Bool(key.parse().with_context(|| format!("{path}: bool key"))?),
        TypeMapKey::Int => ValueKey::Int(key.parse().with_context(|| format!("{path}: int key"))?),
        TypeMapKey::Nat => ValueKey::Nat(key.parse().with_context(|| format!("{path}: nat key"))?),
    };
    Ok(parsed)
}

/// Render a value as JSON in the same shape [`record_from_json`] accepts.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Nat(n) => json!(n),
        Value::Float(f) => json!(f),
        Value::Text(t) => json!(t),
        Value::Bytes(b) => json!(STANDARD.encode(b)),
        Value::List(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(key, entry)| (key_to_string(key), value_to_json(entry)))
                .collect(),
        ),
        Value::Record(record) => record_to_json(record),
        Value::Variant { tag, value } => variant_to_json(tag, value.as_deref().map(value_to_json)),
        Value::Dynamic(payload) => dynamic_to_json(payload),
    }
}

pub fn record_to_json(record: &Record) -> JsonValue {
    JsonValue::Object(
        record
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), value_to_json(value)))
            .collect(),
    )
}

fn variant_to_json(tag: &str, value: Option<JsonValue>) -> JsonValue {
    let mut object = JsonMap::new();
    object.insert("$tag".into(), json!(tag));
    if let Some(value) = value {
        object.insert("$value".into(), value);
    }
    JsonValue::Object(object)
}

fn dynamic_to_json(payload: &Value) -> JsonValue {
    let (type_name, value) = match payload {
        Value::Null => return json!({ "$type": "null" }),
        Value::Record(record) => (record.type_name.as_str(), record_to_json(record)),
        Value::List(items) => ("list", JsonValue::Array(items.iter().map(dynamic_to_json).collect())),
        Value::Map(entries) => (
            "map",
            JsonValue::Array(
                entries
                    .iter()
                    .map(|(key, entry)| json!([dynamic_key_to_json(key), dynamic_to_json(entry)]))
                    .collect(),
            ),
        ),
        Value::Variant { tag, value } => (
            "variant",
            variant_to_json(tag, value.as_deref().map(dynamic_to_json)),
        ),
        Value::Dynamic(inner) => ("dynamic", dynamic_to_json(inner)),
        scalar => (scalar.kind(), value_to_json(scalar)),
    };
    json!({ "$type": type_name, "$value": value })
}

fn dynamic_key_to_json(key: &ValueKey) -> JsonValue {
    match key {
        ValueKey::Bool(b) => json!({ "$type": "bool", "$value": b }),
        ValueKey::Int(i) => json!({ "$type": "int", "$value": i }),
        ValueKey::Nat(n) => json!({ "$type": "nat", "$value": n }),
        ValueKey::Text(t) => json!({ "$type": "text", "$value": t }),
    }
}

pub fn key_to_string(key: &ValueKey) -> String {
    match key {
        ValueKey::Bool(b) => b.to_string(),
        ValueKey::Int(i) => i.to_string(),
        ValueKey::Nat(n) => n.to_string(),
        ValueKey::Text(t) => t.clone(),
    }
}
