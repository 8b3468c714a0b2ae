use gconst_types::{SchemaIndex, TypeExpr};

use crate::value::{Record, Value, ValueMap};

/// Empty value for a declared field type.
///
/// Embedded records expand to empty records; optional, variant and dynamic
/// slots are `Null`.
pub fn empty_value(schemas: &SchemaIndex, ty: &TypeExpr) -> Value {
    match ty {
        TypeExpr::Bool => Value::Bool(false),
        TypeExpr::Int => Value::Int(0),
        TypeExpr::Nat => Value::Nat(0),
        TypeExpr::Float => Value::Float(0.0),
        TypeExpr::Text => Value::Text(String::new()),
        TypeExpr::Bytes => Value::Bytes(Vec::new()),
        TypeExpr::Ref(name) => Value::Record(empty_record(schemas, name)),
        TypeExpr::List(_) => Value::List(Vec::new()),
        TypeExpr::Map(_) => Value::Map(ValueMap::new()),
        TypeExpr::Option(_) | TypeExpr::Variant(_) | TypeExpr::Dynamic => Value::Null,
    }
}

/// Fresh instance of `type_name` with every declared field at its empty value.
///
/// Unknown types yield a record with no fields; missing fields read as empty.
/// Terminates because [`SchemaIndex`] rejects embedded cycles.
pub fn empty_record(schemas: &SchemaIndex, type_name: &str) -> Record {
    let mut record = Record::new(type_name);
    if let Some(def) = schemas.get(type_name) {
        for field in &def.fields {
            record
                .fields
                .insert(field.name.clone(), empty_value(schemas, &field.ty));
        }
    }
    record
}
