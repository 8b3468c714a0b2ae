use gconst_types::{FieldAccess, FieldDef, RecordDef, SchemaIndex, TypeExpr, TypeMapKey};

use crate::value::{Value, ValueKey, ValueMap};

mod reduce;

pub(crate) fn test_schemas() -> SchemaIndex {
    let point = TypeExpr::reference("geo/Point");
    SchemaIndex::from_defs([
        RecordDef::new(
            "geo/Feature",
            [
                FieldDef::new("type", TypeExpr::Text),
                FieldDef::new("id", TypeExpr::Text),
                FieldDef::new("geometry", TypeExpr::option(TypeExpr::reference("geo/Geometry"))),
                FieldDef::new("tags", TypeExpr::map(TypeMapKey::Text, TypeExpr::Text)),
            ],
        ),
        RecordDef::new(
            "geo/Geometry",
            [
                FieldDef::new("type", TypeExpr::Text),
                FieldDef::new("coordinates", TypeExpr::option(point.clone())),
            ],
        ),
        RecordDef::new(
            "geo/Point",
            [
                FieldDef::new("latitude", TypeExpr::Float),
                FieldDef::new("longitude", TypeExpr::Float),
            ],
        ),
        RecordDef::new(
            "demo/TestStruct",
            [
                FieldDef::new("obj", TypeExpr::Text),
                FieldDef::new("sub", TypeExpr::reference("demo/Nested")),
            ],
        ),
        RecordDef::new(
            "demo/Nested",
            [
                FieldDef::new("some", TypeExpr::Dynamic),
                FieldDef::new("level", TypeExpr::Int),
            ],
        ),
        RecordDef::new(
            "demo/ObjWithMap",
            [
                FieldDef::new("name", TypeExpr::Text),
                FieldDef::new("obj", TypeExpr::map(TypeMapKey::Text, TypeExpr::Text)),
            ],
        ),
        RecordDef::new(
            "demo/Registry",
            [
                FieldDef::new(
                    "stations",
                    TypeExpr::map(TypeMapKey::Text, TypeExpr::reference("demo/Station")),
                ),
                FieldDef::new("readings", TypeExpr::list(TypeExpr::Int)),
            ],
        ),
        RecordDef::new(
            "demo/Station",
            [
                FieldDef::new("name", TypeExpr::Text),
                FieldDef::new("metadata", TypeExpr::Text),
            ],
        ),
        RecordDef::new(
            "demo/Guarded",
            [
                FieldDef::new("open", TypeExpr::Text),
                FieldDef::new("hidden", TypeExpr::Text).with_access(FieldAccess::Private),
                FieldDef::new("frozen", TypeExpr::Nat).with_access(FieldAccess::ReadOnly),
                FieldDef::new(
                    "choice",
                    TypeExpr::Variant(
                        [("name".to_string(), TypeExpr::Text), ("count".to_string(), TypeExpr::Int)]
                            .into_iter()
                            .collect(),
                    ),
                ),
                FieldDef::new("double", TypeExpr::option(TypeExpr::option(point))),
                FieldDef::new("flag", TypeExpr::Bool),
                FieldDef::new("blob", TypeExpr::Bytes),
            ],
        ),
    ])
    .expect("test schemas are valid")
}

pub(crate) fn point(latitude: f64, longitude: f64) -> Value {
    Value::record(
        "geo/Point",
        [
            ("latitude", Value::Float(latitude)),
            ("longitude", Value::Float(longitude)),
        ],
    )
}

pub(crate) fn geometry(kind: &str, coordinates: Value) -> Value {
    Value::record(
        "geo/Geometry",
        [("type", Value::from(kind)), ("coordinates", coordinates)],
    )
}

pub(crate) fn feature(kind: &str, id: &str, geometry: Value) -> Value {
    Value::record(
        "geo/Feature",
        [
            ("type", Value::from(kind)),
            ("id", Value::from(id)),
            ("geometry", geometry),
        ],
    )
}

/// `{Type:"", Id:"", Geometry:{Type:"origin", Coordinates:{0, 0}}}`
pub(crate) fn origin_feature() -> Value {
    feature("", "", geometry("origin", point(0.0, 0.0)))
}

pub(crate) fn test_struct(obj: &str, some: Value) -> Value {
    Value::record(
        "demo/TestStruct",
        [
            ("obj", Value::from(obj)),
            ("sub", Value::record("demo/Nested", [("some", some)])),
        ],
    )
}

pub(crate) fn text_map(entries: &[(&str, &str)]) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(k, v)| (ValueKey::from(*k), Value::from(*v)))
            .collect::<ValueMap>(),
    )
}
