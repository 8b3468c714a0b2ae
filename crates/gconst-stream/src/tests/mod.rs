use gconst_merge::Value;
use gconst_types::{FieldDef, RecordDef, SchemaIndex, TypeExpr, TypeMapKey};

pub(crate) fn geo_schemas() -> SchemaIndex {
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
                FieldDef::new("coordinates", TypeExpr::option(TypeExpr::reference("geo/Point"))),
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
            "demo/Envelope",
            [
                FieldDef::new("serial", TypeExpr::Nat),
                FieldDef::new("offset", TypeExpr::Int),
                FieldDef::new("urgent", TypeExpr::Bool),
                FieldDef::new("raw", TypeExpr::Bytes),
                FieldDef::new("samples", TypeExpr::list(TypeExpr::Float)),
                FieldDef::new("counts", TypeExpr::map(TypeMapKey::Nat, TypeExpr::Int)),
                FieldDef::new("extra", TypeExpr::Dynamic),
                FieldDef::new(
                    "status",
                    TypeExpr::Variant(
                        [
                            ("ok".to_string(), TypeExpr::Text),
                            ("retry".to_string(), TypeExpr::Nat),
                        ]
                        .into_iter()
                        .collect(),
                    ),
                ),
                FieldDef::new("origin", TypeExpr::reference("geo/Point")),
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

pub(crate) fn origin_feature() -> Value {
    feature("", "", geometry("origin", point(0.0, 0.0)))
}
