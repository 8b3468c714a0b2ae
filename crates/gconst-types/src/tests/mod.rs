use crate::{FieldDef, RecordDef, SchemaIndex, TypeExpr, TypeMapKey};

mod index;
mod serde_shape;

/// Feature/Geometry/Point shapes used across the schema tests.
pub(crate) fn geo_defs() -> Vec<RecordDef> {
    vec![
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
    ]
}

pub(crate) fn geo_index() -> SchemaIndex {
    SchemaIndex::from_defs(geo_defs()).expect("geo schema is valid")
}
