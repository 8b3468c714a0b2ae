use crate::{FieldAccess, FieldDef, RecordDef, SchemaError, SchemaIndex, TypeExpr};

use super::{geo_defs, geo_index};

#[test]
fn geo_schema_validates_and_preserves_order() {
    let index = geo_index();
    assert_eq!(index.len(), 3);
    let names: Vec<_> = index.iter().map(|def| def.name.as_str()).collect();
    assert_eq!(names, ["geo/Feature", "geo/Geometry", "geo/Point"]);

    let feature = index.get("geo/Feature").expect("feature");
    let (position, field) = feature.field("geometry").expect("geometry field");
    assert_eq!(position, 2);
    assert_eq!(field.access, FieldAccess::Public);
}

#[test]
fn duplicate_record_is_rejected() {
    let mut defs = geo_defs();
    defs.push(RecordDef::new("geo/Point", Vec::new()));
    assert_eq!(
        SchemaIndex::from_defs(defs).unwrap_err(),
        SchemaError::DuplicateRecord("geo/Point".into())
    );
}

#[test]
fn duplicate_field_is_rejected() {
    let defs = [RecordDef::new(
        "demo/Twice",
        [
            FieldDef::new("name", TypeExpr::Text),
            FieldDef::new("name", TypeExpr::Int),
        ],
    )];
    assert!(matches!(
        SchemaIndex::from_defs(defs),
        Err(SchemaError::DuplicateField { field, .. }) if field == "name"
    ));
}

#[test]
fn unknown_reference_inside_list_is_rejected() {
    let defs = [RecordDef::new(
        "demo/Holder",
        [FieldDef::new("items", TypeExpr::list(TypeExpr::reference("demo/Missing")))],
    )];
    let err = SchemaIndex::from_defs(defs).unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnknownRef {
            record: "demo/Holder".into(),
            field: "items".into(),
            reference: "demo/Missing".into(),
        }
    );
}

#[test]
fn embedded_self_reference_is_rejected() {
    let defs = [
        RecordDef::new("demo/A", [FieldDef::new("b", TypeExpr::reference("demo/B"))]),
        RecordDef::new("demo/B", [FieldDef::new("a", TypeExpr::reference("demo/A"))]),
    ];
    assert!(matches!(
        SchemaIndex::from_defs(defs),
        Err(SchemaError::EmbeddedCycle(_))
    ));
}

#[test]
fn optional_self_reference_is_allowed() {
    let defs = [RecordDef::new(
        "demo/Node",
        [
            FieldDef::new("value", TypeExpr::Int),
            FieldDef::new("next", TypeExpr::option(TypeExpr::reference("demo/Node"))),
            FieldDef::new("children", TypeExpr::list(TypeExpr::reference("demo/Node"))),
        ],
    )];
    SchemaIndex::from_defs(defs).expect("option and list break the cycle");
}

#[test]
fn closure_follows_references_from_one_record() {
    let index = geo_index();
    let names: Vec<_> = index
        .closure("geo/Geometry")
        .iter()
        .map(|def| def.name.as_str())
        .collect();
    assert_eq!(names, ["geo/Geometry", "geo/Point"]);

    let names: Vec<_> = index
        .closure("geo/Feature")
        .iter()
        .map(|def| def.name.as_str())
        .collect();
    assert_eq!(names, ["geo/Feature", "geo/Geometry", "geo/Point"]);
    assert!(index.closure("geo/Missing").is_empty());
}
