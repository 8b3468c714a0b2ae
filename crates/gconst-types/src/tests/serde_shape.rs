use serde_json::json;

use crate::{FieldAccess, SchemaError, SchemaIndex, TypeExpr, TypeMapKey};

#[test]
fn schema_document_loads_from_json() {
    let doc = json!({
        "records": [
            {
                "name": "demo/Station",
                "fields": [
                    { "name": "name", "type": "text" },
                    { "name": "secret", "type": "bytes", "access": "private" },
                    { "name": "readings", "type": { "map": { "key": "text", "value": "float" } } },
                    { "name": "extra", "type": "dynamic" },
                    { "name": "choice", "type": { "variant": { "a": "int", "b": "text" } } },
                    { "name": "parent", "type": { "option": { "ref": "demo/Station" } } }
                ]
            }
        ]
    });
    let index = SchemaIndex::from_json_str(&doc.to_string()).expect("load schema");
    let station = index.get("demo/Station").expect("station");

    assert_eq!(station.fields[1].access, FieldAccess::Private);
    assert_eq!(
        station.fields[2].ty,
        TypeExpr::map(TypeMapKey::Text, TypeExpr::Float)
    );
    assert_eq!(station.fields[3].ty, TypeExpr::Dynamic);
    assert_eq!(station.fields[4].ty.kind(), "variant");
    assert_eq!(
        station.fields[5].ty,
        TypeExpr::option(TypeExpr::reference("demo/Station"))
    );
}

#[test]
fn public_access_is_omitted_when_serialized() {
    let index = super::geo_index();
    let point = index.get("geo/Point").expect("point");
    let json = serde_json::to_value(point).expect("serialize");
    assert_eq!(
        json,
        json!({
            "name": "geo/Point",
            "fields": [
                { "name": "latitude", "type": "float" },
                { "name": "longitude", "type": "float" }
            ]
        })
    );
}

#[test]
fn malformed_document_reports_json_error() {
    let err = SchemaIndex::from_json_str("{\"records\": 3}").unwrap_err();
    assert!(matches!(err, SchemaError::Json(_)));
}
