//! Shared fixtures for the engine integration tests.
//!
//! Each integration test compiles this module separately, so some helpers may
//! look unused from a single test file.

#![allow(dead_code)]

use gconst_merge::{Value, ValueKey};
use gconst_types::SchemaIndex;
use serde_json::json;

pub fn geo_schemas() -> SchemaIndex {
    let doc = json!({
        "records": [
            {
                "name": "geo/Feature",
                "fields": [
                    { "name": "type", "type": "text" },
                    { "name": "id", "type": "text" },
                    { "name": "geometry", "type": { "option": { "ref": "geo/Geometry" } } },
                    { "name": "tags", "type": { "map": { "key": "text", "value": "text" } } }
                ]
            },
            {
                "name": "geo/Geometry",
                "fields": [
                    { "name": "type", "type": "text" },
                    { "name": "coordinates", "type": { "option": { "ref": "geo/Point" } } }
                ]
            },
            {
                "name": "geo/Point",
                "fields": [
                    { "name": "latitude", "type": "float" },
                    { "name": "longitude", "type": "float" }
                ]
            },
            {
                "name": "demo/TestStruct",
                "fields": [
                    { "name": "obj", "type": "text" },
                    { "name": "sub", "type": { "ref": "demo/Nested" } }
                ]
            },
            {
                "name": "demo/Nested",
                "fields": [
                    { "name": "some", "type": "dynamic" }
                ]
            },
            {
                "name": "demo/Sample",
                "fields": [
                    { "name": "label", "type": "text" },
                    { "name": "count", "type": "int" },
                    { "name": "serial", "type": "nat" },
                    { "name": "enabled", "type": "bool" },
                    { "name": "payload", "type": "bytes" },
                    { "name": "readings", "type": { "list": "float" } },
                    { "name": "extra", "type": "dynamic" },
                    { "name": "origin", "type": { "ref": "geo/Point" } }
                ]
            }
        ]
    });
    SchemaIndex::from_json_str(&doc.to_string()).expect("geo schemas")
}

pub fn point(latitude: f64, longitude: f64) -> Value {
    Value::record(
        "geo/Point",
        [
            ("latitude", Value::Float(latitude)),
            ("longitude", Value::Float(longitude)),
        ],
    )
}

pub fn geometry(kind: &str, coordinates: Value) -> Value {
    Value::record(
        "geo/Geometry",
        [("type", Value::from(kind)), ("coordinates", coordinates)],
    )
}

pub fn feature(kind: &str, id: &str, geometry: Value) -> Value {
    Value::record(
        "geo/Feature",
        [
            ("type", Value::from(kind)),
            ("id", Value::from(id)),
            ("geometry", geometry),
        ],
    )
}

pub fn origin_feature() -> Value {
    feature("", "", geometry("origin", point(0.0, 0.0)))
}

pub fn test_struct(obj: &str, some: Value) -> Value {
    Value::record(
        "demo/TestStruct",
        [
            ("obj", Value::from(obj)),
            ("sub", Value::record("demo/Nested", [("some", some)])),
        ],
    )
}

pub fn with_tags(mut feature: Value, tags: &[(&str, &str)]) -> Value {
    let map = tags
        .iter()
        .map(|(k, v)| (ValueKey::from(*k), Value::from(*v)))
        .collect();
    if let Some(record) = feature.as_record_mut() {
        record.set("tags", Value::Map(map));
    }
    feature
}
