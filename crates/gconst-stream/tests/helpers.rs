//! Shared fixtures for the stream integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use gconst_merge::{Record, Value, ValueMap};
use gconst_stream::{Metadata, MessageSink, StreamError};
use gconst_types::SchemaIndex;
use serde_json::json;

pub fn geo_schemas() -> Arc<SchemaIndex> {
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
            }
        ]
    });
    Arc::new(SchemaIndex::from_json_str(&doc.to_string()).expect("geo schemas"))
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

/// Feature with every declared field present, as a decoder produces it.
pub fn feature(kind: &str, id: &str, geometry: Value) -> Record {
    Record::from_fields(
        "geo/Feature",
        [
            ("type", Value::from(kind)),
            ("id", Value::from(id)),
            ("geometry", geometry),
            ("tags", Value::Map(ValueMap::new())),
        ],
    )
}

/// The constant every feature of the test stream shares.
pub fn constant() -> Record {
    feature("Feature", "", geometry("Point", Value::Null))
}

pub fn features(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let i = i as f64;
            feature(
                "Feature",
                &format!("feature-{i}"),
                geometry("Point", point(i, -i)),
            )
        })
        .collect()
}

pub fn advertising_metadata() -> Metadata {
    let mut metadata = Metadata::new();
    gconst_stream::client_metadata(&mut metadata);
    metadata
}

/// Sink that keeps what it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub header: Option<Metadata>,
    pub sent: Vec<Record>,
}

impl MessageSink for RecordingSink {
    fn set_header(&mut self, metadata: Metadata) -> Result<(), StreamError> {
        self.header = Some(metadata);
        Ok(())
    }

    fn send(&mut self, message: Record) -> Result<(), StreamError> {
        self.sent.push(message);
        Ok(())
    }
}
