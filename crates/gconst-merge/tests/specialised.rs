//! A hand-written merger for one record type must be interchangeable with the
//! generic engine.

mod helpers;

use gconst_merge::{ApplyError, EngineConfig, FieldPlan, Merger, Record, Value};
use helpers::*;

/// Fixed-donor merger for `geo/Feature` with geometry `{type:"origin", coordinates:{0, 0}}`.
struct OriginFeatureMerger;

impl OriginFeatureMerger {
    fn fill_text(record: &mut Record, field: &str, value: &str) {
        let slot = record.fields.entry(field.to_string()).or_insert(Value::from(""));
        if matches!(slot, Value::Text(text) if text.is_empty()) {
            *slot = Value::from(value);
        }
    }

    fn ensure_record<'r>(record: &'r mut Record, field: &str, template: Value) -> Option<&'r mut Record> {
        let slot = record.fields.entry(field.to_string()).or_insert(Value::Null);
        if matches!(slot, Value::Null) {
            *slot = template;
        }
        slot.as_record_mut()
    }
}

impl Merger for OriginFeatureMerger {
    fn merge(&self, target: &mut Value) -> Result<(), ApplyError> {
        let found = target.kind();
        let record = target
            .as_record_mut()
            .ok_or(ApplyError::NotARecord { found })?;
        if record.type_name != "geo/Feature" {
            return Err(ApplyError::TypeMismatch {
                expected: "geo/Feature".into(),
                found: record.type_name.clone(),
            });
        }
        let Some(geometry) =
            Self::ensure_record(record, "geometry", geometry("", Value::Null))
        else {
            return Ok(());
        };
        Self::fill_text(geometry, "type", "origin");
        Self::ensure_record(geometry, "coordinates", point(0.0, 0.0));
        Ok(())
    }
}

fn targets() -> Vec<Value> {
    vec![
        feature("Top", "uuid", Value::Null),
        feature("", "", geometry("", Value::Null)),
        feature("Top", "", geometry("line", point(3.0, 4.0))),
        feature("Top", "", geometry("", point(0.0, 9.0))),
        feature("Top", "", Value::from("corrupt")),
        Value::record("geo/Feature", Vec::<(&str, Value)>::new()),
    ]
}

#[test]
fn specialised_merger_matches_generic_engine() {
    let schemas = geo_schemas();
    let generic: Box<dyn Merger> = Box::new(
        FieldPlan::build(&schemas, &origin_feature(), &EngineConfig::default()).unwrap(),
    );
    let specialised: Box<dyn Merger> = Box::new(OriginFeatureMerger);

    for target in targets() {
        let mut by_generic = target.clone();
        let mut by_specialised = target.clone();
        generic.merge(&mut by_generic).unwrap();
        specialised.merge(&mut by_specialised).unwrap();
        assert_eq!(by_generic, by_specialised, "diverged on {target:?}");
    }
}

#[test]
fn both_reject_foreign_records() {
    let schemas = geo_schemas();
    let generic = FieldPlan::build(&schemas, &origin_feature(), &EngineConfig::default()).unwrap();

    let mut foreign = point(1.0, 1.0);
    assert_eq!(
        Merger::merge(&generic, &mut foreign.clone()),
        OriginFeatureMerger.merge(&mut foreign)
    );
}
