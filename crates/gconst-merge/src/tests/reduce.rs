use super::*;
use crate::apply::{ApplyError, Reducer};
use crate::config::{CollectionPolicy, EngineConfig};
use crate::plan::FieldPlan;

fn plan(reference: &Value) -> FieldPlan {
    FieldPlan::build(&test_schemas(), reference, &EngineConfig::default()).expect("plan builds")
}

#[test]
fn clears_fields_equal_to_reference() {
    let reducer = plan(&origin_feature());
    let mut subject = feature("Top", "uuid", geometry("origin", point(0.0, 0.0)));
    reducer.reduce_from(&mut subject).unwrap();

    // The emptied geometry stays in place.
    assert_eq!(
        subject,
        feature("Top", "uuid", geometry("", point(0.0, 0.0)))
    );
}

#[test]
fn differing_fields_survive() {
    let reducer = plan(&feature("Top", "", geometry("origin", point(1.0, 2.0))));
    let mut subject = feature("Other", "uuid", geometry("origin", point(1.0, 3.0)));
    reducer.reduce_from(&mut subject).unwrap();

    assert_eq!(
        subject,
        feature("Other", "uuid", geometry("", point(0.0, 3.0)))
    );
}

#[test]
fn absent_composites_are_not_allocated() {
    let reducer = plan(&origin_feature());
    let mut subject = feature("Top", "", Value::Null);
    reducer.reduce_from(&mut subject).unwrap();
    assert_eq!(subject, feature("Top", "", Value::Null));
}

#[test]
fn reducing_twice_changes_nothing() {
    let reducer = plan(&origin_feature());
    let mut once = feature("Top", "uuid", geometry("origin", point(5.0, 0.0)));
    reducer.reduce_from(&mut once).unwrap();
    let mut twice = once.clone();
    reducer.reduce_from(&mut twice).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn text_cleared_while_unrelated_dynamic_survives() {
    let reducer = plan(&test_struct("hello", Value::Null));
    let mut subject = test_struct("hello", Value::dynamic(Value::Int(1)));
    reducer.reduce_from(&mut subject).unwrap();
    assert_eq!(subject, test_struct("", Value::dynamic(Value::Int(1))));
}

#[test]
fn dynamic_fields_compare_structurally() {
    let reducer = plan(&test_struct("", Value::dynamic(Value::from("Hello"))));
    let mut different = test_struct("", Value::dynamic(Value::Int(1)));
    reducer.reduce_from(&mut different).unwrap();
    assert_eq!(different, test_struct("", Value::dynamic(Value::Int(1))));

    let payload = Value::dynamic(point(1.0, 2.0));
    let reducer = plan(&test_struct("", payload.clone()));
    let mut equal = test_struct("x", payload.clone());
    reducer.reduce_from(&mut equal).unwrap();
    assert_eq!(equal, test_struct("x", Value::Null));

    let mut moved = test_struct("x", Value::dynamic(point(1.0, 2.5)));
    reducer.reduce_from(&mut moved).unwrap();
    assert_eq!(moved, test_struct("x", Value::dynamic(point(1.0, 2.5))));
}

#[test]
fn maps_are_cleared_whole_or_not_at_all() {
    let reference = Value::record("demo/ObjWithMap", [("obj", text_map(&[("hell", "world")]))]);
    let reducer = plan(&reference);

    let mut equal = Value::record(
        "demo/ObjWithMap",
        [("name", Value::from("n")), ("obj", text_map(&[("hell", "world")]))],
    );
    reducer.reduce_from(&mut equal).unwrap();
    assert_eq!(equal.as_record().unwrap().get("obj"), Some(&text_map(&[])));

    let mut different = Value::record("demo/ObjWithMap", [("obj", text_map(&[("hell1", "world")]))]);
    reducer.reduce_from(&mut different).unwrap();
    assert_eq!(
        different.as_record().unwrap().get("obj"),
        Some(&text_map(&[("hell1", "world")]))
    );
}

#[test]
fn element_aware_reduce_still_clears_whole_maps() {
    let reference = Value::record(
        "demo/ObjWithMap",
        [("obj", text_map(&[("a", "1"), ("b", "2")]))],
    );
    let config = EngineConfig::default().with_policy(CollectionPolicy::ElementAware);
    let reducer = FieldPlan::build(&test_schemas(), &reference, &config).unwrap();

    let mut partial = Value::record("demo/ObjWithMap", [("obj", text_map(&[("a", "1")]))]);
    reducer.reduce_from(&mut partial).unwrap();
    assert_eq!(partial.as_record().unwrap().get("obj"), Some(&text_map(&[("a", "1")])));

    let mut equal = reference.clone();
    reducer.reduce_from(&mut equal).unwrap();
    assert_eq!(equal.as_record().unwrap().get("obj"), Some(&text_map(&[])));
}

#[test]
fn lists_are_compared_whole() {
    let reference = Value::record(
        "demo/Registry",
        [("readings", Value::List(vec![Value::Int(1), Value::Int(2)]))],
    );
    let reducer = plan(&reference);

    let mut reordered = Value::record(
        "demo/Registry",
        [("readings", Value::List(vec![Value::Int(2), Value::Int(1)]))],
    );
    reducer.reduce_from(&mut reordered).unwrap();
    assert_eq!(
        reordered.as_record().unwrap().get("readings"),
        Some(&Value::List(vec![Value::Int(2), Value::Int(1)]))
    );

    let mut equal = reference.clone();
    reducer.reduce_from(&mut equal).unwrap();
    assert_eq!(equal.as_record().unwrap().get("readings"), Some(&Value::List(vec![])));
}

#[test]
fn subject_must_match_plan_type() {
    let reducer = plan(&origin_feature());
    let mut subject = Value::Null;
    assert_eq!(
        reducer.reduce(&mut subject),
        Err(ApplyError::NotARecord { found: "null" })
    );
}

#[test]
fn nested_dynamics_are_cleared_whole() {
    let reference = Value::dynamic(Value::dynamic(point(1.0, 2.0)));
    let reducer = plan(&test_struct("", reference.clone()));

    let differing = Value::dynamic(Value::dynamic(point(1.0, 9.9)));
    let mut subject = test_struct("x", differing.clone());
    reducer.reduce_from(&mut subject).unwrap();
    assert_eq!(subject, test_struct("x", differing));

    let mut equal = test_struct("x", reference);
    reducer.reduce_from(&mut equal).unwrap();
    assert_eq!(equal, test_struct("x", Value::Null));
}
