use famtree_core::{import, Event, IdGenerator, Individual, RecordGraph, Sex};
use serde_json::json;

#[test]
fn individual_serializes_with_stable_field_names() {
    let mut ids = IdGenerator::new();
    let mut person = Individual::new(ids.next_id()).with_name("Ada", "Byron");
    person.sex = Sex::Female;
    person.events.push(Event::new("BIRT").with_date("10 DEC 1815"));
    person.refresh_derived_years();

    let value = serde_json::to_value(&person).unwrap();
    assert_eq!(value["id"], json!(1));
    assert_eq!(value["sex"], json!("female"));
    assert_eq!(value["birth_year"], json!(1815));
    assert_eq!(value["death_year"], json!(null));
    assert_eq!(value["events"][0]["type"], json!("BIRT"));
    assert_eq!(value["events"][0]["date"], json!("10 DEC 1815"));
}

#[test]
fn event_fields_default_when_absent() {
    let event: Event = serde_json::from_value(json!({ "type": "BURI" })).unwrap();
    assert_eq!(event, Event::new("BURI"));
}

#[test]
fn graph_json_round_trips_without_metadata() {
    let graph = import("0 @I1@ INDI\n1 NAME Liv /Berg/\n0 @F1@ FAM\n1 CHIL @I1@\n").unwrap();

    let mut value = serde_json::to_value(&graph).unwrap();
    value.as_object_mut().unwrap().remove("metadata");
    let restored: RecordGraph = serde_json::from_value(value).unwrap();

    assert_eq!(restored.individuals, graph.individuals);
    assert_eq!(restored.families, graph.families);
    assert_eq!(restored.metadata, Default::default());
}
