// integration tests for field parsing and materialization

use jbdap::conditions::{Root, ValuesOp};
use jbdap::query::{RawField, RawFields, ValueField};
use jbdap::{Engine, ErrorKind, Language};
use serde_json::{json, Value};

fn engine() -> Engine {
    Engine::with_language(Language::EnUs)
}

fn people() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "ann", "age": 31, "team": "red" }),
        json!({ "id": 2, "name": "bob", "age": 25, "team": "blue" }),
        json!({ "id": 3, "name": "cid", "age": 31, "team": "blue" }),
        json!({ "id": 4, "name": "dee", "age": null, "team": "red" }),
    ]
}

#[test]
fn test_fields_shorthand_scenario() {
    let spec = engine()
        .parse_fields(Some(&json!("id,name=>displayName,count#id=>total")))
        .unwrap();

    assert_eq!(
        spec.raw,
        RawFields::Some(vec![
            RawField::Name("id".to_string()),
            RawField::Alias {
                alias: "displayName".to_string(),
                source: "name".to_string()
            },
        ])
    );
    assert_eq!(spec.values, vec![ValueField::new("total", ValuesOp::Count, "id")]);
    assert!(spec.cascaded.is_empty());
}

#[test]
fn test_fields_array_with_cascaded_objects() {
    let spec = engine()
        .parse_fields(Some(&json!(["id", { "name": "posts", "type": "list" }])))
        .unwrap();
    assert_eq!(spec.raw, RawFields::Some(vec![RawField::Name("id".to_string())]));
    assert_eq!(spec.cascaded.len(), 1);
    assert_eq!(spec.cascaded[0]["name"], json!("posts"));
}

#[test]
fn test_fields_star_rules() {
    assert!(engine().parse_fields(Some(&json!("*"))).unwrap().raw.is_all());
    assert!(engine().parse_fields(None).unwrap().raw.is_all());

    let err = engine().parse_fields(Some(&json!("*,id"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FieldsParser);
    assert_eq!(err.root_kind(), ErrorKind::FieldsDef);

    let err = engine().parse_fields(Some(&json!("median#age=>m"))).unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::OperatorDef);
}

#[test]
fn test_list_filter_order_page_project() {
    let e = engine();
    let root = Root::new();
    let spec = e.parse_fields(Some(&json!("id,name=>who"))).unwrap();
    let query = json!({
        "where": { "age#isNotNull": true },
        "order": "age#desc,id#desc",
        "page": 1,
        "size": 2
    });

    let list = e
        .get_list_from_list(&people(), Some(&query), &spec.raw, &root, None)
        .unwrap()
        .unwrap();
    assert_eq!(list, vec![json!({ "id": 3, "who": "cid" }), json!({ "id": 1, "who": "ann" })]);

    let query = json!({ "where": { "age#isNotNull": true }, "order": "age#desc,id#desc", "page": 2, "size": 2 });
    let list = e
        .get_list_from_list(&people(), Some(&query), &spec.raw, &root, None)
        .unwrap()
        .unwrap();
    assert_eq!(list, vec![json!({ "id": 2, "who": "bob" })]);
}

#[test]
fn test_list_empty_source_and_empty_result() {
    let e = engine();
    let root = Root::new();
    assert_eq!(
        e.get_list_from_list(&[], None, &RawFields::All, &root, None).unwrap(),
        None
    );

    let query = json!({ "where": { "team": "green" } });
    assert_eq!(
        e.get_list_from_list(&people(), Some(&query), &RawFields::All, &root, None)
            .unwrap(),
        Some(vec![])
    );
}

#[test]
fn test_list_order_puts_null_first() {
    let e = engine();
    let query = json!({ "order": ["age", "id#desc"] });
    let spec = e.parse_fields(Some(&json!("id"))).unwrap();
    let list = e
        .get_list_from_list(&people(), Some(&query), &spec.raw, &Root::new(), None)
        .unwrap()
        .unwrap();
    assert_eq!(
        list,
        vec![json!({ "id": 4 }), json!({ "id": 2 }), json!({ "id": 3 }), json!({ "id": 1 })]
    );
}

#[test]
fn test_entity_where_with_root_reference() {
    let e = engine();
    let root = Root::new().with("Team", json!({ "name": "blue", "minAge": 30 }));
    let query = json!({ "where": { "team": "/Team.name", "age#gte": "/Team.minAge" } });
    let spec = e.parse_fields(Some(&json!("name"))).unwrap();

    let found = e
        .get_obj_from_list(&people(), Some(&query), &spec.raw, &root, None)
        .unwrap();
    assert_eq!(found, json!({ "name": "cid" }));

    let err = e
        .get_obj_from_list(&people(), Some(&query), &spec.raw, &Root::new(), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DealRef);
    assert_eq!(err.needs_ref(), Some("Team"));
}

#[test]
fn test_entity_order_takes_head() {
    let e = engine();
    let query = json!({ "order": "age#desc,id" });
    let found = e
        .get_obj_from_list(&people(), Some(&query), &RawFields::All, &Root::new(), None)
        .unwrap();
    assert_eq!(found["id"], json!(1));
}

#[test]
fn test_entity_missing_and_bad_queries() {
    let e = engine();
    let root = Root::new();
    let query = json!({ "where": { "id": 99 } });
    assert_eq!(
        e.get_obj_from_list(&people(), Some(&query), &RawFields::All, &root, None)
            .unwrap(),
        Value::Null
    );

    let err = e
        .get_obj_from_list(&people(), Some(&json!({ "page": 1 })), &RawFields::All, &root, None)
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::QueryDef);

    let err = e
        .get_obj_from_list(&people(), Some(&json!({ "where": "id=1" })), &RawFields::All, &root, None)
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::QueryDef);
}

#[test]
fn test_projection_is_idempotent() {
    let e = engine();
    let spec = e.parse_fields(Some(&json!("id,name=>who"))).unwrap();
    let record = people().remove(0);

    let first = e.get_obj_from_obj(&record, &spec.raw).unwrap();
    let second = e.get_obj_from_obj(&record, &spec.raw).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, json!({ "id": 1, "who": "ann" }));
}

#[test]
fn test_values_over_people() {
    let e = engine();
    let spec = e
        .parse_fields(Some(&json!([
            "count#*=>rows",
            "count#age=>aged",
            "sum#age=>years",
            "avg#age=>mean",
            "min#name=>first",
            "pick#team=>teams",
            // clone with several fields needs the array form
            "clone#id,team=>copy"
        ])))
        .unwrap();
    let values = e.get_values_from_list(&people(), &spec.values).unwrap();

    assert_eq!(values["rows"], json!(4));
    assert_eq!(values["aged"], json!(3));
    assert_eq!(values["years"], json!(87));
    assert_eq!(values["mean"], json!(29.0));
    assert_eq!(values["first"], json!("ann"));
    assert_eq!(values["teams"], json!(["red", "blue"]));
    assert_eq!(values["copy"][1], json!({ "id": 2, "team": "blue" }));
    assert_eq!(values["copy"].as_array().unwrap().len(), 4);
}

#[test]
fn test_values_on_empty_list() {
    let e = engine();
    assert_eq!(
        e.get_value(&[], &ValueField::new("p", ValuesOp::Pick, "x")).unwrap(),
        json!([])
    );
    assert_eq!(
        e.get_value(&[], &ValueField::new("s", ValuesOp::Sum, "x")).unwrap(),
        Value::Null
    );

    let err = e.get_values_from_list(&people(), &[]).unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::CmdDef);
}

#[test]
fn test_page_scenario() {
    let e = engine();
    let page = e.parse_offset_and_limit(Some(&json!(2)), Some(&json!(10))).unwrap();
    assert_eq!((page.offset, page.limit), (10, 10));

    let err = e.parse_offset_and_limit(Some(&json!(2)), None).unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::SizeDef);
}
