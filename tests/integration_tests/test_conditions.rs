// integration tests for condition evaluation through the public library API

use jbdap::conditions::{
    check_condition, compare, parse_condition, tag_to_value, Comparison, CompareOp, EvalContext,
    OpKind, Relation, Resolved, Root,
};
use jbdap::{Engine, ErrorKind, Language};
use serde_json::{json, Value};

fn engine() -> Engine {
    Engine::with_language(Language::EnUs)
}

fn check(condition: Value, current: Value) -> bool {
    engine()
        .check_condition(OpKind::Compare, &condition, "and", &Root::new(), None, Some(&current))
        .unwrap()
}

#[test]
fn test_empty_conditions() {
    let root = Root::new();
    let e = engine();
    assert!(e.check_condition(OpKind::Compare, &json!({}), "and", &root, None, None).unwrap());
    assert!(!e.check_condition(OpKind::Compare, &json!({}), "or", &root, None, None).unwrap());
    assert!(!e.check_condition(OpKind::Compare, &json!({}), "not", &root, None, None).unwrap());
}

#[test]
fn test_invalid_relation() {
    let err = engine()
        .check_condition(OpKind::Compare, &json!({}), "xor", &Root::new(), None, None)
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::ConditionDef);
}

#[test]
fn test_nested_groups() {
    let record = json!({ "age": 30, "role": "editor", "tags": ["a", "b"] });
    let condition = json!({
        "age#gte": 18,
        "$or": { "role": "admin", "tags#contains": "b" },
        "$not": { "role#in": ["guest", "banned"] }
    });
    assert!(check(condition, record.clone()));

    let condition = json!({ "$not": { "age#gt": 10, "role": "editor" } });
    assert!(!check(condition, record));
}

#[test]
fn test_group_value_must_be_object() {
    let err = engine()
        .check_condition(OpKind::Compare, &json!({ "$or": [1] }), "and", &Root::new(), None, None)
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::ConditionDef);
}

#[test]
fn test_loose_equality() {
    assert!(check(json!({ "n": "5" }), json!({ "n": 5 })));
    assert!(check(json!({ "flag": 1 }), json!({ "flag": true })));
    assert!(check(json!({ "obj": { "a": [1] } }), json!({ "obj": { "a": [1] } })));
    assert!(check(json!({ "missing#isUndefined": true }), json!({})));
    assert!(check(json!({ "missing": null }), json!({})));
}

#[test]
fn test_string_and_array_operators() {
    let record = json!({ "name": "jbdap engine", "list": [1, 2, 3] });
    assert!(check(json!({ "name#startsWith": "jbdap" }), record.clone()));
    assert!(check(json!({ "name#endsWith": "engine" }), record.clone()));
    assert!(check(json!({ "name#doesNotContain": "sql" }), record.clone()));
    assert!(check(json!({ "list#startsWith": 1 }), record.clone()));
    assert!(check(json!({ "list#endsWith": 3 }), record.clone()));
    assert!(check(json!({ "list#doesNotEndWith": 2 }), record.clone()));
    assert!(check(json!({ "name#matches": "^jb.*ine$" }), record.clone()));
    assert!(check(json!({ "list#isNotEmpty": true }), record));
}

#[test]
fn test_ends_with_on_number_is_rejected() {
    let err = engine()
        .check_condition(
            OpKind::Compare,
            &json!({ "n#endsWith": 1 }),
            "and",
            &Root::new(),
            None,
            Some(&json!({ "n": 11 })),
        )
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::OperatorDef);
}

#[test]
fn test_not_exist_sentinel() {
    let root = Root::new().with("User", json!({ "profile": { "name": "x" } }));
    let ctx = EvalContext::new(&root).with_language(Language::EnUs);

    let resolved = tag_to_value("/User.profile.age", &ctx).unwrap();
    assert_eq!(resolved, Resolved::NotExist);

    let ok = compare(
        &Comparison::new("/User.profile.age", CompareOp::DoesNotExist, json!(true)),
        &ctx,
    )
    .unwrap();
    assert!(ok);

    let err = compare(&Comparison::eq("/User.profile.age", json!(null)), &ctx).unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::TagDef);
    assert_eq!(err.kind(), ErrorKind::Compare);
}

#[test]
fn test_null_entity_data_is_present() {
    let root = Root::new().with("User", Value::Null);
    let ctx = EvalContext::new(&root);
    assert!(compare(&Comparison::new("/User", CompareOp::IsNull, json!(true)), &ctx).unwrap());
}

#[test]
fn test_reference_not_filled_is_a_signal() {
    let root = Root::new().with("Blog", json!({ "id": 1 }));
    let ctx = EvalContext::new(&root).with_language(Language::EnUs);
    let condition = json!({ "/Blog.id": 1, "/Author.id": "$.author" });

    let err = check_condition(OpKind::Compare, &condition, "and", &ctx).unwrap_err();
    assert!(err.is_ref_not_filled());
    assert_eq!(err.needs_ref(), Some("Author"));

    // once the scheduler fills the entity the same call succeeds
    let root = root.with("Author", json!({ "id": 4 }));
    let parent = json!({ "author": 4 });
    let ctx = EvalContext::new(&root).with_parent(Some(&parent));
    assert!(check_condition(OpKind::Compare, &condition, "and", &ctx).unwrap());
}

#[test]
fn test_right_side_ignores_self() {
    // a bare name on the right is a literal, never a self property
    assert!(check(json!({ "a": "b" }), json!({ "a": "b", "b": "zzz" })));
}

#[test]
fn test_parse_once_evaluate_many() {
    let condition = parse_condition(
        OpKind::Query,
        &json!({ "score#between": [1, 2] }),
        Relation::And,
        Language::EnUs,
    )
    .unwrap();
    assert_eq!(condition.items.len(), 1);

    // accepted by the query vocabulary, left to storage by the evaluator
    let root = Root::new();
    let record = json!({ "score": 1 });
    let err = engine()
        .evaluate(&condition, &root, None, Some(&record))
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::OperatorDef);
}

#[test]
fn test_unknown_operator_suggestions_in_chinese() {
    let err = Engine::default()
        .check_condition(OpKind::Compare, &json!({ "a#contians": "x" }), "and", &Root::new(), None, None)
        .unwrap_err();
    assert_eq!(err.root_kind(), ErrorKind::OperatorDef);
    assert!(err.all_suggestions().contains(&"contains".to_string()));
    assert!(err.root().message().contains("不支持"));
}

#[test]
fn test_short_circuit_skips_unparsed_keys() {
    let record = json!({ "a": 1 });
    assert!(!check(json!({ "a": 2, "b#bogus": 1 }), record.clone()));

    let ok = engine()
        .check_condition(OpKind::Compare, &json!({ "a": 1, "$or": [1] }), "or", &Root::new(), None, Some(&record))
        .unwrap();
    assert!(ok);
}
