// integration tests for the engine subcommands of the jbdap binary

use crate::common::*;
use serde_json::json;

const RECORDS: &str = r#"[{"name": "a", "age": 5}, {"name": "b", "age": 9}]"#;

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_true_and_false() {
    let (output, value) = run_json(&[
        "check",
        "--condition",
        r#"{"age#gte": 18}"#,
        "--self",
        r#"{"age": 20}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(value["jsonrpc"], json!("2.0"));
    assert_eq!(value["result"], json!(true));
    assert_eq!(value["id"], json!(null));

    let (output, value) = run_json(&[
        "check",
        "--condition",
        r#"{"age#gte": 18}"#,
        "--self",
        r#"{"age": 12}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!(false));
}

#[test]
fn test_check_with_relation_and_root() {
    let (output, value) = run_json(&[
        "check",
        "--condition",
        r#"{"/User.role": "admin", "/User.age#gt": 50}"#,
        "--relation",
        "or",
        "--root",
        r#"{"User": {"data": {"role": "admin", "age": 30}}}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!(true));
}

#[test]
fn test_check_unknown_operator_reports_suggestions() {
    let (output, value) = run_json(&["check", "--condition", r#"{"age#gtee": 1}"#]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["error"]["code"], json!(-32002));
    assert_eq!(value["error"]["data"]["kind"], json!("OperatorDefError"));
    let suggestions = value["error"]["data"]["suggestions"].as_array().unwrap();
    assert!(suggestions.contains(&json!("gte")));
}

#[test]
fn test_check_missing_reference_signals_dependency() {
    let (output, value) = run_json(&["check", "--condition", r#"{"/User.id#eq": 1}"#]);

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(value["error"]["code"], json!(-32003));
    assert_eq!(value["error"]["data"]["needRef"], json!("User"));
    assert_eq!(value["error"]["data"]["kind"], json!("TagRefNotFilled"));
}

#[test]
fn test_check_query_vocabulary() {
    // matches is a compare operator only
    let (output, value) = run_json(&[
        "check",
        "--kind",
        "query",
        "--condition",
        r#"{"name#matches": "^a"}"#,
        "--self",
        r#"{"name": "abc"}"#,
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["error"]["data"]["kind"], json!("OperatorDefError"));
}

#[test]
fn test_check_text_mode_prints_cause_chain() {
    let output = run_jbdap(&[
        "--no-json",
        "--lang",
        "en-us",
        "check",
        "--condition",
        r#"{"age#gtee": 1}"#,
    ]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: "));
    assert!(stderr.contains("caused by: OperatorDefError"));
    assert!(stderr.contains("did you mean: gte"));
}

#[test]
fn test_check_invalid_json_argument() {
    let output = run_jbdap(&["--json", "check", "--condition", "{not json"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid JSON argument"));
}

// ============================================================================
// tag
// ============================================================================

#[test]
fn test_tag_states() {
    let (output, value) = run_json(&["tag", "$.items.$.k", "--parent", r#"{"items": [{"k": 1}, {"k": 2}, {"k": 1}]}"#]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!({ "state": "value", "value": [1, 2] }));

    let (_, value) = run_json(&["tag", "$.missing", "--parent", r#"{"a": 1}"#]);
    assert_eq!(value["result"], json!({ "state": "notExist" }));

    let (_, value) = run_json(&["tag", "missing", "--self", r#"{"a": 1}"#]);
    assert_eq!(value["result"], json!({ "state": "undefined" }));

    // no self record: a bare name is a literal
    let (_, value) = run_json(&["tag", "hello"]);
    assert_eq!(value["result"], json!({ "state": "value", "value": "hello" }));
}

// ============================================================================
// entity / list / values
// ============================================================================

#[test]
fn test_list_filters_records() {
    let (output, value) = run_json(&[
        "list",
        "--records",
        RECORDS,
        "--query",
        r#"{"where": {"age#gte": 6}}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!([{ "name": "b", "age": 9 }]));
}

#[test]
fn test_list_orders_pages_and_projects() {
    let (_, value) = run_json(&[
        "list",
        "--records",
        RECORDS,
        "--query",
        r#"{"order": "age#desc", "page": 1, "size": 1}"#,
        "--fields",
        "name=>who",
    ]);
    assert_eq!(value["result"], json!([{ "who": "b" }]));

    let (_, value) = run_json(&["list", "--records", "[]"]);
    assert_eq!(value["result"], json!(null));
}

#[test]
fn test_list_rejects_unknown_query_key() {
    let (output, value) = run_json(&["list", "--records", RECORDS, "--query", r#"{"limit": 1}"#]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["error"]["data"]["kind"], json!("QueryDefError"));
}

#[test]
fn test_entity_from_list_and_object() {
    let (output, value) = run_json(&[
        "entity",
        "--records",
        RECORDS,
        "--query",
        r#"{"where": {"name": "b"}}"#,
        "--fields",
        "age",
    ]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!({ "age": 9 }));

    let (_, value) = run_json(&["entity", "--records", r#"{"id": 1, "n": "x"}"#, "--fields", "n=>name"]);
    assert_eq!(value["result"], json!({ "name": "x" }));

    let (output, value) = run_json(&["entity", "--records", r#"{"id": 1}"#, "--fields", "nope"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["error"]["data"]["kind"], json!("FieldNotExistError"));
}

#[test]
fn test_entity_where_uses_parent() {
    let (_, value) = run_json(&[
        "entity",
        "--records",
        r#"[{"id": 1, "owner": 7}, {"id": 2, "owner": 8}]"#,
        "--query",
        r#"{"where": {"owner": "$.id"}}"#,
        "--parent",
        r#"{"id": 8}"#,
        "--fields",
        "id",
    ]);
    assert_eq!(value["result"], json!({ "id": 2 }));
}

#[test]
fn test_values_aggregates() {
    let (output, value) = run_json(&[
        "values",
        "--records",
        RECORDS,
        "--fields",
        "count#*=>total,sum#age=>ages,max#name=>last,pick#name=>names",
    ]);
    assert!(output.status.success());
    assert_eq!(
        value["result"],
        json!({ "total": 2, "ages": 14, "last": "b", "names": ["a", "b"] })
    );
}

#[test]
fn test_records_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "records.json", RECORDS);
    let arg = format!("@{}", path.display());

    let (output, value) = run_json(&["values", "--records", &arg, "--fields", "avg#age=>mean"]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!({ "mean": 7.0 }));
}

// ============================================================================
// parsers
// ============================================================================

#[test]
fn test_parse_fields_shorthand() {
    let (output, value) = run_json(&["parse-fields", "id,name=>displayName,count#id=>total"]);
    assert!(output.status.success());
    assert_eq!(value["result"]["raw"], json!(["id", { "displayName": "name" }]));
    assert_eq!(
        value["result"]["values"],
        json!([{ "name": "total", "operator": "count", "fields": "id" }])
    );
}

#[test]
fn test_parse_order() {
    let (_, value) = run_json(&["parse-order", "age#desc,name"]);
    assert_eq!(
        value["result"],
        json!([
            { "column": "age", "direction": "desc" },
            { "column": "name", "direction": "asc" }
        ])
    );

    let (output, value) = run_json(&["parse-order", "age#down"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["error"]["data"]["kind"], json!("OrderDefError"));
}

#[test]
fn test_page() {
    let (_, value) = run_json(&["page", "--page", "2", "--size", "10"]);
    assert_eq!(value["result"], json!({ "offset": 10, "limit": 10 }));

    let (output, value) = run_json(&["page", "--page", "2"]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["error"]["data"]["kind"], json!("SizeDefError"));

    let (_, value) = run_json(&["page", "--page", "0", "--size", "10"]);
    assert_eq!(value["error"]["data"]["kind"], json!("PageDefError"));
}

#[test]
fn test_check_command() {
    let (output, value) = run_json(&["check-command", r#"{"type": "list", "fields": "*"}"#]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!("list"));

    let (output, value) = run_json(&["check-command", r#"{"type": "lists"}"#]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(value["error"]["data"]["kind"], json!("CommandError"));
    assert_eq!(value["error"]["data"]["suggestions"], json!(["list"]));

    let (output, _) = run_json(&["check-command", "--top", r#"{"type": "list", "return": 1}"#]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_default_language_is_chinese() {
    let output = run_jbdap(&["--no-json", "page", "--page", "2"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("size"));
    assert!(stderr.contains("也必须定义"));
}
