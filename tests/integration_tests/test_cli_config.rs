// integration tests for the config command and config driven behaviour

use crate::common::*;
use serde_json::json;
use tempfile::TempDir;

fn config_dir(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "config.json", content);
    (dir, path)
}

// ============================================================================
// config show / path / default
// ============================================================================

#[test]
fn test_config_show_defaults_when_missing() {
    let output = run_jbdap(&["config", "show"]);
    assert!(output.status.success());

    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        shown,
        json!({ "settings": { "language": "zh-cn", "log_level": "warn" } })
    );
}

#[test]
fn test_config_show_reads_json5() {
    let (_dir, path) = config_dir(
        r#"{
            // english errors please
            settings: { language: "en-us" },
        }"#,
    );
    let output = run_jbdap_with_config(&["config", "show"], &path);
    assert!(output.status.success());

    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["settings"]["language"], json!("en-us"));
    assert_eq!(shown["settings"]["log_level"], json!("warn"));
}

#[test]
fn test_config_path_prints_override() {
    let (_dir, path) = config_dir("{}");
    let output = run_jbdap_with_config(&["config", "path"], &path);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        path.display().to_string()
    );
}

#[test]
fn test_config_default() {
    let output = run_jbdap(&["config", "default"]);
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["settings"]["language"], json!("zh-cn"));
}

// ============================================================================
// config verify
// ============================================================================

#[test]
fn test_config_verify_valid() {
    let (_dir, path) = config_dir(r#"{ "settings": { "log_level": "jbdap=debug" } }"#);
    let output = run_jbdap_with_config(&["config", "verify"], &path);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_config_verify_reports_errors() {
    let (_dir, path) = config_dir(r#"{ "settings": { "log_level": "jbdap=loud" } }"#);
    let output = run_jbdap_with_config(&["config", "verify"], &path);
    assert_eq!(output.status.code(), Some(5));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 error(s)"));
    assert!(stdout.contains("settings.log_level"));
}

#[test]
fn test_config_verify_broken_file() {
    let (_dir, path) = config_dir("{ settings: ");
    let output = run_jbdap_with_config(&["config", "verify"], &path);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid config"));

    let output = run_jbdap(&["config", "verify"]);
    assert_eq!(output.status.code(), Some(5));
}

// ============================================================================
// settings applied to engine commands
// ============================================================================

#[test]
fn test_config_language_applies() {
    let (_dir, path) = config_dir(r#"{ "settings": { "language": "en-us" } }"#);
    let output = run_jbdap_with_config(&["--no-json", "page", "--page", "2"], &path);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("one 'size' definition is required"));

    // --lang wins over the config file
    let output = run_jbdap_with_config(&["--no-json", "--lang", "zh-cn", "page", "--page", "2"], &path);
    assert!(String::from_utf8_lossy(&output.stderr).contains("也必须定义"));
}

#[test]
fn test_broken_config_fails_engine_commands() {
    let (_dir, path) = config_dir(r#"{ "settings": { "colour": "red" } }"#);
    let output = run_jbdap_with_config(&["--json", "page"], &path);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse config file"));
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let (output, value) = run_json(&[
        "--verbose",
        "list",
        "--records",
        r#"[{"a": 1}]"#,
        "--query",
        r#"{"where": {"a": 2}}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(value["result"], json!([]));
    assert!(String::from_utf8_lossy(&output.stderr).contains("where matched no record"));
}
