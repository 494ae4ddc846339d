// shared utilities for integration tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

/// path to the jbdap binary built for this test run
pub fn jbdap_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_jbdap"))
}

/// config path that never exists, so runs use the defaults
pub fn missing_config_path() -> PathBuf {
    PathBuf::from("/nonexistent/jbdap-tests/config.json")
}

/// run jbdap with the default config
pub fn run_jbdap(args: &[&str]) -> Output {
    run_jbdap_with_config(args, &missing_config_path())
}

/// run jbdap against a specific config file
pub fn run_jbdap_with_config(args: &[&str], config: &Path) -> Output {
    Command::new(jbdap_binary_path())
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("JBDAP_CONFIG")
        .output()
        .expect("Failed to run jbdap")
}

/// run jbdap with `--json --lang en-us` and parse the JSON-RPC envelope on stdout
pub fn run_json(args: &[&str]) -> (Output, Value) {
    let mut full = vec!["--json", "--lang", "en-us"];
    full.extend_from_slice(args);
    let output = run_jbdap(&full);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value = serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, stdout));
    (output, value)
}

/// write `content` to a file inside `dir`
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}
