//! output formatting for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - success: {"jsonrpc": "2.0", "result": ..., "id": null}
//! - error: {"jsonrpc": "2.0", "error": {"code": N, "message": "...", "data": {...}}, "id": null}

use serde::Serialize;
use serde_json::Value;
use std::io::IsTerminal;

use crate::conditions::Resolved;
use crate::error::Error;

use super::exit_codes;

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !std::io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// JSON-RPC 2.0 error response
#[derive(Serialize)]
pub struct JsonRpcError {
    pub jsonrpc: &'static str,
    pub error: RpcError,
    pub id: Option<String>,
}

/// JSON-RPC 2.0 error object
#[derive(Serialize)]
pub struct RpcError {
    /// jbdap exit code offset by -32000
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

/// engine details attached to an error
#[derive(Serialize, Default)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    /// kind of every layer, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<&'static str>,
    /// entity that has to be fetched before retrying
    #[serde(rename = "needRef", skip_serializing_if = "Option::is_none")]
    pub need_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl JsonRpcError {
    /// create error with standard JSON-RPC error code range
    /// jbdap uses -32000 to -32099 for application errors
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            error: RpcError {
                code: to_jsonrpc_code(code),
                message: message.into(),
                data: None,
            },
            id: None,
        }
    }

    /// error response for an engine failure, carrying its cause chain
    pub fn from_engine(err: &Error) -> Self {
        let suggestions = err.all_suggestions();
        let mut response = Self::new(exit_codes::for_error(err), err.full_message());
        response.error.data = Some(ErrorData {
            kind: Some(err.root_kind().name()),
            chain: err.chain().map(|e| e.kind().name()).collect(),
            need_ref: err.needs_ref().map(str::to_string),
            suggestions: if suggestions.is_empty() {
                None
            } else {
                Some(suggestions)
            },
        });
        response
    }
}

/// convert jbdap exit code to JSON-RPC error code
/// JSON-RPC reserves -32000 to -32099 for server/application errors
fn to_jsonrpc_code(code: i32) -> i32 {
    -32000 - code
}

/// state of a resolved tag as reported by `jbdap tag`
#[derive(Serialize, Debug, PartialEq)]
pub struct TagData {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl From<Resolved> for TagData {
    fn from(resolved: Resolved) -> Self {
        match resolved {
            Resolved::Value(value) => Self {
                state: "value",
                value: Some(value),
            },
            Resolved::Undefined => Self {
                state: "undefined",
                value: None,
            },
            Resolved::NotExist => Self {
                state: "notExist",
                value: None,
            },
        }
    }
}

/// print JSON-RPC success response to stdout
pub fn print_json<T: Serialize>(data: &T) {
    let response = JsonRpcResponse::new(data);
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{}", json);
    }
}

/// print an engine error as JSON-RPC to stdout
pub fn print_engine_error(err: &Error) {
    if let Ok(json) = serde_json::to_string(&JsonRpcError::from_engine(err)) {
        println!("{}", json);
    }
}

/// print a result in the chosen mode
pub fn print_result<T: Serialize>(mode: OutputMode, data: &T) {
    match mode {
        OutputMode::Json => print_json(data),
        OutputMode::Text => {
            let text = match serde_json::to_value(data) {
                Ok(Value::String(s)) => s,
                Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_default(),
                Err(_) => return,
            };
            println!("{}", text);
        }
        OutputMode::Quiet => {}
    }
}

/// human-readable engine error on stderr, one line per layer
pub fn format_engine_error(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", err)];
    for cause in err.chain().skip(1) {
        lines.push(format!("  caused by: {}", cause));
    }
    if let Some(entity) = err.needs_ref() {
        lines.push(format!("  needs reference: {}", entity));
    }
    let suggestions = err.all_suggestions();
    if !suggestions.is_empty() {
        lines.push(format!("  did you mean: {}", suggestions.join(", ")));
    }
    lines.join("\n")
}
