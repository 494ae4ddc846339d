//! per-type shape checks for single commands
//!
//! structural JSON validation happens upstream; these checks only enforce
//! which properties each command type may or must carry.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::conditions::suggest;
use crate::error::{Error, ErrorKind, Result};
use crate::i18n::Language;

/// every command type name
pub const COMMAND_TYPES: [&str; 10] = [
    "list", "entity", "distinct", "values", "create", "update", "delete", "increase", "decrease",
    "function",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    List,
    Entity,
    Distinct,
    Values,
    Create,
    Update,
    Delete,
    Increase,
    Decrease,
    Function,
}

impl CommandType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(CommandType::List),
            "entity" => Some(CommandType::Entity),
            "distinct" => Some(CommandType::Distinct),
            "values" => Some(CommandType::Values),
            "create" => Some(CommandType::Create),
            "update" => Some(CommandType::Update),
            "delete" => Some(CommandType::Delete),
            "increase" => Some(CommandType::Increase),
            "decrease" => Some(CommandType::Decrease),
            "function" => Some(CommandType::Function),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::List => "list",
            CommandType::Entity => "entity",
            CommandType::Distinct => "distinct",
            CommandType::Values => "values",
            CommandType::Create => "create",
            CommandType::Update => "update",
            CommandType::Delete => "delete",
            CommandType::Increase => "increase",
            CommandType::Decrease => "decrease",
            CommandType::Function => "function",
        }
    }

    /// `data` must be absent
    fn forbids_data(&self) -> bool {
        matches!(
            self,
            CommandType::Entity | CommandType::List | CommandType::Values | CommandType::Delete
        )
    }

    /// `data` is required
    fn requires_data(&self) -> bool {
        matches!(
            self,
            CommandType::Create | CommandType::Update | CommandType::Increase | CommandType::Decrease
        )
    }

    /// `fields` must be absent
    fn forbids_fields(&self) -> bool {
        matches!(
            self,
            CommandType::Create
                | CommandType::Update
                | CommandType::Delete
                | CommandType::Increase
                | CommandType::Decrease
                | CommandType::Function
        )
    }

    /// `query` must be absent
    fn forbids_query(&self) -> bool {
        matches!(self, CommandType::Create | CommandType::Function)
    }

    fn is_atomic(&self) -> bool {
        matches!(self, CommandType::Increase | CommandType::Decrease)
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// check the property rules of one command
pub fn check_command(cmd: &Value, lang: Language) -> Result<CommandType> {
    let Some(obj) = cmd.as_object() else {
        return Err(command_error(lang.text("指令必须是 Object 类型", "A command must be an Object")));
    };
    let kind = command_type(obj, lang)?;

    let should_not_exist = |key: &str| {
        command_error(lang.text(
            format!("属性 '{}' 不应该出现在 '{}' 指令中", key, kind),
            format!("The '{}' property should not exist in '{}' type commands", key, kind),
        ))
    };

    if kind.forbids_data() && obj.contains_key("data") {
        return Err(should_not_exist("data"));
    }

    if kind.requires_data() {
        let Some(data) = obj.get("data") else {
            return Err(command_error(lang.text(
                format!("在 '{}' 命令中，属性 'data' 必须要配置", kind),
                format!("The 'data' property is required in '{}' type commands", kind),
            )));
        };
        if kind != CommandType::Create && !data.is_object() {
            return Err(command_error(lang.text(
                format!("在 '{}' 命令中，属性 'data' 必须是 Object 类型", kind),
                format!("The 'data' property in '{}' type commands must be an Object", kind),
            )));
        }
        if kind.is_atomic() {
            let fails: Vec<&str> = data
                .as_object()
                .into_iter()
                .flatten()
                .filter(|(_, v)| !v.is_number())
                .map(|(k, _)| k.as_str())
                .collect();
            if !fails.is_empty() {
                return Err(command_error(lang.text(
                    format!("字段 '{}' 的值不是有效数字", fails.join(",")),
                    format!("Values of fields '{}' are not numbers", fails.join(",")),
                )));
            }
        }
    }

    if kind.forbids_fields() && obj.contains_key("fields") {
        return Err(should_not_exist("fields"));
    }
    if kind.forbids_query() && obj.contains_key("query") {
        return Err(should_not_exist("query"));
    }

    if kind == CommandType::Values && !obj.contains_key("fields") {
        return Err(command_error(lang.text(
            "在 'values' 命令中，属性 'fields' 必须要配置",
            "The 'fields' property is required in 'values' type commands",
        )));
    }

    if kind == CommandType::Function && obj.get("data").is_some_and(|d| !d.is_object()) {
        return Err(command_error(lang.text(
            "对于 'function' 操作，属性 'data' 必须是 Object 类型",
            "Property 'data' must be an Object for 'function' type operations",
        )));
    }

    Ok(kind)
}

/// check a top level command: the single command rules plus `return`
pub fn check_top_command(cmd: &Value, lang: Language) -> Result<CommandType> {
    let kind = check_command(cmd, lang)?;

    if cmd.get("return").is_some_and(|r| !r.is_boolean()) {
        return Err(command_error(lang.text(
            "属性 'return' 必须是 Boolean 类型",
            "The 'return' property must be a Boolean",
        )));
    }
    Ok(kind)
}

fn command_type(obj: &Map<String, Value>, lang: Language) -> Result<CommandType> {
    let name = obj.get("type").and_then(Value::as_str).ok_or_else(|| {
        command_error(lang.text(
            "指令缺少 String 类型的 'type' 属性",
            "A command needs a 'type' property of String type",
        ))
    })?;

    CommandType::parse(name).ok_or_else(|| {
        command_error(lang.text(
            format!("不支持 '{}' 类型的指令", name),
            format!("Command type '{}' is not supported", name),
        ))
        .with_suggestions(suggest(name, &COMMAND_TYPES))
    })
}

fn command_error(message: String) -> Error {
    Error::new(ErrorKind::CommandDef, message)
}
