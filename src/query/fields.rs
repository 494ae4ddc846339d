//! `fields` shorthand parser
//!
//! element grammar:
//! - `name` - raw field
//! - `name=>alias` - raw field renamed to `alias`
//! - `op#field=>name` - aggregation, result stored under `name`
//! - `*` - every raw field, exclusive with other raw fields
//! - `{ ... }` - cascaded selection, passed through unchanged

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::conditions::{suggest, ValuesOp, VALUES_OPS};
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::i18n::Language;

const ALL_FIELDS: &str = "*";

/// one explicitly selected raw field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField {
    Name(String),
    /// `source=>alias`; serialized as `{alias: source}`
    Alias { alias: String, source: String },
}

impl RawField {
    /// key in the projected record
    pub fn output_name(&self) -> &str {
        match self {
            RawField::Name(name) => name,
            RawField::Alias { alias, .. } => alias,
        }
    }

    /// key read from the source record
    pub fn source_name(&self) -> &str {
        match self {
            RawField::Name(name) => name,
            RawField::Alias { source, .. } => source,
        }
    }
}

impl Serialize for RawField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RawField::Name(name) => serializer.serialize_str(name),
            RawField::Alias { alias, source } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(alias, source)?;
                map.end()
            }
        }
    }
}

/// raw field selection of a [`FieldSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawFields {
    /// `*`
    #[default]
    All,
    Some(Vec<RawField>),
}

impl RawFields {
    pub fn is_all(&self) -> bool {
        matches!(self, RawFields::All)
    }
}

impl Serialize for RawFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RawFields::All => serializer.serialize_str(ALL_FIELDS),
            RawFields::Some(fields) => fields.serialize(serializer),
        }
    }
}

/// one aggregation request: `operator#fields=>name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueField {
    pub name: String,
    pub operator: ValuesOp,
    /// single field name, `*`, or a comma separated set for `clone`
    pub fields: String,
}

impl ValueField {
    pub fn new(name: impl Into<String>, operator: ValuesOp, fields: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator,
            fields: fields.into(),
        }
    }
}

/// normalized `fields` definition
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FieldSpec {
    pub raw: RawFields,
    pub values: Vec<ValueField>,
    pub cascaded: Vec<Map<String, Value>>,
}

/// parse a `fields` definition (comma separated string or array)
///
/// an omitted definition selects every raw field.
pub fn parse_fields(fields: Option<&Value>, lang: Language) -> Result<FieldSpec> {
    let Some(fields) = fields else {
        return Ok(FieldSpec::default());
    };

    parse_defined(fields, lang).wrap_err(ErrorKind::FieldsParser, || {
        lang.text("解析 fields 出错", "Error occurred while parsing 'fields' property")
    })
}

fn parse_defined(fields: &Value, lang: Language) -> Result<FieldSpec> {
    let owned: Vec<Value>;
    let list: &[Value] = match fields {
        Value::String(s) => {
            owned = s
                .split(',')
                .filter(|slice| !slice.is_empty())
                .map(|slice| Value::String(slice.to_string()))
                .collect();
            if owned.is_empty() {
                return Err(Error::new(
                    ErrorKind::FieldsDef,
                    lang.text("'fields' 不能是空字符串", "'fields' can not be an empty String"),
                ));
            }
            &owned
        }
        Value::Array(items) => items,
        _ => {
            return Err(Error::new(
                ErrorKind::FieldsDef,
                lang.text(
                    "'fields' 必须是 String 或者 Array 类型",
                    "'fields' must be a String or an Array",
                ),
            ))
        }
    };

    let mut raw = Vec::new();
    let mut values = Vec::new();
    let mut cascaded = Vec::new();
    let mut has_star = false;

    for item in list {
        match item {
            Value::String(s) if s == ALL_FIELDS => has_star = true,
            Value::String(s) => {
                // fail fast, nothing may follow a '*'
                if has_star {
                    return Err(Error::new(
                        ErrorKind::FieldsDef,
                        lang.text(
                            format!("字段 '{}' 定义有误，前面已经有 * 就不能再定义其它字段名", s),
                            format!(
                                "Invalid field '{}' definition, no more fields can be defined after a '*'",
                                s
                            ),
                        ),
                    ));
                }
                match parse_item(s, lang)? {
                    Item::Raw(field) => raw.push(field),
                    Item::Value(field) => values.push(field),
                }
            }
            Value::Object(map) => cascaded.push(map.clone()),
            _ => {
                return Err(Error::new(
                    ErrorKind::FieldsDef,
                    lang.text(
                        "'fields' 数组元素必须是 String 或者 Object",
                        "Each element in 'fields' must be a String or an Object",
                    ),
                ))
            }
        }
    }

    let raw = match (has_star, raw.is_empty()) {
        (true, true) => RawFields::All,
        (false, _) => RawFields::Some(raw),
        (true, false) => {
            return Err(Error::new(
                ErrorKind::FieldsDef,
                lang.text(
                    "请检查 'fields' 定义，* 不能与其它字段定义同时出现",
                    "Please check the 'fields' property, once you have a '*', other fields are not allowed to exist",
                ),
            ))
        }
    };

    Ok(FieldSpec {
        raw,
        values,
        cascaded,
    })
}

enum Item {
    Raw(RawField),
    Value(ValueField),
}

fn parse_item(item: &str, lang: Language) -> Result<Item> {
    let empty_sides = |sep: &str| {
        Error::new(
            ErrorKind::FieldsDef,
            lang.text(
                format!("字段 '{}' 定义有误，'{}' 两侧都不能是空字符串", item, sep),
                format!(
                    "Invalid field '{}' definition, empty String is not allowed in both left and right sides around '{}'",
                    item, sep
                ),
            ),
        )
    };
    let too_many = |sep: &str| {
        Error::new(
            ErrorKind::FieldsDef,
            lang.text(
                format!("字段 '{}' 定义有误，有多于1个 '{}' 符号", item, sep),
                format!(
                    "Invalid field '{}' definition, having more than one '{}' is not allowed",
                    item, sep
                ),
            ),
        )
    };

    let slices: Vec<&str> = item.split("=>").collect();
    let (left, name) = match slices.as_slice() {
        [name] => return Ok(Item::Raw(RawField::Name(name.to_string()))),
        [left, name] if left.is_empty() || name.is_empty() => return Err(empty_sides("=>")),
        [left, name] => (*left, *name),
        _ => return Err(too_many("=>")),
    };

    let pieces: Vec<&str> = left.split('#').collect();
    match pieces.as_slice() {
        [source] => Ok(Item::Raw(RawField::Alias {
            alias: name.to_string(),
            source: source.to_string(),
        })),
        [op, fields] if op.is_empty() || fields.is_empty() => Err(empty_sides("#")),
        [op, fields] => {
            let operator = ValuesOp::parse(op).ok_or_else(|| {
                Error::new(
                    ErrorKind::OperatorDef,
                    lang.text(
                        format!("values 定义有误，不支持 '{}' 计算", op),
                        format!("values definition is invalid, calculation '{}' is not supported", op),
                    ),
                )
                .with_suggestions(suggest(op, &VALUES_OPS))
            })?;
            Ok(Item::Value(ValueField::new(name, operator, *fields)))
        }
        _ => Err(too_many("#")),
    }
}
