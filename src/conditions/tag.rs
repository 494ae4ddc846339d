//! tag resolver
//!
//! a tag addresses a value in one of three places:
//! - `/Entity[.path]` - an entity in the root map (must already be fetched)
//! - `$[.path]` - the parent record
//! - `name` - a property of the self record (never cascaded); with no self
//!   record in scope the bare string is a literal
//!
//! one `.$.` may split a tag into an array path and a property to pluck
//! from every element (`$.items.$.id`).

use serde_json::Value;
use tracing::{debug, trace};

use super::context::EvalContext;
use crate::error::{Error, ErrorKind, Result, ResultExt};

/// separator between an array path and the plucked property
const PLUCK_SEPARATOR: &str = ".$.";

static NULL: Value = Value::Null;

/// result of resolving a tag
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// a concrete value (possibly `null`)
    Value(Value),
    /// bare-name property absent from the self record
    Undefined,
    /// the final segment of a cascading path is absent
    NotExist,
}

impl Resolved {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_not_exist(&self) -> bool {
        matches!(self, Resolved::NotExist)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Resolved::Undefined)
    }

    /// collapse into JSON; both absent markers become `null`
    pub fn into_json(self) -> Value {
        match self {
            Resolved::Value(v) => v,
            Resolved::Undefined | Resolved::NotExist => Value::Null,
        }
    }
}

impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        Resolved::Value(value)
    }
}

/// resolve `tag` against the context
pub fn tag_to_value(tag: &str, ctx: &EvalContext) -> Result<Resolved> {
    let lang = ctx.lang;
    let resolved = resolve(tag, ctx).wrap_err(ErrorKind::TagToValue, || {
        lang.text(
            format!("标签 '{}' 转为值失败", tag),
            format!("Failed to convert tag '{}' to value", tag),
        )
    })?;
    trace!(tag, value = ?resolved, "resolved tag");
    Ok(resolved)
}

fn resolve(tag: &str, ctx: &EvalContext) -> Result<Resolved> {
    let lang = ctx.lang;
    let head = tag.split('.').next().unwrap_or_default();

    let target: &Value = if let Some(name) = head.strip_prefix('/') {
        if name.is_empty() {
            return Err(Error::new(
                ErrorKind::TagDef,
                lang.text(
                    format!("标签 '{}' 缺少引用对象名", tag),
                    format!("Tag '{}' is missing the referenced entity name", tag),
                ),
            ));
        }
        match ctx.root.get(name) {
            // null data is allowed, it may be checked with isNull
            Some(data) => data,
            None => {
                debug!(entity = name, tag, "reference not filled yet");
                return Err(Error::ref_not_filled(
                    name,
                    lang.text(
                        format!("引用对象 /{} 尚未填充数据", name),
                        format!("Reference /{} has no data filled", name),
                    ),
                ));
            }
        }
    } else if head.starts_with('$') {
        if head != "$" {
            return Err(Error::new(
                ErrorKind::TagDef,
                lang.text(
                    format!("标签 '{}' 定义有误，父对象引用必须以 '$' 或 '$.' 开头", tag),
                    format!("Tag '{}' is invalid, parent references must start with '$' or '$.'", tag),
                ),
            ));
        }
        ctx.parent.unwrap_or(&NULL)
    } else {
        // self property, no cascading
        return Ok(match ctx.current {
            None => Resolved::Value(Value::String(tag.to_string())),
            Some(record) => record
                .get(tag)
                .cloned()
                .map(Resolved::Value)
                .unwrap_or(Resolved::Undefined),
        });
    };

    let slices: Vec<&str> = tag.split(PLUCK_SEPARATOR).collect();
    match slices.as_slice() {
        [path] => Ok(walk(tag, path, target, ctx)?
            .map(|v| Resolved::Value(v.clone()))
            .unwrap_or(Resolved::NotExist)),
        [path, field] => {
            if path.is_empty() || field.is_empty() {
                return Err(Error::new(
                    ErrorKind::TagDef,
                    lang.text(
                        format!("'{}' 定义有误，'.$.' 符号两侧均不能为空字符串", tag),
                        format!(
                            "'{}' is invalid, empty String is not allowed in both left and right sides around '.$.'",
                            tag
                        ),
                    ),
                ));
            }
            if field.contains('.') {
                return Err(Error::new(
                    ErrorKind::TagDef,
                    lang.text(
                        "无法取得一个数组的级联子属性",
                        "You can't acquire a cascaded property of an array",
                    ),
                ));
            }
            let Some(base) = walk(tag, path, target, ctx)? else {
                return Ok(Resolved::NotExist);
            };
            let Some(items) = base.as_array() else {
                let name = path.rsplit('.').next().unwrap_or(path);
                return Err(Error::new(
                    ErrorKind::TagDef,
                    lang.text(
                        format!("属性 '{}' 不是 Array 类型，无法进行子属性抽取", name),
                        format!(
                            "You can't pick element properties from a non-array Object '{}'",
                            name
                        ),
                    ),
                ));
            };
            Ok(Resolved::Value(Value::Array(pluck(items, field))))
        }
        _ => Err(Error::new(
            ErrorKind::TagDef,
            lang.text(
                "不支持多层 '.$.' 查询",
                "Multiple '.$.' query is not supported",
            ),
        )),
    }
}

/// walk a dotted path below `target`, skipping the head segment
///
/// `Ok(None)` means only the last segment is missing.
fn walk<'v>(
    tag: &str,
    path: &str,
    target: &'v Value,
    ctx: &EvalContext,
) -> Result<Option<&'v Value>> {
    let lang = ctx.lang;
    let pieces: Vec<&str> = path.split('.').collect();
    let mut current = target;

    for i in 1..pieces.len() {
        let Some(obj) = current.as_object() else {
            return Err(Error::new(
                ErrorKind::TagDef,
                lang.text(
                    format!("'{}' 标签里的 '{}' 不是 Object 类型", tag, pieces[i - 1]),
                    format!("'{}' in tag '{}' is not an Object", pieces[i - 1], tag),
                ),
            ));
        };
        match obj.get(pieces[i]) {
            Some(next) => current = next,
            None if i == pieces.len() - 1 => return Ok(None),
            None => {
                return Err(Error::new(
                    ErrorKind::TagDef,
                    lang.text(
                        format!("不存在 '{}' 属性", pieces[i]),
                        format!("'{}' property does not exist", pieces[i]),
                    ),
                ))
            }
        }
    }

    Ok(Some(current))
}

/// `field` of every element, de-duplicated in first-seen order
fn pluck(items: &[Value], field: &str) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        let value = item.get(field).cloned().unwrap_or(Value::Null);
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
