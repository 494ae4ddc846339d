//! parser for JSON condition objects
//!
//! grammar:
//! ```text
//! condition  = { entry* }
//! entry      = group | comparison
//! group      = "$and" | "$or" | "$not" : condition
//! comparison = "<tag>" | "<tag>#<operator>" : value
//! ```

use serde_json::{Map, Value};

use super::ops::{suggest, CompareOp, OpKind};
use super::types::{Comparison, Condition, ConditionItem, Relation};
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::i18n::Language;

/// parse one `tag#operator` key and its value into a [`Comparison`]
///
/// a key without `#` compares with `eq`. the operator must belong to the
/// vocabulary selected by `kind`.
pub fn parse_comparison(kind: OpKind, key: &str, value: &Value, lang: Language) -> Result<Comparison> {
    split_key(kind, key, lang)
        .map(|(left, operator)| Comparison::new(left, operator, value.clone()))
        .wrap_err(ErrorKind::ComparisonParser, || {
            lang.text("单个比较运算条件解析失败", "Error occurred while parsing single comparison")
        })
}

fn split_key(kind: OpKind, key: &str, lang: Language) -> Result<(String, CompareOp)> {
    let pieces: Vec<&str> = key.split('#').collect();

    match pieces.as_slice() {
        [left] => Ok((left.to_string(), CompareOp::Eq)),
        [left, op] => {
            if left.is_empty() || op.is_empty() {
                return Err(Error::new(
                    ErrorKind::OperatorDef,
                    lang.text(
                        format!("'{}' 定义有误，'#' 符号两侧均不能为空字符串", key),
                        format!(
                            "'{}' is invalid, empty String is not allowed in both left and right sides around '#'",
                            key
                        ),
                    ),
                ));
            }
            match kind.operator(op) {
                Some(operator) => Ok((left.to_string(), operator)),
                None => Err(Error::new(
                    ErrorKind::OperatorDef,
                    lang.text(
                        format!("'{}' 定义有误，不支持 '{}' 运算符", key, op),
                        format!("'{}' is invalid, operator '{}' is not supported", key, op),
                    ),
                )
                .with_suggestions(suggest(op, kind.vocabulary()))),
            }
        }
        _ => Err(Error::new(
            ErrorKind::OperatorDef,
            lang.text(
                format!("'{}' 定义有误，有多于1个 '#' 符号", key),
                format!("'{}' is invalid, having more than one '#' is not allowed", key),
            ),
        )),
    }
}

/// the entries of a condition group, which must be a JSON object
pub(super) fn group_entries(obj: &Value, relation: Relation, lang: Language) -> Result<&Map<String, Value>> {
    obj.as_object().ok_or_else(|| {
        Error::new(
            ErrorKind::ConditionDef,
            lang.text(
                format!("'{}' 条件定义必须是 Object 类型", relation),
                format!("Condition group '{}' must be an Object", relation),
            ),
        )
    })
}

/// parse a condition object into a [`Condition`] tree
///
/// keys are kept in insertion order. every entry is validated here, unlike
/// [`check_condition`](super::check_condition) which only parses the keys it
/// reaches.
pub fn parse_condition(kind: OpKind, obj: &Value, relation: Relation, lang: Language) -> Result<Condition> {
    let map = group_entries(obj, relation, lang)?;

    let mut items = Vec::with_capacity(map.len());
    for (key, value) in map {
        let item = match Relation::from_group_key(key) {
            Some(nested) => ConditionItem::Group(parse_condition(kind, value, nested, lang)?),
            None => ConditionItem::Compare(parse_comparison(kind, key, value, lang)?),
        };
        items.push(item);
    }

    Ok(Condition::new(relation, items))
}
