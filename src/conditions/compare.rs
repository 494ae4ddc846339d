//! comparator - operator semantics for one resolved (left, right) pair

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use super::context::EvalContext;
use super::ops::CompareOp;
use super::tag::{tag_to_value, Resolved};
use super::types::Comparison;
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::i18n::Language;

/// evaluate a single comparison
///
/// `left` resolves with the context's self record. a string `right`
/// resolves with self forced to `None`, so the right operand can never read
/// the current record's own properties; bare names there stay literals.
pub fn compare(comparison: &Comparison, ctx: &EvalContext) -> Result<bool> {
    let lang = ctx.lang;
    compare_inner(comparison, ctx).wrap_err(ErrorKind::Compare, || {
        lang.text("比较运算失败", "Failed to execute comparison")
    })
}

fn compare_inner(comparison: &Comparison, ctx: &EvalContext) -> Result<bool> {
    let lang = ctx.lang;
    let op = comparison.operator;

    let left = tag_to_value(&comparison.left, ctx)?;
    let right = match &comparison.right {
        Value::String(tag) => tag_to_value(tag, &ctx.without_current())?,
        other => Resolved::Value(other.clone()),
    };

    if left.is_not_exist() && !matches!(op, CompareOp::Exists | CompareOp::DoesNotExist) {
        return Err(Error::new(
            ErrorKind::TagDef,
            lang.text(
                format!("标签 '{}' 路径中有不存在的属性", comparison.left),
                format!(
                    "Some property does not exist in path '{}'",
                    comparison.left
                ),
            ),
        ));
    }

    let check = Check {
        op,
        left: &left,
        right: &right,
        lang,
    };

    match op {
        CompareOp::Eq => Ok(loose_eq(&left, &right)),
        CompareOp::Ne => Ok(!loose_eq(&left, &right)),
        CompareOp::Gte => Ok(matches!(
            order(&left, &right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        CompareOp::Gt => Ok(order(&left, &right) == Some(Ordering::Greater)),
        CompareOp::Lte => Ok(matches!(
            order(&left, &right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        CompareOp::Lt => Ok(order(&left, &right) == Some(Ordering::Less)),
        CompareOp::In => check.is_in(),
        CompareOp::NotIn => check.is_in().map(|b| !b),
        CompareOp::Contains => check.contains(),
        CompareOp::DoesNotContain => check.contains().map(|b| !b),
        CompareOp::StartsWith => check.starts_with(),
        CompareOp::DoesNotStartWith => check.starts_with().map(|b| !b),
        CompareOp::EndsWith => check.ends_with(),
        CompareOp::DoesNotEndWith => check.ends_with().map(|b| !b),
        CompareOp::Matches => check.matches(),
        CompareOp::DoesNotMatch => check.matches().map(|b| !b),
        CompareOp::Exists => Ok(!left.is_not_exist() == check.flag()?),
        CompareOp::DoesNotExist => Ok(left.is_not_exist() == check.flag()?),
        CompareOp::IsNull => Ok(is_null(&left) == check.flag()?),
        CompareOp::IsNotNull => Ok(!is_null(&left) == check.flag()?),
        CompareOp::IsUndefined => Ok(left.is_undefined() == check.flag()?),
        CompareOp::IsNotUndefined => Ok(!left.is_undefined() == check.flag()?),
        CompareOp::IsEmpty => Ok(check.is_empty()? == check.flag()?),
        CompareOp::IsNotEmpty => Ok(!check.is_empty()? == check.flag()?),
        CompareOp::Between | CompareOp::NotBetween | CompareOp::Like | CompareOp::NotLike => {
            Err(Error::new(
                ErrorKind::OperatorDef,
                lang.text(
                    format!("运算符 '{}' 只能由数据库查询执行，不支持内存比较", op),
                    format!(
                        "Operator '{}' is only supported by storage queries, not in-memory comparison",
                        op
                    ),
                ),
            ))
        }
    }
}

/// operand pair plus the operator, for the type-dependent operators
struct Check<'a> {
    op: CompareOp,
    left: &'a Resolved,
    right: &'a Resolved,
    lang: Language,
}

impl Check<'_> {
    fn type_error(&self) -> Error {
        let left = describe(self.left);
        let right = describe(self.right);
        Error::new(
            ErrorKind::OperatorDef,
            self.lang.text(
                format!("运算符 '{}' 不支持 {} 与 {} 之间的比较", self.op, left, right),
                format!(
                    "Operator '{}' is not applicable to {} and {}",
                    self.op, left, right
                ),
            ),
        )
    }

    /// the boolean right operand of the presence/emptiness operators
    fn flag(&self) -> Result<bool> {
        match self.right {
            Resolved::Value(Value::Bool(b)) => Ok(*b),
            _ => Err(Error::new(
                ErrorKind::OperatorDef,
                self.lang.text(
                    format!("运算符 '{}' 的比较值必须是 Boolean 类型", self.op),
                    format!("Operator '{}' expects a Boolean value", self.op),
                ),
            )),
        }
    }

    fn is_in(&self) -> Result<bool> {
        match (self.left, self.right) {
            (l, Resolved::Value(Value::Array(items))) => {
                Ok(items.iter().any(|item| strict_eq(l, item)))
            }
            (Resolved::Value(Value::String(l)), Resolved::Value(Value::String(r))) => {
                Ok(r.contains(l.as_str()))
            }
            _ => Err(self.type_error()),
        }
    }

    fn contains(&self) -> Result<bool> {
        match (self.left, self.right) {
            (Resolved::Value(Value::String(l)), Resolved::Value(Value::String(r))) => {
                Ok(l.contains(r.as_str()))
            }
            (Resolved::Value(Value::Array(items)), r) => {
                Ok(items.iter().any(|item| strict_eq(r, item)))
            }
            _ => Err(self.type_error()),
        }
    }

    fn starts_with(&self) -> Result<bool> {
        match (self.left, self.right) {
            (Resolved::Value(Value::String(l)), Resolved::Value(Value::String(r))) => {
                Ok(l.starts_with(r.as_str()))
            }
            (Resolved::Value(Value::Array(items)), r) => {
                Ok(items.first().is_some_and(|first| strict_eq(r, first)))
            }
            _ => Err(self.type_error()),
        }
    }

    /// suffix for strings, last-element equality for arrays
    fn ends_with(&self) -> Result<bool> {
        match (self.left, self.right) {
            (Resolved::Value(Value::String(l)), Resolved::Value(Value::String(r))) => {
                Ok(l.ends_with(r.as_str()))
            }
            (Resolved::Value(Value::Array(items)), r) => {
                Ok(items.last().is_some_and(|last| strict_eq(r, last)))
            }
            _ => Err(self.type_error()),
        }
    }

    fn matches(&self) -> Result<bool> {
        match (self.left, self.right) {
            (Resolved::Value(Value::String(l)), Resolved::Value(Value::String(pattern))) => {
                let re = Regex::new(pattern).map_err(|e| {
                    Error::new(
                        ErrorKind::OperatorDef,
                        self.lang.text(
                            format!("正则表达式 '{}' 无效: {}", pattern, e),
                            format!("Invalid regular expression '{}': {}", pattern, e),
                        ),
                    )
                })?;
                Ok(re.is_match(l))
            }
            _ => Err(self.type_error()),
        }
    }

    fn is_empty(&self) -> Result<bool> {
        match self.left {
            Resolved::Value(Value::String(s)) => Ok(s.is_empty()),
            Resolved::Value(Value::Array(a)) => Ok(a.is_empty()),
            Resolved::Value(Value::Object(o)) => Ok(o.is_empty()),
            _ => Err(self.type_error()),
        }
    }
}

fn describe(value: &Resolved) -> &'static str {
    match value {
        Resolved::NotExist => "not-exist",
        Resolved::Undefined => "undefined",
        Resolved::Value(Value::Null) => "null",
        Resolved::Value(Value::Bool(_)) => "boolean",
        Resolved::Value(Value::Number(_)) => "number",
        Resolved::Value(Value::String(_)) => "string",
        Resolved::Value(Value::Array(_)) => "array",
        Resolved::Value(Value::Object(_)) => "object",
    }
}

fn is_null(value: &Resolved) -> bool {
    matches!(value, Resolved::Value(Value::Null))
}

/// scalar view used by the loose comparisons
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// loose equality used by `eq` / `ne`
///
/// - null and undefined are equal to each other and nothing else
/// - same-typed values compare structurally (numbers numerically)
/// - number, numeric string and boolean compare numerically
fn loose_eq(left: &Resolved, right: &Resolved) -> bool {
    let (l, r) = match (left, right) {
        (Resolved::NotExist, _) | (_, Resolved::NotExist) => return false,
        (Resolved::Undefined, Resolved::Undefined) => return true,
        (Resolved::Undefined, Resolved::Value(v)) | (Resolved::Value(v), Resolved::Undefined) => {
            return v.is_null()
        }
        (Resolved::Value(l), Resolved::Value(r)) => (l, r),
    };

    match (l, r) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Array(_), _) | (_, Value::Array(_)) | (Value::Object(_), _) | (_, Value::Object(_)) => {
            l == r
        }
        _ => match (as_number(l), as_number(r)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// membership equality (no cross-type coercion); numbers compare numerically
fn strict_eq(left: &Resolved, item: &Value) -> bool {
    match (left, item) {
        (Resolved::Value(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Resolved::Value(v), item) => v == item,
        _ => false,
    }
}

/// ordering used by `gt` / `gte` / `lt` / `lte`; `None` when incomparable
fn order(left: &Resolved, right: &Resolved) -> Option<Ordering> {
    let (Resolved::Value(l), Resolved::Value(r)) = (left, right) else {
        return None;
    };

    match (l, r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => None,
        _ => {
            let a = as_number(l)?;
            let b = as_number(r)?;
            a.partial_cmp(&b)
        }
    }
}
