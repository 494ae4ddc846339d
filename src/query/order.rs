//! `order` parsing and in-memory sorting

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::i18n::Language;

/// sort direction of one order column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// one `column#direction` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSpec {
    pub column: String,
    pub direction: Direction,
}

impl OrderSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }
}

/// parse an `order` definition (comma separated string or array of strings)
pub fn parse_order(order: Option<&Value>, lang: Language) -> Result<Vec<OrderSpec>> {
    match order {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(order) => parse_defined(order, lang).wrap_err(ErrorKind::OrderParser, || {
            lang.text("解析 order 出错", "Error occurred while parsing 'order' property")
        }),
    }
}

fn parse_defined(order: &Value, lang: Language) -> Result<Vec<OrderSpec>> {
    let entries: Vec<&str> = match order {
        Value::String(s) => s.split(',').filter(|slice| !slice.is_empty()).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().ok_or_else(|| {
                    Error::new(
                        ErrorKind::OrderDef,
                        lang.text(
                            format!("下标为 {} 的元素不是 String 类型", i),
                            format!("The element with index {} is not a String", i),
                        ),
                    )
                })
            })
            .collect::<Result<_>>()?,
        _ => {
            return Err(Error::new(
                ErrorKind::OrderDef,
                lang.text(
                    "'order' 必须是 String 或者 Array 类型",
                    "'order' must be a String or an Array",
                ),
            ))
        }
    };

    entries.into_iter().map(|entry| parse_entry(entry, lang)).collect()
}

fn parse_entry(entry: &str, lang: Language) -> Result<OrderSpec> {
    let slices: Vec<&str> = entry.split('#').collect();
    match slices.as_slice() {
        [column] => Ok(OrderSpec::asc(*column)),
        [column, direction] => {
            if column.is_empty() || direction.is_empty() {
                return Err(Error::new(
                    ErrorKind::OrderDef,
                    lang.text(
                        format!("'{}' 定义有误，'#' 符号两侧均不能为空字符串", entry),
                        format!(
                            "'{}' is invalid, empty String is not allowed in both left and right sides around '#'",
                            entry
                        ),
                    ),
                ));
            }
            let direction = Direction::parse(direction).ok_or_else(|| {
                Error::new(
                    ErrorKind::OrderDef,
                    lang.text(
                        format!("'{}' 定义有误，排序方向只能是 asc 或 desc", entry),
                        format!("'{}' is invalid, direction must be asc or desc", entry),
                    ),
                )
            })?;
            Ok(OrderSpec {
                column: column.to_string(),
                direction,
            })
        }
        _ => Err(Error::new(
            ErrorKind::OrderDef,
            lang.text(
                format!("'{}' 定义有误，有多于1个 '#' 符号", entry),
                format!("'{}' is invalid, having more than one '#' is not allowed", entry),
            ),
        )),
    }
}

/// stable multi-column sort; later columns break ties of earlier ones
pub fn sort_records(records: &mut [Value], order: &[OrderSpec]) {
    if order.is_empty() {
        return;
    }

    records.sort_by(|a, b| {
        order.iter().fold(Ordering::Equal, |acc, spec| {
            acc.then_with(|| {
                let ordering = compare_values(a.get(&spec.column), b.get(&spec.column));
                match spec.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            })
        })
    });
}

/// compare two column values for sorting
///
/// ordering rules:
/// - missing < null < bool < number < string < array < object
/// - same types use natural ordering; arrays and objects tie
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(_), None) => return Ordering::Greater,
        (Some(a), Some(b)) => (a, b),
    };

    let rank = |v: &Value| -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
