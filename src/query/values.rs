//! aggregation over record lists for `values` queries

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use super::fields::ValueField;
use crate::conditions::ValuesOp;
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::i18n::Language;

const ALL_FIELDS: &str = "*";

/// reduce `list` according to one aggregation request
///
/// empty input gives `null`, except `count` (0) and `pick` (`[]`, so the
/// result can feed an `in` comparison directly).
pub fn get_value(list: &[Value], field: &ValueField, lang: Language) -> Result<Value> {
    aggregate(list, field, lang).wrap_err(ErrorKind::ValuesCal, || {
        lang.text("查询后取值失败", "Getting value failed after query")
    })
}

fn aggregate(list: &[Value], field: &ValueField, lang: Language) -> Result<Value> {
    let op = field.operator;

    if op == ValuesOp::Count && field.fields == ALL_FIELDS {
        return Ok(Value::from(list.len()));
    }
    if op != ValuesOp::Clone && field.fields.contains(',') {
        return Err(Error::new(
            ErrorKind::FieldsDef,
            lang.text(
                format!("'{}' 运算只接受一个字段", op),
                format!("Calculation '{}' accepts one field only", op),
            ),
        ));
    }
    let name = field.fields.as_str();

    match op {
        ValuesOp::Count => Ok(Value::from(
            list.iter()
                .filter(|record| record.get(name).is_some_and(|v| !v.is_null()))
                .count(),
        )),
        ValuesOp::Pick => {
            let mut picked: Vec<Value> = Vec::new();
            for record in list {
                let value = record.get(name).cloned().unwrap_or(Value::Null);
                if !picked.contains(&value) {
                    picked.push(value);
                }
            }
            Ok(Value::Array(picked))
        }
        ValuesOp::Clone => Ok(clone_records(list, name)),
        _ if list.is_empty() => Ok(Value::Null),
        ValuesOp::First => list[0].get(name).cloned().ok_or_else(|| {
            Error::new(
                ErrorKind::FieldsDef,
                lang.text(
                    format!("'{}' 字段不存在于第一条记录", name),
                    format!("Field '{}' doesn't exist in first row of records", name),
                ),
            )
        }),
        ValuesOp::Sum => Ok(sum(&numbers(list, name, op, lang)?)),
        ValuesOp::Avg => {
            let values = numbers(list, name, op, lang)?;
            if values.is_empty() {
                return Ok(Value::Null);
            }
            let total: f64 = values.iter().filter_map(|n| n.as_f64()).sum();
            Ok(from_f64(total / values.len() as f64))
        }
        ValuesOp::Max => extreme(list, name, op, Ordering::Greater, lang),
        ValuesOp::Min => extreme(list, name, op, Ordering::Less, lang),
    }
}

/// present, non-null values of `name`
fn present<'a>(list: &'a [Value], name: &str) -> Vec<&'a Value> {
    list.iter()
        .filter_map(|record| record.get(name))
        .filter(|v| !v.is_null())
        .collect()
}

fn not_numeric(name: &str, op: ValuesOp, lang: Language) -> Error {
    Error::new(
        ErrorKind::ValueCalculation,
        lang.text(
            format!("'{}' 运算要求字段 '{}' 的值是数字", op, name),
            format!("Calculation '{}' requires numeric values in field '{}'", op, name),
        ),
    )
}

fn numbers<'a>(list: &'a [Value], name: &str, op: ValuesOp, lang: Language) -> Result<Vec<&'a Number>> {
    present(list, name)
        .into_iter()
        .map(|v| match v {
            Value::Number(n) => Ok(n),
            _ => Err(not_numeric(name, op, lang)),
        })
        .collect()
}

/// integer sum while every value is an integer, float sum otherwise
fn sum(values: &[&Number]) -> Value {
    let ints: Option<i64> = values
        .iter()
        .try_fold(0i64, |acc, n| n.as_i64().and_then(|i| acc.checked_add(i)));
    match ints {
        Some(total) => Value::from(total),
        None => from_f64(values.iter().filter_map(|n| n.as_f64()).sum()),
    }
}

fn from_f64(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// max/min over all-numeric or all-string values
fn extreme(list: &[Value], name: &str, op: ValuesOp, want: Ordering, lang: Language) -> Result<Value> {
    let values = present(list, name);
    if values.is_empty() {
        return Ok(Value::Null);
    }

    let all_numbers = values.iter().all(|v| v.is_number());
    let all_strings = values.iter().all(|v| v.is_string());
    if !all_numbers && !all_strings {
        return Err(not_numeric(name, op, lang));
    }

    let ordering = |a: &Value, b: &Value| -> Ordering {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    };

    let mut best = values[0];
    for &value in &values[1..] {
        if ordering(value, best) == want {
            best = value;
        }
    }
    Ok(best.clone())
}

/// copy each record restricted to the comma separated `fields` (or `*`)
fn clone_records(list: &[Value], fields: &str) -> Value {
    if list.is_empty() {
        return Value::Null;
    }

    let mut names: Vec<&str> = Vec::new();
    for name in fields.split(',').filter(|s| !s.is_empty()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    let everything = names.contains(&ALL_FIELDS);

    let cloned = list
        .iter()
        .map(|record| {
            if everything {
                return record.clone();
            }
            let mut copy = Map::new();
            for name in &names {
                if let Some(value) = record.get(*name) {
                    copy.insert(name.to_string(), value.clone());
                }
            }
            Value::Object(copy)
        })
        .collect();
    Value::Array(cloned)
}
