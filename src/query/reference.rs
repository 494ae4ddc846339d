//! materializer: turn fetched records into command results
//!
//! every function works on caller-owned data and returns fresh copies, so a
//! result never aliases the records it was built from.

use serde_json::{Map, Value};
use tracing::debug;

use super::fields::{RawFields, ValueField};
use super::order::{parse_order, sort_records};
use super::page::parse_offset_and_limit;
use super::values::get_value;
use crate::conditions::{check_condition, EvalContext, OpKind, Relation};
use crate::error::{Error, ErrorKind, Result, ResultExt};
use crate::i18n::Language;

/// query keys accepted when selecting a single record
const OBJ_QUERY_KEYS: [&str; 2] = ["where", "order"];
/// query keys accepted when selecting a list
const LIST_QUERY_KEYS: [&str; 4] = ["where", "order", "page", "size"];

/// project one record to the requested raw fields
///
/// `*` returns the record unchanged. aliases rename the source field.
pub fn get_obj_from_obj(record: &Value, raw: &RawFields, lang: Language) -> Result<Value> {
    project(record, raw, lang).wrap_err(ErrorKind::DealRef, || {
        lang.text("单个对象属性筛选出错", "Filtering fields from one Object failed")
    })
}

fn project(record: &Value, raw: &RawFields, lang: Language) -> Result<Value> {
    let fields = match raw {
        RawFields::All => return Ok(record.clone()),
        RawFields::Some(fields) => fields,
    };

    let mut projected = Map::new();
    for field in fields {
        let source = field.source_name();
        let value = record.get(source).ok_or_else(|| {
            Error::new(
                ErrorKind::FieldNotExist,
                lang.text(
                    format!("原始数据中不存在 '{}' 字段", source),
                    format!("Field '{}' doesn't exist in raw data", source),
                ),
            )
        })?;
        projected.insert(field.output_name().to_string(), value.clone());
    }
    Ok(Value::Object(projected))
}

/// select one record from a list
///
/// - `order` sorts a copy of the list and takes its head
/// - `where` scans the list in its original order and takes the first match;
///   when present it decides the result, whatever `order` picked
/// - neither: the first record
///
/// returns `null` for an empty list or when `where` matches nothing.
pub fn get_obj_from_list(
    records: &[Value],
    query: Option<&Value>,
    raw: &RawFields,
    ctx: &EvalContext,
) -> Result<Value> {
    let lang = ctx.lang;
    select_one(records, query, raw, ctx).wrap_err(ErrorKind::DealRef, || {
        lang.text(
            "多条记录中筛选目标出错",
            "Selecting one target from multiple records failed",
        )
    })
}

fn select_one(
    records: &[Value],
    query: Option<&Value>,
    raw: &RawFields,
    ctx: &EvalContext,
) -> Result<Value> {
    let lang = ctx.lang;
    let query = query_object(query, &OBJ_QUERY_KEYS, lang)?;

    if records.is_empty() {
        return Ok(Value::Null);
    }

    let mut selected: Option<&Value> = None;
    let mut sorted: Vec<Value>;

    if let Some(query) = query {
        let order = parse_order(query.get("order"), lang)?;
        if !order.is_empty() {
            sorted = records.to_vec();
            sort_records(&mut sorted, &order);
            selected = sorted.first();
        }

        if let Some(filter) = where_filter(query, lang)? {
            selected = None;
            for record in records {
                if record_matches(filter, record, ctx)? {
                    selected = Some(record);
                    break;
                }
            }
            if selected.is_none() {
                debug!(candidates = records.len(), "where matched no record");
                return Ok(Value::Null);
            }
        }
    }

    let record = selected.unwrap_or(&records[0]);
    let result = get_obj_from_obj(record, raw, lang)?;
    debug!(candidates = records.len(), results = 1, "materialized record");
    Ok(result)
}

/// select, sort and page a list of records
///
/// `None` when `records` is empty; an empty list when nothing survives the
/// filter or the page window.
pub fn get_list_from_list(
    records: &[Value],
    query: Option<&Value>,
    raw: &RawFields,
    ctx: &EvalContext,
) -> Result<Option<Vec<Value>>> {
    let lang = ctx.lang;
    select_many(records, query, raw, ctx).wrap_err(ErrorKind::DealRef, || {
        lang.text(
            "多条记录中筛选多条记录出错",
            "Selecting several records from multiple records failed",
        )
    })
}

fn select_many(
    records: &[Value],
    query: Option<&Value>,
    raw: &RawFields,
    ctx: &EvalContext,
) -> Result<Option<Vec<Value>>> {
    let lang = ctx.lang;
    let query = query_object(query, &LIST_QUERY_KEYS, lang)?;

    if records.is_empty() {
        return Ok(None);
    }

    let mut selected: Vec<Value> = match query {
        Some(query) => {
            let mut selected = match where_filter(query, lang)? {
                Some(filter) => {
                    let mut kept = Vec::new();
                    for record in records {
                        if record_matches(filter, record, ctx)? {
                            kept.push(record.clone());
                        }
                    }
                    if kept.is_empty() {
                        debug!(candidates = records.len(), "where matched no record");
                    }
                    kept
                }
                None => records.to_vec(),
            };
            sort_records(&mut selected, &parse_order(query.get("order"), lang)?);
            parse_offset_and_limit(query.get("page"), query.get("size"), lang)?.apply(selected)
        }
        None => records.to_vec(),
    };

    for record in selected.iter_mut() {
        *record = get_obj_from_obj(record, raw, lang)?;
    }
    debug!(
        candidates = records.len(),
        results = selected.len(),
        "materialized list"
    );
    Ok(Some(selected))
}

/// run every aggregation request against the full list
pub fn get_values_from_list(
    records: &[Value],
    values: &[ValueField],
    lang: Language,
) -> Result<Map<String, Value>> {
    aggregate_all(records, values, lang).wrap_err(ErrorKind::DealRef, || {
        lang.text("取值查询出错", "Error occurred in this 'values' type query")
    })
}

fn aggregate_all(records: &[Value], values: &[ValueField], lang: Language) -> Result<Map<String, Value>> {
    if values.is_empty() {
        return Err(Error::new(
            ErrorKind::CmdDef,
            lang.text(
                "'values' 查询类型至少要定义一个取值字段",
                "A 'values' type query needs one value field defined at least",
            ),
        ));
    }

    let mut result = Map::new();
    for field in values {
        result.insert(field.name.clone(), get_value(records, field, lang)?);
    }
    debug!(
        candidates = records.len(),
        results = result.len(),
        "materialized values"
    );
    Ok(result)
}

/// validate the query object and its keys; `null` counts as no query
fn query_object<'q>(
    query: Option<&'q Value>,
    allowed: &[&str],
    lang: Language,
) -> Result<Option<&'q Map<String, Value>>> {
    let query = match query {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(Error::new(
                ErrorKind::QueryDef,
                lang.text("'query' 必须是 Object 类型", "'query' must be an Object"),
            ))
        }
    };

    if let Some(key) = query.keys().find(|key| !allowed.contains(&key.as_str())) {
        return Err(Error::new(
            ErrorKind::QueryDef,
            lang.text(
                format!(
                    "查询条件不支持 '{}' 参数，只接受 {}",
                    key,
                    allowed.join(", ")
                ),
                format!(
                    "Query parameter '{}' is not supported, valid parameters are: {}",
                    key,
                    allowed.join(", ")
                ),
            ),
        ));
    }

    Ok(Some(query))
}

/// the `where` object of a query, if any
fn where_filter<'q>(query: &'q Map<String, Value>, lang: Language) -> Result<Option<&'q Value>> {
    let filter = match query.get("where") {
        None | Some(Value::Null) => return Ok(None),
        Some(filter) if filter.is_object() => filter,
        Some(_) => {
            return Err(Error::new(
                ErrorKind::QueryDef,
                lang.text("'where' 必须是 Object 类型", "'where' must be an Object"),
            ))
        }
    };

    Ok(Some(filter))
}

fn record_matches(filter: &Value, record: &Value, ctx: &EvalContext) -> Result<bool> {
    check_condition(
        OpKind::Query,
        filter,
        Relation::And.as_str(),
        &ctx.with_current(Some(record)),
    )
}
