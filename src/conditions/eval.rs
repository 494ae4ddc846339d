//! evaluator for condition trees

use serde_json::Value;

use super::compare::compare;
use super::context::EvalContext;
use super::ops::OpKind;
use super::parser::{group_entries, parse_comparison};
use super::types::{Condition, ConditionItem, Relation};
use crate::error::{Error, ErrorKind, Result, ResultExt};

/// evaluate a parsed condition against the context
///
/// - `and` stops at the first false child
/// - `or` stops at the first true child
/// - `not` evaluates every child and negates their conjunction
pub fn evaluate(condition: &Condition, ctx: &EvalContext) -> Result<bool> {
    match condition.relation {
        Relation::And => {
            for item in &condition.items {
                if !evaluate_item(item, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Relation::Or => {
            for item in &condition.items {
                if evaluate_item(item, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Relation::Not => {
            let mut all = true;
            for item in &condition.items {
                all &= evaluate_item(item, ctx)?;
            }
            Ok(!all)
        }
    }
}

fn evaluate_item(item: &ConditionItem, ctx: &EvalContext) -> Result<bool> {
    match item {
        ConditionItem::Compare(comparison) => compare(comparison, ctx),
        ConditionItem::Group(group) => evaluate(group, ctx),
    }
}

/// evaluate one entry straight from its JSON key and value
fn check_entry(kind: OpKind, key: &str, value: &Value, ctx: &EvalContext) -> Result<bool> {
    match Relation::from_group_key(key) {
        Some(nested) => check_group(kind, value, nested, ctx),
        None => compare(&parse_comparison(kind, key, value, ctx.lang)?, ctx),
    }
}

fn check_group(kind: OpKind, obj: &Value, relation: Relation, ctx: &EvalContext) -> Result<bool> {
    let entries = group_entries(obj, relation, ctx.lang)?;
    match relation {
        Relation::And => {
            for (key, value) in entries {
                if !check_entry(kind, key, value, ctx)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Relation::Or => {
            for (key, value) in entries {
                if check_entry(kind, key, value, ctx)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Relation::Not => {
            let mut all = true;
            for (key, value) in entries {
                all &= check_entry(kind, key, value, ctx)?;
            }
            Ok(!all)
        }
    }
}

/// parse and evaluate a JSON condition object in one go
///
/// `relation` is the textual relation of the top level group: `and`, `or`
/// or `not`. keys are parsed as they are reached, so an entry past a short
/// circuit is never looked at.
pub fn check_condition(kind: OpKind, obj: &Value, relation: &str, ctx: &EvalContext) -> Result<bool> {
    let lang = ctx.lang;
    let run = || -> Result<bool> {
        let relation = Relation::parse(relation).ok_or_else(|| {
            Error::new(
                ErrorKind::ConditionDef,
                lang.text(
                    format!("运算条件定义有误，不支持 '{}' 关系", relation),
                    format!("Invalid condition definition, relation '{}' is not supported", relation),
                ),
            )
        })?;
        check_group(kind, obj, relation, ctx)
    };

    run().wrap_err(ErrorKind::ConditionCal, || {
        lang.text("条件运算出错", "Error occurred in condition calculation")
    })
}
