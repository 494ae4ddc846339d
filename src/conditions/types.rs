//! core types for the condition system

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::ops::CompareOp;

/// how the children of a condition group combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// every child must be true; empty group is true
    And,
    /// at least one child must be true; empty group is false
    Or,
    /// negation of the AND of all children (NOR)
    Not,
}

impl Relation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "and" => Some(Relation::And),
            "or" => Some(Relation::Or),
            "not" => Some(Relation::Not),
            _ => None,
        }
    }

    /// relation for a grouping key (`$and`, `$or`, `$not`)
    pub fn from_group_key(key: &str) -> Option<Self> {
        key.strip_prefix('$').and_then(Self::parse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::And => "and",
            Relation::Or => "or",
            Relation::Not => "not",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// a single normalized comparison: `left operator right`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// tag (or literal when no self record is in scope)
    pub left: String,
    pub operator: CompareOp,
    /// literal, or a tag string resolved at evaluation time
    pub right: Value,
}

impl Comparison {
    pub fn new(left: impl Into<String>, operator: CompareOp, right: Value) -> Self {
        Self {
            left: left.into(),
            operator,
            right,
        }
    }

    /// create an equality comparison
    pub fn eq(left: impl Into<String>, right: Value) -> Self {
        Self::new(left, CompareOp::Eq, right)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

/// one entry of a condition object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionItem {
    Compare(Comparison),
    Group(Condition),
}

/// the condition AST: a group of comparisons and nested groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub relation: Relation,
    /// children in key insertion order
    pub items: Vec<ConditionItem>,
}

impl Condition {
    pub fn new(relation: Relation, items: Vec<ConditionItem>) -> Self {
        Self { relation, items }
    }

    /// create an AND group
    pub fn all(items: Vec<ConditionItem>) -> Self {
        Self::new(Relation::And, items)
    }

    /// create an OR group
    pub fn any(items: Vec<ConditionItem>) -> Self {
        Self::new(Relation::Or, items)
    }

    /// create a NOT group
    pub fn none(items: Vec<ConditionItem>) -> Self {
        Self::new(Relation::Not, items)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for ConditionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionItem::Compare(c) => write!(f, "{}", c),
            ConditionItem::Group(g) => write!(f, "{}", g),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.relation)?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, ")")
    }
}
