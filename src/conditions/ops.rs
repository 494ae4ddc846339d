//! operator catalog
//!
//! two comparison vocabularies share one enum: `compare` (runtime checks in
//! `onlyIf`) and `query` (record filtering in `where`). which one applies is
//! decided by [`OpKind`]. aggregation operators live in [`ValuesOp`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

/// max edit distance for "did you mean" operator suggestions
const SUGGESTION_THRESHOLD: usize = 2;

/// operators accepted when evaluating `onlyIf` style conditions
pub const COMPARE_OPS: [&str; 24] = [
    "eq",
    "ne",
    "gte",
    "gt",
    "lte",
    "lt",
    "in",
    "notIn",
    "contains",
    "doesNotContain",
    "startsWith",
    "doesNotStartWith",
    "endsWith",
    "doesNotEndWith",
    "matches",
    "doesNotMatch",
    "exists",
    "doesNotExist",
    "isNull",
    "isNotNull",
    "isUndefined",
    "isNotUndefined",
    "isEmpty",
    "isNotEmpty",
];

/// operators accepted in `where` clauses
pub const QUERY_OPS: [&str; 20] = [
    "eq",
    "ne",
    "gte",
    "gt",
    "lte",
    "lt",
    "in",
    "notIn",
    "between",
    "notBetween",
    "like",
    "notLike",
    "contains",
    "doesNotContain",
    "startsWith",
    "doesNotStartWith",
    "endsWith",
    "doesNotEndWith",
    "isNull",
    "isNotNull",
];

/// aggregation operators for `values` queries
pub const VALUES_OPS: [&str; 8] = ["count", "sum", "avg", "max", "min", "first", "pick", "clone"];

/// every comparison operator known to either vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gte,
    Gt,
    Lte,
    Lt,
    In,
    NotIn,
    Contains,
    DoesNotContain,
    StartsWith,
    DoesNotStartWith,
    EndsWith,
    DoesNotEndWith,
    Matches,
    DoesNotMatch,
    Exists,
    DoesNotExist,
    IsNull,
    IsNotNull,
    IsUndefined,
    IsNotUndefined,
    IsEmpty,
    IsNotEmpty,
    /// query only, evaluated by the storage layer
    Between,
    /// query only, evaluated by the storage layer
    NotBetween,
    /// query only, evaluated by the storage layer
    Like,
    /// query only, evaluated by the storage layer
    NotLike,
}

impl CompareOp {
    pub const ALL: [CompareOp; 28] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Gte,
        CompareOp::Gt,
        CompareOp::Lte,
        CompareOp::Lt,
        CompareOp::In,
        CompareOp::NotIn,
        CompareOp::Contains,
        CompareOp::DoesNotContain,
        CompareOp::StartsWith,
        CompareOp::DoesNotStartWith,
        CompareOp::EndsWith,
        CompareOp::DoesNotEndWith,
        CompareOp::Matches,
        CompareOp::DoesNotMatch,
        CompareOp::Exists,
        CompareOp::DoesNotExist,
        CompareOp::IsNull,
        CompareOp::IsNotNull,
        CompareOp::IsUndefined,
        CompareOp::IsNotUndefined,
        CompareOp::IsEmpty,
        CompareOp::IsNotEmpty,
        CompareOp::Between,
        CompareOp::NotBetween,
        CompareOp::Like,
        CompareOp::NotLike,
    ];

    /// parse an operator name (case sensitive, as written in keys)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gte => "gte",
            CompareOp::Gt => "gt",
            CompareOp::Lte => "lte",
            CompareOp::Lt => "lt",
            CompareOp::In => "in",
            CompareOp::NotIn => "notIn",
            CompareOp::Contains => "contains",
            CompareOp::DoesNotContain => "doesNotContain",
            CompareOp::StartsWith => "startsWith",
            CompareOp::DoesNotStartWith => "doesNotStartWith",
            CompareOp::EndsWith => "endsWith",
            CompareOp::DoesNotEndWith => "doesNotEndWith",
            CompareOp::Matches => "matches",
            CompareOp::DoesNotMatch => "doesNotMatch",
            CompareOp::Exists => "exists",
            CompareOp::DoesNotExist => "doesNotExist",
            CompareOp::IsNull => "isNull",
            CompareOp::IsNotNull => "isNotNull",
            CompareOp::IsUndefined => "isUndefined",
            CompareOp::IsNotUndefined => "isNotUndefined",
            CompareOp::IsEmpty => "isEmpty",
            CompareOp::IsNotEmpty => "isNotEmpty",
            CompareOp::Between => "between",
            CompareOp::NotBetween => "notBetween",
            CompareOp::Like => "like",
            CompareOp::NotLike => "notLike",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// which operator vocabulary a condition is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    /// `onlyIf` checks
    #[default]
    Compare,
    /// `where` filtering
    Query,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Compare => "compare",
            OpKind::Query => "query",
        }
    }

    /// operator names valid for this kind
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            OpKind::Compare => &COMPARE_OPS,
            OpKind::Query => &QUERY_OPS,
        }
    }

    pub fn accepts(&self, op: CompareOp) -> bool {
        self.vocabulary().contains(&op.as_str())
    }

    /// look up `name` in this vocabulary
    pub fn operator(&self, name: &str) -> Option<CompareOp> {
        CompareOp::parse(name).filter(|op| self.accepts(*op))
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compare" => Ok(OpKind::Compare),
            "query" => Ok(OpKind::Query),
            _ => Err(format!("invalid kind '{}', expected: compare, query", s)),
        }
    }
}

/// aggregation operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValuesOp {
    Count,
    Sum,
    Avg,
    Max,
    Min,
    First,
    Pick,
    Clone,
}

impl ValuesOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "count" => Some(ValuesOp::Count),
            "sum" => Some(ValuesOp::Sum),
            "avg" => Some(ValuesOp::Avg),
            "max" => Some(ValuesOp::Max),
            "min" => Some(ValuesOp::Min),
            "first" => Some(ValuesOp::First),
            "pick" => Some(ValuesOp::Pick),
            "clone" => Some(ValuesOp::Clone),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValuesOp::Count => "count",
            ValuesOp::Sum => "sum",
            ValuesOp::Avg => "avg",
            ValuesOp::Max => "max",
            ValuesOp::Min => "min",
            ValuesOp::First => "first",
            ValuesOp::Pick => "pick",
            ValuesOp::Clone => "clone",
        }
    }
}

impl fmt::Display for ValuesOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// operator names close to `input`, nearest first
pub fn suggest(input: &str, vocabulary: &[&str]) -> Vec<String> {
    let input_lower = input.to_lowercase();

    let mut matches: Vec<(usize, &str)> = vocabulary
        .iter()
        .map(|name| (levenshtein(&input_lower, &name.to_lowercase()), *name))
        .filter(|(distance, _)| *distance <= SUGGESTION_THRESHOLD)
        .collect();

    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    matches.into_iter().map(|(_, name)| name.to_string()).collect()
}
