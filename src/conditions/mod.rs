//! condition evaluation for jbdap commands
//!
//! provides the expression language used by `onlyIf` checks and `where`
//! filters:
//! - grouping keys: `$and`, `$or`, `$not` (NOR of all children)
//! - comparison keys: `tag` or `tag#operator`, value is the right operand
//! - tags addressing the root map (`/Entity.path`), the parent record
//!   (`$.path`) or the self record (`name`), with `.$.` array plucking
//!
//! [`check_condition`] evaluates the JSON object directly, parsing each key
//! as it is reached. [`parse_condition`] builds a [`Condition`] tree up front
//! for callers that evaluate the same condition many times.

mod compare;
mod context;
mod eval;
mod ops;
mod parser;
mod tag;
mod types;

pub use compare::compare;
pub use context::{EvalContext, Fetched, Root};
pub use eval::{check_condition, evaluate};
pub use ops::{suggest, CompareOp, OpKind, ValuesOp, COMPARE_OPS, QUERY_OPS, VALUES_OPS};
pub use parser::{parse_comparison, parse_condition};
pub use tag::{tag_to_value, Resolved};
pub use types::{Comparison, Condition, ConditionItem, Relation};
