//! Raw predicate AST (WHERE clause)
//!
//! This is the tree a parser hands to the filter compiler. It is owned by the
//! parser side: compilers must copy what they need out of it and must not keep
//! references into it.
//!
//! JSON form (internally tagged by `kind`):
//!
//! ```text
//! {"kind": "predicate", "alias": "a", "property": "age", "op": "gt",
//!  "value": {"type": "int32", "value": 30}}
//! {"kind": "condition", "op": "and", "left": {...}, "right": {...}}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::TypedValue;

/// Comparison operator of a predicate.
///
/// The grammar produces `ne` for `!=` / `<>`; the filter tree only defines the
/// ordering relations, so `ne` predicates compile but fail at evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical connective of a condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => f.write_str("AND"),
            LogicalOp::Or => f.write_str("OR"),
        }
    }
}

/// A node of the raw predicate AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawFilterNode {
    /// `alias.property <op> value`
    Predicate {
        alias: String,
        property: String,
        op: CompareOp,
        value: TypedValue,
    },
    /// `left <AND|OR> right`
    Condition {
        op: LogicalOp,
        left: Box<RawFilterNode>,
        right: Box<RawFilterNode>,
    },
}

impl RawFilterNode {
    pub fn predicate(
        alias: impl Into<String>,
        property: impl Into<String>,
        op: CompareOp,
        value: impl Into<TypedValue>,
    ) -> Self {
        RawFilterNode::Predicate {
            alias: alias.into(),
            property: property.into(),
            op,
            value: value.into(),
        }
    }

    pub fn condition(op: LogicalOp, left: RawFilterNode, right: RawFilterNode) -> Self {
        RawFilterNode::Condition {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: RawFilterNode, right: RawFilterNode) -> Self {
        Self::condition(LogicalOp::And, left, right)
    }

    pub fn or(left: RawFilterNode, right: RawFilterNode) -> Self {
        Self::condition(LogicalOp::Or, left, right)
    }
}
