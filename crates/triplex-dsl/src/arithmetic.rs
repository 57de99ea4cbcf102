//! Arithmetic expression trees.
//!
//! Scalar computations referenced by filters and projections: constants,
//! entity-property references (`alias.property`) and named operations over an
//! ordered argument list. Operands are always leaves; an operator node owns
//! its arguments and, transitively, the whole subtree.
//!
//! How a named operation is applied to its evaluated arguments is not defined
//! here. See `triplex_filter::arithmetic` for the evaluation interface.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::TypedValue;

/// Leaf of an arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A literal value.
    Constant(TypedValue),
    /// A property of an aliased graph entity, resolved per match.
    Variable { alias: String, property: String },
}

/// A node of an arithmetic expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRepr", into = "NodeRepr")]
pub enum ArithmeticExpressionNode {
    Operator {
        function: String,
        args: Vec<ArithmeticExpressionNode>,
    },
    Operand(Operand),
}

impl ArithmeticExpressionNode {
    pub fn make_constant(value: impl Into<TypedValue>) -> Self {
        ArithmeticExpressionNode::Operand(Operand::Constant(value.into()))
    }

    pub fn make_variable(alias: impl Into<String>, property: impl Into<String>) -> Self {
        ArithmeticExpressionNode::Operand(Operand::Variable {
            alias: alias.into(),
            property: property.into(),
        })
    }

    /// Build an operator node; the node takes ownership of every argument.
    pub fn make_operator(function: impl Into<String>, args: Vec<ArithmeticExpressionNode>) -> Self {
        ArithmeticExpressionNode::Operator {
            function: function.into(),
            args,
        }
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, ArithmeticExpressionNode::Operand(_))
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0usize;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let ArithmeticExpressionNode::Operator { args, .. } = node {
                stack.extend(args.iter());
            }
        }
        count
    }

    /// Release this node and its whole subtree.
    ///
    /// Same as dropping the node; the node is consumed, so it cannot be
    /// destroyed twice.
    pub fn destroy(self) {
        drop(self)
    }
}

/// Iterative teardown, so arbitrarily deep trees do not exhaust the stack.
impl Drop for ArithmeticExpressionNode {
    fn drop(&mut self) {
        let ArithmeticExpressionNode::Operator { args, .. } = self else {
            return;
        };
        if args.iter().all(ArithmeticExpressionNode::is_operand) {
            return;
        }
        let mut stack = std::mem::take(args);
        while let Some(mut node) = stack.pop() {
            if let ArithmeticExpressionNode::Operator { args, .. } = &mut node {
                stack.append(args);
            }
        }
    }
}

impl fmt::Display for ArithmeticExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticExpressionNode::Operand(Operand::Constant(v)) => write!(f, "{v}"),
            ArithmeticExpressionNode::Operand(Operand::Variable { alias, property }) => {
                write!(f, "{alias}.{property}")
            }
            ArithmeticExpressionNode::Operator { function, args } => {
                write!(f, "{function}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

// ============================================================================
// JSON form
// ============================================================================

/// Flat wire shape: `{"kind": "operator" | "constant" | "variable", ...}`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NodeRepr {
    Operator {
        function: String,
        #[serde(default)]
        args: Vec<ArithmeticExpressionNode>,
    },
    Constant {
        value: TypedValue,
    },
    Variable {
        alias: String,
        property: String,
    },
}

impl From<NodeRepr> for ArithmeticExpressionNode {
    fn from(repr: NodeRepr) -> Self {
        match repr {
            NodeRepr::Operator { function, args } => {
                ArithmeticExpressionNode::Operator { function, args }
            }
            NodeRepr::Constant { value } => ArithmeticExpressionNode::Operand(Operand::Constant(value)),
            NodeRepr::Variable { alias, property } => {
                ArithmeticExpressionNode::Operand(Operand::Variable { alias, property })
            }
        }
    }
}

impl From<ArithmeticExpressionNode> for NodeRepr {
    fn from(mut node: ArithmeticExpressionNode) -> Self {
        // Fields are taken rather than moved: the node has a `Drop` impl.
        match &mut node {
            ArithmeticExpressionNode::Operator { function, args } => NodeRepr::Operator {
                function: std::mem::take(function),
                args: std::mem::take(args),
            },
            ArithmeticExpressionNode::Operand(operand) => {
                let empty = Operand::Variable {
                    alias: String::new(),
                    property: String::new(),
                };
                match std::mem::replace(operand, empty) {
                    Operand::Constant(value) => NodeRepr::Constant { value },
                    Operand::Variable { alias, property } => NodeRepr::Variable { alias, property },
                }
            }
        }
    }
}
