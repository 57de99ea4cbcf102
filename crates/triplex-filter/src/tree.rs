//! Compiled filter trees.
//!
//! `build` turns a raw predicate AST into an owned boolean-expression tree:
//! predicates at the leaves, AND/OR conditions above them. Every string and
//! value is copied out of the raw AST, so the compiled tree outlives it. The
//! tree is immutable after `build` returns and can be shared across threads.

use std::fmt;

use thiserror::Error;
use triplex_dsl::{CompareOp, LogicalOp, RawFilterNode, TypedValue, ValueType};

use crate::comparator::{ComparatorRegistry, ValueComparator};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no comparator registered for {0} values")]
    UnsupportedType(ValueType),
}

// ============================================================================
// Nodes
// ============================================================================

/// Leaf: `alias.property <op> value`.
///
/// `comparator` is bound from `value`'s discriminant at build time and never
/// changes afterwards.
#[derive(Debug, Clone)]
pub struct PredicateNode {
    alias: String,
    property: String,
    op: CompareOp,
    value: TypedValue,
    comparator: &'static dyn ValueComparator,
}

impl PredicateNode {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn value(&self) -> &TypedValue {
        &self.value
    }

    pub fn comparator(&self) -> &'static dyn ValueComparator {
        self.comparator
    }
}

impl fmt::Display for PredicateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} {} {}", self.alias, self.property, self.op, self.value)
    }
}

#[derive(Debug, Clone)]
pub struct ConditionNode {
    op: LogicalOp,
    left: Box<FilterNode>,
    right: Box<FilterNode>,
}

impl ConditionNode {
    pub fn op(&self) -> LogicalOp {
        self.op
    }

    pub fn left(&self) -> &FilterNode {
        &self.left
    }

    pub fn right(&self) -> &FilterNode {
        &self.right
    }
}

#[derive(Debug, Clone)]
pub enum FilterNode {
    Predicate(PredicateNode),
    Condition(ConditionNode),
}

// ============================================================================
// Build
// ============================================================================

/// Compile `raw` against the standard (total) comparator registry.
pub fn build(raw: &RawFilterNode) -> Result<FilterNode, BuildError> {
    build_with(&ComparatorRegistry::standard(), raw)
}

/// Compile `raw` against an explicit comparator registry.
///
/// Fails as a whole if any predicate's discriminant is unregistered; no
/// partial tree is returned.
pub fn build_with(registry: &ComparatorRegistry, raw: &RawFilterNode) -> Result<FilterNode, BuildError> {
    let tree = build_node(registry, raw)?;
    tracing::debug!(
        predicates = tree.predicate_count(),
        depth = tree.depth(),
        "compiled filter tree"
    );
    Ok(tree)
}

fn build_node(registry: &ComparatorRegistry, raw: &RawFilterNode) -> Result<FilterNode, BuildError> {
    match raw {
        RawFilterNode::Predicate {
            alias,
            property,
            op,
            value,
        } => {
            let ty = value.value_type();
            let comparator = registry.get(ty).ok_or(BuildError::UnsupportedType(ty))?;
            Ok(FilterNode::Predicate(PredicateNode {
                alias: alias.clone(),
                property: property.clone(),
                op: *op,
                value: value.clone(),
                comparator,
            }))
        }
        RawFilterNode::Condition { op, left, right } => {
            let left = build_node(registry, left)?;
            let right = build_node(registry, right)?;
            Ok(FilterNode::Condition(ConditionNode {
                op: *op,
                left: Box::new(left),
                right: Box::new(right),
            }))
        }
    }
}

// ============================================================================
// Inspection / teardown
// ============================================================================

impl FilterNode {
    pub fn as_predicate(&self) -> Option<&PredicateNode> {
        match self {
            FilterNode::Predicate(p) => Some(p),
            FilterNode::Condition(_) => None,
        }
    }

    pub fn as_condition(&self) -> Option<&ConditionNode> {
        match self {
            FilterNode::Condition(c) => Some(c),
            FilterNode::Predicate(_) => None,
        }
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates().len()
    }

    /// All predicate leaves, left to right.
    pub fn predicates(&self) -> Vec<&PredicateNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                FilterNode::Predicate(p) => out.push(p),
                FilterNode::Condition(c) => {
                    stack.push(c.right.as_ref());
                    stack.push(c.left.as_ref());
                }
            }
        }
        out
    }

    /// Height of the tree; a single predicate has depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0usize;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, d)) = stack.pop() {
            max = max.max(d);
            if let FilterNode::Condition(c) = node {
                stack.push((c.left.as_ref(), d + 1));
                stack.push((c.right.as_ref(), d + 1));
            }
        }
        max
    }

    /// Indented, one-node-per-line rendering for `explain` output.
    pub fn explain_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut stack = vec![(self, 0usize)];
        while let Some((node, indent)) = stack.pop() {
            let pad = "  ".repeat(indent);
            match node {
                FilterNode::Predicate(p) => lines.push(format!("{pad}{p}")),
                FilterNode::Condition(c) => {
                    lines.push(format!("{pad}{}", c.op));
                    stack.push((c.right.as_ref(), indent + 1));
                    stack.push((c.left.as_ref(), indent + 1));
                }
            }
        }
        lines
    }

    /// Release this tree. Iterative; the tree is consumed and cannot be
    /// released twice.
    pub fn destroy(self) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let FilterNode::Condition(c) = node {
                stack.push(*c.left);
                stack.push(*c.right);
            }
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Predicate(p) => write!(f, "{p}"),
            FilterNode::Condition(c) => write!(f, "({} {} {})", c.left, c.op, c.right),
        }
    }
}
