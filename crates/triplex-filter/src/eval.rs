//! Filter evaluation against candidate matches.
//!
//! Evaluation is recursive and short-circuiting. Outcomes per predicate:
//!
//! - alias not bound to the subject or object slot → `false`
//! - property missing (entity absent or field unset) → `false`
//! - stored text does not parse as the predicate's discriminant →
//!   `EvalError::InvalidPropertyValue`, aborting the traversal
//! - otherwise the bound comparator decides, mapped through the operator
//!
//! Errors never escape through a short circuit: an error in an evaluated
//! subtree is returned as-is. The tree itself is left untouched and can be
//! evaluated against the next candidate.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use triplex_dsl::{CompareOp, LogicalOp, ParseValueError, TypedValue};

use crate::resolver::PropertyResolver;
use crate::tree::{FilterNode, PredicateNode};

// ============================================================================
// Candidate matches
// ============================================================================

/// A subject–predicate–object match produced by the pattern matcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triplet {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Query-local names for the three triplet positions.
///
/// JSON form is a three-element array: `["a", "r", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[String; 3]", into = "[String; 3]")]
pub struct AliasBinding {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl AliasBinding {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Entity id that `alias` names in `candidate`.
    ///
    /// Only the subject and object slots carry properties; the predicate alias
    /// resolves to nothing. When both entity aliases are equal the object wins.
    pub fn resolve<'t>(&self, alias: &str, candidate: &'t Triplet) -> Option<&'t str> {
        if alias == self.object {
            Some(candidate.object.as_str())
        } else if alias == self.subject {
            Some(candidate.subject.as_str())
        } else {
            None
        }
    }
}

impl From<[String; 3]> for AliasBinding {
    fn from([subject, predicate, object]: [String; 3]) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl From<AliasBinding> for [String; 3] {
    fn from(binding: AliasBinding) -> Self {
        [binding.subject, binding.predicate, binding.object]
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("property `{property}` of `{entity}` is not a valid {}: {source}", .source.expected())]
    InvalidPropertyValue {
        entity: String,
        property: String,
        #[source]
        source: ParseValueError,
    },
    #[error("unsupported comparison operator `{0}`")]
    UnknownOperator(CompareOp),
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate `root` against one candidate match.
pub fn evaluate<R>(
    root: &FilterNode,
    candidate: &Triplet,
    aliases: &AliasBinding,
    resolver: &R,
) -> Result<bool, EvalError>
where
    R: PropertyResolver + ?Sized,
{
    match root {
        FilterNode::Predicate(pred) => evaluate_predicate(pred, candidate, aliases, resolver),
        FilterNode::Condition(cond) => {
            let left = evaluate(cond.left(), candidate, aliases, resolver)?;
            match (cond.op(), left) {
                (LogicalOp::And, false) => Ok(false),
                (LogicalOp::Or, true) => Ok(true),
                _ => evaluate(cond.right(), candidate, aliases, resolver),
            }
        }
    }
}

impl FilterNode {
    pub fn evaluate<R>(&self, candidate: &Triplet, aliases: &AliasBinding, resolver: &R) -> Result<bool, EvalError>
    where
        R: PropertyResolver + ?Sized,
    {
        evaluate(self, candidate, aliases, resolver)
    }
}

fn evaluate_predicate<R>(
    pred: &PredicateNode,
    candidate: &Triplet,
    aliases: &AliasBinding,
    resolver: &R,
) -> Result<bool, EvalError>
where
    R: PropertyResolver + ?Sized,
{
    let Some(entity) = aliases.resolve(pred.alias(), candidate) else {
        tracing::trace!(alias = pred.alias(), "alias not bound to an entity slot");
        return Ok(false);
    };

    let Some(raw) = resolver.get_property(entity, pred.property()) else {
        tracing::trace!(entity, property = pred.property(), "property not found");
        return Ok(false);
    };

    let stored = TypedValue::parse(&raw, pred.value().value_type()).map_err(|source| {
        EvalError::InvalidPropertyValue {
            entity: entity.to_string(),
            property: pred.property().to_string(),
            source,
        }
    })?;

    let relation = pred.comparator().compare(&stored, pred.value());
    tracing::trace!(entity, predicate = %pred, ?relation, "compared property");
    relation_holds(pred.op(), relation)
}

/// Map a comparator outcome through `op`. Unordered (`None`) never matches.
fn relation_holds(op: CompareOp, relation: Option<Ordering>) -> Result<bool, EvalError> {
    let holds = |f: fn(Ordering) -> bool| relation.map_or(false, f);
    match op {
        CompareOp::Eq => Ok(holds(Ordering::is_eq)),
        CompareOp::Gt => Ok(holds(Ordering::is_gt)),
        CompareOp::Ge => Ok(holds(Ordering::is_ge)),
        CompareOp::Lt => Ok(holds(Ordering::is_lt)),
        CompareOp::Le => Ok(holds(Ordering::is_le)),
        CompareOp::Ne => Err(EvalError::UnknownOperator(op)),
    }
}
