//! Arithmetic expression evaluation interface.
//!
//! Trees come from `triplex_dsl::arithmetic`. This module fixes how they are
//! evaluated without shipping any named operations: variables resolve through
//! a `BindingContext`, operator nodes call into a `FunctionDispatch` supplied
//! by the host.

use ahash::AHashMap;
use thiserror::Error;
use triplex_dsl::{ArithmeticExpressionNode, Operand, TypedValue};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArithmeticError {
    #[error("unbound variable {alias}.{property}")]
    UnboundVariable { alias: String, property: String },
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("invalid arguments to `{function}`: {reason}")]
    InvalidArguments { function: String, reason: String },
}

/// Values for `alias.property` references.
pub trait BindingContext {
    fn lookup(&self, alias: &str, property: &str) -> Option<TypedValue>;
}

/// Named operations over evaluated arguments.
pub trait FunctionDispatch {
    fn call(&self, function: &str, args: Vec<TypedValue>) -> Result<TypedValue, ArithmeticError>;
}

/// Dispatch with no registered functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFunctions;

impl FunctionDispatch for NoFunctions {
    fn call(&self, function: &str, _args: Vec<TypedValue>) -> Result<TypedValue, ArithmeticError> {
        Err(ArithmeticError::UnknownFunction(function.to_string()))
    }
}

/// Map-backed binding context, keyed alias → property.
#[derive(Debug, Clone, Default)]
pub struct StaticBindings {
    values: AHashMap<String, AHashMap<String, TypedValue>>,
}

impl StaticBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(
        mut self,
        alias: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<TypedValue>,
    ) -> Self {
        self.values
            .entry(alias.into())
            .or_default()
            .insert(property.into(), value.into());
        self
    }
}

impl BindingContext for StaticBindings {
    fn lookup(&self, alias: &str, property: &str) -> Option<TypedValue> {
        self.values.get(alias)?.get(property).cloned()
    }
}

/// Evaluate `node`: constants yield themselves, variables resolve through
/// `bindings`, operators evaluate their arguments left to right and then call
/// `functions`.
pub fn evaluate_arithmetic(
    node: &ArithmeticExpressionNode,
    bindings: &dyn BindingContext,
    functions: &dyn FunctionDispatch,
) -> Result<TypedValue, ArithmeticError> {
    match node {
        ArithmeticExpressionNode::Operand(Operand::Constant(value)) => Ok(value.clone()),
        ArithmeticExpressionNode::Operand(Operand::Variable { alias, property }) => bindings
            .lookup(alias, property)
            .ok_or_else(|| ArithmeticError::UnboundVariable {
                alias: alias.clone(),
                property: property.clone(),
            }),
        ArithmeticExpressionNode::Operator { function, args } => {
            let values = args
                .iter()
                .map(|arg| evaluate_arithmetic(arg, bindings, functions))
                .collect::<Result<Vec<_>, _>>()?;
            functions.call(function, values)
        }
    }
}
