//! Triplex DSL types
//!
//! This crate defines the value and syntax-tree types shared by the Triplex
//! query pipeline:
//!
//! - `value`: typed scalar values (`TypedValue`) and their lexical parsing
//! - `filter_ast`: the raw WHERE-style predicate AST handed over by a parser
//! - `arithmetic`: owned arithmetic expression trees (constants, entity
//!   properties, named operations)
//!
//! Everything here is plain owned data. The raw AST is serde-serializable so
//! tooling can produce it as typed JSON instead of query text.

pub mod arithmetic;
pub mod filter_ast;
pub mod value;

pub use arithmetic::{ArithmeticExpressionNode, Operand};
pub use filter_ast::{CompareOp, LogicalOp, RawFilterNode};
pub use value::{ParseValueError, TypedValue, ValueType};
