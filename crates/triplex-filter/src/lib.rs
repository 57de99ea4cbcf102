//! Triplex filter trees
//!
//! Compiles a raw WHERE-style predicate AST into an owned, immutable
//! boolean-expression tree and evaluates it against candidate
//! subject–predicate–object matches:
//!
//! ```text
//!   RawFilterNode ──build──► FilterNode ──evaluate(triplet)──► bool | EvalError
//!                   │                      │
//!          ComparatorRegistry        PropertyResolver
//! ```
//!
//! ## Module Organization
//!
//! - `comparator`: per-discriminant comparators and the registry
//! - `tree`: compiled filter nodes and the builder
//! - `eval`: triplets, alias bindings and short-circuit evaluation
//! - `resolver`: property lookup trait and the in-memory hash store
//! - `scan`: evaluating a filter over many candidates
//! - `config`: scan settings
//! - `arithmetic`: evaluation interface for arithmetic expression trees
//! - `scenario`: self-contained JSON scenarios (used by the CLI)

pub mod arithmetic;
pub mod comparator;
pub mod config;
pub mod eval;
pub mod resolver;
pub mod scan;
pub mod scenario;
pub mod tree;

pub use arithmetic::{
    evaluate_arithmetic, ArithmeticError, BindingContext, FunctionDispatch, NoFunctions,
    StaticBindings,
};
pub use comparator::{comparator_for, ComparatorRegistry, ValueComparator};
pub use config::{ConfigError, FilterConfig, InvalidValuePolicy};
pub use eval::{evaluate, AliasBinding, EvalError, Triplet};
pub use resolver::{FnResolver, HashPropertyStore, PropertyResolver};
pub use scan::{scan, ScanOutcome, SkippedCandidate};
pub use scenario::{Scenario, ScenarioError};
pub use tree::{build, build_with, BuildError, ConditionNode, FilterNode, PredicateNode};

pub use triplex_dsl as dsl;
