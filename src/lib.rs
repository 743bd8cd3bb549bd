// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod builtins;
mod compiler;
mod constants;
mod definition;
mod engine;
mod expression;
pub mod literal;
mod nodes;
mod ops;
pub mod plugins;
mod tolerance;
mod types;
mod value;
mod vm;

pub use compiler::{CancellationToken, CompileError, Compiler};
pub use constants::NAMED_CONSTANTS;
pub use definition::{DefinitionError, MathDefinition, OperatorPrecedenceStyle};
pub use engine::{Engine, ExpressionCompiler};
pub use expression::{CompiledExpression, DataFinder, EvaluationError, FinderFn};
pub use nodes::{ExternalParameter, TypeError};
pub use plugins::PluginRegistry;
pub use tolerance::ComparisonTolerance;
pub use types::{SupportedTypes, ValueType};
pub use value::Value;

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::nodes::*;
    pub use crate::tolerance::{ToleranceKey, ToleranceKind};
    pub use crate::types::{conversion_cost, Cost, CostTable};
    pub use crate::vm::*;
}
