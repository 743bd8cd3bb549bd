// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The expression tree and its type inference.
//!
//! Composite nodes carry the overloads (signatures) still possible for them
//! and a cost table: for every type the node could produce, the cheapest
//! overload producing it, counting implicit conversions of the operands.
//! Parameters keep their candidate types in a registry shared by every
//! occurrence, so narrowing one occurrence narrows them all.

mod lower;
mod operators;
mod typing;

pub use operators::{BinaryOp, UnaryOp};

use crate::builtins::Builtin;
use crate::plugins::PluginRegistry;
use crate::types::{CostTable, SupportedTypes, ValueType};
use crate::value::Value;
use crate::vm::{ExprVm, ProgramBuilder, VmError};

use log::trace;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("expression is not logically valid: {0}")]
    NotLogicallyValid(String),
}

/// One overload of an operator or function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub args: Vec<ValueType>,
    pub result: ValueType,
}

#[derive(Debug, Clone)]
pub struct Typing {
    sigs: Vec<Signature>,
    costs: CostTable,
    /// Target type and overload index, once strongly determined.
    chosen: Option<(ValueType, usize)>,
}

impl Typing {
    fn new(sigs: Vec<Signature>) -> Self {
        Self {
            sigs,
            costs: CostTable::new(),
            chosen: None,
        }
    }
}

/// A named input of a compiled expression, bound by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalParameter {
    pub name: String,
    /// Types the argument may have.
    pub supported: SupportedTypes,
}

impl ExternalParameter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            supported: SupportedTypes::ALL,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Constant {
        value: Value,
        /// Source text the constant came from.
        text: String,
    },
    Parameter {
        id: usize,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
        typing: Typing,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
        typing: Typing,
    },
    Call {
        function: Builtin,
        args: Vec<Node>,
        typing: Typing,
    },
}

impl Node {
    pub fn constant(value: Value, text: &str) -> Node {
        Node::Constant {
            value,
            text: text.to_string(),
        }
    }

    pub fn parameter(id: usize) -> Node {
        Node::Parameter { id }
    }

    pub fn unary(
        op: UnaryOp,
        operand: Node,
        params: &mut [ExternalParameter],
    ) -> Result<Node, TypeError> {
        let mut node = Node::Unary {
            op,
            operand: Box::new(operand),
            typing: Typing::new(op.signatures()),
        };
        node.determine_weakly(SupportedTypes::ALL, params)?;
        Ok(node)
    }

    pub fn binary(
        op: BinaryOp,
        left: Node,
        right: Node,
        params: &mut [ExternalParameter],
    ) -> Result<Node, TypeError> {
        let mut node = Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            typing: Typing::new(op.signatures()),
        };
        node.determine_weakly(SupportedTypes::ALL, params)?;
        Ok(node)
    }

    pub fn call(
        function: Builtin,
        args: Vec<Node>,
        params: &mut [ExternalParameter],
    ) -> Result<Node, TypeError> {
        let sigs = function
            .signatures
            .iter()
            .filter(|(sig_args, _)| sig_args.len() == args.len())
            .map(|(sig_args, result)| Signature {
                args: sig_args.to_vec(),
                result: *result,
            })
            .collect();
        let mut node = Node::Call {
            function,
            args,
            typing: Typing::new(sigs),
        };
        node.determine_weakly(SupportedTypes::ALL, params)?;
        Ok(node)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Constant { .. })
    }

    fn children(&self) -> Vec<&Node> {
        match self {
            Node::Constant { .. } | Node::Parameter { .. } => vec![],
            Node::Unary { operand, .. } => vec![operand.as_ref()],
            Node::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::Call { args, .. } => args.iter().collect(),
        }
    }

    fn parts_mut(&mut self) -> Option<(&mut Typing, Vec<&mut Node>)> {
        match self {
            Node::Constant { .. } | Node::Parameter { .. } => None,
            Node::Unary {
                operand, typing, ..
            } => Some((typing, vec![operand.as_mut()])),
            Node::Binary {
                left,
                right,
                typing,
                ..
            } => Some((typing, vec![left.as_mut(), right.as_mut()])),
            Node::Call { args, typing, .. } => Some((typing, args.iter_mut().collect())),
        }
    }

    fn any(&self, pred: &impl Fn(&Node) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|c| c.any(pred))
    }

    /// Whether some comparison in the tree may compare numbers, and so is
    /// affected by a tolerance.
    pub fn is_tolerant(&self) -> bool {
        self.any(&|node| match node {
            Node::Binary { op, typing, .. } if op.is_comparison() => typing
                .sigs
                .iter()
                .any(|s| matches!(s.args[0], ValueType::Integer | ValueType::Numeric)),
            _ => false,
        })
    }

    /// Whether the tree calls a non-deterministic function, so a lowered
    /// program must not be reused between evaluations.
    pub fn requires_preserved_expression(&self) -> bool {
        self.any(&|node| matches!(node, Node::Call { function, .. } if !function.deterministic))
    }

    /// Fold the node into a constant when every operand is a constant.
    ///
    /// Evaluation faults (e.g. division by zero) leave the node as is so that
    /// they surface at evaluation time.
    pub fn simplify(self, text: &str, plugins: &PluginRegistry) -> Node {
        let foldable = match &self {
            Node::Constant { .. } | Node::Parameter { .. } => false,
            Node::Call { function, .. } if !function.deterministic => false,
            node => node.children().iter().all(|c| c.is_constant()),
        };
        if !foldable {
            return self;
        }

        match self.evaluate_constant(plugins) {
            Ok(value) => Node::constant(value, text),
            Err(err) => {
                trace!("not folding `{text}`: {err}");
                self
            }
        }
    }

    fn evaluate_constant(&self, plugins: &PluginRegistry) -> Result<Value, VmError> {
        let mut node = self.clone();
        let target = node
            .costs(&[])
            .preferred()
            .ok_or_else(|| VmError::Undetermined(format!("{node:?}")))?;
        node.determine_strongly(target, &mut [])
            .map_err(|e| VmError::Undetermined(e.to_string()))?;

        let mut builder = ProgramBuilder::new();
        let result = node.lower(target, &[], &mut builder)?;
        let program = builder.finish(result, None);
        ExprVm::new(&program, plugins).execute(&[])
    }
}

#[cfg(test)]
mod tests;
