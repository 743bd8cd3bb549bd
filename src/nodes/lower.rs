// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{BinaryOp, ExternalParameter, Node, UnaryOp};
use crate::ops;
use crate::types::ValueType;
use crate::vm::{BuiltinCallParams, Instruction, ProgramBuilder, Result, VmError};

use log::trace;

fn widen(b: &mut ProgramBuilder, src: u16, from: ValueType, to: ValueType) -> Result<u16> {
    if from == to {
        return Ok(src);
    }
    let dest = b.alloc_register()?;
    b.emit(Instruction::Convert { dest, src, to });
    Ok(dest)
}

impl Node {
    /// Emit instructions computing this node as a value of type `target`.
    /// Returns the register holding the result.
    ///
    /// The tree must have been strongly determined for `target` first.
    pub fn lower(
        &self,
        target: ValueType,
        params: &[ExternalParameter],
        b: &mut ProgramBuilder,
    ) -> Result<u16> {
        match self {
            Node::Constant { value, .. } => {
                let value = ops::convert(value, target)?;
                let literal_idx = b.add_literal(value)?;
                let dest = b.alloc_register()?;
                b.emit(Instruction::LoadLiteral { dest, literal_idx });
                Ok(dest)
            }
            Node::Parameter { id } => {
                let index = u16::try_from(*id).map_err(|_| VmError::RegisterLimitExceeded {
                    limit: usize::from(u16::MAX),
                })?;
                let param = params.get(*id).ok_or(VmError::ParameterIndexOutOfBounds {
                    index,
                    count: params.len(),
                })?;
                let dest = b.alloc_register()?;
                b.emit(Instruction::LoadParam { dest, index });
                match param.supported.single() {
                    Some(own) => widen(b, dest, own, target),
                    None => Ok(dest),
                }
            }
            Node::Unary {
                op,
                operand,
                typing,
            } => {
                let (_, sig) = typing
                    .chosen()
                    .ok_or_else(|| VmError::Undetermined(format!("{op:?}")))?;
                let src = operand.lower(sig.args[0], params, b)?;
                let dest = b.alloc_register()?;
                b.emit(match op {
                    UnaryOp::Negate => Instruction::Neg { dest, src },
                    UnaryOp::Not => Instruction::Not { dest, src },
                });
                widen(b, dest, sig.result, target)
            }
            Node::Binary {
                op,
                left,
                right,
                typing,
            } => {
                let (_, sig) = typing
                    .chosen()
                    .ok_or_else(|| VmError::Undetermined(format!("{op:?}")))?;
                let left = left.lower(sig.args[0], params, b)?;
                let right = right.lower(sig.args[1], params, b)?;
                let dest = b.alloc_register()?;
                b.emit(match *op {
                    BinaryOp::Add => Instruction::Add { dest, left, right },
                    BinaryOp::Subtract => Instruction::Sub { dest, left, right },
                    BinaryOp::Multiply => Instruction::Mul { dest, left, right },
                    BinaryOp::Divide => Instruction::Div { dest, left, right },
                    BinaryOp::Modulo => Instruction::Mod { dest, left, right },
                    BinaryOp::Power => Instruction::Pow { dest, left, right },
                    BinaryOp::And => Instruction::And { dest, left, right },
                    BinaryOp::Or => Instruction::Or { dest, left, right },
                    BinaryOp::Xor => Instruction::Xor { dest, left, right },
                    BinaryOp::ShiftLeft => Instruction::Shl { dest, left, right },
                    BinaryOp::ShiftRight => Instruction::Shr { dest, left, right },
                    BinaryOp::Compare(cmp) => Instruction::Compare {
                        dest,
                        left,
                        right,
                        op: cmp,
                        tolerant: matches!(sig.args[0], ValueType::Integer | ValueType::Numeric),
                    },
                });
                widen(b, dest, sig.result, target)
            }
            Node::Call {
                function,
                args,
                typing,
            } => {
                let (_, sig) = typing
                    .chosen()
                    .ok_or_else(|| VmError::Undetermined(function.name.to_string()))?;
                let args = args
                    .iter()
                    .zip(&sig.args)
                    .map(|(arg, t)| arg.lower(*t, params, b))
                    .collect::<Result<Vec<_>>>()?;
                let dest = b.alloc_register()?;
                let params_index = b.add_builtin_call(BuiltinCallParams {
                    dest,
                    builtin: *function,
                    args,
                })?;
                b.emit(Instruction::BuiltinCall { params_index });
                trace!("lowered call to `{}` as {}", function.name, sig.result);
                widen(b, dest, sig.result, target)
            }
        }
    }
}
