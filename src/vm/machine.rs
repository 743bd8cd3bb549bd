// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_debug_implementations)] // VM structs are not debug printed

use super::errors::{Result, VmError};
use super::instructions::Instruction;
use super::program::Program;
use crate::builtins::comparison::{compare, compare_tolerant};
use crate::ops;
use crate::plugins::PluginRegistry;
use crate::value::Value;

/// Executes a lowered [`Program`] against positional arguments.
pub struct ExprVm<'a> {
    program: &'a Program,
    plugins: &'a PluginRegistry,
    registers: Vec<Value>,
}

impl<'a> ExprVm<'a> {
    pub fn new(program: &'a Program, plugins: &'a PluginRegistry) -> Self {
        Self {
            program,
            plugins,
            registers: vec![Value::Bool(false); program.register_count],
        }
    }

    fn get(&self, register: u16) -> Result<&Value> {
        self.registers
            .get(usize::from(register))
            .ok_or(VmError::RegisterOutOfBounds { register })
    }

    fn set(&mut self, register: u16, value: Value) -> Result<()> {
        let slot = self
            .registers
            .get_mut(usize::from(register))
            .ok_or(VmError::RegisterOutOfBounds { register })?;
        *slot = value;
        Ok(())
    }

    fn binary(
        &mut self,
        dest: u16,
        left: u16,
        right: u16,
        f: impl FnOnce(&Value, &Value) -> anyhow::Result<Value>,
    ) -> Result<()> {
        let value = f(self.get(left)?, self.get(right)?)?;
        self.set(dest, value)
    }

    pub fn execute(&mut self, args: &[Value]) -> Result<Value> {
        let program = self.program;
        for instruction in &program.instructions {
            match *instruction {
                Instruction::LoadLiteral { dest, literal_idx } => {
                    let value = program
                        .literals
                        .get(usize::from(literal_idx))
                        .ok_or(VmError::LiteralIndexOutOfBounds { index: literal_idx })?
                        .clone();
                    self.set(dest, value)?;
                }
                Instruction::LoadParam { dest, index } => {
                    let value = args.get(usize::from(index)).cloned().ok_or(
                        VmError::ParameterIndexOutOfBounds {
                            index,
                            count: args.len(),
                        },
                    )?;
                    self.set(dest, value)?;
                }
                Instruction::Convert { dest, src, to } => {
                    let value = ops::convert(self.get(src)?, to)?;
                    self.set(dest, value)?;
                }
                Instruction::Add { dest, left, right } => {
                    let plugins = self.plugins;
                    self.binary(dest, left, right, |a, b| ops::add(a, b, plugins))?;
                }
                Instruction::Sub { dest, left, right } => self.binary(dest, left, right, ops::sub)?,
                Instruction::Mul { dest, left, right } => self.binary(dest, left, right, ops::mul)?,
                Instruction::Div { dest, left, right } => self.binary(dest, left, right, ops::div)?,
                Instruction::Mod { dest, left, right } => self.binary(dest, left, right, ops::rem)?,
                Instruction::Pow { dest, left, right } => self.binary(dest, left, right, ops::pow)?,
                Instruction::And { dest, left, right } => {
                    self.binary(dest, left, right, |a, b| ops::logic(ops::LogicOp::And, a, b))?
                }
                Instruction::Or { dest, left, right } => {
                    self.binary(dest, left, right, |a, b| ops::logic(ops::LogicOp::Or, a, b))?
                }
                Instruction::Xor { dest, left, right } => {
                    self.binary(dest, left, right, |a, b| ops::logic(ops::LogicOp::Xor, a, b))?
                }
                Instruction::Shl { dest, left, right } => {
                    self.binary(dest, left, right, ops::shift_left)?
                }
                Instruction::Shr { dest, left, right } => {
                    self.binary(dest, left, right, ops::shift_right)?
                }
                Instruction::Compare {
                    dest,
                    left,
                    right,
                    op,
                    tolerant,
                } => {
                    let tolerance = program.tolerance.filter(|_| tolerant);
                    self.binary(dest, left, right, |a, b| {
                        let holds = match &tolerance {
                            Some(t) => compare_tolerant(op, a, b, t)?,
                            None => compare(op, a, b)?,
                        };
                        Ok(Value::Bool(holds))
                    })?;
                }
                Instruction::Neg { dest, src } => {
                    let value = ops::neg(self.get(src)?)?;
                    self.set(dest, value)?;
                }
                Instruction::Not { dest, src } => {
                    let value = ops::not(self.get(src)?)?;
                    self.set(dest, value)?;
                }
                Instruction::BuiltinCall { params_index } => {
                    let params = program
                        .builtin_calls
                        .get(usize::from(params_index))
                        .ok_or(VmError::InvalidBuiltinCallParams {
                            index: params_index,
                        })?;
                    let args = params
                        .args
                        .iter()
                        .map(|r| self.get(*r).cloned())
                        .collect::<Result<Vec<_>>>()?;
                    let value = (params.builtin.eval)(&args).map_err(|e| {
                        VmError::BuiltinFailed {
                            name: params.builtin.name,
                            message: e.to_string(),
                        }
                    })?;
                    self.set(params.dest, value)?;
                }
                Instruction::Return { value } => return self.get(value).cloned(),
            }
        }
        Err(VmError::MissingReturn)
    }
}
