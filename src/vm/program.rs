// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::errors::{Result, VmError};
use super::instructions::{BuiltinCallParams, Instruction};
use crate::tolerance::ToleranceKind;
use crate::value::Value;

use core::fmt;

/// A lowered expression, ready to run on [`super::ExprVm`].
#[derive(Debug, Clone)]
pub struct Program {
    pub instructions: Vec<Instruction>,

    /// Literal value table
    pub literals: Vec<Value>,

    /// Builtin call parameter table
    pub builtin_calls: Vec<BuiltinCallParams>,

    pub register_count: usize,

    /// Applied by comparisons lowered as tolerant
    pub tolerance: Option<ToleranceKind>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, literal) in self.literals.iter().enumerate() {
            writeln!(f, "L({idx}) = {literal}")?;
        }
        for (idx, call) in self.builtin_calls.iter().enumerate() {
            let args = call
                .args
                .iter()
                .map(|r| format!("R({r})"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "P({idx}) = {} R({}) [{args}]", call.builtin.name, call.dest)?;
        }
        for (pc, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{pc:4}: {instruction}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,
    literals: Vec<Value>,
    builtin_calls: Vec<BuiltinCallParams>,
    register_count: usize,
}

fn index(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| VmError::RegisterLimitExceeded {
        limit: usize::from(u16::MAX),
    })
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_register(&mut self) -> Result<u16> {
        let register = index(self.register_count)?;
        self.register_count += 1;
        Ok(register)
    }

    pub fn add_literal(&mut self, value: Value) -> Result<u16> {
        if let Some(idx) = self.literals.iter().position(|l| *l == value) {
            return index(idx);
        }
        let idx = index(self.literals.len())?;
        self.literals.push(value);
        Ok(idx)
    }

    pub fn add_builtin_call(&mut self, params: BuiltinCallParams) -> Result<u16> {
        let idx = index(self.builtin_calls.len())?;
        self.builtin_calls.push(params);
        Ok(idx)
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn finish(mut self, result: u16, tolerance: Option<ToleranceKind>) -> Program {
        self.emit(Instruction::Return { value: result });
        Program {
            instructions: self.instructions,
            literals: self.literals,
            builtin_calls: self.builtin_calls,
            register_count: self.register_count,
            tolerance,
        }
    }
}
