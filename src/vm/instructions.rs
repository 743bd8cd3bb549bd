// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::comparison::CompareOp;
use crate::builtins::Builtin;
use crate::types::ValueType;

use core::fmt;

/// Register-based instructions of a lowered expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Load literal value from literal table into register
    LoadLiteral { dest: u16, literal_idx: u16 },

    /// Load positional argument into register
    LoadParam { dest: u16, index: u16 },

    /// Implicit widening between value types
    Convert { dest: u16, src: u16, to: ValueType },

    /// Arithmetic operations
    Add { dest: u16, left: u16, right: u16 },
    Sub { dest: u16, left: u16, right: u16 },
    Mul { dest: u16, left: u16, right: u16 },
    Div { dest: u16, left: u16, right: u16 },
    Mod { dest: u16, left: u16, right: u16 },
    Pow { dest: u16, left: u16, right: u16 },

    /// Logical or bitwise, depending on operand kinds
    And { dest: u16, left: u16, right: u16 },
    Or { dest: u16, left: u16, right: u16 },
    Xor { dest: u16, left: u16, right: u16 },

    Shl { dest: u16, left: u16, right: u16 },
    Shr { dest: u16, left: u16, right: u16 },

    /// Comparison. When `tolerant` is set, the program's tolerance applies.
    Compare {
        dest: u16,
        left: u16,
        right: u16,
        op: CompareOp,
        tolerant: bool,
    },

    Neg { dest: u16, src: u16 },
    Not { dest: u16, src: u16 },

    /// Call a builtin; arguments live in the program's call table
    BuiltinCall { params_index: u16 },

    Return { value: u16 },
}

/// Builtin call parameters stored in the program's call table
#[derive(Debug, Clone)]
pub struct BuiltinCallParams {
    pub dest: u16,
    pub builtin: Builtin,
    pub args: Vec<u16>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::LoadLiteral { dest, literal_idx } => {
                write!(f, "LOAD R({dest}) L({literal_idx})")
            }
            Instruction::LoadParam { dest, index } => write!(f, "LOAD_PARAM R({dest}) P({index})"),
            Instruction::Convert { dest, src, to } => write!(f, "CONVERT R({dest}) R({src}) {to}"),
            Instruction::Add { dest, left, right } => write!(f, "ADD R({dest}) R({left}) R({right})"),
            Instruction::Sub { dest, left, right } => write!(f, "SUB R({dest}) R({left}) R({right})"),
            Instruction::Mul { dest, left, right } => write!(f, "MUL R({dest}) R({left}) R({right})"),
            Instruction::Div { dest, left, right } => write!(f, "DIV R({dest}) R({left}) R({right})"),
            Instruction::Mod { dest, left, right } => write!(f, "MOD R({dest}) R({left}) R({right})"),
            Instruction::Pow { dest, left, right } => write!(f, "POW R({dest}) R({left}) R({right})"),
            Instruction::And { dest, left, right } => write!(f, "AND R({dest}) R({left}) R({right})"),
            Instruction::Or { dest, left, right } => write!(f, "OR R({dest}) R({left}) R({right})"),
            Instruction::Xor { dest, left, right } => write!(f, "XOR R({dest}) R({left}) R({right})"),
            Instruction::Shl { dest, left, right } => write!(f, "SHL R({dest}) R({left}) R({right})"),
            Instruction::Shr { dest, left, right } => write!(f, "SHR R({dest}) R({left}) R({right})"),
            Instruction::Compare {
                dest,
                left,
                right,
                op,
                tolerant,
            } => {
                let suffix = if tolerant { " ~" } else { "" };
                write!(f, "{op:?} R({dest}) R({left}) R({right}){suffix}")
            }
            Instruction::Neg { dest, src } => write!(f, "NEG R({dest}) R({src})"),
            Instruction::Not { dest, src } => write!(f, "NOT R({dest}) R({src})"),
            Instruction::BuiltinCall { params_index } => write!(f, "BUILTIN_CALL P({params_index})"),
            Instruction::Return { value } => write!(f, "RETURN R({value})"),
        }
    }
}
