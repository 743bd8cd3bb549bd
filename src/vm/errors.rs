// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Faults while lowering or executing a program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("Literal index {index} out of bounds")]
    LiteralIndexOutOfBounds { index: u16 },

    #[error("Register {register} out of bounds")]
    RegisterOutOfBounds { register: u16 },

    #[error("Parameter index {index} out of bounds ({count} arguments supplied)")]
    ParameterIndexOutOfBounds { index: u16, count: usize },

    #[error("Invalid builtin call params index: {index}")]
    InvalidBuiltinCallParams { index: u16 },

    #[error("Builtin `{name}` failed: {message}")]
    BuiltinFailed { name: &'static str, message: String },

    #[error("Program needs more than {limit} registers")]
    RegisterLimitExceeded { limit: usize },

    #[error("Program ended without returning a value")]
    MissingReturn,

    #[error("Node is not ready for lowering: {0}")]
    Undetermined(String),

    #[error("Arithmetic error: {0}")]
    ArithmeticError(String),
}

impl From<anyhow::Error> for VmError {
    fn from(err: anyhow::Error) -> Self {
        VmError::ArithmeticError(format!("{}", err))
    }
}

pub type Result<T> = core::result::Result<T, VmError>;
