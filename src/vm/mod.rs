// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// A small register-based machine executing lowered expressions.

mod errors;
mod instructions;
mod machine;
mod program;

pub use errors::{Result, VmError};
pub use instructions::{BuiltinCallParams, Instruction};
pub use machine::ExprVm;
pub use program::{Program, ProgramBuilder};
