// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub mod bitwise;
pub mod comparison;
mod numbers;
mod random;
mod strings;
pub mod utils;

use crate::types::ValueType;
use crate::value::Value;

use std::collections::HashMap;

use anyhow::Result;
use lazy_static::lazy_static;

pub(crate) use crate::types::ValueType as T;

pub const MAX_ARITY: usize = 3;

/// Argument types and result type of one overload.
pub type Sig = (&'static [ValueType], ValueType);

/// Arguments arrive already converted to one of the builtin's signatures.
pub type BuiltinFcn = fn(&[Value]) -> Result<Value>;

/// Builtins by name, then by arity.
pub type Registry = HashMap<&'static str, [Option<Builtin>; MAX_ARITY + 1]>;

#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    /// Overloads in preference order.
    pub signatures: &'static [Sig],
    pub eval: BuiltinFcn,
    pub deterministic: bool,
}

impl Builtin {
    pub const fn new(name: &'static str, signatures: &'static [Sig], eval: BuiltinFcn) -> Self {
        Self {
            name,
            signatures,
            eval,
            deterministic: true,
        }
    }

    pub const fn random(name: &'static str, signatures: &'static [Sig], eval: BuiltinFcn) -> Self {
        Self {
            name,
            signatures,
            eval,
            deterministic: false,
        }
    }

    pub fn arity(&self) -> usize {
        self.signatures.first().map_or(0, |(args, _)| args.len())
    }
}

#[rustfmt::skip]
lazy_static! {
    pub static ref FUNCTIONS: Registry = {
	let mut m: Registry = HashMap::new();

	numbers::register(&mut m);
	random::register(&mut m);
	strings::register(&mut m);

	m
    };
}

pub(crate) fn add(m: &mut Registry, names: &[&'static str], builtin: Builtin) {
    let arity = builtin.arity();
    for name in names.iter().copied() {
        m.entry(name).or_default()[arity] = Some(builtin);
    }
}

/// The builtin registered under `name` (case-sensitive) for `arity`
/// arguments.
pub fn lookup(name: &str, arity: usize) -> Option<Builtin> {
    FUNCTIONS.get(name)?.get(arity).copied().flatten()
}

pub fn is_function(name: &str) -> bool {
    FUNCTIONS.contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_arity() {
        assert_eq!(lookup("random", 0).map(|b| b.arity()), Some(0));
        assert_eq!(lookup("random", 2).map(|b| b.deterministic), Some(false));
        assert_eq!(lookup("round", 2).map(|b| b.name), Some("round"));
        assert_eq!(lookup("substring", 3).map(|b| b.name), Some("substr"));
        assert!(lookup("sin", 2).is_none());
        assert!(lookup("Sin", 1).is_none());
        assert!(is_function("arctg"));
    }
}
