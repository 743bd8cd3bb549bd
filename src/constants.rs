// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Built-in named constants.

use crate::value::Value;

/// Named constants usable directly by name in an expression.
pub const NAMED_CONSTANTS: [(&str, f64); 6] = [
    ("e", core::f64::consts::E),
    ("π", core::f64::consts::PI),
    ("φ", 1.618_033_988_749_894_8),
    ("β", 0.280_169_499_023_869_1),
    ("γ", 0.577_215_664_901_532_8),
    ("λ", 0.303_663_002_898_732_6),
];

/// Names usable between the special symbol indicators, e.g. `[pi]`.
const SPECIAL_SYMBOLS: [(&str, &str); 10] = [
    ("pi", "π"),
    ("π", "π"),
    ("phi", "φ"),
    ("φ", "φ"),
    ("beta", "β"),
    ("β", "β"),
    ("gamma", "γ"),
    ("γ", "γ"),
    ("lambda", "λ"),
    ("λ", "λ"),
];

pub fn named_constant(name: &str) -> Option<Value> {
    NAMED_CONSTANTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| Value::Numeric(*v))
}

/// Resolve the name written inside special symbol indicators to the
/// constant's canonical name.
pub fn special_symbol(name: &str) -> Option<&'static str> {
    let name = name.trim();
    SPECIAL_SYMBOLS
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| *canonical)
        .or_else(|| {
            NAMED_CONSTANTS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(n, _)| *n)
        })
}
