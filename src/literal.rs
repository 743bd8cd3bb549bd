// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Recognition of literal text: numbers, hex and binary literals, booleans.
#![allow(clippy::unwrap_used)] // static patterns

use crate::plugins::PluginRegistry;
use crate::value::Value;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref GROUPED_INTEGER: Regex = Regex::new(r"^[+-]?\d{1,3}(,\d{3})+$").unwrap();
    static ref EXPONENT_INTEGER: Regex = Regex::new(r"^([+-]?\d+)[eE]\+?(\d+)$").unwrap();
    static ref FLOAT: Regex = Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap();
}

/// Parse an integer or floating point literal.
///
/// Integer parsing is tried first. Hex literals (`0x` or `&h`) only ever
/// produce integers.
pub fn parse_numeric(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(v) = parse_hex(text) {
        return Some(v);
    }

    parse_integer(text)
        .map(Value::Integer)
        .or_else(|| parse_float(text).map(Value::Numeric))
}

fn parse_integer(text: &str) -> Option<i64> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(i);
    }

    if GROUPED_INTEGER.is_match(text) {
        return text.replace(',', "").parse::<i64>().ok();
    }

    let captures = EXPONENT_INTEGER.captures(text)?;
    let mantissa = captures.get(1)?.as_str().parse::<i64>().ok()?;
    let exponent = captures.get(2)?.as_str().parse::<u32>().ok()?;
    10i64
        .checked_pow(exponent)
        .and_then(|scale| mantissa.checked_mul(scale))
}

fn parse_float(text: &str) -> Option<f64> {
    if !FLOAT.is_match(text) {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Parse `0x1F` or `&h1F` (case-insensitive prefix) into an integer.
///
/// The full 64 bits are used, so `0xFFFFFFFFFFFFFFFF` is `-1`.
pub fn parse_hex(text: &str) -> Option<Value> {
    let lower = text.to_ascii_lowercase();
    let digits = lower
        .strip_prefix("0x")
        .or_else(|| lower.strip_prefix("&h"))?;
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16)
        .ok()
        .map(|u| Value::Integer(u as i64))
}

/// Parse a `0b` binary literal into a byte array.
///
/// Underscores separate digits. The digits are padded on the left to whole
/// bytes; the bytes are collected most significant first and then reversed,
/// so the resulting array is least significant byte first.
pub fn parse_binary(text: &str) -> Option<Value> {
    let digits = text
        .strip_prefix("0b")
        .or_else(|| text.strip_prefix("0B"))?
        .replace('_', "");
    if digits.is_empty() {
        return None;
    }

    let padding = (8 - digits.len() % 8) % 8;
    let padded = format!("{}{digits}", "0".repeat(padding));

    let mut bytes = Vec::with_capacity(padded.len() / 8);
    for group in padded.as_bytes().chunks(8) {
        if !group.iter().all(|c| *c == b'0' || *c == b'1') {
            return None;
        }
        let byte = group
            .iter()
            .fold(0u8, |acc, c| (acc << 1) | u8::from(*c == b'1'));
        bytes.push(byte);
    }
    bytes.reverse();

    Some(Value::from(bytes))
}

pub fn parse_boolean(text: &str) -> Option<Value> {
    if text.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        None
    }
}

/// Interpret `text` as a literal.
///
/// Registered interpreters go first, in priority order; the built-in
/// grammars follow.
pub fn parse_literal(text: &str, plugins: &PluginRegistry) -> Option<Value> {
    for interpreter in plugins.interpreters() {
        if let Some(v) = interpreter.interpret(text) {
            return Some(v);
        }
    }

    parse_binary(text)
        .or_else(|| parse_numeric(text))
        .or_else(|| parse_boolean(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_before_floats() {
        assert_eq!(parse_numeric("42"), Some(Value::Integer(42)));
        assert_eq!(parse_numeric("-7"), Some(Value::Integer(-7)));
        assert_eq!(parse_numeric("1,000,000"), Some(Value::Integer(1_000_000)));
        assert_eq!(parse_numeric("2e3"), Some(Value::Integer(2000)));
        assert_eq!(parse_numeric("2.5"), Some(Value::Numeric(2.5)));
        assert_eq!(parse_numeric("1.5e-3"), Some(Value::Numeric(0.0015)));
        assert_eq!(parse_numeric(".5"), Some(Value::Numeric(0.5)));
    }

    #[test]
    fn rejects_non_numbers() {
        assert_eq!(parse_numeric("x"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("1,00"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn hex_literals() {
        assert_eq!(parse_numeric("0x1F"), Some(Value::Integer(31)));
        assert_eq!(parse_numeric("&hff"), Some(Value::Integer(255)));
        assert_eq!(parse_numeric("0XFF"), Some(Value::Integer(255)));
        assert_eq!(parse_numeric("0xFFFFFFFFFFFFFFFF"), Some(Value::Integer(-1)));
        assert_eq!(parse_hex("0x"), None);
        assert_eq!(parse_hex("0xZZ"), None);
    }

    #[test]
    fn binary_literals_are_little_endian() {
        assert_eq!(parse_binary("0b00000001"), Some(Value::from(vec![1])));
        assert_eq!(parse_binary("0b1"), Some(Value::from(vec![1])));
        assert_eq!(
            parse_binary("0b0000_0001_0000_0010"),
            Some(Value::from(vec![0b10, 0b1]))
        );
        assert_eq!(parse_binary("0b1_00000000"), Some(Value::from(vec![0, 1])));
        assert_eq!(parse_binary("0b0201"), None);
        assert_eq!(parse_binary("0b"), None);
        assert_eq!(parse_binary("101"), None);
    }

    #[test]
    fn booleans() {
        assert_eq!(parse_boolean("true"), Some(Value::Bool(true)));
        assert_eq!(parse_boolean("FALSE"), Some(Value::Bool(false)));
        assert_eq!(parse_boolean("yes"), None);
    }
}
