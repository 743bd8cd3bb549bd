// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use mathic::literal::*;
use mathic::{PluginRegistry, Value};

#[test]
fn numbers() {
    assert_eq!(parse_numeric("42"), Some(Value::from(42)));
    assert_eq!(parse_numeric("-7"), Some(Value::from(-7)));
    assert_eq!(parse_numeric("1,234,567"), Some(Value::from(1234567)));
    assert_eq!(parse_numeric("3e2"), Some(Value::from(300)));
    assert_eq!(parse_numeric("2.5"), Some(Value::from(2.5)));
    assert_eq!(parse_numeric(".5"), Some(Value::from(0.5)));
    assert_eq!(parse_numeric("1.5e3"), Some(Value::from(1500.0)));
    assert_eq!(parse_numeric("1,23"), None);
    assert_eq!(parse_numeric("abc"), None);
    assert_eq!(parse_numeric(""), None);
}

#[test]
fn hex() {
    assert_eq!(parse_hex("0x1F"), Some(Value::from(31)));
    assert_eq!(parse_hex("&hff"), Some(Value::from(255)));
    assert_eq!(parse_hex("0xFFFFFFFFFFFFFFFF"), Some(Value::from(-1)));
    assert_eq!(parse_hex("0x"), None);
    assert_eq!(parse_hex("0xZZ"), None);
    assert_eq!(parse_numeric("0x10"), Some(Value::from(16)));
}

#[test]
fn binary() {
    assert_eq!(parse_binary("0b00000001"), Some(Value::from(vec![1u8])));
    assert_eq!(parse_binary("0b1"), Some(Value::from(vec![1u8])));
    assert_eq!(
        parse_binary("0b0000_0001_0000_0010"),
        Some(Value::from(vec![2u8, 1]))
    );
    assert_eq!(parse_binary("0b1_0000_0000"), Some(Value::from(vec![0u8, 1])));
    assert_eq!(parse_binary("0b"), None);
    assert_eq!(parse_binary("0b102"), None);
}

#[test]
fn literals() {
    let plugins = PluginRegistry::new();
    assert_eq!(parse_literal("TRUE", &plugins), Some(Value::from(true)));
    assert_eq!(parse_literal("false", &plugins), Some(Value::from(false)));
    assert_eq!(parse_literal("12", &plugins), Some(Value::from(12)));
    assert_eq!(parse_literal("x", &plugins), None);
}
