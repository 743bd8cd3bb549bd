// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use mathic::*;

#[test]
fn display() {
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from(-3).to_string(), "-3");
    assert_eq!(Value::from(2.5).to_string(), "2.5");
    assert_eq!(Value::from("text").to_string(), "text");
    // Most significant byte first.
    assert_eq!(Value::from(vec![0x02u8, 0x01]).to_string(), "0x0102");
}

#[test]
fn serialize() -> Result<()> {
    assert_eq!(serde_json::to_string(&Value::from(1))?, "1");
    assert_eq!(serde_json::to_string(&Value::from(1.5))?, "1.5");
    assert_eq!(serde_json::to_string(&Value::from("a"))?, "\"a\"");
    assert_eq!(
        serde_json::to_string(&Value::from(vec![1u8, 2]))?,
        r#"{"bytes!":[1,2]}"#
    );
    Ok(())
}

#[test]
fn deserialize() -> Result<()> {
    assert_eq!(Value::from_json_str("true")?, Value::from(true));
    assert_eq!(Value::from_json_str("7")?, Value::from(7));
    assert_eq!(Value::from_json_str("7.0")?, Value::from(7.0));
    assert_eq!(Value::from_json_str("[1, 2]")?, Value::from(vec![1u8, 2]));
    assert_eq!(
        Value::from_json_str(r#"{"bytes!": [3]}"#)?,
        Value::from(vec![3u8])
    );
    assert!(Value::from_json_str(r#"{"other": [3]}"#).is_err());
    assert!(Value::from_json_str("null").is_err());
    assert!(Value::from_json_str("[256]").is_err());
    Ok(())
}

#[test]
fn value_types() {
    assert_eq!(Value::from(1).value_type(), ValueType::Integer);
    assert_eq!(Value::from(1.0).value_type(), ValueType::Numeric);
    assert_eq!(Value::from(vec![1u8]).value_type(), ValueType::ByteArray);
    assert!(Value::from(1).is_number());
    assert!(!Value::from("1").is_number());
    assert_eq!(Value::from(1), Value::from(1));
    assert_ne!(Value::from(1), Value::from(1.0));
}
