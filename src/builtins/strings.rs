// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_args_count, ensure_integer, ensure_string};
use crate::builtins::{self, Builtin, Sig, T};
use crate::value::Value;

use anyhow::{bail, Result};

const LENGTH: &[Sig] = &[(&[T::String], T::Integer), (&[T::ByteArray], T::Integer)];
const TRIM: &[Sig] = &[(&[T::String], T::String)];
const TWO_STRINGS: &[Sig] = &[(&[T::String, T::String], T::String)];
const THREE_STRINGS: &[Sig] = &[(&[T::String, T::String, T::String], T::String)];
const SUBSTR: &[Sig] = &[(&[T::String, T::Integer], T::String)];
const SUBSTR_LENGTH: &[Sig] = &[(&[T::String, T::Integer, T::Integer], T::String)];

pub fn register(m: &mut builtins::Registry) {
    builtins::add(m, &["length", "strlen"], Builtin::new("length", LENGTH, length));
    builtins::add(m, &["trim"], Builtin::new("trim", TRIM, trim));
    builtins::add(m, &["trim"], Builtin::new("trim", TWO_STRINGS, trim_set));
    builtins::add(m, &["trimbody"], Builtin::new("trimbody", TWO_STRINGS, trimbody));
    builtins::add(m, &["substr", "substring"], Builtin::new("substr", SUBSTR, substr));
    builtins::add(
        m,
        &["substr", "substring"],
        Builtin::new("substr", SUBSTR_LENGTH, substr_length),
    );
    builtins::add(m, &["replace"], Builtin::new("replace", THREE_STRINGS, replace));
}

fn length(args: &[Value]) -> Result<Value> {
    ensure_args_count("length", args, 1)?;
    let n = match &args[0] {
        Value::ByteArray(bytes) => bytes.len(),
        v => ensure_string("length", v)?.chars().count(),
    };
    Ok(Value::Integer(n as i64))
}

fn trim(args: &[Value]) -> Result<Value> {
    ensure_args_count("trim", args, 1)?;
    Ok(Value::from(ensure_string("trim", &args[0])?.trim()))
}

fn trim_set(args: &[Value]) -> Result<Value> {
    ensure_args_count("trim", args, 2)?;
    let s = ensure_string("trim", &args[0])?;
    let set = ensure_string("trim", &args[1])?;
    Ok(Value::from(s.trim_matches(|c| set.contains(c))))
}

fn trimbody(args: &[Value]) -> Result<Value> {
    ensure_args_count("trimbody", args, 2)?;
    let s = ensure_string("trimbody", &args[0])?;
    let body = ensure_string("trimbody", &args[1])?;
    if body.is_empty() {
        return Ok(Value::String(s));
    }
    Ok(Value::from(s.replace(body.as_ref(), "")))
}

fn start_index(fcn: &str, v: &Value) -> Result<usize> {
    let start = ensure_integer(fcn, v)?;
    if start < 0 {
        bail!("`{fcn}` expects a non-negative start index");
    }
    Ok(usize::try_from(start)?)
}

fn substr(args: &[Value]) -> Result<Value> {
    ensure_args_count("substr", args, 2)?;
    let s = ensure_string("substr", &args[0])?;
    let start = start_index("substr", &args[1])?;
    Ok(Value::from(s.chars().skip(start).collect::<String>()))
}

fn substr_length(args: &[Value]) -> Result<Value> {
    ensure_args_count("substr", args, 3)?;
    let s = ensure_string("substr", &args[0])?;
    let start = start_index("substr", &args[1])?;
    let length = ensure_integer("substr", &args[2])?;
    if length < 0 {
        bail!("`substr` expects a non-negative length");
    }
    Ok(Value::from(
        s.chars()
            .skip(start)
            .take(usize::try_from(length)?)
            .collect::<String>(),
    ))
}

fn replace(args: &[Value]) -> Result<Value> {
    ensure_args_count("replace", args, 3)?;
    let s = ensure_string("replace", &args[0])?;
    let old = ensure_string("replace", &args[1])?;
    let new = ensure_string("replace", &args[2])?;
    if old.is_empty() {
        return Ok(Value::String(s));
    }
    Ok(Value::from(s.replace(old.as_ref(), new.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths() -> Result<()> {
        assert_eq!(length(&[Value::from("héllo")])?, Value::from(5));
        assert_eq!(length(&[Value::from(vec![1])])?, Value::from(1));
        Ok(())
    }

    #[test]
    fn trimming() -> Result<()> {
        assert_eq!(trim(&[Value::from("  a b ")])?, Value::from("a b"));
        assert_eq!(
            trim_set(&[Value::from("xxabcyx"), Value::from("xy")])?,
            Value::from("abc")
        );
        assert_eq!(
            trimbody(&[Value::from("a-b-c"), Value::from("-")])?,
            Value::from("abc")
        );
        Ok(())
    }

    #[test]
    fn substrings() -> Result<()> {
        assert_eq!(
            substr(&[Value::from("hello"), Value::from(1)])?,
            Value::from("ello")
        );
        assert_eq!(substr(&[Value::from("hi"), Value::from(9)])?, Value::from(""));
        assert_eq!(
            substr_length(&[Value::from("hello"), Value::from(1), Value::from(3)])?,
            Value::from("ell")
        );
        assert!(substr(&[Value::from("hi"), Value::from(-1)]).is_err());
        Ok(())
    }
}
