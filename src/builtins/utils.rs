// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Value;

use std::sync::Arc;

use anyhow::{bail, Result};

pub fn ensure_args_count(fcn: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        if expected == 1 {
            bail!("`{fcn}` expects 1 argument");
        } else {
            bail!("`{fcn}` expects {expected} arguments");
        }
    }
    Ok(())
}

pub fn ensure_numeric(fcn: &str, v: &Value) -> Result<f64> {
    match v {
        Value::Numeric(n) => Ok(*n),
        Value::Integer(i) => Ok(*i as f64),
        _ => bail!("`{fcn}` expects numeric argument. Got `{v}` instead"),
    }
}

pub fn ensure_integer(fcn: &str, v: &Value) -> Result<i64> {
    match v {
        Value::Integer(i) => Ok(*i),
        _ => bail!("`{fcn}` expects integer argument. Got `{v}` instead"),
    }
}

pub fn ensure_string(fcn: &str, v: &Value) -> Result<Arc<str>> {
    match v {
        Value::String(s) => Ok(s.clone()),
        _ => bail!("`{fcn}` expects string argument. Got `{v}` instead"),
    }
}

/// A float result, rejecting NaN and infinities.
pub fn finite(fcn: &str, n: f64) -> Result<Value> {
    if !n.is_finite() {
        bail!("`{fcn}` produced a non-finite result");
    }
    Ok(Value::Numeric(n))
}
