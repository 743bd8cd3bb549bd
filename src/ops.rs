// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Value semantics of the operators, shared by constant folding and the VM.

use crate::builtins::bitwise;
use crate::plugins::PluginRegistry;
use crate::types::{SupportedTypes, ValueType};
use crate::value::Value;

use anyhow::{anyhow, bail, Result};

/// Implicit conversion performed when a node's result feeds a parent that
/// computes in a wider type.
pub fn convert(value: &Value, to: ValueType) -> Result<Value> {
    match (value, to) {
        (v, t) if v.value_type() == t => Ok(v.clone()),
        (Value::Integer(i), ValueType::Numeric) => Ok(Value::Numeric(*i as f64)),
        (v, t) => bail!("cannot convert `{v}` to {t}"),
    }
}

/// Coerce an argument towards the types its parameter supports.
///
/// Integers widen, integral floats narrow, and anything formats into a string
/// when the parameter accepts strings.
pub fn coerce(value: &Value, supported: SupportedTypes, plugins: &PluginRegistry) -> Option<Value> {
    if supported.supports(value.value_type()) {
        return Some(value.clone());
    }
    match value {
        Value::Integer(i) if supported.supports(ValueType::Numeric) => {
            return Some(Value::Numeric(*i as f64))
        }
        Value::Numeric(n)
            if supported.supports(ValueType::Integer)
                && n.fract() == 0.0
                && *n >= i64::MIN as f64
                && *n < i64::MAX as f64 =>
        {
            return Some(Value::Integer(*n as i64))
        }
        _ => (),
    }
    supported
        .supports(ValueType::String)
        .then(|| Value::from(plugins.format(value)))
}

fn numbers(a: &Value, b: &Value) -> Result<(f64, f64)> {
    Ok((a.as_f64()?, b.as_f64()?))
}

pub fn add(a: &Value, b: &Value, plugins: &PluginRegistry) -> Result<Value> {
    Ok(match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(
            x.checked_add(*y)
                .ok_or_else(|| anyhow!("integer overflow in `{x} + {y}`"))?,
        ),
        (Value::String(_), _) | (_, Value::String(_)) => {
            let mut s = plugins.format(a);
            s.push_str(&plugins.format(b));
            Value::from(s)
        }
        (Value::ByteArray(x), Value::ByteArray(y)) => {
            let mut bytes = x.to_vec();
            bytes.extend_from_slice(y);
            Value::from(bytes)
        }
        _ if a.is_number() && b.is_number() => {
            let (x, y) = numbers(a, b)?;
            Value::Numeric(x + y)
        }
        _ => bail!("cannot add `{a}` and `{b}`"),
    })
}

pub fn sub(a: &Value, b: &Value) -> Result<Value> {
    Ok(match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(
            x.checked_sub(*y)
                .ok_or_else(|| anyhow!("integer overflow in `{x} - {y}`"))?,
        ),
        _ if a.is_number() && b.is_number() => {
            let (x, y) = numbers(a, b)?;
            Value::Numeric(x - y)
        }
        _ => bail!("cannot subtract `{b}` from `{a}`"),
    })
}

pub fn mul(a: &Value, b: &Value) -> Result<Value> {
    Ok(match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(
            x.checked_mul(*y)
                .ok_or_else(|| anyhow!("integer overflow in `{x} * {y}`"))?,
        ),
        _ if a.is_number() && b.is_number() => {
            let (x, y) = numbers(a, b)?;
            Value::Numeric(x * y)
        }
        _ => bail!("cannot multiply `{a}` and `{b}`"),
    })
}

pub fn div(a: &Value, b: &Value) -> Result<Value> {
    let (x, y) = numbers(a, b).map_err(|_| anyhow!("cannot divide `{a}` by `{b}`"))?;
    if y == 0.0 {
        bail!("division by zero");
    }
    Ok(Value::Numeric(x / y))
}

pub fn rem(a: &Value, b: &Value) -> Result<Value> {
    Ok(match (a, b) {
        (Value::Integer(_), Value::Integer(0)) => bail!("division by zero"),
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(
            x.checked_rem(*y)
                .ok_or_else(|| anyhow!("integer overflow in `{x} % {y}`"))?,
        ),
        _ if a.is_number() && b.is_number() => {
            let (x, y) = numbers(a, b)?;
            if y == 0.0 {
                bail!("division by zero");
            }
            Value::Numeric(x % y)
        }
        _ => bail!("cannot take `{a}` modulo `{b}`"),
    })
}

pub fn pow(a: &Value, b: &Value) -> Result<Value> {
    let (x, y) = numbers(a, b).map_err(|_| anyhow!("cannot raise `{a}` to `{b}`"))?;
    Ok(Value::Numeric(x.powf(y)))
}

pub fn neg(a: &Value) -> Result<Value> {
    Ok(match a {
        Value::Integer(x) => Value::Integer(
            x.checked_neg()
                .ok_or_else(|| anyhow!("integer overflow in `-{x}`"))?,
        ),
        Value::Numeric(x) => Value::Numeric(-x),
        _ => bail!("cannot negate `{a}`"),
    })
}

pub fn not(a: &Value) -> Result<Value> {
    Ok(match a {
        Value::Bool(b) => Value::Bool(!b),
        Value::Integer(x) => Value::Integer(!x),
        Value::ByteArray(bytes) => Value::from(bitwise::not_bytes(bytes)),
        _ => bail!("cannot negate `{a}`"),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Xor,
}

pub fn logic(op: LogicOp, a: &Value, b: &Value) -> Result<Value> {
    Ok(match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Value::Bool(match op {
            LogicOp::And => *x && *y,
            LogicOp::Or => *x || *y,
            LogicOp::Xor => *x != *y,
        }),
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(match op {
            LogicOp::And => x & y,
            LogicOp::Or => x | y,
            LogicOp::Xor => x ^ y,
        }),
        (Value::ByteArray(x), Value::ByteArray(y)) => Value::from(match op {
            LogicOp::And => bitwise::zip_bytes(x, y, |p, q| p & q),
            LogicOp::Or => bitwise::zip_bytes(x, y, |p, q| p | q),
            LogicOp::Xor => bitwise::zip_bytes(x, y, |p, q| p ^ q),
        }),
        _ => bail!("cannot apply {op:?} to `{a}` and `{b}`"),
    })
}

pub fn shift_left(a: &Value, b: &Value) -> Result<Value> {
    let count = b.as_i64()?;
    Ok(match a {
        Value::Integer(x) => Value::Integer(bitwise::shift_left_i64(*x, count)),
        Value::ByteArray(bytes) => Value::from(bitwise::shift_left(bytes, count)),
        _ => bail!("cannot shift `{a}`"),
    })
}

pub fn shift_right(a: &Value, b: &Value) -> Result<Value> {
    let count = b.as_i64()?;
    Ok(match a {
        Value::Integer(x) => Value::Integer(bitwise::shift_right_i64(*x, count)),
        Value::ByteArray(bytes) => Value::from(bitwise::shift_right(bytes, count)),
        _ => bail!("cannot shift `{a}`"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_concatenation_formats_other_side() -> Result<()> {
        let plugins = PluginRegistry::new();
        assert_eq!(
            add(&Value::from("n="), &Value::from(5), &plugins)?,
            Value::from("n=5")
        );
        assert_eq!(
            add(&Value::from(true), &Value::from("!"), &plugins)?,
            Value::from("true!")
        );
        assert_eq!(
            add(&Value::from(vec![1]), &Value::from(vec![2]), &plugins)?,
            Value::from(vec![1, 2])
        );
        Ok(())
    }

    #[test]
    fn arithmetic_faults() {
        assert!(div(&Value::from(1), &Value::from(0)).is_err());
        assert!(rem(&Value::from(1), &Value::from(0)).is_err());
        assert!(add(&Value::from(i64::MAX), &Value::from(1), &PluginRegistry::new()).is_err());
        assert!(neg(&Value::from(i64::MIN)).is_err());
    }

    #[test]
    fn coercion() {
        let plugins = PluginRegistry::new();
        assert_eq!(
            coerce(&Value::from(2), SupportedTypes::NUMERIC, &plugins),
            Some(Value::Numeric(2.0))
        );
        assert_eq!(
            coerce(&Value::from(2.0), SupportedTypes::INTEGER, &plugins),
            Some(Value::Integer(2))
        );
        assert_eq!(coerce(&Value::from(2.5), SupportedTypes::INTEGER, &plugins), None);
        assert_eq!(
            coerce(&Value::from(2.5), SupportedTypes::STRING, &plugins),
            Some(Value::from("2.5"))
        );
    }
}
