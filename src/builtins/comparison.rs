// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::bitwise::compare_bytes;
use crate::tolerance::ToleranceKind;
use crate::value::Value;

use core::cmp::Ordering;

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering.is_eq(),
            CompareOp::Ne => ordering.is_ne(),
            CompareOp::Lt => ordering.is_lt(),
            CompareOp::Le => ordering.is_le(),
            CompareOp::Gt => ordering.is_gt(),
            CompareOp::Ge => ordering.is_ge(),
        }
    }
}

/// compare two values of the same kind
///
/// Numbers compare numerically (an integer against a float widens), strings
/// ordinally and byte arrays as unsigned numbers, most significant byte
/// first. Booleans only support equality.
pub fn compare(op: CompareOp, v1: &Value, v2: &Value) -> Result<bool> {
    let ordering = match (v1, v2) {
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::ByteArray(a), Value::ByteArray(b)) => compare_bytes(a, b),
        (Value::Bool(a), Value::Bool(b)) => match op {
            CompareOp::Eq => return Ok(a == b),
            CompareOp::Ne => return Ok(a != b),
            _ => bail!("booleans cannot be ordered"),
        },
        (a, b) if a.is_number() && b.is_number() => {
            let (a, b) = (a.as_f64()?, b.as_f64()?);
            match a.partial_cmp(&b) {
                Some(o) => o,
                // NaN is unordered: only `!=` holds.
                None => return Ok(op == CompareOp::Ne),
            }
        }
        _ => bail!("cannot compare `{v1}` with `{v2}`"),
    };
    Ok(op.holds(ordering))
}

/// Compare two numbers with an allowance around the right operand.
///
/// With a band `[low, high]` around `v2`: `=` holds inside the band, `<`
/// below it, `>` above it, and `<=`/`>=` when not above/below it.
pub fn compare_tolerant(
    op: CompareOp,
    v1: &Value,
    v2: &Value,
    tolerance: &ToleranceKind,
) -> Result<bool> {
    if !v1.is_number() || !v2.is_number() {
        return compare(op, v1, v2);
    }
    let left = v1.as_f64()?;
    let (low, high) = tolerance.band(v2.as_f64()?);

    let inside = left >= low && left <= high;
    Ok(match op {
        CompareOp::Eq => inside,
        CompareOp::Ne => !inside,
        CompareOp::Lt => left < low,
        CompareOp::Le => left <= high,
        CompareOp::Gt => left > high,
        CompareOp::Ge => left >= low,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_kind_ordering() -> Result<()> {
        assert!(compare(CompareOp::Lt, &Value::from(1), &Value::from(2))?);
        assert!(compare(CompareOp::Ge, &Value::from("b"), &Value::from("a"))?);
        assert!(compare(
            CompareOp::Gt,
            &Value::from(vec![0x00, 0x02]),
            &Value::from(vec![0xFF, 0x01])
        )?);
        assert!(compare(CompareOp::Eq, &Value::from(2), &Value::from(2.0))?);
        assert!(compare(CompareOp::Lt, &Value::from(true), &Value::from(false)).is_err());
        Ok(())
    }

    #[test]
    fn tolerant_equality() -> Result<()> {
        let range = ToleranceKind::Range {
            lower: 0.2,
            upper: 0.2,
        };
        assert!(compare_tolerant(
            CompareOp::Eq,
            &Value::from(1.7),
            &Value::from(1.9),
            &range
        )?);
        assert!(!compare_tolerant(
            CompareOp::Lt,
            &Value::from(1.7),
            &Value::from(1.9),
            &range
        )?);

        let tight = ToleranceKind::Range {
            lower: 0.1,
            upper: 0.1,
        };
        assert!(!compare_tolerant(
            CompareOp::Eq,
            &Value::from(1.7),
            &Value::from(1.9),
            &tight
        )?);
        assert!(compare_tolerant(
            CompareOp::Ne,
            &Value::from(1.7),
            &Value::from(1.9),
            &tight
        )?);
        Ok(())
    }
}
