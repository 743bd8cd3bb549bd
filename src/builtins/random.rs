// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Non-deterministic functions. Calls to these are never folded.

use crate::builtins::utils::{ensure_args_count, ensure_integer, ensure_numeric};
use crate::builtins::{self, Builtin, Sig, T};
use crate::value::Value;

use core::cmp::Ordering;

use anyhow::{bail, Result};
use rand::{thread_rng, Rng};

const RANDOM_0: &[Sig] = &[(&[], T::Numeric)];
const RANDOM_1: &[Sig] = &[(&[T::Numeric], T::Numeric)];
const RANDOM_2: &[Sig] = &[(&[T::Numeric, T::Numeric], T::Numeric)];
const RANDOMINT_0: &[Sig] = &[(&[], T::Integer)];
const RANDOMINT_1: &[Sig] = &[(&[T::Integer], T::Integer)];
const RANDOMINT_2: &[Sig] = &[(&[T::Integer, T::Integer], T::Integer)];

pub fn register(m: &mut builtins::Registry) {
    builtins::add(m, &["random"], Builtin::random("random", RANDOM_0, random));
    builtins::add(m, &["random"], Builtin::random("random", RANDOM_1, random_below));
    builtins::add(m, &["random"], Builtin::random("random", RANDOM_2, random_between));
    builtins::add(m, &["randomint"], Builtin::random("randomint", RANDOMINT_0, randomint));
    builtins::add(
        m,
        &["randomint"],
        Builtin::random("randomint", RANDOMINT_1, randomint_below),
    );
    builtins::add(
        m,
        &["randomint"],
        Builtin::random("randomint", RANDOMINT_2, randomint_between),
    );
}

fn float_in(fcn: &str, low: f64, high: f64) -> Result<Value> {
    // `gen_range` panics on empty or unbounded ranges.
    if low.partial_cmp(&high) != Some(Ordering::Less) || !(high - low).is_finite() {
        bail!("`{fcn}` expects a non-empty finite range. Got [{low}, {high})");
    }
    Ok(Value::Numeric(thread_rng().gen_range(low..high)))
}

fn int_in(fcn: &str, low: i64, high: i64) -> Result<Value> {
    if low >= high {
        bail!("`{fcn}` expects a non-empty range. Got [{low}, {high})");
    }
    Ok(Value::Integer(thread_rng().gen_range(low..high)))
}

fn random(args: &[Value]) -> Result<Value> {
    ensure_args_count("random", args, 0)?;
    Ok(Value::Numeric(thread_rng().gen::<f64>()))
}

fn random_below(args: &[Value]) -> Result<Value> {
    ensure_args_count("random", args, 1)?;
    float_in("random", 0.0, ensure_numeric("random", &args[0])?)
}

fn random_between(args: &[Value]) -> Result<Value> {
    ensure_args_count("random", args, 2)?;
    float_in(
        "random",
        ensure_numeric("random", &args[0])?,
        ensure_numeric("random", &args[1])?,
    )
}

fn randomint(args: &[Value]) -> Result<Value> {
    ensure_args_count("randomint", args, 0)?;
    int_in("randomint", 0, i64::from(i32::MAX))
}

fn randomint_below(args: &[Value]) -> Result<Value> {
    ensure_args_count("randomint", args, 1)?;
    int_in("randomint", 0, ensure_integer("randomint", &args[0])?)
}

fn randomint_between(args: &[Value]) -> Result<Value> {
    ensure_args_count("randomint", args, 2)?;
    int_in(
        "randomint",
        ensure_integer("randomint", &args[0])?,
        ensure_integer("randomint", &args[1])?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_honored() -> Result<()> {
        for _ in 0..100 {
            let v = random_between(&[Value::from(2.0), Value::from(8.0)])?.as_f64()?;
            assert!((2.0..8.0).contains(&v));
            let v = randomint_below(&[Value::from(5)])?.as_i64()?;
            assert!((0..5).contains(&v));
        }
        Ok(())
    }

    #[test]
    fn empty_ranges_fail() {
        assert!(random_below(&[Value::from(0.0)]).is_err());
        assert!(randomint_between(&[Value::from(3), Value::from(3)]).is_err());
    }
}
