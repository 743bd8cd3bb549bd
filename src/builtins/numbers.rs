// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::utils::{ensure_args_count, ensure_integer, ensure_numeric, finite};
use crate::builtins::{self, Builtin, BuiltinFcn, Sig, T};
use crate::value::Value;

use anyhow::{anyhow, bail, Result};

const UNARY: &[Sig] = &[(&[T::Numeric], T::Numeric)];
const UNARY_SAME: &[Sig] = &[(&[T::Integer], T::Integer), (&[T::Numeric], T::Numeric)];
const SIGN: &[Sig] = &[(&[T::Integer], T::Integer), (&[T::Numeric], T::Integer)];
const BINARY: &[Sig] = &[(&[T::Numeric, T::Numeric], T::Numeric)];
const BINARY_SAME: &[Sig] = &[
    (&[T::Integer, T::Integer], T::Integer),
    (&[T::Numeric, T::Numeric], T::Numeric),
];
const ROUND_DIGITS: &[Sig] = &[(&[T::Numeric, T::Integer], T::Numeric)];

pub fn register(m: &mut builtins::Registry) {
    let math: [(&[&'static str], BuiltinFcn); 14] = [
        (&["acos", "arccos"], acos),
        (&["asin", "arcsin"], asin),
        (&["atan", "arctg"], atan),
        (&["cos"], cos),
        (&["cosh"], cosh),
        (&["exp"], exp),
        (&["ln"], ln),
        (&["lg", "log10"], lg),
        (&["log2"], log2),
        (&["sin", "sine"], sin),
        (&["sqrt"], sqrt),
        (&["cbrt"], cbrt),
        (&["tan", "tangent"], tan),
        (&["tanh"], tanh),
    ];
    for (names, eval) in math {
        builtins::add(m, names, Builtin::new(names[0], UNARY, eval));
    }

    builtins::add(m, &["abs"], Builtin::new("abs", UNARY_SAME, abs));
    builtins::add(m, &["ceil", "ceiling"], Builtin::new("ceil", UNARY_SAME, ceil));
    builtins::add(m, &["floor"], Builtin::new("floor", UNARY_SAME, floor));
    builtins::add(m, &["round"], Builtin::new("round", UNARY_SAME, round));
    builtins::add(m, &["trun", "truncate"], Builtin::new("truncate", UNARY_SAME, truncate));
    builtins::add(m, &["sign"], Builtin::new("sign", SIGN, sign));

    builtins::add(m, &["log"], Builtin::new("log", BINARY, log));
    builtins::add(m, &["pow"], Builtin::new("pow", BINARY, pow));
    builtins::add(m, &["atan2"], Builtin::new("atan2", BINARY, atan2));
    builtins::add(m, &["min"], Builtin::new("min", BINARY_SAME, min));
    builtins::add(m, &["max"], Builtin::new("max", BINARY_SAME, max));
    builtins::add(m, &["round"], Builtin::new("round", ROUND_DIGITS, round_digits));
}

fn unary_math(fcn: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value> {
    ensure_args_count(fcn, args, 1)?;
    finite(fcn, f(ensure_numeric(fcn, &args[0])?))
}

fn acos(args: &[Value]) -> Result<Value> {
    unary_math("acos", args, f64::acos)
}

fn asin(args: &[Value]) -> Result<Value> {
    unary_math("asin", args, f64::asin)
}

fn atan(args: &[Value]) -> Result<Value> {
    unary_math("atan", args, f64::atan)
}

fn cos(args: &[Value]) -> Result<Value> {
    unary_math("cos", args, f64::cos)
}

fn cosh(args: &[Value]) -> Result<Value> {
    unary_math("cosh", args, f64::cosh)
}

fn exp(args: &[Value]) -> Result<Value> {
    unary_math("exp", args, f64::exp)
}

fn ln(args: &[Value]) -> Result<Value> {
    unary_math("ln", args, f64::ln)
}

fn lg(args: &[Value]) -> Result<Value> {
    unary_math("lg", args, f64::log10)
}

fn log2(args: &[Value]) -> Result<Value> {
    unary_math("log2", args, f64::log2)
}

fn sin(args: &[Value]) -> Result<Value> {
    unary_math("sin", args, f64::sin)
}

fn sqrt(args: &[Value]) -> Result<Value> {
    unary_math("sqrt", args, f64::sqrt)
}

fn cbrt(args: &[Value]) -> Result<Value> {
    unary_math("cbrt", args, f64::cbrt)
}

fn tan(args: &[Value]) -> Result<Value> {
    unary_math("tan", args, f64::tan)
}

fn tanh(args: &[Value]) -> Result<Value> {
    unary_math("tanh", args, f64::tanh)
}

/// Integers pass through `f_int`; floats go through `f`.
fn same_kind(
    fcn: &str,
    args: &[Value],
    f_int: fn(i64) -> Option<i64>,
    f: fn(f64) -> f64,
) -> Result<Value> {
    ensure_args_count(fcn, args, 1)?;
    match &args[0] {
        Value::Integer(i) => f_int(*i)
            .map(Value::Integer)
            .ok_or_else(|| anyhow!("integer overflow in `{fcn}`")),
        v => finite(fcn, f(ensure_numeric(fcn, v)?)),
    }
}

fn abs(args: &[Value]) -> Result<Value> {
    same_kind("abs", args, i64::checked_abs, f64::abs)
}

fn ceil(args: &[Value]) -> Result<Value> {
    same_kind("ceil", args, Some, f64::ceil)
}

fn floor(args: &[Value]) -> Result<Value> {
    same_kind("floor", args, Some, f64::floor)
}

// Half away from zero.
fn round(args: &[Value]) -> Result<Value> {
    same_kind("round", args, Some, f64::round)
}

fn truncate(args: &[Value]) -> Result<Value> {
    same_kind("truncate", args, Some, f64::trunc)
}

fn sign(args: &[Value]) -> Result<Value> {
    ensure_args_count("sign", args, 1)?;
    match &args[0] {
        Value::Integer(i) => Ok(Value::Integer(i.signum())),
        v => {
            let n = ensure_numeric("sign", v)?;
            if n.is_nan() {
                bail!("`sign` of NaN");
            }
            Ok(Value::Integer(if n > 0.0 {
                1
            } else if n < 0.0 {
                -1
            } else {
                0
            }))
        }
    }
}

fn log(args: &[Value]) -> Result<Value> {
    ensure_args_count("log", args, 2)?;
    let x = ensure_numeric("log", &args[0])?;
    let base = ensure_numeric("log", &args[1])?;
    finite("log", x.log(base))
}

fn pow(args: &[Value]) -> Result<Value> {
    ensure_args_count("pow", args, 2)?;
    let x = ensure_numeric("pow", &args[0])?;
    let y = ensure_numeric("pow", &args[1])?;
    finite("pow", x.powf(y))
}

fn atan2(args: &[Value]) -> Result<Value> {
    ensure_args_count("atan2", args, 2)?;
    let y = ensure_numeric("atan2", &args[0])?;
    let x = ensure_numeric("atan2", &args[1])?;
    finite("atan2", y.atan2(x))
}

fn min(args: &[Value]) -> Result<Value> {
    ensure_args_count("min", args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(*a.min(b))),
        (a, b) => Ok(Value::Numeric(
            ensure_numeric("min", a)?.min(ensure_numeric("min", b)?),
        )),
    }
}

fn max(args: &[Value]) -> Result<Value> {
    ensure_args_count("max", args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(*a.max(b))),
        (a, b) => Ok(Value::Numeric(
            ensure_numeric("max", a)?.max(ensure_numeric("max", b)?),
        )),
    }
}

fn round_digits(args: &[Value]) -> Result<Value> {
    ensure_args_count("round", args, 2)?;
    let x = ensure_numeric("round", &args[0])?;
    let digits = ensure_integer("round", &args[1])?;
    if !(-15..=15).contains(&digits) {
        bail!("`round` supports between -15 and 15 digits");
    }
    let scale = 10f64.powi(digits as i32);
    finite("round", (x * scale).round() / scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() -> Result<()> {
        assert_eq!(round(&[Value::from(2.5)])?, Value::from(3.0));
        assert_eq!(round(&[Value::from(-2.5)])?, Value::from(-3.0));
        assert_eq!(round(&[Value::from(7)])?, Value::from(7));
        assert_eq!(
            round_digits(&[Value::from(3.14159), Value::from(2)])?,
            Value::from(3.14)
        );
        Ok(())
    }

    #[test]
    fn integers_keep_kind() -> Result<()> {
        assert_eq!(abs(&[Value::from(-4)])?, Value::from(4));
        assert!(abs(&[Value::from(i64::MIN)]).is_err());
        assert_eq!(min(&[Value::from(3), Value::from(2)])?, Value::from(2));
        assert_eq!(max(&[Value::from(3.5), Value::from(2.0)])?, Value::from(3.5));
        assert_eq!(sign(&[Value::from(-0.5)])?, Value::from(-1));
        Ok(())
    }

    #[test]
    fn non_finite_results_fail() {
        assert!(sqrt(&[Value::from(-1.0)]).is_err());
        assert!(ln(&[Value::from(0.0)]).is_err());
    }
}
