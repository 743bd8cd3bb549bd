// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use mathic::*;

#[test]
fn range() {
    let engine = Engine::new();
    let expr = engine.interpret("x = y");
    let args = [Value::from(1.75), Value::from(1.9)];

    assert_eq!(expr.evaluate(&args), Value::from(false));
    assert_eq!(
        expr.evaluate_with_tolerance(&args, &ComparisonTolerance::range(0.2, 0.2)),
        Value::from(true)
    );
    assert_eq!(
        expr.evaluate_with_tolerance(&args, &ComparisonTolerance::range(0.1, 0.1)),
        Value::from(false)
    );
    // The band is asymmetric.
    assert_eq!(
        expr.evaluate_with_tolerance(&args, &ComparisonTolerance::range(0.2, 0.0)),
        Value::from(true)
    );
    assert_eq!(
        expr.evaluate_with_tolerance(&args, &ComparisonTolerance::range(0.0, 0.2)),
        Value::from(false)
    );
}

#[test]
fn proportional() {
    let engine = Engine::new();
    let expr = engine.interpret("x = y");
    let args = [Value::from(1), Value::from(1.5)];

    assert_eq!(
        expr.evaluate_with_tolerance(&args, &ComparisonTolerance::proportional(0.5)),
        Value::from(true)
    );
    assert_eq!(
        expr.evaluate_with_tolerance(&args, &ComparisonTolerance::proportional(0.1)),
        Value::from(false)
    );
    assert_eq!(
        expr.evaluate_with_tolerance(&args, &ComparisonTolerance::proportional(2.0)),
        Value::from(true)
    );
}

#[test]
fn ordering_comparisons_use_the_band() {
    let engine = Engine::new();
    let tolerance = ComparisonTolerance::integer_range(2, 2);

    let lt = engine.interpret("x < 10");
    assert_eq!(lt.evaluate(&[Value::from(9)]), Value::from(true));
    assert_eq!(
        lt.evaluate_with_tolerance(&[Value::from(9)], &tolerance),
        Value::from(false)
    );
    assert_eq!(
        lt.evaluate_with_tolerance(&[Value::from(7)], &tolerance),
        Value::from(true)
    );

    let ge = engine.interpret("x >= 10");
    assert_eq!(
        ge.evaluate_with_tolerance(&[Value::from(8)], &tolerance),
        Value::from(true)
    );
}

#[test]
fn honors_one_kind() {
    let tolerance = ComparisonTolerance {
        integer_range: Some((1, 1)),
        range: Some((5.0, 5.0)),
        proportion: Some(0.5),
    };
    assert!(matches!(
        tolerance.honored(),
        Some(unstable::ToleranceKind::IntegerRange { lower: 1, upper: 1 })
    ));
    assert_eq!(ComparisonTolerance::default().honored(), None);

    let engine = Engine::new();
    assert_eq!(
        engine
            .interpret("x = 10")
            .evaluate_with_tolerance(&[Value::from(13)], &tolerance),
        Value::from(false)
    );
}

#[test]
fn deserialize() -> Result<()> {
    let tolerance: ComparisonTolerance = serde_json::from_str(r#"{ "range": [0.5, 1.5] }"#)?;
    assert_eq!(tolerance, ComparisonTolerance::range(0.5, 1.5));
    Ok(())
}
