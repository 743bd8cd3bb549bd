// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use anyhow::{bail, Result};
use mathic::*;
use serde::Deserialize;
use test_generator::test_resources;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    expr: String,
    args: Option<Vec<Value>>,
    data: Option<BTreeMap<String, Value>>,
    want_result: Value,
    want_constant: Option<bool>,
    want_parameters: Option<Vec<String>>,
    tolerance: Option<ComparisonTolerance>,
    definition: Option<MathDefinition>,
    skip: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn evaluate(expr: &CompiledExpression, case: &TestCase) -> Value {
    match (&case.data, &case.args) {
        (Some(data), _) => expr.evaluate_with_finder_and_tolerance(data, case.tolerance.as_ref()),
        (None, args) => {
            let args = args.clone().unwrap_or_default();
            match &case.tolerance {
                Some(tolerance) => expr.evaluate_with_tolerance(&args, tolerance),
                None => expr.evaluate(&args),
            }
        }
    }
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;

    println!("running {file}");

    for case in test.cases {
        print!("case {} ", case.note);
        if case.skip == Some(true) {
            println!("skipped");
            continue;
        }

        let definition = case.definition.clone().unwrap_or_default();
        let compiler = Compiler::new(Arc::new(definition), Arc::new(PluginRegistry::new()))?;
        let expr = compiler.compile(&case.expr);

        let result = evaluate(&expr, &case);
        if result != case.want_result {
            bail!(
                "{}: `{}` evaluated to {result:?}, expected {:?}",
                case.note,
                case.expr,
                case.want_result
            );
        }

        if let Some(constant) = case.want_constant {
            if expr.is_constant() != constant {
                bail!("{}: is_constant() is {}", case.note, expr.is_constant());
            }
        }

        if let Some(parameters) = &case.want_parameters {
            if &expr.parameter_names() != parameters {
                bail!(
                    "{}: parameters {:?}, expected {parameters:?}",
                    case.note,
                    expr.parameter_names()
                );
            }
        }

        // Evaluating again goes through the lowered program cache.
        if evaluate(&expr, &case) != result {
            bail!("{}: second evaluation differs", case.note);
        }

        println!("passed");
    }

    println!("{file} passed");
    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test]
#[ignore = "intended for running a single yaml file"]
fn one_yaml() -> Result<()> {
    let Some(file) = env::args().find(|a| a.ends_with(".yaml")) else {
        bail!("missing <yaml-file>");
    };
    yaml_test(&file)
}

#[test_resources("tests/expressions/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
