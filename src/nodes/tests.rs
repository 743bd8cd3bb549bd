// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::*;
use crate::builtins;
use crate::builtins::comparison::CompareOp;

use anyhow::Result;

fn int(v: i64) -> Node {
    Node::constant(Value::from(v), &v.to_string())
}

fn lowered(
    node: &Node,
    params: &mut [ExternalParameter],
    args: &[Value],
) -> Result<Value> {
    let mut node = node.clone();
    for (param, arg) in params.iter_mut().zip(args) {
        param.supported = SupportedTypes::of(arg.value_type());
    }
    node.refresh(params)?;
    let target = node.returns(params);
    node.determine_strongly(target, params)?;

    let mut builder = ProgramBuilder::new();
    let result = node.lower(target, params, &mut builder)?;
    let program = builder.finish(result, None);
    let plugins = PluginRegistry::new();
    Ok(ExprVm::new(&program, &plugins).execute(args)?)
}

#[test]
fn folds_constant_operands() -> Result<()> {
    let plugins = PluginRegistry::new();
    let node = Node::binary(BinaryOp::Add, int(3), int(4), &mut [])?.simplify("3+4", &plugins);
    match node {
        Node::Constant { value, text } => {
            assert_eq!(value, Value::from(7));
            assert_eq!(text, "3+4");
        }
        other => panic!("expected a constant, got {other:?}"),
    }
    Ok(())
}

#[test]
fn keeps_faulting_operations() -> Result<()> {
    let plugins = PluginRegistry::new();
    let node = Node::binary(BinaryOp::Divide, int(1), int(0), &mut [])?.simplify("1/0", &plugins);
    assert!(!node.is_constant());
    Ok(())
}

#[test]
fn division_narrows_parameters_to_numbers() -> Result<()> {
    let mut params = vec![ExternalParameter::new("x")];
    let node = Node::binary(BinaryOp::Divide, Node::parameter(0), int(2), &mut params)?;
    assert_eq!(params[0].supported, SupportedTypes::NUMBER);
    assert_eq!(node.returns(&params), ValueType::Numeric);

    assert_eq!(lowered(&node, &mut params.clone(), &[Value::from(3)])?, Value::from(1.5));
    Ok(())
}

#[test]
fn integer_wins_ties() -> Result<()> {
    let mut params = vec![ExternalParameter::new("x")];
    let node = Node::binary(BinaryOp::Add, Node::parameter(0), int(1), &mut params)?;
    assert_eq!(node.returns(&params), ValueType::Integer);

    assert_eq!(lowered(&node, &mut params.clone(), &[Value::from(2)])?, Value::from(3));
    assert_eq!(
        lowered(&node, &mut params.clone(), &[Value::from(2.5)])?,
        Value::from(3.5)
    );
    Ok(())
}

#[test]
fn string_comparisons_are_not_tolerant() -> Result<()> {
    let mut params = vec![ExternalParameter::new("x")];
    let text = Node::constant(Value::from("a"), "\"a\"");
    let node = Node::binary(
        BinaryOp::Compare(CompareOp::Eq),
        Node::parameter(0),
        text,
        &mut params,
    )?;
    assert!(!node.is_tolerant());
    assert_eq!(params[0].supported, SupportedTypes::STRING);

    let mut params = vec![ExternalParameter::new("x")];
    let node = Node::binary(
        BinaryOp::Compare(CompareOp::Lt),
        Node::parameter(0),
        int(1),
        &mut params,
    )?;
    assert!(node.is_tolerant());
    Ok(())
}

#[test]
fn random_calls_are_preserved() -> Result<()> {
    let plugins = PluginRegistry::new();
    let random = builtins::lookup("random", 0).ok_or_else(|| anyhow::anyhow!("random/0"))?;
    let node = Node::call(random, vec![], &mut [])?.simplify("random()", &plugins);
    assert!(!node.is_constant());
    assert!(node.requires_preserved_expression());
    assert_eq!(node.returns(&[]), ValueType::Numeric);
    Ok(())
}

#[test]
fn rejects_impossible_operands() {
    let fraction = Node::constant(Value::from(1.5), "1.5");
    assert!(matches!(
        Node::unary(UnaryOp::Not, fraction, &mut []),
        Err(TypeError::NotLogicallyValid(_))
    ));

    let flag = Node::constant(Value::Bool(true), "true");
    assert!(Node::binary(BinaryOp::Subtract, flag, int(1), &mut []).is_err());
}

#[test]
fn negation_widens_for_numeric_context() -> Result<()> {
    let mut params = vec![ExternalParameter::new("x")];
    let neg = Node::unary(UnaryOp::Negate, Node::parameter(0), &mut params)?;
    let half = Node::constant(Value::from(0.5), "0.5");
    let node = Node::binary(BinaryOp::Multiply, neg, half, &mut params)?;
    assert_eq!(params[0].supported, SupportedTypes::NUMBER);
    assert_eq!(lowered(&node, &mut params.clone(), &[Value::from(4)])?, Value::from(-2.0));
    Ok(())
}
