// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use anyhow::Result;
use mathic::plugins::{ConstantInterpreter, StringFormatter};
use mathic::*;

struct CountingCompiler {
    inner: Compiler,
    calls: AtomicUsize,
}

impl ExpressionCompiler for CountingCompiler {
    fn compile(&self, text: &str) -> CompiledExpression {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.compile(text)
    }
}

fn counting() -> Result<Arc<CountingCompiler>> {
    Ok(Arc::new(CountingCompiler {
        inner: Compiler::new(
            Arc::new(MathDefinition::default()),
            Arc::new(PluginRegistry::new()),
        )?,
        calls: AtomicUsize::new(0),
    }))
}

#[test]
fn interpret_caches_by_text() -> Result<()> {
    let compiler = counting()?;
    let engine = Engine::with_compiler(compiler.clone());

    let first = engine.interpret("x + 1");
    let second = engine.interpret("x + 1");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);

    engine.interpret("x + 2");
    assert_eq!(engine.cached_len(), 2);
    assert_eq!(compiler.calls.load(Ordering::SeqCst), 2);

    engine.clear_cache();
    assert_eq!(engine.cached_len(), 0);
    engine.interpret("x + 1");
    assert_eq!(compiler.calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn concurrent_requests_compile_once() -> Result<()> {
    let compiler = counting()?;
    let engine = Engine::with_compiler(compiler.clone());
    let threads = 8;
    let barrier = Barrier::new(threads);

    let results: Vec<Value> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let engine = &engine;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    engine.execute("a * b + 1", &[Value::from(i as i64), Value::from(2)])
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("evaluation thread panicked"))
            .collect()
    });

    assert_eq!(compiler.calls.load(Ordering::SeqCst), 1);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(*result, Value::from(i as i64 * 2 + 1));
    }
    Ok(())
}

#[test]
fn execute_with_named_data() {
    let engine = Engine::new();
    let mut data = HashMap::new();
    data.insert("price".to_string(), Value::from(20));
    data.insert("quantity".to_string(), Value::from(3));

    assert_eq!(
        engine.execute_with_finder("price * quantity", &data),
        Value::from(60)
    );
    assert_eq!(
        engine.execute_with_finder("price * discount", &data),
        Value::from("price * discount")
    );

    let finder = FinderFn(|name: &str| (name == "n").then(|| Value::from(4.0)));
    assert_eq!(
        engine.execute_with_finder("sqrt(n)", &finder),
        Value::from(2.0)
    );
}

#[test]
fn expression_introspection() {
    let engine = Engine::new();

    let expr = engine.interpret("y + x * 2");
    assert!(expr.is_recognized());
    assert!(!expr.is_constant());
    assert_eq!(expr.parameter_names(), vec!["y", "x"]);
    assert_eq!(expr.returns(), ValueType::Integer);
    assert_eq!(expr.evaluate(&[Value::from(1), Value::from(3)]), Value::from(7));

    let expr = engine.interpret("x / 2");
    assert_eq!(expr.returns(), ValueType::Numeric);
    assert!(!expr.is_tolerant());

    let expr = engine.interpret("x");
    assert!(expr.possible_pass_through());

    let expr = engine.interpret("x < 3");
    assert!(expr.is_tolerant());
    assert_eq!(expr.returns(), ValueType::Boolean);

    let expr = engine.interpret("2 +");
    assert!(!expr.is_recognized());
    assert_eq!(expr.returns(), ValueType::String);
    assert!(expr.parameters().is_empty());
}

#[test]
fn random_functions() {
    let engine = Engine::new();
    for _ in 0..20 {
        match engine.execute("random(5)", &[]) {
            Value::Numeric(n) => assert!((0.0..5.0).contains(&n)),
            v => panic!("unexpected {v:?}"),
        }
        match engine.execute("random(2, 8)", &[]) {
            Value::Numeric(n) => assert!((2.0..8.0).contains(&n)),
            v => panic!("unexpected {v:?}"),
        }
        match engine.execute("randomint(1, 7)", &[]) {
            Value::Integer(n) => assert!((1..7).contains(&n)),
            v => panic!("unexpected {v:?}"),
        }
    }
    assert!(!engine.interpret("random() + 1").is_constant());
}

#[test]
fn custom_definition() -> Result<()> {
    let definition = MathDefinition::from_json_str(
        r#"{
            "parameterSeparator": ";",
            "andSymbol": "&&",
            "orSymbol": "||",
            "operatorPrecedenceStyle": "cStyle"
        }"#,
    )?;
    let engine = Engine::with_definition(definition.clone())?;
    assert_eq!(engine.execute("max(1; 4) * 2", &[]), Value::from(8));
    assert_eq!(
        engine.execute("true || false && false", &[]),
        Value::from(true)
    );

    let json = serde_json::to_string(&definition)?;
    assert_eq!(MathDefinition::from_json_str(&json)?, definition);
    Ok(())
}

#[test]
fn invalid_definitions_are_rejected() {
    let definition = MathDefinition {
        parameter_separator: String::new(),
        ..MathDefinition::default()
    };
    assert!(Engine::with_definition(definition).is_err());
    assert!(MathDefinition::from_json_str("{ \"addSymbol\": 1 }").is_err());
}

struct Percent;

impl ConstantInterpreter for Percent {
    fn interpret(&self, text: &str) -> Option<Value> {
        let number = text.strip_suffix("pct")?.parse::<f64>().ok()?;
        Some(Value::from(number / 100.0))
    }
}

struct Currency;

impl StringFormatter for Currency {
    fn format(&self, value: &Value) -> Option<String> {
        match value {
            Value::Numeric(n) => Some(format!("${n:.2}")),
            _ => None,
        }
    }
}

#[test]
fn plugins_interpret_and_format() -> Result<()> {
    let mut plugins = PluginRegistry::new();
    plugins.add_interpreter(Arc::new(Percent));
    plugins.add_formatter(Arc::new(Currency));
    let engine = Engine::with_plugins(MathDefinition::default(), plugins)?;

    assert_eq!(engine.execute("200 * 50pct", &[]), Value::from(100.0));
    assert_eq!(
        engine.execute("\"Total: \" + x", &[Value::from(2.5)]),
        Value::from("Total: $2.50")
    );
    assert_eq!(
        engine.execute("\"Count: \" + x", &[Value::from(3)]),
        Value::from("Count: 3")
    );
    Ok(())
}
