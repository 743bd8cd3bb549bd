// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Extension points consulted while compiling and evaluating expressions.
//!
//! Hosts build a [`PluginRegistry`] explicitly and hand it to the compiler.
//! The registry is shared by `Arc` with every compiled expression so that
//! evaluation formats strings with the same formatters compilation used.

mod extractors;

pub use extractors::{NumericLiteralExtractor, SpecialSymbolExtractor, StringLiteralExtractor};

use crate::definition::MathDefinition;
use crate::value::Value;

use std::sync::Arc;

/// Order in which constant extractors run. Lower levels run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtractorLevel {
    Strings,
    SpecialSymbols,
    Numbers,
    Other,
}

/// Outcome of one constant extractor scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// `text[start..end]` is a literal with the given value.
    Found {
        start: usize,
        end: usize,
        value: Value,
    },
    /// A candidate started at `at` but turned out not to be a literal.
    Invalid { at: usize },
    /// Nothing more to extract.
    Exhausted,
}

/// Finds literal spans in the raw expression text.
pub trait ConstantExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn level(&self) -> ExtractorLevel;

    /// Scan `text` starting at byte offset `from`.
    fn scan(&self, text: &str, from: usize, definition: &MathDefinition) -> Extraction;
}

/// Turns operand text into a value. Tried before the built-in literal
/// grammars.
pub trait ConstantInterpreter: Send + Sync {
    fn interpret(&self, text: &str) -> Option<Value>;

    /// Interpreters with a lower priority run first.
    fn priority(&self) -> i32 {
        0
    }
}

/// Produces the textual form of a value when it is concatenated to a string.
pub trait StringFormatter: Send + Sync {
    /// Return `None` to let the next formatter (or the default form) decide.
    fn format(&self, value: &Value) -> Option<String>;
}

#[derive(Clone)]
pub struct PluginRegistry {
    extractors: Vec<Arc<dyn ConstantExtractor>>,
    interpreters: Vec<Arc<dyn ConstantInterpreter>>,
    formatters: Vec<Arc<dyn StringFormatter>>,
}

impl core::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field(
                "extractors",
                &self.extractors.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("interpreters", &self.interpreters.len())
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    /// Registry holding the built-in extractors.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.add_extractor(Arc::new(StringLiteralExtractor));
        registry.add_extractor(Arc::new(SpecialSymbolExtractor));
        registry.add_extractor(Arc::new(NumericLiteralExtractor));
        registry
    }

    /// Registry without any plugin, not even the built-in extractors.
    pub fn empty() -> Self {
        Self {
            extractors: vec![],
            interpreters: vec![],
            formatters: vec![],
        }
    }

    pub fn add_extractor(&mut self, extractor: Arc<dyn ConstantExtractor>) {
        self.extractors.push(extractor);
        // Stable: extractors of the same level keep registration order.
        self.extractors.sort_by_key(|e| e.level());
    }

    pub fn add_interpreter(&mut self, interpreter: Arc<dyn ConstantInterpreter>) {
        self.interpreters.push(interpreter);
        self.interpreters.sort_by_key(|i| i.priority());
    }

    pub fn add_formatter(&mut self, formatter: Arc<dyn StringFormatter>) {
        self.formatters.push(formatter);
    }

    pub fn extractors(&self) -> impl Iterator<Item = &dyn ConstantExtractor> {
        self.extractors.iter().map(|e| e.as_ref())
    }

    pub fn interpreters(&self) -> impl Iterator<Item = &dyn ConstantInterpreter> {
        self.interpreters.iter().map(|i| i.as_ref())
    }

    /// Textual form of `value`: the first formatter that claims it wins,
    /// otherwise the value's `Display` form.
    pub fn format(&self, value: &Value) -> String {
        if let Value::String(s) = value {
            return s.to_string();
        }
        self.formatters
            .iter()
            .find_map(|f| f.format(value))
            .unwrap_or_else(|| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Percent;

    impl ConstantInterpreter for Percent {
        fn interpret(&self, text: &str) -> Option<Value> {
            let number = text.strip_suffix("pct")?;
            number.parse::<f64>().ok().map(|n| Value::Numeric(n / 100.0))
        }
    }

    struct Hex;

    impl StringFormatter for Hex {
        fn format(&self, value: &Value) -> Option<String> {
            match value {
                Value::Integer(i) => Some(format!("{i:#x}")),
                _ => None,
            }
        }
    }

    #[test]
    fn builtin_extractors_run_in_level_order() {
        let registry = PluginRegistry::new();
        let levels: Vec<_> = registry.extractors().map(|e| e.level()).collect();
        assert_eq!(
            levels,
            vec![
                ExtractorLevel::Strings,
                ExtractorLevel::SpecialSymbols,
                ExtractorLevel::Numbers
            ]
        );
    }

    #[test]
    fn formatters_fall_back_to_display() {
        let mut registry = PluginRegistry::new();
        assert_eq!(registry.format(&Value::Integer(255)), "255");
        registry.add_formatter(Arc::new(Hex));
        assert_eq!(registry.format(&Value::Integer(255)), "0xff");
        assert_eq!(registry.format(&Value::Bool(true)), "true");
    }

    #[test]
    fn interpreters_are_consulted() {
        let mut registry = PluginRegistry::empty();
        registry.add_interpreter(Arc::new(Percent));
        let found: Vec<_> = registry
            .interpreters()
            .filter_map(|i| i.interpret("50pct"))
            .collect();
        assert_eq!(found, vec![Value::Numeric(0.5)]);
    }
}
