// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Working state of a single compilation.

use crate::constants::NAMED_CONSTANTS;
use super::CompileError;
use crate::definition::MathDefinition;
use crate::nodes::{ExternalParameter, Node};
use crate::plugins::PluginRegistry;
use crate::types::SupportedTypes;
use crate::value::Value;

use std::collections::{BTreeMap, HashMap};

/// A named sub-expression produced by rewriting the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Rewritten text, with operator markers applied.
    pub text: String,
    /// `name(arg, ...)`, where every argument is a plain operand or a symbol.
    pub is_function_call: bool,
}

/// A constant known to the compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: Value,
    /// Source text the constant was read from.
    pub text: String,
}

/// Outcome of building one text under one set of parameter masks, with the
/// masks the build left behind.
pub type Built = Result<(Node, Vec<SupportedTypes>), CompileError>;

/// Key of the symbol holding the whole expression.
pub const MAIN_SYMBOL: &str = "";

/// Owns the symbol, constant and parameter tables of one compile call.
#[derive(Debug)]
pub struct CompilationContext<'a> {
    pub definition: &'a MathDefinition,
    pub plugins: &'a PluginRegistry,
    pub original: &'a str,

    /// The source with string literals replaced by placeholders.
    pub unquoted: String,

    pub symbols: BTreeMap<String, Symbol>,

    /// Constants by placeholder (or built-in) name.
    pub constants: HashMap<String, Constant>,

    /// Placeholder name by literal text.
    pub reverse_constants: HashMap<String, String>,

    /// External parameters, ordered by first occurrence once populated.
    pub params: Vec<ExternalParameter>,

    /// Builds already attempted, by text and parameter masks.
    pub built: HashMap<(String, Vec<SupportedTypes>), Built>,

    /// Binary and unary splits attempted so far.
    pub splits: usize,

    counter: usize,
}

impl<'a> CompilationContext<'a> {
    pub fn new(definition: &'a MathDefinition, plugins: &'a PluginRegistry, original: &'a str) -> Self {
        let constants = NAMED_CONSTANTS
            .iter()
            .map(|(name, v)| {
                (
                    name.to_string(),
                    Constant {
                        value: Value::Numeric(*v),
                        text: name.to_string(),
                    },
                )
            })
            .collect();

        Self {
            definition,
            plugins,
            original,
            unquoted: original.to_string(),
            symbols: BTreeMap::new(),
            constants,
            reverse_constants: HashMap::new(),
            params: vec![],
            built: HashMap::new(),
            splits: 0,
            counter: 0,
        }
    }

    /// A placeholder name that occurs neither in the source nor in any table.
    pub fn fresh_name(&mut self) -> String {
        loop {
            self.counter += 1;
            let name = format!("item{:04}", self.counter);
            if !self.original.contains(&name) && !self.is_known(&name) {
                return name;
            }
        }
    }

    /// Register `value`, read from `text`, as a constant. Identical text is
    /// interned to a single name.
    pub fn intern(&mut self, value: Value, text: &str) -> String {
        if let Some(name) = self.reverse_constants.get(text) {
            return name.clone();
        }
        let name = self.fresh_name();
        self.constants.insert(
            name.clone(),
            Constant {
                value,
                text: text.to_string(),
            },
        );
        self.reverse_constants.insert(text.to_string(), name.clone());
        name
    }

    pub fn add_symbol(&mut self, text: String, is_function_call: bool) -> String {
        let name = self.fresh_name();
        self.symbols.insert(
            name.clone(),
            Symbol {
                text,
                is_function_call,
            },
        );
        name
    }

    pub fn constant(&self, key: &str) -> Option<&Constant> {
        self.constants.get(key).or_else(|| {
            self.reverse_constants
                .get(key)
                .and_then(|name| self.constants.get(name))
        })
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn param_masks(&self) -> Vec<SupportedTypes> {
        self.params.iter().map(|p| p.supported).collect()
    }

    pub fn restore_masks(&mut self, masks: &[SupportedTypes]) {
        for (param, mask) in self.params.iter_mut().zip(masks) {
            param.supported = *mask;
        }
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.constant(key).is_some()
            || self.symbols.contains_key(key)
            || self.param_index(key).is_some()
    }
}
