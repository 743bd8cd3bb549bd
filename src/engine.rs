// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::compiler::Compiler;
use crate::definition::{DefinitionError, MathDefinition};
use crate::expression::{CompiledExpression, DataFinder};
use crate::plugins::PluginRegistry;
use crate::value::Value;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

/// Something that turns expression text into a [`CompiledExpression`].
pub trait ExpressionCompiler: Send + Sync {
    fn compile(&self, text: &str) -> CompiledExpression;
}

impl ExpressionCompiler for Compiler {
    fn compile(&self, text: &str) -> CompiledExpression {
        Compiler::compile(self, text)
    }
}

type Slot = Arc<OnceLock<Arc<CompiledExpression>>>;

/// The main entry point: compiles expressions on demand and caches them by
/// source text.
///
/// Concurrent requests for the same text share one compilation; callers that
/// lose the race block until the winner is done.
pub struct Engine {
    compiler: Arc<dyn ExpressionCompiler>,
    cache: Mutex<HashMap<String, Slot>>,
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the default definition and the built-in plugins.
    pub fn new() -> Self {
        let plugins = Arc::new(PluginRegistry::new());
        Self::with_compiler(Arc::new(Compiler::with_default_definition(plugins)))
    }

    pub fn with_definition(definition: MathDefinition) -> Result<Self, DefinitionError> {
        Self::with_plugins(definition, PluginRegistry::new())
    }

    pub fn with_plugins(
        definition: MathDefinition,
        plugins: PluginRegistry,
    ) -> Result<Self, DefinitionError> {
        let compiler = Compiler::new(Arc::new(definition), Arc::new(plugins))?;
        Ok(Self::with_compiler(Arc::new(compiler)))
    }

    pub fn with_compiler(compiler: Arc<dyn ExpressionCompiler>) -> Self {
        Self {
            compiler,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The compiled form of `text`, compiling it at most once.
    pub fn interpret(&self, text: &str) -> Arc<CompiledExpression> {
        let slot = self.cache.lock().entry(text.to_string()).or_default().clone();
        slot.get_or_init(|| Arc::new(self.compiler.compile(text)))
            .clone()
    }

    pub fn execute(&self, text: &str, args: &[Value]) -> Value {
        self.interpret(text).evaluate(args)
    }

    pub fn execute_with_finder(&self, text: &str, finder: &dyn DataFinder) -> Value {
        self.interpret(text).evaluate_with_finder(finder)
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}
