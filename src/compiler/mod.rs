// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compilation of expression text into a [`CompiledExpression`].
//!
//! The text is rewritten in stages: literal extraction, function call
//! extraction, parenthesis flattening and operand classification. The
//! recursive [`builder::Builder`] then turns the resulting symbol table into a
//! typed node tree. Cancellation is only observed between stages.

#![allow(clippy::unwrap_used)] // static patterns

mod builder;
mod context;
mod extract;
mod markers;

use crate::definition::{DefinitionError, MathDefinition};
use crate::expression::CompiledExpression;
use crate::nodes::{ExternalParameter, Node, TypeError};
use crate::plugins::PluginRegistry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use context::{CompilationContext, Symbol, MAIN_SYMBOL};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("expression is empty")]
    Empty,

    #[error("unbalanced parentheses in `{0}`")]
    Unbalanced(String),

    #[error("empty group or argument in `{0}`")]
    EmptyGroup(String),

    #[error("`{0}` is neither a literal nor a parameter name")]
    InvalidOperand(String),

    #[error("no function `{name}` taking {arity} arguments")]
    UnknownFunction { name: String, arity: usize },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("cannot resolve `{0}`")]
    Unresolved(String),

    #[error("gave up after {0} split attempts")]
    TooComplex(usize),

    #[error("compilation cancelled")]
    Cancelled,
}

/// Cooperative cancellation of a compilation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), CompileError> {
        if self.is_cancelled() {
            return Err(CompileError::Cancelled);
        }
        Ok(())
    }
}

/// `name<open>args<close>` spanning the whole text.
fn call_pattern(open: &str, close: &str) -> String {
    format!(
        r"(?s)^([\p{{L}}_][\p{{L}}\p{{N}}_]*){}(.*){}$",
        regex::escape(open),
        regex::escape(close)
    )
}

lazy_static! {
    static ref DEFAULT_FUNCTION_CALL: Regex = Regex::new(&call_pattern("(", ")")).unwrap();
}

/// Compiles expression text under one definition and plugin registry.
#[derive(Debug, Clone)]
pub struct Compiler {
    definition: Arc<MathDefinition>,
    plugins: Arc<PluginRegistry>,
    markers: markers::OperatorMarkers,
    function_call: Regex,
}

impl Compiler {
    pub fn new(
        definition: Arc<MathDefinition>,
        plugins: Arc<PluginRegistry>,
    ) -> Result<Self, DefinitionError> {
        definition.validate()?;

        let (open, close) = &definition.parentheses;
        let function_call = Regex::new(&call_pattern(open, close))
            .map_err(|e| DefinitionError::Pattern(e.to_string()))?;

        Ok(Self {
            markers: markers::OperatorMarkers::new(&definition),
            definition,
            plugins,
            function_call,
        })
    }

    /// Compiler for [`MathDefinition::default`].
    pub fn with_default_definition(plugins: Arc<PluginRegistry>) -> Self {
        let definition = Arc::new(MathDefinition::default());
        Self {
            markers: markers::OperatorMarkers::new(&definition),
            definition,
            plugins,
            function_call: DEFAULT_FUNCTION_CALL.clone(),
        }
    }

    pub fn definition(&self) -> &MathDefinition {
        &self.definition
    }

    pub fn plugins(&self) -> &Arc<PluginRegistry> {
        &self.plugins
    }

    /// Compile `text`. Text that cannot be compiled yields an unrecognized
    /// expression which evaluates to `text` itself.
    pub fn compile(&self, text: &str) -> CompiledExpression {
        self.compile_cancellable(text, &CancellationToken::new())
            .unwrap_or_else(|_| CompiledExpression::unrecognized(text, self.plugins.clone()))
    }

    /// Like [`Compiler::compile`], but gives up with
    /// [`CompileError::Cancelled`] once `token` is cancelled.
    pub fn compile_cancellable(
        &self,
        text: &str,
        token: &CancellationToken,
    ) -> Result<CompiledExpression, CompileError> {
        match self.build(text, token) {
            Ok((root, params)) => Ok(CompiledExpression::new(
                text,
                root,
                params,
                self.plugins.clone(),
            )),
            Err(CompileError::Cancelled) => Err(CompileError::Cancelled),
            Err(err) => {
                debug!("`{text}` is not a recognized expression: {err}");
                Ok(CompiledExpression::unrecognized(text, self.plugins.clone()))
            }
        }
    }

    fn build(
        &self,
        text: &str,
        token: &CancellationToken,
    ) -> Result<(Node, Vec<ExternalParameter>), CompileError> {
        let mut ctx = CompilationContext::new(&self.definition, &self.plugins, text);

        token.check()?;
        let main = extract::extract_constants(&mut ctx);
        debug!(
            "`{text}`: {} literal(s) extracted, rewritten as `{main}`",
            ctx.reverse_constants.len()
        );
        if main.is_empty() {
            return Err(CompileError::Empty);
        }

        token.check()?;
        ctx.symbols.insert(
            MAIN_SYMBOL.to_string(),
            Symbol {
                text: main.clone(),
                is_function_call: false,
            },
        );

        token.check()?;
        let main = extract::extract_functions(&mut ctx, &self.markers, &main)?;
        if let Some(symbol) = ctx.symbols.get_mut(MAIN_SYMBOL) {
            symbol.text = main;
        }

        token.check()?;
        extract::flatten_groups(&mut ctx)?;

        token.check()?;
        extract::populate(&mut ctx, &self.markers)?;
        debug!(
            "`{text}`: {} symbol(s), parameters {:?}",
            ctx.symbols.len(),
            ctx.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
        );

        token.check()?;
        let builder = builder::Builder::new(&self.definition, &self.markers, &self.function_call);
        let mut root = builder.build(&mut ctx, MAIN_SYMBOL)?;
        root.refresh(&ctx.params)?;

        Ok((root, ctx.params))
    }
}
