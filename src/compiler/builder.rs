// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::context::CompilationContext;
use super::markers::OperatorMarkers;
use super::CompileError;
use crate::builtins;
use crate::definition::MathDefinition;
use crate::nodes::{BinaryOp, Node, UnaryOp};

use log::trace;
use regex::Regex;

/// Splits attempted per compilation before giving up on the text.
pub const MAX_SPLITS: usize = 100_000;

/// Turns symbol text into nodes.
///
/// Binary operators are tried loosest tier first and, within a tier, at the
/// rightmost occurrence first; a failed split restores the parameter
/// registry and moves on to the next candidate. Every composite text is
/// built at most once per set of parameter masks.
pub struct Builder<'c> {
    markers: &'c OperatorMarkers,
    function_call: &'c Regex,
    separator: &'c str,
    /// (operator, tier, marked token)
    binary: Vec<(BinaryOp, u8, &'c str)>,
    unary: [(UnaryOp, &'c str); 2],
}

impl<'c> Builder<'c> {
    pub fn new(
        definition: &'c MathDefinition,
        markers: &'c OperatorMarkers,
        function_call: &'c Regex,
    ) -> Self {
        let style = definition.operator_precedence_style;
        let binary = BinaryOp::with_tokens(definition)
            .into_iter()
            .map(|(op, token)| (op, op.tier(style), markers.marked(token)))
            .collect();
        let unary = [
            (
                UnaryOp::Negate,
                markers.marked(definition.subtract_symbol.as_str()),
            ),
            (UnaryOp::Not, markers.marked(definition.not_symbol.as_str())),
        ];

        Self {
            markers,
            function_call,
            separator: definition.parameter_separator.as_str(),
            binary,
            unary,
        }
    }

    pub fn build(&self, ctx: &mut CompilationContext<'_>, key: &str) -> Result<Node, CompileError> {
        if let Some(constant) = ctx.constant(key) {
            return Ok(Node::constant(constant.value.clone(), &constant.text));
        }
        if let Some(id) = ctx.param_index(key) {
            return Ok(Node::parameter(id));
        }
        if let Some(symbol) = ctx.symbols.get(key).cloned() {
            if symbol.text == key {
                return Err(CompileError::Unresolved(key.to_string()));
            }
            return if symbol.is_function_call {
                self.build_call(ctx, &symbol.text)
            } else {
                self.build(ctx, &symbol.text)
            };
        }

        let memo = (key.to_string(), ctx.param_masks());
        if let Some(built) = ctx.built.get(&memo).cloned() {
            let (node, masks) = built?;
            ctx.restore_masks(&masks);
            return Ok(node);
        }
        let result = self.build_composite(ctx, key);
        let built = result.clone().map(|node| (node, ctx.param_masks()));
        ctx.built.insert(memo, built);
        result
    }

    fn build_composite(
        &self,
        ctx: &mut CompilationContext<'_>,
        key: &str,
    ) -> Result<Node, CompileError> {
        if self.function_call.is_match(key) {
            return self.build_call(ctx, key);
        }

        if let Some(node) = self.build_binary(ctx, key)? {
            return Ok(node);
        }
        if let Some(node) = self.build_unary(ctx, key)? {
            return Ok(node);
        }
        Err(CompileError::Unresolved(self.markers.unmark(key)))
    }

    fn spend_split(&self, ctx: &mut CompilationContext<'_>) -> Result<(), CompileError> {
        ctx.splits += 1;
        if ctx.splits > MAX_SPLITS {
            return Err(CompileError::TooComplex(MAX_SPLITS));
        }
        Ok(())
    }

    fn build_call(&self, ctx: &mut CompilationContext<'_>, text: &str) -> Result<Node, CompileError> {
        let captures = self
            .function_call
            .captures(text)
            .ok_or_else(|| CompileError::Unresolved(text.to_string()))?;
        let name = captures.get(1).map_or("", |m| m.as_str());
        let inner = captures.get(2).map_or("", |m| m.as_str());
        let args: Vec<&str> = if inner.is_empty() {
            vec![]
        } else {
            inner.split(self.separator).collect()
        };

        let function =
            builtins::lookup(name, args.len()).ok_or_else(|| CompileError::UnknownFunction {
                name: name.to_string(),
                arity: args.len(),
            })?;
        let args = args
            .into_iter()
            .map(|arg| self.build(ctx, arg))
            .collect::<Result<Vec<_>, _>>()?;

        let node = Node::call(function, args, &mut ctx.params)?;
        Ok(node.simplify(&self.markers.unmark(text), ctx.plugins))
    }

    fn build_binary(
        &self,
        ctx: &mut CompilationContext<'_>,
        text: &str,
    ) -> Result<Option<Node>, CompileError> {
        let mut candidates: Vec<(u8, usize, BinaryOp, usize)> = self
            .binary
            .iter()
            .flat_map(|(op, tier, token)| {
                text.match_indices(*token)
                    .map(move |(pos, _)| (*tier, pos, *op, token.len()))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        for (_, pos, op, len) in candidates {
            if pos == 0 {
                continue;
            }
            let (left, right) = (&text[..pos], &text[pos + len..]);
            if left.trim().is_empty() || right.trim().is_empty() {
                continue;
            }

            self.spend_split(ctx)?;
            let saved = ctx.params.clone();
            let split = self.build(ctx, left).and_then(|left| {
                let right = self.build(ctx, right)?;
                Ok(Node::binary(op, left, right, &mut ctx.params)?)
            });
            match split {
                Ok(node) => {
                    return Ok(Some(
                        node.simplify(&self.markers.unmark(text), ctx.plugins),
                    ))
                }
                Err(err @ CompileError::TooComplex(_)) => return Err(err),
                Err(err) => {
                    trace!(
                        "`{}` does not split at {op:?} ({pos}): {err}",
                        self.markers.unmark(text)
                    );
                    ctx.params = saved;
                }
            }
        }
        Ok(None)
    }

    fn build_unary(
        &self,
        ctx: &mut CompilationContext<'_>,
        text: &str,
    ) -> Result<Option<Node>, CompileError> {
        for (op, token) in self.unary {
            let Some(rest) = text.strip_prefix(token).filter(|r| !r.trim().is_empty()) else {
                continue;
            };

            self.spend_split(ctx)?;
            let saved = ctx.params.clone();
            let operand = self
                .build(ctx, rest)
                .and_then(|operand| Ok(Node::unary(op, operand, &mut ctx.params)?));
            match operand {
                Ok(node) => {
                    return Ok(Some(
                        node.simplify(&self.markers.unmark(text), ctx.plugins),
                    ))
                }
                Err(err @ CompileError::TooComplex(_)) => return Err(err),
                Err(err) => {
                    trace!("`{}` is not {op:?}: {err}", self.markers.unmark(text));
                    ctx.params = saved;
                }
            }
        }
        Ok(None)
    }
}
