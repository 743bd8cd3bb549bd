// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rewriting stages run before the tree is built.

use super::context::CompilationContext;
use super::markers::OperatorMarkers;
use super::CompileError;
use crate::builtins;
use crate::literal;
use crate::nodes::ExternalParameter;
use crate::plugins::{Extraction, ExtractorLevel};

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(is_identifier_char)
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Byte offset of the first whole-word occurrence of `name` in `text`.
fn first_occurrence(text: &str, name: &str) -> Option<usize> {
    text.match_indices(name).map(|(pos, _)| pos).find(|pos| {
        let before = text[..*pos].chars().next_back();
        let after = text[pos + name.len()..].chars().next();
        !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
    })
}

/// Offset of the `close` token matching an `open` token whose content starts
/// at `from`.
fn matching_close(text: &str, from: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = from;
    while pos < text.len() {
        let rest = &text[pos..];
        if rest.starts_with(open) {
            depth += 1;
            pos += open.len();
        } else if rest.starts_with(close) {
            depth -= 1;
            if depth == 0 {
                return Some(pos);
            }
            pos += close.len();
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

/// Split `text` at separators outside any parentheses.
fn split_arguments<'t>(text: &'t str, open: &str, close: &str, separator: &str) -> Vec<&'t str> {
    let mut args = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        if rest.starts_with(open) {
            depth += 1;
            pos += open.len();
        } else if rest.starts_with(close) {
            depth = depth.saturating_sub(1);
            pos += close.len();
        } else if depth == 0 && rest.starts_with(separator) {
            args.push(&text[start..pos]);
            pos += separator.len();
            start = pos;
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    args.push(&text[start..]);
    args
}

/// Find the leftmost `<function name><open>` in `text`.
/// Returns the offsets of the name and of the open token.
fn find_call(text: &str, open: &str) -> Option<(usize, usize)> {
    text.match_indices(open).find_map(|(at, _)| {
        let head = &text[..at];
        let start = head
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
            .last()
            .map_or(at, |(i, _)| i);
        let name = &text[start..at];
        (is_identifier(name) && builtins::is_function(name)).then_some((start, at))
    })
}

/// Replace the literal spans found by the registered extractors with
/// placeholders. Whitespace outside string literals is dropped once the
/// string level has run.
pub fn extract_constants(ctx: &mut CompilationContext<'_>) -> String {
    let plugins = ctx.plugins;
    let definition = ctx.definition;
    let mut text = ctx.original.to_string();
    let mut stripped = false;

    for extractor in plugins.extractors() {
        if !stripped && extractor.level() > ExtractorLevel::Strings {
            ctx.unquoted = text.clone();
            text = strip_whitespace(&text);
            stripped = true;
        }

        let mut from = 0;
        while from <= text.len() {
            match extractor.scan(&text, from, definition) {
                Extraction::Found { start, end, value } => {
                    let Some(literal) = text
                        .get(start..end)
                        .filter(|_| start >= from && end > start)
                        .map(str::to_string)
                    else {
                        break;
                    };
                    let name = ctx.intern(value, &literal);
                    text.replace_range(start..end, &name);
                    from = start + name.len();
                }
                Extraction::Invalid { at } => {
                    let at = at.max(from);
                    from = at
                        + text
                            .get(at..)
                            .and_then(|t| t.chars().next())
                            .map_or(1, char::len_utf8);
                }
                Extraction::Exhausted => break,
            }
        }
    }

    if stripped {
        text
    } else {
        ctx.unquoted = text.clone();
        strip_whitespace(&text)
    }
}

/// Replace every call of a registered function by a placeholder for a
/// function-call symbol. Arguments that are not plain operands become
/// symbols of their own.
pub fn extract_functions(
    ctx: &mut CompilationContext<'_>,
    markers: &OperatorMarkers,
    text: &str,
) -> Result<String, CompileError> {
    let definition = ctx.definition;
    let (open, close) = (&definition.parentheses.0, &definition.parentheses.1);
    let separator = definition.parameter_separator.as_str();

    let mut out = String::new();
    let mut rest = text;
    while let Some((start, open_at)) = find_call(rest, open) {
        let inner_start = open_at + open.len();
        let close_at = matching_close(rest, inner_start, open, close)
            .ok_or_else(|| CompileError::Unbalanced(text.to_string()))?;
        let name = &rest[start..open_at];
        let inner = &rest[inner_start..close_at];

        let mut args = split_arguments(inner, open, close, separator);
        if args.len() == 1 && args[0].is_empty() {
            args.clear();
        }

        let mut operands = Vec::with_capacity(args.len());
        for arg in args {
            let arg = extract_functions(ctx, markers, arg)?;
            if arg.is_empty() {
                return Err(CompileError::EmptyGroup(text.to_string()));
            }
            let plain = !markers.contains_operator(&arg) && !arg.contains(open.as_str());
            operands.push(if plain {
                arg
            } else {
                ctx.add_symbol(arg, false)
            });
        }

        let call = format!("{name}{open}{}{close}", operands.join(separator));
        let placeholder = ctx.add_symbol(call, true);
        out.push_str(&rest[..start]);
        out.push_str(&placeholder);
        rest = &rest[close_at + close.len()..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Replace parenthesized groups in every non-call symbol by placeholders,
/// innermost first.
pub fn flatten_groups(ctx: &mut CompilationContext<'_>) -> Result<(), CompileError> {
    let definition = ctx.definition;
    let (open, close) = (&definition.parentheses.0, &definition.parentheses.1);

    let keys: Vec<String> = ctx
        .symbols
        .iter()
        .filter(|(_, s)| !s.is_function_call)
        .map(|(k, _)| k.clone())
        .collect();

    for key in keys {
        let Some(mut text) = ctx.symbols.get(&key).map(|s| s.text.clone()) else {
            continue;
        };

        while let Some(open_at) = text.rfind(open.as_str()) {
            let inner_start = open_at + open.len();
            let close_at = text[inner_start..]
                .find(close.as_str())
                .map(|i| inner_start + i)
                .ok_or_else(|| CompileError::Unbalanced(text.clone()))?;
            let inner = text[inner_start..close_at].to_string();
            if inner.is_empty() {
                return Err(CompileError::EmptyGroup(text));
            }
            let name = if ctx.is_known(&inner) {
                inner
            } else {
                ctx.add_symbol(inner, false)
            };
            text.replace_range(open_at..close_at + close.len(), &name);
        }
        if text.contains(close.as_str()) {
            return Err(CompileError::Unbalanced(text));
        }

        if let Some(symbol) = ctx.symbols.get_mut(&key) {
            symbol.text = text;
        }
    }
    Ok(())
}

/// Mark operators in every symbol and classify the operands that are not yet
/// known: literals are interned, identifiers found in the source become
/// external parameters ordered by first occurrence outside string literals.
pub fn populate(ctx: &mut CompilationContext<'_>, markers: &OperatorMarkers) -> Result<(), CompileError> {
    let definition = ctx.definition;
    let open = definition.parentheses.0.as_str();
    let close = definition.parentheses.1.as_str();
    let separator = definition.parameter_separator.as_str();

    let mut operands: Vec<String> = vec![];
    for symbol in ctx.symbols.values_mut() {
        if symbol.is_function_call {
            let inner = symbol
                .text
                .split_once(open)
                .and_then(|(_, rest)| rest.strip_suffix(close))
                .unwrap_or_default();
            operands.extend(
                inner
                    .split(separator)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
            );
        } else {
            symbol.text = markers.mark(&symbol.text);
            operands.extend(
                markers
                    .split_operands(&symbol.text)
                    .into_iter()
                    .map(|o| o.trim().to_string()),
            );
        }
    }

    let mut found: Vec<(usize, String)> = vec![];
    for operand in operands {
        if ctx.is_known(&operand) || found.iter().any(|(_, name)| *name == operand) {
            continue;
        }
        if let Some(value) = literal::parse_literal(&operand, ctx.plugins) {
            ctx.intern(value, &operand);
            continue;
        }
        match first_occurrence(&ctx.unquoted, &operand) {
            Some(offset) if is_identifier(&operand) => found.push((offset, operand)),
            _ => return Err(CompileError::InvalidOperand(operand)),
        }
    }

    found.sort();
    ctx.params = found
        .iter()
        .map(|(_, name)| ExternalParameter::new(name))
        .collect();
    Ok(())
}
