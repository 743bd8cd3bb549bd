// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::definition::MathDefinition;

/// Operator tokens as they are written in rewritten symbol text.
///
/// A token containing a shorter token (`>=` contains `>` and `=`) is replaced
/// everywhere by a unique `@op{N}@` marker, so scanning for the shorter token
/// never splits the longer one.
#[derive(Debug, Clone)]
pub struct OperatorMarkers {
    /// (token, marked form), longest token first.
    tokens: Vec<(String, String)>,
}

impl OperatorMarkers {
    pub fn new(definition: &MathDefinition) -> Self {
        let tokens = definition.operator_tokens();
        let mut next = 0;
        let tokens = tokens
            .iter()
            .map(|token| {
                let shadows = tokens
                    .iter()
                    .any(|other| other.len() < token.len() && token.contains(other.as_str()));
                if shadows {
                    let marker = format!("@op{next}@");
                    next += 1;
                    (token.clone(), marker)
                } else {
                    (token.clone(), token.clone())
                }
            })
            .collect();
        Self { tokens }
    }

    pub fn mark(&self, text: &str) -> String {
        self.tokens
            .iter()
            .filter(|(token, marked)| token != marked)
            .fold(text.to_string(), |text, (token, marked)| {
                text.replace(token.as_str(), marked)
            })
    }

    pub fn unmark(&self, text: &str) -> String {
        self.tokens
            .iter()
            .filter(|(token, marked)| token != marked)
            .fold(text.to_string(), |text, (token, marked)| {
                text.replace(marked.as_str(), token)
            })
    }

    /// The form `token` takes in marked text.
    pub fn marked<'s>(&'s self, token: &'s str) -> &'s str {
        self.tokens
            .iter()
            .find(|(t, _)| t == token)
            .map_or(token, |(_, marked)| marked.as_str())
    }

    /// Whether unmarked `text` contains any operator.
    pub fn contains_operator(&self, text: &str) -> bool {
        self.tokens.iter().any(|(token, _)| text.contains(token.as_str()))
    }

    /// Split marked `text` at every operator. Empty operands are dropped.
    pub fn split_operands<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut operands = vec![];
        let mut start = 0;
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            match self
                .tokens
                .iter()
                .find(|(_, marked)| rest.starts_with(marked.as_str()))
            {
                Some((_, marked)) => {
                    operands.push(&text[start..pos]);
                    pos += marked.len();
                    start = pos;
                }
                None => pos += rest.chars().next().map_or(1, char::len_utf8),
            }
        }
        operands.push(&text[start..]);
        operands.retain(|o| !o.trim().is_empty());
        operands
    }
}
