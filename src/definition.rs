// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the logical operators bind relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorPrecedenceStyle {
    /// AND, OR and XOR share one tier and associate left to right.
    #[default]
    Mathematical,
    /// AND binds tighter than XOR, which binds tighter than OR.
    CStyle,
}

/// Host configuration errors. These are programming errors and are reported
/// immediately rather than degraded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("token `{field}` must not be empty")]
    EmptyToken { field: &'static str },

    #[error("token `{field}` must not contain whitespace")]
    WhitespaceInToken { field: &'static str },

    #[error("operator `{field}` (`{token}`) must contain at least one symbol character")]
    IdentifierOperator { field: &'static str, token: String },

    #[error("`{field}` uses the same token `{token}` to open and close")]
    SameDelimiters { field: &'static str, token: String },

    #[error("operator token `{token}` is used by both `{first}` and `{second}`")]
    DuplicateOperator {
        token: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("invalid definition: {0}")]
    Json(String),

    #[error("cannot build a pattern from the definition tokens: {0}")]
    Pattern(String),
}

/// Every token the expression grammar is made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MathDefinition {
    pub parentheses: (String, String),
    pub special_symbol_indicators: (String, String),
    pub string_indicator: String,
    pub parameter_separator: String,
    pub escape_character: String,

    pub add_symbol: String,
    pub subtract_symbol: String,
    pub multiply_symbol: String,
    pub divide_symbol: String,
    pub modulo_symbol: String,
    pub power_symbol: String,

    pub equals_symbol: String,
    pub not_equals_symbol: String,
    pub greater_than_symbol: String,
    pub greater_than_or_equal_symbol: String,
    pub less_than_symbol: String,
    pub less_than_or_equal_symbol: String,

    pub and_symbol: String,
    pub or_symbol: String,
    pub xor_symbol: String,
    pub not_symbol: String,

    pub left_shift_symbol: String,
    pub right_shift_symbol: String,

    pub operator_precedence_style: OperatorPrecedenceStyle,
}

impl Default for MathDefinition {
    fn default() -> Self {
        Self {
            parentheses: ("(".into(), ")".into()),
            special_symbol_indicators: ("[".into(), "]".into()),
            string_indicator: "\"".into(),
            parameter_separator: ",".into(),
            escape_character: "\\".into(),

            add_symbol: "+".into(),
            subtract_symbol: "-".into(),
            multiply_symbol: "*".into(),
            divide_symbol: "/".into(),
            modulo_symbol: "%".into(),
            power_symbol: "^".into(),

            equals_symbol: "=".into(),
            not_equals_symbol: "!=".into(),
            greater_than_symbol: ">".into(),
            greater_than_or_equal_symbol: ">=".into(),
            less_than_symbol: "<".into(),
            less_than_or_equal_symbol: "<=".into(),

            and_symbol: "&".into(),
            or_symbol: "|".into(),
            xor_symbol: "#".into(),
            not_symbol: "!".into(),

            left_shift_symbol: "<<".into(),
            right_shift_symbol: ">>".into(),

            operator_precedence_style: OperatorPrecedenceStyle::Mathematical,
        }
    }
}

impl MathDefinition {
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        let definition: MathDefinition =
            serde_json::from_str(json).map_err(|e| DefinitionError::Json(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn c_style() -> Self {
        Self {
            operator_precedence_style: OperatorPrecedenceStyle::CStyle,
            ..Self::default()
        }
    }

    /// Binary operator tokens paired with their field names.
    pub(crate) fn binary_tokens(&self) -> [(&'static str, &str); 17] {
        [
            ("addSymbol", self.add_symbol.as_str()),
            ("subtractSymbol", self.subtract_symbol.as_str()),
            ("multiplySymbol", self.multiply_symbol.as_str()),
            ("divideSymbol", self.divide_symbol.as_str()),
            ("moduloSymbol", self.modulo_symbol.as_str()),
            ("powerSymbol", self.power_symbol.as_str()),
            ("equalsSymbol", self.equals_symbol.as_str()),
            ("notEqualsSymbol", self.not_equals_symbol.as_str()),
            ("greaterThanSymbol", self.greater_than_symbol.as_str()),
            ("greaterThanOrEqualSymbol", self.greater_than_or_equal_symbol.as_str()),
            ("lessThanSymbol", self.less_than_symbol.as_str()),
            ("lessThanOrEqualSymbol", self.less_than_or_equal_symbol.as_str()),
            ("andSymbol", self.and_symbol.as_str()),
            ("orSymbol", self.or_symbol.as_str()),
            ("xorSymbol", self.xor_symbol.as_str()),
            ("leftShiftSymbol", self.left_shift_symbol.as_str()),
            ("rightShiftSymbol", self.right_shift_symbol.as_str()),
        ]
    }

    /// Check that the definition can drive the compiler.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let delimiters = [
            ("parentheses", &self.parentheses.0),
            ("parentheses", &self.parentheses.1),
            ("specialSymbolIndicators", &self.special_symbol_indicators.0),
            ("specialSymbolIndicators", &self.special_symbol_indicators.1),
            ("stringIndicator", &self.string_indicator),
            ("parameterSeparator", &self.parameter_separator),
            ("escapeCharacter", &self.escape_character),
        ];
        let operators = self.binary_tokens();

        for (field, token) in delimiters
            .iter()
            .map(|(f, t)| (*f, t.as_str()))
            .chain(operators.iter().copied())
            .chain([("notSymbol", self.not_symbol.as_str())])
        {
            if token.is_empty() {
                return Err(DefinitionError::EmptyToken { field });
            }
            if token.chars().any(char::is_whitespace) {
                return Err(DefinitionError::WhitespaceInToken { field });
            }
        }

        for (field, token) in operators
            .iter()
            .copied()
            .chain([("notSymbol", self.not_symbol.as_str())])
        {
            if token.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(DefinitionError::IdentifierOperator {
                    field,
                    token: token.to_string(),
                });
            }
        }

        for (field, (open, close)) in [
            ("parentheses", &self.parentheses),
            ("specialSymbolIndicators", &self.special_symbol_indicators),
        ] {
            if open == close {
                return Err(DefinitionError::SameDelimiters {
                    field,
                    token: open.clone(),
                });
            }
        }

        let mut seen: Vec<(&'static str, &str)> = vec![];
        for (field, token) in operators {
            if let Some((first, _)) = seen.iter().find(|(_, t)| *t == token) {
                return Err(DefinitionError::DuplicateOperator {
                    token: token.to_string(),
                    first: *first,
                    second: field,
                });
            }
            seen.push((field, token));
        }

        Ok(())
    }

    /// All operator tokens, longest first.
    pub(crate) fn operator_tokens(&self) -> Vec<String> {
        let mut tokens: BTreeSet<&str> = self.binary_tokens().iter().map(|(_, t)| *t).collect();
        tokens.insert(&self.not_symbol);
        let mut tokens: Vec<String> = tokens.into_iter().map(String::from).collect();
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens
    }
}
