// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::unwrap_used)] // static patterns

use super::{ConstantExtractor, Extraction, ExtractorLevel};
use crate::constants;
use crate::definition::MathDefinition;
use crate::literal;
use crate::value::Value;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NUMERIC_LITERAL: Regex = Regex::new(
        r"0[bB][01_]+|(?:0[xX]|&[hH])[0-9a-fA-F]+|\d+(?:\.\d+)?[eE][+-]?\d+"
    )
    .unwrap();
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Quoted strings. The escape character makes the next character literal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringLiteralExtractor;

impl ConstantExtractor for StringLiteralExtractor {
    fn name(&self) -> &str {
        "strings"
    }

    fn level(&self) -> ExtractorLevel {
        ExtractorLevel::Strings
    }

    fn scan(&self, text: &str, from: usize, definition: &MathDefinition) -> Extraction {
        let quote = definition.string_indicator.as_str();
        let escape = definition.escape_character.as_str();

        let Some(offset) = text.get(from..).and_then(|t| t.find(quote)) else {
            return Extraction::Exhausted;
        };
        let start = from + offset;
        let mut pos = start + quote.len();
        let mut content = String::new();

        while pos < text.len() {
            let rest = &text[pos..];
            if rest.starts_with(escape) {
                let after = pos + escape.len();
                match text[after..].chars().next() {
                    Some(c) => {
                        content.push(c);
                        pos = after + c.len_utf8();
                    }
                    None => break,
                }
            } else if rest.starts_with(quote) {
                return Extraction::Found {
                    start,
                    end: pos + quote.len(),
                    value: Value::from(content),
                };
            } else if let Some(c) = rest.chars().next() {
                content.push(c);
                pos += c.len_utf8();
            }
        }

        // Unterminated string.
        Extraction::Exhausted
    }
}

/// Named constants between the special symbol indicators, e.g. `[pi]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpecialSymbolExtractor;

impl ConstantExtractor for SpecialSymbolExtractor {
    fn name(&self) -> &str {
        "special symbols"
    }

    fn level(&self) -> ExtractorLevel {
        ExtractorLevel::SpecialSymbols
    }

    fn scan(&self, text: &str, from: usize, definition: &MathDefinition) -> Extraction {
        let (open, close) = &definition.special_symbol_indicators;

        let Some(offset) = text.get(from..).and_then(|t| t.find(open.as_str())) else {
            return Extraction::Exhausted;
        };
        let start = from + offset;
        let name_start = start + open.len();
        let Some(length) = text[name_start..].find(close.as_str()) else {
            return Extraction::Exhausted;
        };
        let name = &text[name_start..name_start + length];

        match constants::special_symbol(name).and_then(constants::named_constant) {
            Some(value) => Extraction::Found {
                start,
                end: name_start + length + close.len(),
                value,
            },
            None => Extraction::Invalid { at: start },
        }
    }
}

/// Numeric literals that operator scanning would otherwise tear apart:
/// scientific notation (`1.5e-3`), hex (`0x1F`, `&hFF`) and binary
/// (`0b0000_0001`).
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericLiteralExtractor;

impl ConstantExtractor for NumericLiteralExtractor {
    fn name(&self) -> &str {
        "numbers"
    }

    fn level(&self) -> ExtractorLevel {
        ExtractorLevel::Numbers
    }

    fn scan(&self, text: &str, from: usize, _definition: &MathDefinition) -> Extraction {
        let Some(m) = NUMERIC_LITERAL.find_at(text, from) else {
            return Extraction::Exhausted;
        };

        let inside_identifier = text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(is_identifier_char)
            || text[m.end()..].chars().next().is_some_and(is_identifier_char);
        if inside_identifier {
            return Extraction::Invalid { at: m.start() };
        }

        match literal::parse_binary(m.as_str()).or_else(|| literal::parse_numeric(m.as_str())) {
            Some(value) => Extraction::Found {
                start: m.start(),
                end: m.end(),
                value,
            },
            None => Extraction::Invalid { at: m.start() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(extractor: &dyn ConstantExtractor, text: &str) -> Extraction {
        extractor.scan(text, 0, &MathDefinition::default())
    }

    #[test]
    fn strings_honor_escapes() {
        assert_eq!(
            scan(&StringLiteralExtractor, r#"x + "say \"hi\"" + y"#),
            Extraction::Found {
                start: 4,
                end: 16,
                value: Value::from(r#"say "hi""#),
            }
        );
        assert_eq!(
            scan(&StringLiteralExtractor, r#"x + "open"#),
            Extraction::Exhausted
        );
    }

    #[test]
    fn special_symbols_resolve_aliases() {
        assert_eq!(
            scan(&SpecialSymbolExtractor, "2*[pi]"),
            Extraction::Found {
                start: 2,
                end: 6,
                value: Value::Numeric(core::f64::consts::PI),
            }
        );
        assert_eq!(
            scan(&SpecialSymbolExtractor, "[nope]+1"),
            Extraction::Invalid { at: 0 }
        );
    }

    #[test]
    fn numbers_outside_identifiers_only() {
        assert_eq!(
            scan(&NumericLiteralExtractor, "1.5e-3+x"),
            Extraction::Found {
                start: 0,
                end: 6,
                value: Value::Numeric(0.0015),
            }
        );
        assert_eq!(
            scan(&NumericLiteralExtractor, "length(0b0000_0001)"),
            Extraction::Found {
                start: 7,
                end: 18,
                value: Value::from(vec![1]),
            }
        );
        assert_eq!(
            scan(&NumericLiteralExtractor, "x12e5"),
            Extraction::Invalid { at: 1 }
        );
        assert_eq!(scan(&NumericLiteralExtractor, "a+b"), Extraction::Exhausted);
    }
}
