// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::builtins::comparison::CompareOp;
use crate::definition::{MathDefinition, OperatorPrecedenceStyle};
use crate::types::ValueType as T;

use super::Signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Compare(CompareOp),
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl BinaryOp {
    /// Every binary operator paired with its token in `definition`.
    pub fn with_tokens(definition: &MathDefinition) -> [(BinaryOp, &str); 17] {
        [
            (BinaryOp::Add, definition.add_symbol.as_str()),
            (BinaryOp::Subtract, definition.subtract_symbol.as_str()),
            (BinaryOp::Multiply, definition.multiply_symbol.as_str()),
            (BinaryOp::Divide, definition.divide_symbol.as_str()),
            (BinaryOp::Modulo, definition.modulo_symbol.as_str()),
            (BinaryOp::Power, definition.power_symbol.as_str()),
            (BinaryOp::Compare(CompareOp::Eq), definition.equals_symbol.as_str()),
            (BinaryOp::Compare(CompareOp::Ne), definition.not_equals_symbol.as_str()),
            (BinaryOp::Compare(CompareOp::Gt), definition.greater_than_symbol.as_str()),
            (
                BinaryOp::Compare(CompareOp::Ge),
                definition.greater_than_or_equal_symbol.as_str(),
            ),
            (BinaryOp::Compare(CompareOp::Lt), definition.less_than_symbol.as_str()),
            (
                BinaryOp::Compare(CompareOp::Le),
                definition.less_than_or_equal_symbol.as_str(),
            ),
            (BinaryOp::And, definition.and_symbol.as_str()),
            (BinaryOp::Or, definition.or_symbol.as_str()),
            (BinaryOp::Xor, definition.xor_symbol.as_str()),
            (BinaryOp::ShiftLeft, definition.left_shift_symbol.as_str()),
            (BinaryOp::ShiftRight, definition.right_shift_symbol.as_str()),
        ]
    }

    /// Precedence tier. Lower tiers bind looser and are split first.
    pub fn tier(self, style: OperatorPrecedenceStyle) -> u8 {
        match (self, style) {
            (BinaryOp::Compare(_), _) => 0,
            (BinaryOp::And | BinaryOp::Or | BinaryOp::Xor, OperatorPrecedenceStyle::Mathematical) => 10,
            (BinaryOp::Or, OperatorPrecedenceStyle::CStyle) => 10,
            (BinaryOp::Xor, OperatorPrecedenceStyle::CStyle) => 11,
            (BinaryOp::And, OperatorPrecedenceStyle::CStyle) => 12,
            (BinaryOp::Add | BinaryOp::Subtract, _) => 20,
            (BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo, _) => 30,
            (BinaryOp::ShiftLeft | BinaryOp::ShiftRight, _) => 40,
            (BinaryOp::Power, _) => 50,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Compare(_))
    }

    pub fn result_type(self, left: T, right: T) -> Option<T> {
        match (self, left, right) {
            (BinaryOp::Add, T::String, _) | (BinaryOp::Add, _, T::String) => Some(T::String),
            (BinaryOp::Add, T::ByteArray, T::ByteArray) => Some(T::ByteArray),
            (
                BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Modulo,
                T::Integer,
                T::Integer,
            ) => Some(T::Integer),
            (
                BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Modulo
                | BinaryOp::Divide
                | BinaryOp::Power,
                T::Numeric,
                T::Numeric,
            ) => Some(T::Numeric),

            (BinaryOp::And | BinaryOp::Or | BinaryOp::Xor, l, r)
                if l == r && matches!(l, T::Boolean | T::Integer | T::ByteArray) =>
            {
                Some(l)
            }

            (BinaryOp::ShiftLeft | BinaryOp::ShiftRight, T::Integer | T::ByteArray, T::Integer) => {
                Some(left)
            }

            (BinaryOp::Compare(CompareOp::Eq | CompareOp::Ne), l, r)
                if l == r && l != T::Unknown =>
            {
                Some(T::Boolean)
            }
            (BinaryOp::Compare(_), l, r)
                if l == r && matches!(l, T::Integer | T::Numeric | T::String | T::ByteArray) =>
            {
                Some(T::Boolean)
            }

            _ => None,
        }
    }

    /// Overloads over every pair of concrete types, in preference order.
    pub fn signatures(self) -> Vec<Signature> {
        T::CONCRETE
            .into_iter()
            .flat_map(|l| T::CONCRETE.into_iter().map(move |r| (l, r)))
            .filter_map(|(l, r)| {
                self.result_type(l, r).map(|result| Signature {
                    args: vec![l, r],
                    result,
                })
            })
            .collect()
    }
}

impl UnaryOp {
    pub fn result_type(self, operand: T) -> Option<T> {
        match (self, operand) {
            (UnaryOp::Negate, T::Integer | T::Numeric) => Some(operand),
            (UnaryOp::Not, T::Boolean | T::Integer | T::ByteArray) => Some(operand),
            _ => None,
        }
    }

    pub fn signatures(self) -> Vec<Signature> {
        T::CONCRETE
            .into_iter()
            .filter_map(|t| {
                self.result_type(t).map(|result| Signature {
                    args: vec![t],
                    result,
                })
            })
            .collect()
    }
}
