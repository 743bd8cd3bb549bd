// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The closed set of value types an expression node can produce.
///
/// Variant order matters: when two candidate types have the same conversion
/// cost, the earlier variant wins. That makes Integer preferred over Numeric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ValueType {
    #[default]
    Unknown,
    Boolean,
    Integer,
    Numeric,
    String,
    ByteArray,
}

impl ValueType {
    pub const CONCRETE: [ValueType; 5] = [
        ValueType::Boolean,
        ValueType::Integer,
        ValueType::Numeric,
        ValueType::String,
        ValueType::ByteArray,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Unknown => "unknown",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Numeric => "numeric",
            ValueType::String => "string",
            ValueType::ByteArray => "byte array",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// The types a node that is not fully determined could still become.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SupportedTypes: u8 {
        const BOOLEAN = 1;
        const INTEGER = 1 << 1;
        const NUMERIC = 1 << 2;
        const STRING = 1 << 3;
        const BYTE_ARRAY = 1 << 4;

        const NUMBER = Self::INTEGER.bits() | Self::NUMERIC.bits();
        const ALL = Self::BOOLEAN.bits()
            | Self::INTEGER.bits()
            | Self::NUMERIC.bits()
            | Self::STRING.bits()
            | Self::BYTE_ARRAY.bits();
    }
}

impl SupportedTypes {
    pub const fn of(t: ValueType) -> SupportedTypes {
        match t {
            ValueType::Unknown => SupportedTypes::ALL,
            ValueType::Boolean => SupportedTypes::BOOLEAN,
            ValueType::Integer => SupportedTypes::INTEGER,
            ValueType::Numeric => SupportedTypes::NUMERIC,
            ValueType::String => SupportedTypes::STRING,
            ValueType::ByteArray => SupportedTypes::BYTE_ARRAY,
        }
    }

    pub fn supports(self, t: ValueType) -> bool {
        t != ValueType::Unknown && self.contains(SupportedTypes::of(t))
    }

    /// The concrete types this mask can materialize into, in preference order.
    pub fn types(self) -> impl Iterator<Item = ValueType> {
        ValueType::CONCRETE
            .into_iter()
            .filter(move |t| self.supports(*t))
    }

    /// The single concrete type, when the mask has collapsed to exactly one.
    pub fn single(self) -> Option<ValueType> {
        let mut types = self.types();
        match (types.next(), types.next()) {
            (Some(t), None) => Some(t),
            _ => None,
        }
    }

    /// Every type that can implicitly reach at least one type in `self`.
    pub fn sources(self) -> SupportedTypes {
        ValueType::CONCRETE
            .into_iter()
            .filter(|from| self.types().any(|to| conversion_cost(*from, to).is_some()))
            .fold(SupportedTypes::empty(), |acc, t| acc | SupportedTypes::of(t))
    }
}

/// Cost of implicitly converting a value of type `from` into type `to`.
///
/// `None` means no implicit conversion exists. Only the identity costs 0.
/// Numeric values are never narrowed to Integer.
pub const fn conversion_cost(from: ValueType, to: ValueType) -> Option<u32> {
    match (from, to) {
        (ValueType::Unknown, _) | (_, ValueType::Unknown) => None,
        (ValueType::Integer, ValueType::Numeric) => Some(1),
        (a, b) if a as u8 == b as u8 => Some(0),
        _ => None,
    }
}

/// One row of a cost table: what it costs for a node to produce a type, and
/// which internal computation (signature) produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cost {
    pub cost: u32,
    pub internal: ValueType,
    pub choice: usize,
}

/// Per candidate return type conversion costs for a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostTable {
    entries: [Option<Cost>; 6],
}

impl CostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cost table of a leaf whose own type may be any of `own`.
    pub fn for_leaf(own: SupportedTypes) -> Self {
        let mut table = CostTable::new();
        for from in own.types() {
            for to in ValueType::CONCRETE {
                if let Some(cost) = conversion_cost(from, to) {
                    table.offer(
                        to,
                        Cost {
                            cost,
                            internal: from,
                            choice: 0,
                        },
                    );
                }
            }
        }
        table
    }

    /// Record `cost` for `t` if it beats what is already there.
    /// Equal costs keep the existing entry, so earlier offers win ties.
    pub fn offer(&mut self, t: ValueType, cost: Cost) {
        let slot = &mut self.entries[t.index()];
        match slot {
            Some(existing) if existing.cost <= cost.cost => (),
            _ => *slot = Some(cost),
        }
    }

    pub fn get(&self, t: ValueType) -> Option<Cost> {
        self.entries[t.index()]
    }

    pub fn supported(&self) -> SupportedTypes {
        ValueType::CONCRETE
            .into_iter()
            .filter(|t| self.get(*t).is_some())
            .fold(SupportedTypes::empty(), |acc, t| acc | SupportedTypes::of(t))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// The type this node naturally produces: cheapest first, then
    /// declaration order.
    pub fn preferred(&self) -> Option<ValueType> {
        ValueType::CONCRETE
            .into_iter()
            .filter_map(|t| self.get(t).map(|c| (c.cost, t)))
            .min()
            .map(|(_, t)| t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_free_and_narrowing_is_impossible() {
        for t in ValueType::CONCRETE {
            assert_eq!(conversion_cost(t, t), Some(0));
        }
        assert_eq!(
            conversion_cost(ValueType::Integer, ValueType::Numeric),
            Some(1)
        );
        assert_eq!(conversion_cost(ValueType::Numeric, ValueType::Integer), None);
        assert_eq!(conversion_cost(ValueType::Boolean, ValueType::String), None);
    }

    #[test]
    fn mask_materializes_in_preference_order() {
        let types: Vec<_> = (SupportedTypes::NUMERIC | SupportedTypes::INTEGER | SupportedTypes::STRING)
            .types()
            .collect();
        assert_eq!(
            types,
            vec![ValueType::Integer, ValueType::Numeric, ValueType::String]
        );
        assert_eq!(SupportedTypes::NUMERIC.single(), Some(ValueType::Numeric));
        assert_eq!(SupportedTypes::NUMBER.single(), None);
        assert_eq!(SupportedTypes::NUMERIC.sources(), SupportedTypes::NUMBER);
    }

    #[test]
    fn leaf_costs_prefer_integer_on_ties() {
        let table = CostTable::for_leaf(SupportedTypes::NUMBER);
        assert_eq!(table.preferred(), Some(ValueType::Integer));
        let numeric = table.get(ValueType::Numeric).map(|c| (c.cost, c.internal));
        assert_eq!(numeric, Some((0, ValueType::Numeric)));

        let integer_only = CostTable::for_leaf(SupportedTypes::INTEGER);
        let numeric = integer_only
            .get(ValueType::Numeric)
            .map(|c| (c.cost, c.internal));
        assert_eq!(numeric, Some((1, ValueType::Integer)));
        assert_eq!(integer_only.supported(), SupportedTypes::NUMBER);
    }
}
