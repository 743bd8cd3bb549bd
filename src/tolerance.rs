// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

/// Allowance for approximate comparisons between numbers.
///
/// Only one kind is honored per instance. When several are set the integer
/// range wins, then the floating range, then the proportional tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonTolerance {
    pub integer_range: Option<(i64, i64)>,
    pub range: Option<(f64, f64)>,
    /// `v < 1.0` is a percentage of the right operand; `v >= 1.0` is a
    /// multiplicative factor.
    pub proportion: Option<f64>,
}

/// The tolerance kind actually honored by a [`ComparisonTolerance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToleranceKind {
    IntegerRange { lower: i64, upper: i64 },
    Range { lower: f64, upper: f64 },
    Proportional(f64),
}

/// Hashable identity of a tolerance, used to key lowered programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToleranceKey {
    IntegerRange(i64, i64),
    Range(u64, u64),
    Proportional(u64),
}

impl ComparisonTolerance {
    pub fn integer_range(lower: i64, upper: i64) -> Self {
        Self {
            integer_range: Some((lower, upper)),
            ..Self::default()
        }
    }

    pub fn range(lower: f64, upper: f64) -> Self {
        Self {
            range: Some((lower, upper)),
            ..Self::default()
        }
    }

    pub fn proportional(proportion: f64) -> Self {
        Self {
            proportion: Some(proportion),
            ..Self::default()
        }
    }

    pub fn honored(&self) -> Option<ToleranceKind> {
        if let Some((lower, upper)) = self.integer_range {
            return Some(ToleranceKind::IntegerRange { lower, upper });
        }
        if let Some((lower, upper)) = self.range {
            return Some(ToleranceKind::Range { lower, upper });
        }
        self.proportion.map(ToleranceKind::Proportional)
    }

    pub fn key(&self) -> Option<ToleranceKey> {
        self.honored().map(|kind| match kind {
            ToleranceKind::IntegerRange { lower, upper } => ToleranceKey::IntegerRange(lower, upper),
            ToleranceKind::Range { lower, upper } => {
                ToleranceKey::Range(lower.to_bits(), upper.to_bits())
            }
            ToleranceKind::Proportional(p) => ToleranceKey::Proportional(p.to_bits()),
        })
    }
}

impl ToleranceKind {
    /// Absolute band `[low, high]` around `right` that counts as equal.
    pub fn band(&self, right: f64) -> (f64, f64) {
        match *self {
            ToleranceKind::IntegerRange { lower, upper } => {
                (right - lower as f64, right + upper as f64)
            }
            ToleranceKind::Range { lower, upper } => (right - lower, right + upper),
            ToleranceKind::Proportional(p) => {
                let (a, b) = if p < 1.0 {
                    (right * (1.0 - p), right * (1.0 + p))
                } else {
                    (right / p, right * p)
                };
                (a.min(b), a.max(b))
            }
        }
    }
}
