//! Tagged metric values
//!
//! Performance formulas either produce a number or one of three sentinels.
//! Sentinels propagate explicitly through dependent formulas and are never
//! read as zero.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A computed quantity or the reason it has no value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// A physically meaningful value
    Value(f64),
    /// The GPU has no compute throughput for the precision
    Unsupported,
    /// The formula produced a negative or non-finite value
    OutOfRange,
    /// An input to the formula was itself a sentinel
    NotComputable,
}

impl Metric {
    /// Wraps a raw result, turning negative or non-finite values into `OutOfRange`
    pub fn checked(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Metric::Value(value)
        } else {
            Metric::OutOfRange
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    /// Whether the value satisfies `pred`; sentinels never do
    pub fn satisfies(&self, pred: impl FnOnce(f64) -> bool) -> bool {
        self.value().is_some_and(pred)
    }

    /// Formats the value with `precision` decimals and a unit suffix
    pub fn display_with(&self, precision: usize, unit: &str) -> String {
        match self {
            Metric::Value(v) if unit.is_empty() => format!("{:.*}", precision, v),
            Metric::Value(v) => format!("{:.*} {}", precision, v, unit),
            sentinel => sentinel.to_string(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{}", v),
            Metric::Unsupported => f.write_str("Not Supported"),
            Metric::OutOfRange => f.write_str("OOM"),
            Metric::NotComputable => f.write_str("N/A"),
        }
    }
}
