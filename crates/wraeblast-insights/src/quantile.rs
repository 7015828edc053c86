//! Quantile kinds and labels (`Q4`, `QU5`, `D10`, `P99`)

use crate::error::{InsightsError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Bucket families an item table is ranked into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuantileKind {
    Quartile,
    Quintile,
    Decile,
    Percentile,
}

impl QuantileKind {
    /// Every kind, in tag order
    pub const ALL: [QuantileKind; 4] = [
        QuantileKind::Quartile,
        QuantileKind::Quintile,
        QuantileKind::Decile,
        QuantileKind::Percentile,
    ];

    /// Number of buckets
    pub fn buckets(&self) -> u32 {
        match self {
            QuantileKind::Quartile => 4,
            QuantileKind::Quintile => 5,
            QuantileKind::Decile => 10,
            QuantileKind::Percentile => 100,
        }
    }

    /// Column name used in row predicates
    pub fn column(&self) -> &'static str {
        match self {
            QuantileKind::Quartile => "quartile",
            QuantileKind::Quintile => "quintile",
            QuantileKind::Decile => "decile",
            QuantileKind::Percentile => "percentile",
        }
    }

    /// Label prefix used in tags
    pub fn prefix(&self) -> &'static str {
        match self {
            QuantileKind::Quartile => "Q",
            QuantileKind::Quintile => "QU",
            QuantileKind::Decile => "D",
            QuantileKind::Percentile => "P",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.column() == column)
    }
}

/// A quantile kind with a bucket number, written as `QU4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuantileLabel {
    pub kind: QuantileKind,
    pub value: u32,
}

impl QuantileLabel {
    pub fn new(kind: QuantileKind, value: u32) -> Self {
        Self { kind, value }
    }
}

impl FromStr for QuantileLabel {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // "QU" must be tried before "Q"
        let (kind, digits) = if let Some(rest) = s.strip_prefix("QU") {
            (QuantileKind::Quintile, rest)
        } else if let Some(rest) = s.strip_prefix('Q') {
            (QuantileKind::Quartile, rest)
        } else if let Some(rest) = s.strip_prefix('D') {
            (QuantileKind::Decile, rest)
        } else if let Some(rest) = s.strip_prefix('P') {
            (QuantileKind::Percentile, rest)
        } else {
            return Err(InsightsError::InvalidQuantile(s.to_string()));
        };
        let value = digits
            .parse::<u32>()
            .map_err(|_| InsightsError::InvalidQuantile(s.to_string()))?;
        if value == 0 || value > kind.buckets() {
            return Err(InsightsError::InvalidQuantile(s.to_string()));
        }
        Ok(QuantileLabel { kind, value })
    }
}

impl fmt::Display for QuantileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.value)
    }
}

impl Serialize for QuantileLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuantileLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            "QU4".parse::<QuantileLabel>().unwrap(),
            QuantileLabel::new(QuantileKind::Quintile, 4)
        );
        assert_eq!(
            "Q2".parse::<QuantileLabel>().unwrap(),
            QuantileLabel::new(QuantileKind::Quartile, 2)
        );
        assert_eq!(
            "D10".parse::<QuantileLabel>().unwrap(),
            QuantileLabel::new(QuantileKind::Decile, 10)
        );
        assert_eq!(
            "P99".parse::<QuantileLabel>().unwrap(),
            QuantileLabel::new(QuantileKind::Percentile, 99)
        );
    }

    #[test]
    fn test_invalid_labels() {
        for label in ["X4", "Q", "Q5", "D0", "QUx", ""] {
            assert!(
                matches!(label.parse::<QuantileLabel>(), Err(InsightsError::InvalidQuantile(_))),
                "{} should be rejected",
                label
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        let label = QuantileLabel::new(QuantileKind::Percentile, 42);
        assert_eq!(label.to_string(), "P42");
        assert_eq!(label.to_string().parse::<QuantileLabel>().unwrap(), label);
    }
}
