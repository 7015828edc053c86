//! Comparison operators for conditions

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator preceding a condition value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Operator {
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Equal (=), omitted when serialized
    #[default]
    Eq,
    /// Exact match (==)
    Exact,
    /// Not equal (!)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Eq => "=",
            Operator::Exact => "==",
            Operator::Ne => "!",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    /// Returns true for ordering comparisons that only make sense on numbers
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge
        )
    }
}

impl FromStr for Operator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            "=" => Ok(Operator::Eq),
            "==" => Ok(Operator::Exact),
            "!" | "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            other => Err(CoreError::UnknownKeyword {
                kind: "operator",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_default() {
        assert_eq!(Operator::default(), Operator::Eq);
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!("<=".parse::<Operator>().unwrap(), Operator::Le);
        assert_eq!("==".parse::<Operator>().unwrap(), Operator::Exact);
        assert_eq!("!".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::Ne);
        assert!("=>".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_is_ordering() {
        assert!(Operator::Gt.is_ordering());
        assert!(Operator::Le.is_ordering());
        assert!(!Operator::Eq.is_ordering());
        assert!(!Operator::Exact.is_ordering());
    }
}
