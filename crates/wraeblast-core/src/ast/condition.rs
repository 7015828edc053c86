//! Condition definitions and per-kind value typing

use super::operator::Operator;
use crate::error::{CoreError, Result};
use crate::types::socket::MAX_SOCKETS;
use crate::types::{Influence, Rarity, SocketGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

keyword_enum! {
    /// Item attribute a condition tests
    pub enum ConditionKind("condition") {
        AlternateQuality => "AlternateQuality",
        AnyEnchantment => "AnyEnchantment",
        AreaLevel => "AreaLevel",
        BaseType => "BaseType",
        BlightedMap => "BlightedMap",
        Class => "Class",
        Corrupted => "Corrupted",
        CorruptedMods => "CorruptedMods",
        DropLevel => "DropLevel",
        ElderItem => "ElderItem",
        ElderMap => "ElderMap",
        EnchantmentPassiveNode => "EnchantmentPassiveNode",
        EnchantmentPassiveNum => "EnchantmentPassiveNum",
        FracturedItem => "FracturedItem",
        GemLevel => "GemLevel",
        GemQualityType => "GemQualityType",
        HasEnchantment => "HasEnchantment",
        HasExplicitMod => "HasExplicitMod",
        HasInfluence => "HasInfluence",
        Height => "Height",
        Identified => "Identified",
        ItemLevel => "ItemLevel",
        LinkedSockets => "LinkedSockets",
        MapTier => "MapTier",
        Mirrored => "Mirrored",
        Prophecy => "Prophecy",
        Quality => "Quality",
        Rarity => "Rarity",
        Replica => "Replica",
        Scourged => "Scourged",
        ShapedMap => "ShapedMap",
        ShaperItem => "ShaperItem",
        SocketGroup => "SocketGroup",
        Sockets => "Sockets",
        StackSize => "StackSize",
        SynthesisedItem => "SynthesisedItem",
        UberBlightedMap => "UberBlightedMap",
        Width => "Width",
    }
}

/// Shape of value a condition kind expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Integer comparison
    Numeric,
    /// True/False
    Flag,
    /// One or more quoted names, optionally prefixed by a match count
    Names,
    /// One or more rarities
    Rarity,
    /// One or more influences
    Influence,
    /// Integer or a socket group spec
    Sockets,
}

impl ConditionKind {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::AreaLevel
            | Self::CorruptedMods
            | Self::DropLevel
            | Self::EnchantmentPassiveNum
            | Self::GemLevel
            | Self::Height
            | Self::ItemLevel
            | Self::LinkedSockets
            | Self::MapTier
            | Self::Quality
            | Self::StackSize
            | Self::Width => ValueKind::Numeric,
            Self::AlternateQuality
            | Self::AnyEnchantment
            | Self::BlightedMap
            | Self::Corrupted
            | Self::ElderItem
            | Self::ElderMap
            | Self::FracturedItem
            | Self::Identified
            | Self::Mirrored
            | Self::Replica
            | Self::Scourged
            | Self::ShapedMap
            | Self::ShaperItem
            | Self::SynthesisedItem
            | Self::UberBlightedMap => ValueKind::Flag,
            Self::BaseType
            | Self::Class
            | Self::EnchantmentPassiveNode
            | Self::GemQualityType
            | Self::HasEnchantment
            | Self::HasExplicitMod
            | Self::Prophecy => ValueKind::Names,
            Self::Rarity => ValueKind::Rarity,
            Self::HasInfluence => ValueKind::Influence,
            Self::SocketGroup | Self::Sockets => ValueKind::Sockets,
        }
    }

    /// Threshold kinds where a bare `True` means "at least 1"
    pub fn accepts_presence(&self) -> bool {
        matches!(
            self,
            ConditionKind::AreaLevel
                | ConditionKind::GemLevel
                | ConditionKind::ItemLevel
                | ConditionKind::MapTier
                | ConditionKind::StackSize
        )
    }
}

/// Condition value, validated against its kind on construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Bool(bool),
    Int(i64),
    String(String),
    Strings(Vec<String>),
    Rarities(Vec<Rarity>),
    Influences(Vec<Influence>),
    SocketGroup(SocketGroup),
    /// `>=2 "Tyrannical" "Merciless"`: how many of the names must match
    CountedNames { count: i64, names: Vec<String> },
}

impl ConditionValue {
    fn describe(&self) -> &'static str {
        match self {
            ConditionValue::Bool(_) => "a boolean",
            ConditionValue::Int(_) => "an integer",
            ConditionValue::String(_) => "a string",
            ConditionValue::Strings(_) => "a list of strings",
            ConditionValue::Rarities(_) => "a list of rarities",
            ConditionValue::Influences(_) => "a list of influences",
            ConditionValue::SocketGroup(_) => "a socket group",
            ConditionValue::CountedNames { .. } => "a counted list of names",
        }
    }
}

/// Condition arguments as written in a structured document: either a bare
/// value or a single `{operator: value}` pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConditionArgs {
    WithOperator(BTreeMap<Operator, ConditionValue>),
    Value(ConditionValue),
}

/// A single item predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub op: Operator,
    pub value: ConditionValue,
}

impl Condition {
    /// Create a condition, coercing the value into the shape its kind expects
    pub fn new(kind: ConditionKind, op: Operator, value: ConditionValue) -> Result<Self> {
        let value = coerce_value(kind, value)?;
        let ordered = match kind.value_kind() {
            ValueKind::Numeric | ValueKind::Rarity | ValueKind::Sockets => true,
            // on names the operator compares the number of matching names
            ValueKind::Names => matches!(value, ConditionValue::CountedNames { .. }),
            ValueKind::Flag | ValueKind::Influence => false,
        };
        if op.is_ordering() && !ordered {
            return Err(CoreError::invalid(
                kind.as_str(),
                format!("operator '{}' needs a numeric value", op),
            ));
        }
        Ok(Condition { kind, op, value })
    }

    /// Condition with the default `=` operator
    pub fn equals(kind: ConditionKind, value: ConditionValue) -> Result<Self> {
        Condition::new(kind, Operator::Eq, value)
    }

    /// Build a condition from document arguments
    pub fn from_args(kind: ConditionKind, args: ConditionArgs) -> Result<Self> {
        match args {
            ConditionArgs::Value(value) => Condition::new(kind, Operator::Eq, value),
            ConditionArgs::WithOperator(map) => {
                if map.len() != 1 {
                    return Err(CoreError::invalid(
                        kind.as_str(),
                        format!("expected a single operator, found {}", map.len()),
                    ));
                }
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((op, value)) => Condition::new(kind, op, value),
                    None => Err(CoreError::invalid(kind.as_str(), "missing operator")),
                }
            }
        }
    }
}

fn coerce_value(kind: ConditionKind, value: ConditionValue) -> Result<ConditionValue> {
    let mismatch = |value: &ConditionValue, expected: &str| {
        CoreError::invalid(
            kind.as_str(),
            format!("expected {}, got {}", expected, value.describe()),
        )
    };

    match kind.value_kind() {
        ValueKind::Numeric => match value {
            ConditionValue::Int(_) => Ok(value),
            ConditionValue::Bool(true) if kind.accepts_presence() => Ok(value),
            ConditionValue::String(ref s) => s
                .trim()
                .parse::<i64>()
                .map(ConditionValue::Int)
                .map_err(|_| mismatch(&value, "an integer")),
            other => Err(mismatch(&other, "an integer")),
        },
        ValueKind::Flag => match value {
            ConditionValue::Bool(_) => Ok(value),
            ConditionValue::String(ref s) if s.eq_ignore_ascii_case("true") => {
                Ok(ConditionValue::Bool(true))
            }
            ConditionValue::String(ref s) if s.eq_ignore_ascii_case("false") => {
                Ok(ConditionValue::Bool(false))
            }
            other => Err(mismatch(&other, "True or False")),
        },
        ValueKind::Names => match value {
            ConditionValue::String(_) => Ok(value),
            ConditionValue::Strings(ref names) if !names.is_empty() => Ok(value),
            ConditionValue::CountedNames { count, ref names } if count >= 0 && !names.is_empty() => {
                Ok(value)
            }
            other => Err(mismatch(&other, "one or more names")),
        },
        ValueKind::Rarity => match value {
            ConditionValue::Rarities(ref list) if !list.is_empty() => Ok(value),
            ConditionValue::String(s) => Ok(ConditionValue::Rarities(parse_words(&s)?)),
            ConditionValue::Strings(list) => Ok(ConditionValue::Rarities(parse_all(&list)?)),
            other => Err(mismatch(&other, "one or more rarities")),
        },
        ValueKind::Influence => match value {
            ConditionValue::Influences(ref list) if !list.is_empty() => Ok(value),
            ConditionValue::String(s) => Ok(ConditionValue::Influences(parse_words(&s)?)),
            ConditionValue::Strings(list) => Ok(ConditionValue::Influences(parse_all(&list)?)),
            other => Err(mismatch(&other, "one or more influences")),
        },
        ValueKind::Sockets => match value {
            ConditionValue::Int(n) => socket_count(n),
            ConditionValue::SocketGroup(_) => Ok(value),
            ConditionValue::String(s) => match s.trim().parse::<i64>() {
                Ok(n) => socket_count(n),
                Err(_) => Ok(ConditionValue::SocketGroup(s.parse()?)),
            },
            other => Err(mismatch(&other, "a socket count or socket group")),
        },
    }
}

fn socket_count(n: i64) -> Result<ConditionValue> {
    if (0..=i64::from(MAX_SOCKETS)).contains(&n) {
        Ok(ConditionValue::Int(n))
    } else {
        Err(CoreError::InvalidSocketGroup(format!(
            "{} (at most {} sockets)",
            n, MAX_SOCKETS
        )))
    }
}

fn parse_words<T>(s: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr<Err = CoreError>,
{
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.is_empty() {
        return Err(CoreError::invalid("value", "empty list"));
    }
    words.into_iter().map(str::parse).collect()
}

fn parse_all<T>(list: &[String]) -> Result<Vec<T>>
where
    T: std::str::FromStr<Err = CoreError>,
{
    if list.is_empty() {
        return Err(CoreError::invalid("value", "empty list"));
    }
    list.iter().map(|s| s.parse()).collect()
}
