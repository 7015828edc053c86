//! Wraeblast Core - element model for item-sorting loot filters
//!
//! This crate provides the types shared by the parser, serializer and SDK:
//! - Rules, conditions, actions, styles and presets
//! - Domain values (colors, socket groups, keyword enums)
//! - Style and preset resolution
//! - Error types

#[macro_use]
mod macros;

pub mod ast;
pub mod error;
pub mod resolve;
pub mod types;

// Re-export commonly used types
pub use ast::{
    Action, ActionArg, ActionKind, Condition, ConditionKind, ConditionValue, ItemFilter, Operator,
    Preset, Rule, Style, StyleRef, StyleSheet, TagGroup, Visibility,
};
pub use error::{CoreError, Result};
pub use types::{Color, SocketGroup};
