//! Element model for loot filters
//!
//! This module contains the definitions for:
//! - Conditions and their comparison operators
//! - Actions and their argument types
//! - Styles and presets
//! - Rules and the item filter itself

pub mod action;
pub mod condition;
pub mod filter;
pub mod operator;
pub mod preset;
pub mod rule;
pub mod style;

pub use action::{Action, ActionArg, ActionKind, EnumArg};
pub use condition::{Condition, ConditionArgs, ConditionKind, ConditionValue, ValueKind};
pub use filter::{ItemFilter, DEFAULT_NAME};
pub use operator::Operator;
pub use preset::{Preset, TagReplacement};
pub use rule::{Rule, Visibility, ANONYMOUS};
pub use style::{Style, StyleRef, StyleSheet, TagGroup};
