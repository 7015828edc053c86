//! Item filter: presets, styles and an ordered rule list

use super::preset::Preset;
use super::rule::Rule;
use super::style::StyleSheet;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the preset and style applied implicitly
pub const DEFAULT_NAME: &str = "default";

/// A complete loot filter.
///
/// The filter owns its presets, styles and rules. Rules refer to styles by
/// name only, so resolution can fail when a name is missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ItemFilter {
    pub presets: BTreeMap<String, Preset>,
    pub styles: StyleSheet,
    pub rules: Vec<Rule>,
}

impl ItemFilter {
    /// Build a filter and apply its "default" preset when one exists
    pub fn new(
        presets: BTreeMap<String, Preset>,
        styles: StyleSheet,
        rules: Vec<Rule>,
    ) -> Result<Self> {
        let mut filter = ItemFilter {
            presets,
            styles,
            rules,
        };
        filter.apply_default_preset()?;
        log::debug!("filter.processed rules={}", filter.rules.len());
        Ok(filter)
    }

    /// Build a filter holding only rules
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        log::debug!("filter.processed rules={}", rules.len());
        ItemFilter {
            presets: BTreeMap::new(),
            styles: StyleSheet::new(),
            rules,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
