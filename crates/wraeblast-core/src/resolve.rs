//! Style and preset resolution over a filter's rules

use crate::ast::filter::{ItemFilter, DEFAULT_NAME};
use crate::ast::rule::Rule;
use crate::ast::style::Style;
use crate::error::{CoreError, Result};
use std::collections::BTreeSet;

impl ItemFilter {
    /// Apply the "default" preset if the filter defines one
    pub fn apply_default_preset(&mut self) -> Result<()> {
        if self.presets.contains_key(DEFAULT_NAME) {
            self.apply_preset(DEFAULT_NAME)?;
        }
        Ok(())
    }

    /// Apply a preset to every rule, then re-resolve styles.
    ///
    /// Each rule goes through tag replacement, forced hiding and forced
    /// showing, in that order.
    pub fn apply_preset(&mut self, name: &str) -> Result<()> {
        let preset = self
            .presets
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::PresetNotFound(name.to_string()))?;
        log::debug!("preset.apply preset={}", name);

        for rule in &mut self.rules {
            preset.apply_to(rule);
        }

        self.resolve_styles(false, true)
    }

    /// Styles with at least one tag group satisfied by `tags`, in definition order
    pub fn get_styles_for_tags(&self, tags: &BTreeSet<String>) -> Vec<&Style> {
        self.styles
            .iter()
            .filter(|(_, style)| style.matches(tags))
            .map(|(_, style)| style)
            .collect()
    }

    /// Apply styles to every rule.
    ///
    /// Order per rule: the "default" style (when `apply_default`), then
    /// tag-matched styles, then the rule's explicit style names. Every step
    /// overwrites earlier actions of the same kind. A missing explicit name is
    /// an error unless `ignore_errors` is set, in which case only that name is
    /// skipped.
    pub fn resolve_styles(&mut self, ignore_errors: bool, apply_default: bool) -> Result<()> {
        log::debug!("styles.apply");
        let default_style = if apply_default {
            self.styles.get(DEFAULT_NAME)
        } else {
            None
        };

        let mut resolved = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let mut styles: Vec<&Style> = Vec::new();
            styles.extend(default_style);
            styles.extend(self.get_styles_for_tags(&rule.tags));

            if let Some(style_ref) = &rule.style {
                for name in style_ref.names() {
                    match self.styles.get(name) {
                        Some(style) => styles.push(style),
                        None if ignore_errors => {
                            log::debug!("styles.skip style={}", name);
                        }
                        None => return Err(CoreError::StyleNotFound(name.to_string())),
                    }
                }
            }

            let mut styled = rule.clone();
            for style in styles {
                styled.apply_style(style, true);
            }
            resolved.push(styled.actions);
        }

        for (rule, actions) in self.rules.iter_mut().zip(resolved) {
            rule.actions = actions;
        }
        Ok(())
    }

    /// Drop every rule that is not shown
    pub fn remove_hidden_rules(&mut self) {
        self.rules.retain(Rule::is_visible);
    }
}
