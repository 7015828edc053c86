//! Presets: tag-driven visibility overrides

use super::rule::{Rule, Visibility};
use super::style::TagGroup;
use serde::{Deserialize, Serialize};

/// Replace `source` tags with `target` tags on rules carrying all of `source`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagReplacement {
    pub source: TagGroup,
    pub target: Option<TagGroup>,
}

/// Named visibility overrides applied to a whole filter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub replace: Vec<TagReplacement>,
    #[serde(default)]
    pub visible: Vec<TagGroup>,
    #[serde(default)]
    pub hidden: Vec<TagGroup>,
}

impl Preset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replace(mut self, source: TagGroup, target: Option<TagGroup>) -> Self {
        self.replace.push(TagReplacement { source, target });
        self
    }

    pub fn with_visible(mut self, group: TagGroup) -> Self {
        self.visible.push(group);
        self
    }

    pub fn with_hidden(mut self, group: TagGroup) -> Self {
        self.hidden.push(group);
        self
    }

    /// Apply tag replacement, then forced hiding, then forced showing.
    ///
    /// A rule matched by both a hidden and a visible group ends up shown.
    pub fn apply_to(&self, rule: &mut Rule) {
        for replacement in &self.replace {
            if !replacement.source.is_satisfied_by(&rule.tags) {
                continue;
            }
            for tag in replacement.source.tags() {
                rule.tags.remove(tag);
            }
            if let Some(target) = &replacement.target {
                rule.tags
                    .extend(target.tags().into_iter().map(str::to_string));
            }
        }

        if self.hidden.iter().any(|group| group.is_satisfied_by(&rule.tags)) {
            rule.visibility = Visibility::Hide;
        }

        if self.visible.iter().any(|group| group.is_satisfied_by(&rule.tags)) {
            rule.visibility = Visibility::Show;
        }
    }
}
