//! Styles: reusable bundles of actions matched by tag

use super::action::{normalize_args, ActionArg, ActionKind};
use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One tag, or a list of tags that must all be present
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagGroup {
    One(String),
    All(Vec<String>),
}

impl TagGroup {
    pub fn tags(&self) -> Vec<&str> {
        match self {
            TagGroup::One(tag) => vec![tag.as_str()],
            TagGroup::All(tags) => tags.iter().map(String::as_str).collect(),
        }
    }

    /// True when every tag of the group is in `tags`
    pub fn is_satisfied_by(&self, tags: &BTreeSet<String>) -> bool {
        self.tags().into_iter().all(|tag| tags.contains(tag))
    }
}

impl From<&str> for TagGroup {
    fn from(tag: &str) -> Self {
        TagGroup::One(tag.to_string())
    }
}

impl From<Vec<&str>> for TagGroup {
    fn from(tags: Vec<&str>) -> Self {
        TagGroup::All(tags.into_iter().map(str::to_string).collect())
    }
}

/// Style reference held by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleRef {
    One(String),
    Many(Vec<String>),
}

impl StyleRef {
    pub fn names(&self) -> Vec<&str> {
        match self {
            StyleRef::One(name) => vec![name.as_str()],
            StyleRef::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// A reusable set of action arguments, applied by tag match or by name
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Style {
    actions: IndexMap<ActionKind, Vec<ActionArg>>,
    pub tags: Vec<TagGroup>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action, validating its arguments the same way `Action::new` does
    pub fn with_action(mut self, kind: ActionKind, args: Vec<ActionArg>) -> Result<Self> {
        self.actions.insert(kind, normalize_args(kind, args)?);
        Ok(self)
    }

    pub fn with_tags(mut self, tags: Vec<TagGroup>) -> Self {
        self.tags = tags;
        self
    }

    pub fn actions(&self) -> &IndexMap<ActionKind, Vec<ActionArg>> {
        &self.actions
    }

    /// True when any of the style's tag groups is satisfied by `tags`
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        self.tags.iter().any(|group| group.is_satisfied_by(tags))
    }
}

/// Named styles, kept in definition order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StyleSheet {
    entries: Vec<(String, Style)>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a style, replacing an existing one of the same name in place
    pub fn insert(&mut self, name: impl Into<String>, style: Style) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = style,
            None => self.entries.push((name, style)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Style> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, style)| style)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.entries.iter().map(|(name, style)| (name.as_str(), style))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Style)> for StyleSheet {
    fn from_iter<I: IntoIterator<Item = (String, Style)>>(iter: I) -> Self {
        let mut sheet = StyleSheet::new();
        for (name, style) in iter {
            sheet.insert(name, style);
        }
        sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tag_group_subset() {
        let group = TagGroup::from(vec!["currency", "low_value"]);
        assert!(group.is_satisfied_by(&tags(&["currency", "low_value", "tier1"])));
        assert!(!group.is_satisfied_by(&tags(&["currency"])));
        assert!(TagGroup::from("currency").is_satisfied_by(&tags(&["currency"])));
    }

    #[test]
    fn test_tag_group_deserialize() {
        let groups: Vec<TagGroup> = serde_json::from_str(r#"["a", ["b", "c"]]"#).unwrap();
        assert_eq!(groups[0], TagGroup::One("a".into()));
        assert_eq!(groups[1], TagGroup::All(vec!["b".into(), "c".into()]));
    }

    #[test]
    fn test_style_validates_actions() {
        let style = Style::new()
            .with_action(ActionKind::SetFontSize, vec![ActionArg::Int(40)])
            .unwrap();
        assert_eq!(style.actions().len(), 1);

        let result = Style::new().with_action(ActionKind::SetTextColor, vec!["nope".into()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_style_sheet_keeps_order() {
        let mut sheet = StyleSheet::new();
        sheet.insert("b", Style::new());
        sheet.insert("a", Style::new());
        sheet.insert("b", Style::new().with_tags(vec!["x".into()]));

        let names: Vec<&str> = sheet.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(sheet.get("b").unwrap().tags.len(), 1);
        assert!(!sheet.contains("c"));
    }
}
