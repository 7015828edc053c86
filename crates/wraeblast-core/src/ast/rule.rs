//! Rule definitions

use super::action::{Action, ActionKind};
use super::condition::{Condition, ConditionKind};
use super::style::{Style, StyleRef};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// Name given to rules that don't declare one
pub const ANONYMOUS: &str = "anonymous";

keyword_enum! {
    /// Visibility decision of a rule
    pub enum Visibility("visibility") {
        Show => "Show",
        Hide => "Hide",
        Continue => "Continue",
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Show
    }
}

/// A visibility decision plus its conditions and display actions.
///
/// Conditions and actions are keyed by kind, so a rule holds at most one of
/// each. Both keep the order they were first written in; inserting a kind
/// again replaces the earlier entry in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub visibility: Visibility,
    pub conditions: IndexMap<ConditionKind, Condition>,
    pub actions: IndexMap<ActionKind, Action>,
    pub tags: BTreeSet<String>,
    pub priority: Option<i64>,
    pub style: Option<StyleRef>,
    pub name: Option<String>,
}

impl Rule {
    /// Create an empty rule
    pub fn new(visibility: Visibility) -> Self {
        Rule {
            visibility,
            conditions: IndexMap::new(),
            actions: IndexMap::new(),
            tags: BTreeSet::new(),
            priority: None,
            style: None,
            name: Some(ANONYMOUS.to_string()),
        }
    }

    /// Insert a condition, replacing any condition of the same kind
    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.insert(condition.kind, condition);
    }

    /// Insert an action, replacing any action of the same kind
    pub fn add_action(&mut self, action: Action) {
        self.actions.insert(action.kind, action);
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.add_condition(condition);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.add_action(action);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_style(mut self, style: StyleRef) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Show
    }

    /// Copy of the rule's actions with `style` merged in.
    ///
    /// Kinds missing from the rule are appended. Kinds already present are
    /// overwritten in place only when `replace` is set. The style's argument lists are
    /// cloned, never shared.
    pub fn merged_actions(&self, style: &Style, replace: bool) -> IndexMap<ActionKind, Action> {
        let mut actions = self.actions.clone();
        for (kind, args) in style.actions() {
            if actions.contains_key(kind) && !replace {
                continue;
            }
            actions.insert(
                *kind,
                Action {
                    kind: *kind,
                    args: args.clone(),
                },
            );
        }
        actions
    }

    /// Merge `style` into this rule's actions
    pub fn apply_style(&mut self, style: &Style, replace: bool) {
        self.actions = self.merged_actions(style, replace);
    }

    /// Copy of this rule with `style` merged in, leaving `self` untouched
    pub fn styled(&self, style: &Style, replace: bool) -> Rule {
        Rule {
            actions: self.merged_actions(style, replace),
            ..self.clone()
        }
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::new(Visibility::default())
    }
}
