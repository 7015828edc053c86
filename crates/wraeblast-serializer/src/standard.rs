//! Canonical-format serializer
//!
//! Every argument and value shape is a closed enum in the element model, so
//! each is emitted by an exhaustive match.

use crate::options::SerializerOptions;
use wraeblast_core::ast::{Action, ActionArg, Condition, ConditionValue, ItemFilter, Operator, Rule};
use wraeblast_core::types::Color;

/// Serializer bound to a set of formatting options
#[derive(Debug, Clone, Default)]
pub struct StandardSerializer {
    options: SerializerOptions,
}

impl StandardSerializer {
    /// Create a serializer with default options
    pub fn new() -> Self {
        Self::with_options(SerializerOptions::default())
    }

    /// Create a serializer with custom options
    pub fn with_options(options: SerializerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Serialize a whole filter, one blank line after every rule
    pub fn dumps(&self, filter: &ItemFilter) -> String {
        log::debug!("filter.serialize rules={}", filter.rules.len());
        let mut out = String::new();
        for rule in &filter.rules {
            out.push_str(&self.serialize_rule(rule));
            out.push('\n');
        }
        out
    }

    /// Serialize a rule: the visibility line, then conditions, then actions
    pub fn serialize_rule(&self, rule: &Rule) -> String {
        let indent = self.options.indentation();
        let mut out = String::new();
        out.push_str(rule.visibility.as_str());
        out.push('\n');
        for condition in rule.conditions.values() {
            out.push_str(&indent);
            out.push_str(&serialize_condition(condition));
            out.push('\n');
        }
        for action in rule.actions.values() {
            out.push_str(&indent);
            out.push_str(&self.serialize_action(action));
            out.push('\n');
        }
        out
    }

    /// Serialize one action line
    pub fn serialize_action(&self, action: &Action) -> String {
        let mut out = action.kind.as_str().to_string();
        if action.kind.is_drop_sound() {
            return out;
        }
        let quoted = !action.kind.has_unquoted_args();
        for arg in &action.args {
            out.push(' ');
            out.push_str(&self.serialize_arg(arg, quoted));
        }
        out
    }

    fn serialize_arg(&self, arg: &ActionArg, quoted: bool) -> String {
        match arg {
            ActionArg::Int(n) => n.to_string(),
            ActionArg::String(s) if quoted => quote(s),
            ActionArg::String(s) => s.clone(),
            ActionArg::Enum(value) => value.as_str().to_string(),
            ActionArg::Color(color) => self.serialize_color(color),
            ActionArg::Sequence(items) => items
                .iter()
                .map(|item| self.serialize_arg(item, quoted))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    fn serialize_color(&self, color: &Color) -> String {
        let bytes = color.rgba_bytes();
        let channels = if bytes[3] == u8::MAX && self.options.use_default_opacity {
            &bytes[..3]
        } else {
            &bytes[..]
        };
        channels
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Serialize one condition line.
///
/// `=` is implied and never written. A bare `True` on a threshold kind such
/// as `StackSize` is written as `1`.
pub fn serialize_condition(condition: &Condition) -> String {
    let mut out = condition.kind.as_str().to_string();
    if condition.op != Operator::Eq {
        out.push(' ');
        out.push_str(condition.op.as_str());
    }
    let value = match &condition.value {
        ConditionValue::Bool(true) if condition.kind.accepts_presence() => "1".to_string(),
        other => serialize_value(other),
    };
    out.push(' ');
    out.push_str(&value);
    out
}

fn serialize_value(value: &ConditionValue) -> String {
    match value {
        ConditionValue::Bool(true) => "True".to_string(),
        ConditionValue::Bool(false) => "False".to_string(),
        ConditionValue::Int(n) => n.to_string(),
        ConditionValue::String(s) => quote(s),
        ConditionValue::Strings(list) => join(list.iter().map(|s| quote(s))),
        ConditionValue::Rarities(list) => join(list.iter().map(ToString::to_string)),
        ConditionValue::Influences(list) => join(list.iter().map(ToString::to_string)),
        ConditionValue::SocketGroup(group) => group.to_string(),
        ConditionValue::CountedNames { count, names } => {
            format!("{} {}", count, join(names.iter().map(|s| quote(s))))
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s)
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

/// Serialize a filter with the given options
pub fn dumps(filter: &ItemFilter, options: &SerializerOptions) -> String {
    StandardSerializer::with_options(options.clone()).dumps(filter)
}

/// Serialize a rule with default options
pub fn serialize_rule(rule: &Rule) -> String {
    StandardSerializer::new().serialize_rule(rule)
}

/// Serialize an action with default options
pub fn serialize_action(action: &Action) -> String {
    StandardSerializer::new().serialize_action(action)
}
