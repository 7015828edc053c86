//! Structured document loader
//!
//! Builds an [`ItemFilter`] from the YAML document produced by expanding an
//! extended-format template:
//!
//! ```yaml
//! presets:
//!   strict:
//!     hidden: [[currency, low_value]]
//! styles:
//!   valuable:
//!     actions: { SetFontSize: 45 }
//!     tags: [valuable]
//! rules:
//!   - visibility: Show
//!     conditions: { ItemLevel: { ">=": 65 } }
//!     tags: [valuable]
//! ```

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use wraeblast_core::ast::{
    Action, ActionArg, ActionKind, Condition, ConditionArgs, ConditionKind, ConditionValue,
    ItemFilter, Preset, Rule, Style, StyleRef, StyleSheet, TagGroup, TagReplacement, Visibility,
};

const RULE_FIELDS: &[&str] = &[
    "visibility",
    "conditions",
    "actions",
    "tags",
    "priority",
    "style",
    "name",
];
const STYLE_FIELDS: &[&str] = &["actions", "tags"];
const PRESET_FIELDS: &[&str] = &["tags", "replace", "visible", "hidden"];

/// Loader for structured filter documents
pub struct DocumentParser;

impl DocumentParser {
    /// Parse a YAML document into a filter, applying its "default" preset
    pub fn parse(yaml_str: &str) -> Result<ItemFilter> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Build a filter from an already parsed YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<ItemFilter> {
        if yaml.is_null() {
            return Ok(ItemFilter::new(BTreeMap::new(), StyleSheet::new(), Vec::new())?);
        }
        if !yaml.is_mapping() {
            return Err(YamlParser::type_mismatch("document", "a mapping", yaml));
        }
        YamlParser::validate_fields(yaml, &["presets", "styles", "rules"], "document");

        let mut presets = BTreeMap::new();
        if let Some(mapping) = YamlParser::get_optional_object(yaml, "presets") {
            for (name, body) in mapping {
                let name = key_name(name, "presets")?;
                let preset = Self::parse_preset(body)
                    .map_err(|e| context(e, &format!("preset '{}'", name)))?;
                presets.insert(name, preset);
            }
        }

        let mut styles = StyleSheet::new();
        if let Some(mapping) = YamlParser::get_optional_object(yaml, "styles") {
            for (name, body) in mapping {
                let name = key_name(name, "styles")?;
                let style = Self::parse_style(body)
                    .map_err(|e| context(e, &format!("style '{}'", name)))?;
                styles.insert(name, style);
            }
        }

        let mut rules = Vec::new();
        if let Some(sequence) = YamlParser::get_optional_array(yaml, "rules") {
            for (index, body) in sequence.iter().enumerate() {
                let rule = Self::parse_rule(body)
                    .map_err(|e| context(e, &format!("rule #{}", index + 1)))?;
                rules.push(rule);
            }
        }

        log::debug!(
            "document.load presets={} styles={} rules={}",
            presets.len(),
            styles.len(),
            rules.len()
        );
        Ok(ItemFilter::new(presets, styles, rules)?)
    }

    /// Parse a single rule mapping
    pub fn parse_rule(yaml: &YamlValue) -> Result<Rule> {
        if !yaml.is_mapping() {
            return Err(YamlParser::type_mismatch("rule", "a mapping", yaml));
        }
        YamlParser::validate_fields(yaml, RULE_FIELDS, "rule");

        let visibility = match YamlParser::get_optional_string(yaml, "visibility") {
            Some(v) => v.parse::<Visibility>()?,
            None => Visibility::Show,
        };
        let mut rule = Rule::new(visibility);

        for (key, value) in entries(yaml.get("conditions"), "conditions")? {
            let kind: ConditionKind = parse_kind(&key, "conditions", ConditionKind::ALL)?;
            rule.add_condition(Self::parse_condition(kind, value)?);
        }

        for (key, value) in entries(yaml.get("actions"), "actions")? {
            let kind: ActionKind = parse_kind(&key, "actions", ActionKind::ALL)?;
            rule.add_action(Action::new(kind, action_args(kind, value)?)?);
        }

        rule.tags = tag_set(yaml.get("tags"))?;
        rule.priority = YamlParser::get_optional_i64(yaml, "priority")?;
        rule.style = YamlParser::get_optional_as::<StyleRef>(yaml, "style")?;
        if let Some(name) = YamlParser::get_optional_string(yaml, "name") {
            rule.name = Some(name);
        }

        Ok(rule)
    }

    /// Parse condition arguments: a bare value or a single `{operator: value}` pair
    pub fn parse_condition(kind: ConditionKind, value: &YamlValue) -> Result<Condition> {
        let args = match value {
            YamlValue::Null => ConditionArgs::Value(ConditionValue::Bool(true)),
            other => serde_yaml::from_value(other.clone()).map_err(|e| ParseError::InvalidValue {
                field: kind.to_string(),
                message: e.to_string(),
            })?,
        };
        Ok(Condition::from_args(kind, args)?)
    }

    /// Parse a style mapping
    pub fn parse_style(yaml: &YamlValue) -> Result<Style> {
        if !yaml.is_mapping() {
            return Err(YamlParser::type_mismatch("style", "a mapping", yaml));
        }
        YamlParser::validate_fields(yaml, STYLE_FIELDS, "style");

        let mut style = Style::new();
        for (key, value) in entries(yaml.get("actions"), "actions")? {
            let kind: ActionKind = parse_kind(&key, "actions", ActionKind::ALL)?;
            style = style.with_action(kind, action_args(kind, value)?)?;
        }
        let tags = YamlParser::get_optional_as::<Vec<TagGroup>>(yaml, "tags")?.unwrap_or_default();
        Ok(style.with_tags(tags))
    }

    /// Parse a preset, with its fields either at top level or under `tags`
    pub fn parse_preset(yaml: &YamlValue) -> Result<Preset> {
        if yaml.is_null() {
            return Ok(Preset::new());
        }
        if !yaml.is_mapping() {
            return Err(YamlParser::type_mismatch("preset", "a mapping", yaml));
        }
        YamlParser::validate_fields(yaml, PRESET_FIELDS, "preset");
        let body = match yaml.get("tags") {
            Some(tags) if tags.is_mapping() => tags,
            _ => yaml,
        };

        let mut preset = Preset::new();
        preset.visible = YamlParser::get_optional_as(body, "visible")?.unwrap_or_default();
        preset.hidden = YamlParser::get_optional_as(body, "hidden")?.unwrap_or_default();

        match body.get("replace") {
            None | Some(YamlValue::Null) => {}
            Some(YamlValue::Mapping(mapping)) => {
                for (source, target) in mapping {
                    let source = key_name(source, "replace")?;
                    let target = match target {
                        YamlValue::Null => None,
                        other => Some(serde_yaml::from_value::<TagGroup>(other.clone()).map_err(
                            |e| ParseError::InvalidValue {
                                field: "replace".to_string(),
                                message: e.to_string(),
                            },
                        )?),
                    };
                    preset.replace.push(TagReplacement {
                        source: TagGroup::One(source),
                        target,
                    });
                }
            }
            Some(sequence @ YamlValue::Sequence(_)) => {
                preset.replace = serde_yaml::from_value(sequence.clone()).map_err(|e| {
                    ParseError::InvalidValue {
                        field: "replace".to_string(),
                        message: e.to_string(),
                    }
                })?;
            }
            Some(other) => return Err(YamlParser::type_mismatch("replace", "a mapping", other)),
        }

        Ok(preset)
    }
}

/// Key/value pairs of a `conditions` or `actions` field.
///
/// Accepts a mapping, or a sequence of single-entry mappings where later
/// entries of the same kind replace earlier ones.
fn entries<'a>(value: Option<&'a YamlValue>, field: &str) -> Result<Vec<(String, &'a YamlValue)>> {
    let mut pairs = Vec::new();
    match value {
        None | Some(YamlValue::Null) => {}
        Some(YamlValue::Mapping(mapping)) => {
            for (key, value) in mapping {
                pairs.push((key_name(key, field)?, value));
            }
        }
        Some(YamlValue::Sequence(items)) => {
            for item in items {
                let mapping = item
                    .as_mapping()
                    .ok_or_else(|| YamlParser::type_mismatch(field, "a mapping", item))?;
                for (key, value) in mapping {
                    pairs.push((key_name(key, field)?, value));
                }
            }
        }
        Some(other) => return Err(YamlParser::type_mismatch(field, "a mapping", other)),
    }
    Ok(pairs)
}

fn key_name(key: &YamlValue, field: &str) -> Result<String> {
    key.as_str()
        .map(str::to_string)
        .ok_or_else(|| YamlParser::type_mismatch(field, "string keys", key))
}

fn parse_kind<K>(key: &str, field: &str, all: &[K]) -> Result<K>
where
    K: std::str::FromStr + std::fmt::Display,
{
    key.parse::<K>().map_err(|_| {
        let known: Vec<String> = all.iter().map(|k| k.to_string()).collect();
        let known: Vec<&str> = known.iter().map(String::as_str).collect();
        let suggestion = YamlParser::suggest(key, &known)
            .map(|s| format!(" Did you mean '{}'?", s))
            .unwrap_or_default();
        ParseError::InvalidValue {
            field: field.to_string(),
            message: format!("unknown keyword '{}'.{}", key, suggestion),
        }
    })
}

fn action_args(kind: ActionKind, value: &YamlValue) -> Result<Vec<ActionArg>> {
    if kind.is_drop_sound() {
        return Ok(Vec::new());
    }
    let to_arg = |value: &YamlValue| {
        serde_yaml::from_value::<ActionArg>(value.clone())
            .map_err(|_| YamlParser::type_mismatch(kind.as_str(), "an integer, string or list", value))
    };
    match value {
        YamlValue::Null => Ok(Vec::new()),
        YamlValue::Sequence(items) => items.iter().map(to_arg).collect(),
        scalar => Ok(vec![to_arg(scalar)?]),
    }
}

fn tag_set(value: Option<&YamlValue>) -> Result<std::collections::BTreeSet<String>> {
    match value {
        None | Some(YamlValue::Null) => Ok(Default::default()),
        Some(YamlValue::String(tag)) => Ok([tag.clone()].into_iter().collect()),
        Some(other) => serde_yaml::from_value(other.clone()).map_err(|e| ParseError::InvalidValue {
            field: "tags".to_string(),
            message: e.to_string(),
        }),
    }
}

fn context(error: ParseError, location: &str) -> ParseError {
    match error {
        ParseError::InvalidValue { field, message } => ParseError::InvalidValue {
            field: format!("{}.{}", location, field),
            message,
        },
        ParseError::TypeMismatch {
            field,
            expected,
            actual,
        } => ParseError::TypeMismatch {
            field: format!("{}.{}", location, field),
            expected,
            actual,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wraeblast_core::ast::Operator;

    #[test]
    fn test_parse_condition_forms() {
        let value: YamlValue = serde_yaml::from_str("{'>=': 65}").unwrap();
        let condition = DocumentParser::parse_condition(ConditionKind::ItemLevel, &value).unwrap();
        assert_eq!(condition.op, Operator::Ge);
        assert_eq!(condition.value, ConditionValue::Int(65));

        let condition =
            DocumentParser::parse_condition(ConditionKind::Corrupted, &YamlValue::Null).unwrap();
        assert_eq!(condition.value, ConditionValue::Bool(true));
    }

    #[test]
    fn test_action_args_scalar_and_list() {
        let value: YamlValue = serde_yaml::from_str("45").unwrap();
        assert_eq!(
            action_args(ActionKind::SetFontSize, &value).unwrap(),
            vec![ActionArg::Int(45)]
        );

        let value: YamlValue = serde_yaml::from_str("[0, Red, Star]").unwrap();
        assert_eq!(action_args(ActionKind::MinimapIcon, &value).unwrap().len(), 3);

        let value: YamlValue = serde_yaml::from_str("true").unwrap();
        assert!(action_args(ActionKind::EnableDropSound, &value).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_kind_suggests() {
        let err = parse_kind::<ConditionKind>("ItemLevl", "conditions", ConditionKind::ALL).unwrap_err();
        assert!(err.to_string().contains("Did you mean 'ItemLevel'?"));
    }

    #[test]
    fn test_preset_nested_tags_form() {
        let value: YamlValue = serde_yaml::from_str(
            "tags:\n  hidden: [junk]\n  replace:\n    strict: hidden_strict\n",
        )
        .unwrap();
        let preset = DocumentParser::parse_preset(&value).unwrap();
        assert_eq!(preset.hidden, vec![TagGroup::One("junk".into())]);
        assert_eq!(preset.replace.len(), 1);
        assert_eq!(
            preset.replace[0].target,
            Some(TagGroup::One("hidden_strict".into()))
        );
    }
}
