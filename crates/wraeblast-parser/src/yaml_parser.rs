//! YAML Parser
//!
//! Field access helpers for walking structured filter documents.

use crate::error::{ParseError, Result};
use serde_yaml::Value as YamlValue;

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a YAML value
    pub fn parse(yaml_str: &str) -> Result<YamlValue> {
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// Get an optional string field from YAML object
    pub fn get_optional_string(obj: &YamlValue, field: &str) -> Option<String> {
        obj.get(field)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get an optional integer field, failing if present with another type
    pub fn get_optional_i64(obj: &YamlValue, field: &str) -> Result<Option<i64>> {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| Self::type_mismatch(field, "an integer", value)),
        }
    }

    /// Get an optional array field from YAML object
    pub fn get_optional_array<'a>(obj: &'a YamlValue, field: &str) -> Option<&'a Vec<YamlValue>> {
        obj.get(field).and_then(|v| v.as_sequence())
    }

    /// Get an optional object field from YAML object
    pub fn get_optional_object<'a>(
        obj: &'a YamlValue,
        field: &str,
    ) -> Option<&'a serde_yaml::Mapping> {
        obj.get(field).and_then(|v| v.as_mapping())
    }

    /// Deserialize an optional field into `T`
    pub fn get_optional_as<T>(obj: &YamlValue, field: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        match obj.get(field) {
            None | Some(YamlValue::Null) => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| ParseError::InvalidValue {
                    field: field.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    /// Short type name of a YAML value, for error messages
    pub fn type_name(value: &YamlValue) -> &'static str {
        match value {
            YamlValue::Null => "null",
            YamlValue::Bool(_) => "boolean",
            YamlValue::Number(_) => "number",
            YamlValue::String(_) => "string",
            YamlValue::Sequence(_) => "sequence",
            YamlValue::Mapping(_) => "mapping",
            YamlValue::Tagged(_) => "tagged value",
        }
    }

    pub fn type_mismatch(field: &str, expected: &str, actual: &YamlValue) -> ParseError {
        ParseError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: Self::type_name(actual).to_string(),
        }
    }

    /// Validate fields in a YAML object against a list of known fields
    /// Returns warnings for unknown fields with suggestions
    pub fn validate_fields(obj: &YamlValue, known_fields: &[&str], context: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(mapping) = obj.as_mapping() {
            for (key, _) in mapping {
                if let Some(field_name) = key.as_str() {
                    if !known_fields.contains(&field_name) {
                        let suggestion = Self::suggest(field_name, known_fields)
                            .map(|s| format!(" Did you mean '{}'?", s))
                            .unwrap_or_default();

                        warnings.push(format!(
                            "Unknown field '{}' in {}.{}",
                            field_name, context, suggestion
                        ));
                    }
                }
            }
        }

        for warning in &warnings {
            log::warn!("{}", warning);
        }
        warnings
    }

    /// Closest known name, either from the typo table or by edit distance
    pub fn suggest(name: &str, known: &[&str]) -> Option<String> {
        if let Some((_, correct)) = FIELD_CORRECTIONS.iter().find(|(typo, _)| *typo == name) {
            return Some(correct.to_string());
        }
        known
            .iter()
            .filter(|candidate| levenshtein_distance(name, candidate) <= 2)
            .min_by_key(|candidate| levenshtein_distance(name, candidate))
            .map(|s| s.to_string())
    }
}

/// Common field name typos and their corrections
const FIELD_CORRECTIONS: &[(&str, &str)] = &[
    ("condition", "conditions"),
    ("action", "actions"),
    ("tag", "tags"),
    ("show", "visibility"),
    ("visible_tags", "visible"),
    ("hidden_tags", "hidden"),
    ("styles", "style"),
];

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for (i, &c1) in s1_chars.iter().enumerate() {
        for (j, &c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            matrix[i + 1][j + 1] = (matrix[i][j + 1] + 1)
                .min(matrix[i + 1][j] + 1)
                .min(matrix[i][j] + cost);
        }
    }

    matrix[len1][len2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_optional_i64() {
        let yaml = YamlParser::parse("priority: 5\nname: x\n").unwrap();
        assert_eq!(YamlParser::get_optional_i64(&yaml, "priority").unwrap(), Some(5));
        assert_eq!(YamlParser::get_optional_i64(&yaml, "missing").unwrap(), None);
        assert!(matches!(
            YamlParser::get_optional_i64(&yaml, "name"),
            Err(ParseError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_fields_suggests() {
        let yaml = YamlParser::parse("visibility: Show\ncondition: {}\ntagz: []\n").unwrap();
        let warnings = YamlParser::validate_fields(&yaml, &["visibility", "conditions", "tags"], "rule");
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Did you mean 'conditions'?"));
        assert!(warnings[1].contains("Did you mean 'tags'?"));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("ItemLevl", "ItemLevel"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("same", "same"), 0);
    }
}
