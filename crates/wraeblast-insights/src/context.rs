//! Filter context: priced item tables by category

use crate::error::{InsightsError, Result};
use crate::table::ItemTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Economic data handed to a render, keyed by category name
/// (`currency`, `divination_cards`, `uniques`...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemFilterContext {
    pub data: BTreeMap<String, ItemTable>,
}

impl ItemFilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, category: impl Into<String>, table: ItemTable) -> Self {
        self.insert(category, table);
        self
    }

    pub fn insert(&mut self, category: impl Into<String>, table: ItemTable) {
        self.data.insert(category.into(), table);
    }

    /// Table for `category`, failing when the category is unknown
    pub fn get(&self, category: &str) -> Result<&ItemTable> {
        self.data
            .get(category)
            .ok_or_else(|| InsightsError::UnknownCategory(category.to_string()))
    }

    pub fn contains(&self, category: &str) -> bool {
        self.data.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Parse a context from JSON (`{"category": [rows...]}`)
    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category() {
        let ctx = ItemFilterContext::new().with_table("scarabs", ItemTable::default());
        assert!(ctx.get("scarabs").is_ok());
        assert_eq!(
            ctx.get("maps").unwrap_err(),
            InsightsError::UnknownCategory("maps".into())
        );
    }

    #[test]
    fn test_from_json_keeps_extra_fields() {
        let ctx = ItemFilterContext::from_json_str(
            r#"{"currency": [{"item_name": "Exalted Orb", "chaos_value": 150.0, "quartile": 4, "stack_size": 10}]}"#,
        )
        .unwrap();
        let row = ctx.get("currency").unwrap().get("Exalted Orb").unwrap();
        assert_eq!(row.quartile, 4);
        assert_eq!(row.extra["stack_size"], serde_json::json!(10));
    }
}
