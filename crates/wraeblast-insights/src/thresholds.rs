//! Threshold options: per-category visibility rules and value tags
//!
//! Two variants exist. Quantile thresholds show items ranked at or above a
//! bucket such as `QU4`. Tiered thresholds compare a stack's chaos value
//! against fixed breakpoints.

use crate::cache::{CacheKey, TagCache};
use crate::context::ItemFilterContext;
use crate::error::{InsightsError, Result};
use crate::quantile::{QuantileKind, QuantileLabel};
use crate::table::{ItemRow, ItemTable};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Value tiers used as tags by tiered thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemValue {
    Garbage,
    Valuable,
    HighlyValuable,
    ExtremelyValuable,
}

impl ItemValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemValue::Garbage => "garbage",
            ItemValue::Valuable => "valuable",
            ItemValue::HighlyValuable => "valuable_high",
            ItemValue::ExtremelyValuable => "valuable_extreme",
        }
    }
}

/// What a tag lookup is computed from
#[derive(Debug, Clone, Copy)]
pub enum TagSource<'a> {
    /// A bare chaos value
    Value(f64),
    Row(&'a ItemRow),
    Table(&'a ItemTable),
}

impl TagSource<'_> {
    fn label(&self) -> &'static str {
        match self {
            TagSource::Value(_) => "value",
            TagSource::Row(_) => "row",
            TagSource::Table(_) => "table",
        }
    }

    fn content_hash(&self) -> u64 {
        match self {
            TagSource::Value(value) => value.to_bits(),
            TagSource::Row(row) => row.content_hash(),
            TagSource::Table(table) => table.content_hash(),
        }
    }
}

/// Row column a predicate compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    ChaosValue,
    Quantile(QuantileKind),
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::ChaosValue => "chaos_value",
            Column::Quantile(kind) => kind.column(),
        }
    }
}

/// Declarative row filter, rendered as `column op value`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPredicate {
    pub column: Column,
    /// `>=` when false, `<` when true
    pub inverted: bool,
    pub value: f64,
}

impl RowPredicate {
    pub fn matches(&self, row: &ItemRow) -> bool {
        let actual = match self.column {
            Column::ChaosValue => row.chaos_value,
            Column::Quantile(kind) => f64::from(row.quantile(kind)),
        };
        if self.inverted {
            actual < self.value
        } else {
            actual >= self.value
        }
    }
}

impl fmt::Display for RowPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.inverted { "<" } else { ">=" };
        write!(f, "{} {} {}", self.column.as_str(), op, self.value)
    }
}

/// Rows split by a threshold: the `topk` best above it, the rest above it,
/// and everything below it
#[derive(Debug, Clone, PartialEq)]
pub struct TieredResults<'a> {
    pub top: Vec<&'a ItemRow>,
    pub rest: Vec<&'a ItemRow>,
    pub below: Vec<&'a ItemRow>,
}

/// Fixed chaos-value breakpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TieredThresholdOptions {
    pub visibility: f64,
    pub valuable: f64,
    pub highly_valuable: f64,
    pub extremely_valuable: f64,
}

impl Default for TieredThresholdOptions {
    fn default() -> Self {
        Self {
            visibility: 1.0,
            valuable: 5.0,
            highly_valuable: 10.0,
            extremely_valuable: 20.0,
        }
    }
}

impl TieredThresholdOptions {
    pub fn check_visibility(&self, row: &ItemRow) -> bool {
        row.chaos_value >= self.visibility
    }

    pub fn get_dataframe_query(&self, inverted: bool) -> RowPredicate {
        RowPredicate {
            column: Column::ChaosValue,
            inverted,
            value: self.visibility,
        }
    }

    /// `garbage` below the visibility breakpoint, otherwise every value
    /// tier the stack reaches
    pub fn get_tags(&self, source: TagSource<'_>, stack_size: u32) -> Vec<String> {
        let unit_value = match source {
            TagSource::Value(value) => value,
            TagSource::Row(row) => row.chaos_value,
            TagSource::Table(table) => table.max_chaos_value().unwrap_or(0.0),
        };
        let chaos_value = unit_value * f64::from(stack_size);
        if chaos_value < self.visibility {
            return vec![ItemValue::Garbage.as_str().to_string()];
        }
        [
            (self.valuable, ItemValue::Valuable),
            (self.highly_valuable, ItemValue::HighlyValuable),
            (self.extremely_valuable, ItemValue::ExtremelyValuable),
        ]
        .into_iter()
        .filter(|(breakpoint, _)| chaos_value >= *breakpoint)
        .map(|(_, tier)| tier.as_str().to_string())
        .collect()
    }
}

/// Show items ranked at or above a quantile bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantileThresholdOptions {
    pub quantile: QuantileLabel,
    #[serde(skip)]
    cache: TagCache,
}

impl PartialEq for QuantileThresholdOptions {
    fn eq(&self, other: &Self) -> bool {
        self.quantile == other.quantile
    }
}

impl QuantileThresholdOptions {
    pub fn new(quantile: QuantileLabel) -> Self {
        Self {
            quantile,
            cache: TagCache::default(),
        }
    }

    pub fn cache(&self) -> &TagCache {
        &self.cache
    }

    /// Whether `row`, or a stack of it, reaches the quantile.
    ///
    /// A row below the quantile is still shown when a stack of it is worth
    /// as much as the cheapest qualifying-or-better item in `table`. With no
    /// such item the row is hidden.
    pub fn check_visibility(&self, row: &ItemRow, stack_size: u32, table: Option<&ItemTable>) -> bool {
        let QuantileLabel { kind, value } = self.quantile;
        if row.quantile(kind) >= value {
            return true;
        }
        let Some(table) = table else {
            return false;
        };
        let chaos_value = row.chaos_value * f64::from(stack_size);
        match table.cheapest_at_or_above(chaos_value) {
            Some(candidate) => candidate.quantile(kind) >= value,
            None => false,
        }
    }

    pub fn get_dataframe_query(&self, inverted: bool) -> RowPredicate {
        RowPredicate {
            column: Column::Quantile(self.quantile.kind),
            inverted,
            value: f64::from(self.quantile.value),
        }
    }

    /// Quantile tags (`Q4`, `QU5`, `D9`, `P87`) for a value, row or table.
    ///
    /// A bare value needs `ctx` and is tagged with the first quantile
    /// threshold its stack reaches. A row with `ctx` is tagged like the
    /// cheapest item its stack is worth; without `ctx` it keeps its own
    /// ranks. A table yields every distinct rank it contains.
    pub fn get_tags(
        &self,
        source: TagSource<'_>,
        stack_size: u32,
        ctx: Option<(&ItemFilterContext, &str)>,
    ) -> Result<Vec<String>> {
        // an unknown category is left out; the lookup then fails uncached
        let context = ctx.and_then(|(ctx, category)| {
            ctx.get(category)
                .ok()
                .map(|table| (category.to_string(), table.content_hash()))
        });
        let key = CacheKey {
            source: source.label(),
            content: source.content_hash(),
            stack_size,
            context,
        };
        self.cache
            .get_or_try_insert_with(key, || compute_quantile_tags(source, stack_size, ctx))
    }
}

fn compute_quantile_tags(
    source: TagSource<'_>,
    stack_size: u32,
    ctx: Option<(&ItemFilterContext, &str)>,
) -> Result<Vec<String>> {
    let stack = f64::from(stack_size);
    match source {
        TagSource::Value(value) => {
            let (ctx, category) = ctx.ok_or(InsightsError::MissingContext)?;
            let threshold = ctx
                .get(category)?
                .get_quantiles_for_threshold(value * stack)
                .ok_or_else(|| InsightsError::EmptyTable(category.to_string()))?;
            Ok(threshold.quantile_tags())
        }
        TagSource::Row(row) => {
            let Some((ctx, category)) = ctx else {
                return Ok(row.quantile_tags());
            };
            let table = ctx.get(category)?;
            Ok(table
                .cheapest_at_or_above(row.chaos_value * stack)
                .unwrap_or(row)
                .quantile_tags())
        }
        TagSource::Table(table) => {
            let mut tags = Vec::new();
            for kind in QuantileKind::ALL {
                let distinct: BTreeSet<u32> = table.rows().iter().map(|r| r.quantile(kind)).collect();
                tags.extend(distinct.into_iter().map(|n| format!("{}{}", kind.prefix(), n)));
            }
            Ok(tags)
        }
    }
}

/// Per-category threshold rule.
///
/// A mapping with a `quantile` key is a quantile threshold, anything else
/// is tiered. Bad labels and unknown fields are errors in both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThresholdOptions {
    Quantile(QuantileThresholdOptions),
    Tiered(TieredThresholdOptions),
}

impl<'de> Deserialize<'de> for ThresholdOptions {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let options = if value.get("quantile").is_some() {
            serde_json::from_value(value).map(ThresholdOptions::Quantile)
        } else {
            serde_json::from_value(value).map(ThresholdOptions::Tiered)
        };
        options.map_err(serde::de::Error::custom)
    }
}

impl ThresholdOptions {
    pub fn quantile(label: QuantileLabel) -> Self {
        ThresholdOptions::Quantile(QuantileThresholdOptions::new(label))
    }

    pub fn check_visibility(&self, row: &ItemRow, stack_size: u32, table: Option<&ItemTable>) -> bool {
        match self {
            ThresholdOptions::Quantile(options) => options.check_visibility(row, stack_size, table),
            ThresholdOptions::Tiered(options) => options.check_visibility(row),
        }
    }

    pub fn get_dataframe_query(&self, inverted: bool) -> RowPredicate {
        match self {
            ThresholdOptions::Quantile(options) => options.get_dataframe_query(inverted),
            ThresholdOptions::Tiered(options) => options.get_dataframe_query(inverted),
        }
    }

    pub fn get_tags(
        &self,
        source: TagSource<'_>,
        stack_size: u32,
        ctx: Option<(&ItemFilterContext, &str)>,
    ) -> Result<Vec<String>> {
        match self {
            ThresholdOptions::Quantile(options) => options.get_tags(source, stack_size, ctx),
            ThresholdOptions::Tiered(options) => Ok(options.get_tags(source, stack_size)),
        }
    }

    /// Rows passing the threshold (or failing it, when `inverted`), in table order
    pub fn filter_rows<'a>(&self, table: &'a ItemTable, inverted: bool) -> Vec<&'a ItemRow> {
        let predicate = self.get_dataframe_query(inverted);
        debug!(query = %predicate, "thresholds.filter");
        table.rows().iter().filter(|row| predicate.matches(row)).collect()
    }

    pub fn get_tiered_results<'a>(&self, table: &'a ItemTable, topk: usize) -> TieredResults<'a> {
        let mut above = self.filter_rows(table, false);
        let rest = above.split_off(topk.min(above.len()));
        TieredResults {
            top: above,
            rest,
            below: self.filter_rows(table, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ItemTable {
        ItemTable::from_prices((1..=20).map(|n| (format!("item{}", n), n as f64)))
    }

    #[test]
    fn test_tiered_tags() {
        let tiered = TieredThresholdOptions::default();
        assert_eq!(tiered.get_tags(TagSource::Value(0.5), 1), vec!["garbage"]);
        assert!(tiered.get_tags(TagSource::Value(2.0), 1).is_empty());
        assert_eq!(
            tiered.get_tags(TagSource::Value(2.0), 5),
            vec!["valuable", "valuable_high"]
        );
        assert_eq!(
            tiered.get_tags(TagSource::Value(25.0), 1),
            vec!["valuable", "valuable_high", "valuable_extreme"]
        );
    }

    #[test]
    fn test_queries() {
        let quantile = ThresholdOptions::quantile("QU4".parse().unwrap());
        assert_eq!(quantile.get_dataframe_query(false).to_string(), "quintile >= 4");
        assert_eq!(quantile.get_dataframe_query(true).to_string(), "quintile < 4");

        let tiered = ThresholdOptions::Tiered(TieredThresholdOptions::default());
        assert_eq!(tiered.get_dataframe_query(false).to_string(), "chaos_value >= 1");
    }

    #[test]
    fn test_quantile_visibility_by_rank() {
        let table = table();
        let options = QuantileThresholdOptions::new("Q4".parse().unwrap());
        assert!(options.check_visibility(table.get("item20").unwrap(), 1, None));
        assert!(!options.check_visibility(table.get("item2").unwrap(), 1, None));
    }

    #[test]
    fn test_quantile_visibility_by_stack_value() {
        let table = table();
        let options = QuantileThresholdOptions::new("Q4".parse().unwrap());
        let cheap = table.get("item2").unwrap();
        // a stack of 10 is worth item20
        assert!(options.check_visibility(cheap, 10, Some(&table)));
        assert!(!options.check_visibility(cheap, 2, Some(&table)));
        // nothing is worth 200 chaos
        assert!(!options.check_visibility(cheap, 100, Some(&table)));
    }

    #[test]
    fn test_untagged_deserialization() {
        let quantile: ThresholdOptions = serde_json::from_str(r#"{"quantile": "D9"}"#).unwrap();
        assert!(matches!(quantile, ThresholdOptions::Quantile(_)));

        let tiered: ThresholdOptions = serde_json::from_str(r#"{"valuable": 8}"#).unwrap();
        match tiered {
            ThresholdOptions::Tiered(options) => {
                assert_eq!(options.valuable, 8.0);
                assert_eq!(options.visibility, 1.0);
            }
            other => panic!("Expected tiered options, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_threshold_documents_are_rejected() {
        // an invalid label must not fall back to tiered defaults
        assert!(serde_json::from_str::<ThresholdOptions>(r#"{"quantile": "QU9"}"#).is_err());
        assert!(serde_json::from_str::<ThresholdOptions>(r#"{"quantil": "QU4"}"#).is_err());
        assert!(serde_json::from_str::<ThresholdOptions>(r#"{"quantile": "D9", "valuable": 3}"#).is_err());
        assert!(serde_json::from_str::<ThresholdOptions>(r#"{"valuable": "lots"}"#).is_err());
    }

    #[test]
    fn test_quantile_tags_cached_per_context() {
        let options = QuantileThresholdOptions::new("Q4".parse().unwrap());
        let wide = ItemFilterContext::new().with_table("currencies", table());
        let narrow = ItemFilterContext::new().with_table(
            "currencies",
            ItemTable::from_prices((1..=5).map(|n| (format!("item{}", n), n as f64))),
        );

        let in_wide = options
            .get_tags(TagSource::Value(5.0), 1, Some((&wide, "currencies")))
            .unwrap();
        let in_narrow = options
            .get_tags(TagSource::Value(5.0), 1, Some((&narrow, "currencies")))
            .unwrap();
        assert_ne!(in_wide, in_narrow);
        assert!(in_narrow.contains(&"Q4".to_string()));
        assert_eq!(options.cache().stats().misses, 2);

        // same lookup again is a hit
        options
            .get_tags(TagSource::Value(5.0), 1, Some((&wide, "currencies")))
            .unwrap();
        assert_eq!(options.cache().stats().hits, 1);
    }

    #[test]
    fn test_tiered_results() {
        let table = table();
        let options = ThresholdOptions::Tiered(TieredThresholdOptions {
            visibility: 5.0,
            ..Default::default()
        });
        let results = options.get_tiered_results(&table, 3);
        assert_eq!(results.top.len(), 3);
        assert_eq!(results.top[0].item_name, "item20");
        assert_eq!(results.rest.len(), 13);
        assert_eq!(results.below.len(), 4);
    }
}
