//! Priced item tables and their quantile ranks

use crate::quantile::QuantileKind;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// One priced item with its rank in every quantile family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item_name: String,
    pub chaos_value: f64,
    #[serde(default)]
    pub quartile: u32,
    #[serde(default)]
    pub quintile: u32,
    #[serde(default)]
    pub decile: u32,
    #[serde(default)]
    pub percentile: u32,
    /// Source fields kept for templates (base type, stack size, links...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemRow {
    pub fn new(item_name: impl Into<String>, chaos_value: f64) -> Self {
        Self {
            item_name: item_name.into(),
            chaos_value,
            quartile: 0,
            quintile: 0,
            decile: 0,
            percentile: 0,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn quantile(&self, kind: QuantileKind) -> u32 {
        match kind {
            QuantileKind::Quartile => self.quartile,
            QuantileKind::Quintile => self.quintile,
            QuantileKind::Decile => self.decile,
            QuantileKind::Percentile => self.percentile,
        }
    }

    fn set_quantile(&mut self, kind: QuantileKind, value: u32) {
        match kind {
            QuantileKind::Quartile => self.quartile = value,
            QuantileKind::Quintile => self.quintile = value,
            QuantileKind::Decile => self.decile = value,
            QuantileKind::Percentile => self.percentile = value,
        }
    }

    /// `[Q<n>, QU<n>, D<n>, P<n>]`
    pub fn quantile_tags(&self) -> Vec<String> {
        QuantileKind::ALL
            .iter()
            .map(|kind| format!("{}{}", kind.prefix(), self.quantile(*kind)))
            .collect()
    }

    /// Hash of the identifying content, used as a cache key
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(&mut hasher);
        hasher.finish()
    }

    fn hash_into(&self, hasher: &mut DefaultHasher) {
        self.item_name.hash(hasher);
        self.chaos_value.to_bits().hash(hasher);
    }
}

/// Minimum chaos value of one distinct quantile combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileThreshold {
    pub quartile: u32,
    pub quintile: u32,
    pub decile: u32,
    pub percentile: u32,
    pub chaos_value: f64,
}

impl QuantileThreshold {
    pub fn quantile(&self, kind: QuantileKind) -> u32 {
        match kind {
            QuantileKind::Quartile => self.quartile,
            QuantileKind::Quintile => self.quintile,
            QuantileKind::Decile => self.decile,
            QuantileKind::Percentile => self.percentile,
        }
    }

    /// `[Q<n>, QU<n>, D<n>, P<n>]`
    pub fn quantile_tags(&self) -> Vec<String> {
        QuantileKind::ALL
            .iter()
            .map(|kind| format!("{}{}", kind.prefix(), self.quantile(*kind)))
            .collect()
    }
}

/// Priced items of one category, most valuable first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTable {
    rows: Vec<ItemRow>,
}

impl ItemTable {
    /// Wrap rows whose ranks are already computed
    pub fn new(mut rows: Vec<ItemRow>) -> Self {
        sort_descending(&mut rows);
        Self { rows }
    }

    /// Build a ranked table from `(name, chaos value)` pairs
    pub fn from_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::ranked(
            prices
                .into_iter()
                .map(|(name, value)| ItemRow::new(name, value))
                .collect(),
        )
    }

    /// Recompute every rank column for `rows`.
    ///
    /// Zero chaos values become the smallest non-zero value of the table.
    /// Rows are ranked by chaos value, ties keeping their input order, and
    /// the ranks are cut into equal-count buckets labelled from 1.
    pub fn ranked(mut rows: Vec<ItemRow>) -> Self {
        let min_value = rows
            .iter()
            .map(|row| row.chaos_value)
            .filter(|value| *value != 0.0)
            .fold(None, |min: Option<f64>, value| {
                Some(min.map_or(value, |m| m.min(value)))
            });
        if let Some(min_value) = min_value {
            for row in rows.iter_mut().filter(|row| row.chaos_value == 0.0) {
                row.chaos_value = min_value;
            }
        }

        let mut order: Vec<usize> = (0..rows.len()).collect();
        order.sort_by(|a, b| rows[*a].chaos_value.total_cmp(&rows[*b].chaos_value));

        let count = rows.len();
        for (position, index) in order.into_iter().enumerate() {
            let rank = position + 1;
            for kind in QuantileKind::ALL {
                rows[index].set_quantile(kind, bucket(rank, count, kind.buckets()));
            }
        }

        debug!(rows = count, "table.ranked");
        Self::new(rows)
    }

    pub fn rows(&self) -> &[ItemRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, item_name: &str) -> Option<&ItemRow> {
        self.rows.iter().find(|row| row.item_name == item_name)
    }

    pub fn max_chaos_value(&self) -> Option<f64> {
        self.rows.first().map(|row| row.chaos_value)
    }

    /// The cheapest row worth at least `chaos_value`
    pub fn cheapest_at_or_above(&self, chaos_value: f64) -> Option<&ItemRow> {
        self.rows
            .iter()
            .rev()
            .find(|row| row.chaos_value >= chaos_value)
    }

    /// Minimum chaos value of every distinct quantile combination, cheapest first
    pub fn quantile_thresholds(&self) -> Vec<QuantileThreshold> {
        let mut thresholds: Vec<QuantileThreshold> = Vec::new();
        for row in self.rows.iter().rev() {
            let key = (row.quartile, row.quintile, row.decile, row.percentile);
            match thresholds.iter_mut().find(|t| {
                (t.quartile, t.quintile, t.decile, t.percentile) == key
            }) {
                Some(existing) => existing.chaos_value = existing.chaos_value.min(row.chaos_value),
                None => thresholds.push(QuantileThreshold {
                    quartile: row.quartile,
                    quintile: row.quintile,
                    decile: row.decile,
                    percentile: row.percentile,
                    chaos_value: row.chaos_value,
                }),
            }
        }
        thresholds.sort_by_key(|t| (t.quartile, t.quintile, t.decile, t.percentile));
        thresholds
    }

    /// The first threshold worth at least `min_chaos_value`, else the most valuable one
    pub fn get_quantiles_for_threshold(&self, min_chaos_value: f64) -> Option<QuantileThreshold> {
        let thresholds = self.quantile_thresholds();
        thresholds
            .iter()
            .find(|t| t.chaos_value >= min_chaos_value)
            .or_else(|| thresholds.last())
            .cloned()
    }

    /// Hash of every row's identifying content
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.rows.len().hash(&mut hasher);
        for row in &self.rows {
            row.hash_into(&mut hasher);
        }
        hasher.finish()
    }
}

fn sort_descending(rows: &mut [ItemRow]) {
    rows.sort_by(|a, b| b.chaos_value.total_cmp(&a.chaos_value));
}

/// Equal-count bucket of a 1-based rank, matching interpolated quantile edges
fn bucket(rank: usize, count: usize, buckets: u32) -> u32 {
    if count <= 1 {
        return 1;
    }
    let buckets = buckets as usize;
    let numerator = (rank - 1) * buckets;
    let denominator = count - 1;
    let bucket = (numerator + denominator - 1) / denominator;
    bucket.max(1) as u32
}
