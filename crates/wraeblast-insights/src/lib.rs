//! Wraeblast Insights - economic context for filter templates
//!
//! This crate provides:
//! - Priced item tables with quartile/quintile/decile/percentile ranks
//! - The per-category filter context handed to templates
//! - Threshold options deciding visibility and value tags
//! - A bounded tag cache shared by threshold options

pub mod cache;
pub mod context;
pub mod error;
pub mod quantile;
pub mod table;
pub mod thresholds;

pub use cache::{CacheKey, CacheStats, TagCache};
pub use context::ItemFilterContext;
pub use error::{InsightsError, Result};
pub use quantile::{QuantileKind, QuantileLabel};
pub use table::{ItemRow, ItemTable, QuantileThreshold};
pub use thresholds::{
    ItemValue, QuantileThresholdOptions, RowPredicate, TagSource, ThresholdOptions,
    TieredResults, TieredThresholdOptions,
};
