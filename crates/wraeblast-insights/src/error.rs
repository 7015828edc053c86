//! Insights error types

use thiserror::Error;

/// Errors raised while ranking tables or evaluating thresholds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InsightsError {
    /// Quantile label other than `Q<n>`, `QU<n>`, `D<n>` or `P<n>`
    #[error("Invalid quantile: {0}")]
    InvalidQuantile(String),

    /// Category missing from the filter context
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Lookup against a table without rows
    #[error("Category '{0}' has no priced items")]
    EmptyTable(String),

    /// A bare value can only be tagged against a context category
    #[error("A filter context and category are required to tag a bare value")]
    MissingContext,
}

/// Result type for insights operations
pub type Result<T> = std::result::Result<T, InsightsError>;
