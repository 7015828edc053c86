//! Wraeblast SDK - economy-aware loot filter templates
//!
//! This crate renders extended-format filter templates against an economic
//! context and loads the result into an [`ItemFilter`](wraeblast_core::ItemFilter):
//!
//! - Template environment with the helper library (`environment`, `helpers`)
//! - Colormaps and nearest-color matching (`colors`)
//! - Prerender options with per-category thresholds and colormaps (`config`)
//! - Loader entry points (`loader`, `builder`)
//!
//! # Example
//!
//! ```rust,ignore
//! use wraeblast_sdk::{FilterLoaderBuilder, ItemFilterContext};
//!
//! let loader = FilterLoaderBuilder::new()
//!     .with_context(ItemFilterContext::from_json_str(&prices)?)
//!     .with_search_path("filters")
//!     .build()?;
//! let filter = loader.loads(&template, false)?;
//! print!("{}", wraeblast_sdk::dumps(&filter));
//! ```

pub mod builder;
pub mod colors;
pub mod config;
pub mod environment;
pub mod error;
pub mod helpers;
pub mod loader;

pub use builder::FilterLoaderBuilder;
pub use colors::{get_colormap_by_name, Colormap};
pub use config::{ColormapOptions, ItemFilterPrerenderOptions, RenderOptions};
pub use environment::create_environment;
pub use error::{Result, SdkError};
pub use loader::{loads, render, FilterLoader};

// Re-export lower-level crates
pub use wraeblast_core::{ItemFilter, Rule};
pub use wraeblast_insights::{ItemFilterContext, ItemRow, ItemTable, ThresholdOptions};

/// Serialize a filter to the standard format with default options
pub fn dumps(filter: &ItemFilter) -> String {
    wraeblast_serializer::dumps(filter, &wraeblast_serializer::SerializerOptions::default())
}
