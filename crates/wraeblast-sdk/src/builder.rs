//! Builder pattern for FilterLoader

use crate::config::{deep_merge, ItemFilterPrerenderOptions, RenderOptions};
use crate::error::Result;
use crate::loader::FilterLoader;
use std::path::{Path, PathBuf};
use tracing::info;
use wraeblast_insights::ItemFilterContext;

/// Builder for FilterLoader
///
/// # Example
///
/// ```rust,ignore
/// use wraeblast_sdk::FilterLoaderBuilder;
///
/// // Built-in options scaled to the context
/// let loader = FilterLoaderBuilder::new()
///     .with_context(ctx)
///     .build()?;
///
/// // Overrides from a file, templates included from "filters/"
/// let loader = FilterLoaderBuilder::new()
///     .with_context(ctx)
///     .with_options_file("options.yaml")
///     .with_search_path("filters")
///     .build()?;
/// ```
#[derive(Debug)]
pub struct FilterLoaderBuilder {
    ctx: ItemFilterContext,
    options: Option<ItemFilterPrerenderOptions>,
    overrides: Option<serde_json::Value>,
    options_file: Option<PathBuf>,
    set_colormap_maximums: bool,
    render_options: RenderOptions,
}

impl FilterLoaderBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            ctx: ItemFilterContext::new(),
            options: None,
            overrides: None,
            options_file: None,
            set_colormap_maximums: true,
            render_options: RenderOptions::default(),
        }
    }

    /// Set the economic context templates render against
    pub fn with_context(mut self, ctx: ItemFilterContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Use complete options, skipping the built-in defaults
    pub fn with_options(mut self, options: ItemFilterPrerenderOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Merge an override document onto the built-in defaults
    pub fn with_overrides(mut self, overrides: serde_json::Value) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Read the override document from a JSON or YAML file
    pub fn with_options_file(mut self, path: impl AsRef<Path>) -> Self {
        self.options_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Scale colormaps to each category's most valuable item (default: true)
    pub fn set_colormap_maximums(mut self, enabled: bool) -> Self {
        self.set_colormap_maximums = enabled;
        self
    }

    /// Directory template includes are resolved from
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.render_options = RenderOptions::new(path);
        self
    }

    /// Build the loader
    pub fn build(self) -> Result<FilterLoader> {
        let options = match self.options {
            Some(options) => options,
            None => {
                let overrides = match (self.options_file, self.overrides) {
                    (Some(path), None) => Some(ItemFilterPrerenderOptions::read_overrides(path)?),
                    (Some(path), Some(overrides)) => {
                        let mut merged = ItemFilterPrerenderOptions::read_overrides(path)?;
                        deep_merge(&mut merged, &overrides);
                        Some(merged)
                    }
                    (None, overrides) => overrides,
                };
                ItemFilterPrerenderOptions::with_defaults(
                    overrides.as_ref(),
                    Some(&self.ctx),
                    self.set_colormap_maximums,
                )?
            }
        };

        info!(
            categories = self.ctx.data.len(),
            thresholds = options.thresholds.len(),
            search_path = %self.render_options.search_path.display(),
            "loader.built"
        );
        Ok(FilterLoader::new(self.ctx, options, self.render_options))
    }
}

impl Default for FilterLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
