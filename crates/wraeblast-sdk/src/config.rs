//! Prerender options: per-category thresholds and colormaps

use crate::colors::{self, Colormap};
use crate::error::{Result, SdkError};
use crate::helpers;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use wraeblast_core::Color;
use wraeblast_insights::{ItemFilterContext, ThresholdOptions};

/// Quantile every category must reach by default
pub const DEFAULT_QUANTILE: &str = "QU4";

/// Default template search path
pub const DEFAULT_SEARCH_PATH: &str = "filters";

const THRESHOLD_CATEGORIES: [&str; 19] = [
    "artifacts",
    "base_types",
    "blighted_maps",
    "cluster_jewels",
    "currencies",
    "delirium_orbs",
    "divination_cards",
    "essences",
    "fossils",
    "fragments",
    "incubators",
    "maps",
    "oils",
    "prophecies",
    "scarabs",
    "skill_gems",
    "uniques",
    "vials",
    "watchstones",
];

const DEFAULT_COLORMAPS: [(&str, &str); 23] = [
    ("artifacts", "Curl_20"),
    ("base_types", "Turbid_20_r"),
    ("blighted_maps", "Devon_20"),
    ("cluster_jewels", "Hawaii_20"),
    ("currencies", "Curl_20"),
    ("delirium_orbs", "Curl_20"),
    ("divination_cards", "GrayC_20_r"),
    ("essences", "Curl_20"),
    ("flasks", "Magenta_5"),
    ("fossils", "Tokyo_20"),
    ("fragments", "Tokyo_20"),
    ("incubators", "Tokyo_20"),
    ("life_flasks", "Magenta_5"),
    ("mana_flasks", "BluYl_2"),
    ("maps", "Devon_20"),
    ("maps_tiered", "Devon_20"),
    ("oils", "Curl_20"),
    ("prophecies", "GrayC_20_r"),
    ("scarabs", "Tokyo_20"),
    ("skill_gems", "Curl_20"),
    ("uniques", "Viridis_20"),
    ("vials", "Tokyo_20"),
    ("watchstones", "Curl_20"),
];

/// Highest map tier, the scale of the `maps_tiered` colormap
const MAX_MAP_TIER: f64 = 14.0;

fn default_vmin() -> f64 {
    1.0
}

fn default_vmax() -> f64 {
    30_000f64.ln()
}

/// A named colormap with its value range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColormapOptions {
    pub name: String,
    #[serde(default = "default_vmin")]
    pub vmin: f64,
    #[serde(default = "default_vmax")]
    pub vmax: f64,
}

impl ColormapOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vmin: default_vmin(),
            vmax: default_vmax(),
        }
    }

    pub fn with_vmin(mut self, vmin: f64) -> Self {
        self.vmin = vmin;
        self
    }

    pub fn with_vmax(mut self, vmax: f64) -> Self {
        self.vmax = vmax;
        self
    }

    pub fn get_colormap(&self) -> Result<Colormap> {
        colors::get_colormap_by_name(&self.name)
    }

    /// Pick a color, the range defaulting to this colormap's own
    pub fn pick(&self, value: f64, vmax: Option<f64>, vmin: Option<f64>, log_scale: bool) -> Result<Color> {
        Ok(helpers::colormap_pick(
            &self.get_colormap()?,
            value,
            vmax.unwrap_or(self.vmax),
            vmin.unwrap_or(self.vmin),
            log_scale,
        ))
    }
}

/// Options consulted while a filter template renders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilterPrerenderOptions {
    #[serde(default)]
    pub thresholds: BTreeMap<String, ThresholdOptions>,
    #[serde(default)]
    pub colormaps: BTreeMap<String, ColormapOptions>,
}

impl ItemFilterPrerenderOptions {
    /// Options without any category
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults merged with `overrides`.
    ///
    /// Override maps merge recursively into the defaults, except threshold
    /// entries, which replace the default entry of their category. With a
    /// context, each colormap of a category present in it is scaled to the
    /// category's most valuable item unless the override sets its `vmax`.
    pub fn with_defaults(
        overrides: Option<&Value>,
        ctx: Option<&ItemFilterContext>,
        set_colormap_maximums: bool,
    ) -> Result<Self> {
        let mut document = default_options();
        if let Some(overrides) = overrides {
            if !overrides.is_object() && !overrides.is_null() {
                return Err(SdkError::Config("options overrides must be a mapping".to_string()));
            }
            merge_overrides(&mut document, overrides);
        }
        let mut options: Self = serde_json::from_value(document)?;

        if let (Some(ctx), true) = (ctx, set_colormap_maximums) {
            for (category, colormap) in options.colormaps.iter_mut() {
                if overrides_vmax(overrides, category) {
                    continue;
                }
                if let Some(max) = ctx.data.get(category).and_then(|table| table.max_chaos_value()) {
                    colormap.vmax = max;
                }
            }
        }

        debug!(
            thresholds = options.thresholds.len(),
            colormaps = options.colormaps.len(),
            "options.initialized"
        );
        Ok(options)
    }

    pub fn with_threshold(mut self, category: impl Into<String>, threshold: ThresholdOptions) -> Self {
        self.thresholds.insert(category.into(), threshold);
        self
    }

    pub fn with_colormap(mut self, category: impl Into<String>, colormap: ColormapOptions) -> Self {
        self.colormaps.insert(category.into(), colormap);
        self
    }

    /// Threshold rule of `category`
    pub fn threshold(&self, category: &str) -> Result<&ThresholdOptions> {
        self.thresholds
            .get(category)
            .ok_or_else(|| SdkError::Config(format!("no threshold configured for '{}'", category)))
    }

    /// Colormap of `category`
    pub fn colormap(&self, category: &str) -> Result<&ColormapOptions> {
        self.colormaps
            .get(category)
            .ok_or_else(|| SdkError::Config(format!("no colormap configured for '{}'", category)))
    }

    /// Parse a complete options document from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a complete options document from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read an override document, YAML for `.yaml`/`.yml` files and JSON otherwise
    pub fn read_overrides(path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let overrides = if is_yaml {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(overrides)
    }

    /// Defaults merged with the override file at `path`
    pub fn load(path: impl AsRef<Path>, ctx: Option<&ItemFilterContext>) -> Result<Self> {
        let overrides = Self::read_overrides(path)?;
        Self::with_defaults(Some(&overrides), ctx, true)
    }
}

/// The built-in options document
pub fn default_options() -> Value {
    let thresholds: Map<String, Value> = THRESHOLD_CATEGORIES
        .iter()
        .map(|category| (category.to_string(), json!({ "quantile": DEFAULT_QUANTILE })))
        .collect();
    let colormaps: Map<String, Value> = DEFAULT_COLORMAPS
        .iter()
        .map(|(category, name)| {
            let mut colormap = json!({ "name": name });
            if *category == "maps_tiered" {
                colormap["vmax"] = json!(MAX_MAP_TIER);
            }
            (category.to_string(), colormap)
        })
        .collect();
    json!({
        "thresholds": thresholds,
        "colormaps": colormaps,
    })
}

fn merge_overrides(document: &mut Value, overrides: &Value) {
    let Value::Object(overrides) = overrides else {
        return;
    };
    for (key, value) in overrides {
        if key == "thresholds" {
            if let (Some(Value::Object(thresholds)), Value::Object(entries)) =
                (document.get_mut("thresholds"), value)
            {
                for (category, entry) in entries {
                    thresholds.insert(category.clone(), entry.clone());
                }
                continue;
            }
        }
        match document.get_mut(key.as_str()) {
            Some(existing) => deep_merge(existing, value),
            None => {
                if let Value::Object(map) = document {
                    map.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// Merge `overrides` into `base`, maps recursively and everything else by replacement
pub fn deep_merge(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}

fn overrides_vmax(overrides: Option<&Value>, category: &str) -> bool {
    overrides
        .and_then(|o| o.get("colormaps"))
        .and_then(|colormaps| colormaps.get(category))
        .and_then(|colormap| colormap.get("vmax"))
        .is_some()
}

/// Where template includes are resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub search_path: PathBuf,
}

impl RenderOptions {
    pub fn new(search_path: impl Into<PathBuf>) -> Self {
        Self {
            search_path: search_path.into(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wraeblast_insights::{ItemTable, QuantileLabel};

    #[test]
    fn test_defaults() {
        let options = ItemFilterPrerenderOptions::with_defaults(None, None, true).unwrap();
        assert_eq!(options.thresholds.len(), THRESHOLD_CATEGORIES.len());
        assert_eq!(
            options.threshold("currencies").unwrap(),
            &ThresholdOptions::quantile("QU4".parse::<QuantileLabel>().unwrap())
        );
        let uniques = options.colormap("uniques").unwrap();
        assert_eq!(uniques.name, "Viridis_20");
        assert_eq!(uniques.vmin, 1.0);
        assert!((uniques.vmax - 30_000f64.ln()).abs() < 1e-12);
        assert_eq!(options.colormap("maps_tiered").unwrap().vmax, 14.0);
    }

    #[test]
    fn test_overrides_merge_into_defaults() {
        let overrides = json!({
            "colormaps": {"uniques": {"name": "Magma_10"}},
            "thresholds": {"currencies": {"visibility": 2.0}},
        });
        let options = ItemFilterPrerenderOptions::with_defaults(Some(&overrides), None, true).unwrap();
        let uniques = options.colormap("uniques").unwrap();
        assert_eq!(uniques.name, "Magma_10");
        assert!((uniques.vmax - 30_000f64.ln()).abs() < 1e-12);
        assert!(matches!(
            options.threshold("currencies").unwrap(),
            ThresholdOptions::Tiered(tiered) if tiered.visibility == 2.0 && tiered.valuable == 5.0
        ));
    }

    #[test]
    fn test_context_sets_colormap_maximums() {
        let ctx = ItemFilterContext::new()
            .with_table("uniques", ItemTable::from_prices([("Headhunter", 9000.0), ("Tabula Rasa", 10.0)]))
            .with_table("fossils", ItemTable::from_prices([("Faceted Fossil", 120.0)]));
        let overrides = json!({"colormaps": {"fossils": {"vmax": 50.0}}});
        let options =
            ItemFilterPrerenderOptions::with_defaults(Some(&overrides), Some(&ctx), true).unwrap();
        assert_eq!(options.colormap("uniques").unwrap().vmax, 9000.0);
        assert_eq!(options.colormap("fossils").unwrap().vmax, 50.0);

        let unscaled = ItemFilterPrerenderOptions::with_defaults(None, Some(&ctx), false).unwrap();
        assert!((unscaled.colormap("uniques").unwrap().vmax - 30_000f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_mapping_overrides() {
        let result = ItemFilterPrerenderOptions::with_defaults(Some(&json!([1, 2])), None, true);
        assert!(matches!(result, Err(SdkError::Config(_))));
    }

    #[test]
    fn test_deep_merge() {
        let mut base = json!({"a": {"b": 1, "c": 2}, "d": [1]});
        deep_merge(&mut base, &json!({"a": {"c": 3}, "d": [2, 3]}));
        assert_eq!(base, json!({"a": {"b": 1, "c": 3}, "d": [2, 3]}));
    }

    #[test]
    fn test_missing_category() {
        let options = ItemFilterPrerenderOptions::new();
        assert!(matches!(options.threshold("maps"), Err(SdkError::Config(_))));
    }

    #[test]
    fn test_builder_methods_and_yaml() {
        let options = ItemFilterPrerenderOptions::new()
            .with_threshold(
                "scarabs",
                ThresholdOptions::quantile("D8".parse::<QuantileLabel>().unwrap()),
            )
            .with_colormap("scarabs", ColormapOptions::new("Tokyo_20").with_vmin(2.0).with_vmax(400.0));
        let parsed = ItemFilterPrerenderOptions::from_yaml_str(
            "thresholds:\n  scarabs:\n    quantile: D8\ncolormaps:\n  scarabs:\n    name: Tokyo_20\n    vmin: 2.0\n    vmax: 400.0\n",
        )
        .unwrap();
        assert_eq!(parsed, options);
    }
}
