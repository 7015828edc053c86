//! Helper library exposed to filter templates
//!
//! Pure functions over colors, quantile labels and item names. The template
//! environment wraps each of them as a global function.

use crate::colors::{self, Colormap};
use crate::error::{Result, SdkError};
use wraeblast_core::types::{AltQuality, NamedColor};
use wraeblast_core::{Color, Operator};
use wraeblast_insights::{QuantileKind, QuantileLabel};

/// Name keywords tagged by [`get_item_tags`]
pub const ITEM_KEYWORDS: [&str; 10] = [
    "breachstone",
    "emblem",
    "fragment",
    "key",
    "sacrifice",
    "scarab",
    "simulacrum",
    "splinter",
    "vessel",
    "writ",
];

/// Breachlords recognized in breachstone and splinter names
pub const BREACHLORDS: [&str; 4] = ["chayula", "tul", "uul-netol", "xoph"];

/// Default spacing of `stacks:<n>` tags
pub const DEFAULT_STACK_INTERVAL: u32 = 5;

/// Set the HSL lightness of a color
pub fn change_brightness(color: Color, brightness: f64) -> Color {
    color.with_luminance(brightness)
}

/// Pick the color for `value` from a colormap.
///
/// With `log_scale`, the value and both bounds are replaced by their natural
/// logarithm. A non-positive value maps to `vmin`, and a non-positive `vmin`
/// is kept as is.
pub fn colormap_pick(colormap: &Colormap, value: f64, vmax: f64, vmin: f64, log_scale: bool) -> Color {
    let (value, vmax, vmin) = if log_scale {
        let value = if value > 0.0 { value.ln() } else { vmin };
        let vmin = if vmin > 0.0 { vmin.ln() } else { vmin };
        (value, vmax.ln(), vmin)
    } else {
        (value, vmax, vmin)
    };
    colors::get_color_for_value(colormap, value, vmax, vmin)
}

/// Position of a quantile label on a `0..1` scale (`QU1` is 0, `QU5` is 0.8)
pub fn quantile_position(label: QuantileLabel) -> f64 {
    let step = match label.kind {
        QuantileKind::Quartile => 0.25,
        QuantileKind::Quintile => 0.2,
        QuantileKind::Decile => 0.1,
        QuantileKind::Percentile => 0.01,
    };
    step * f64::from(label.value - 1)
}

/// The game color nearest to the colormap color picked for `value`
pub fn nearest_named_color(
    colormap: &Colormap,
    value: f64,
    vmax: f64,
    vmin: f64,
    log_scale: bool,
) -> NamedColor {
    colors::nearest_game_color(colormap_pick(colormap, value, vmax, vmin, log_scale))
}

/// Keyword tags for an item name, plus `breach` and `breach:<lord>` for
/// breachstones and splinters
pub fn get_item_tags(item_name: &str) -> Vec<String> {
    let name = item_name.to_lowercase();
    let mut tags = Vec::new();
    for keyword in ITEM_KEYWORDS {
        if !name.contains(keyword) {
            continue;
        }
        tags.push(keyword.to_string());
        if matches!(keyword, "breachstone" | "splinter") && !tags.iter().any(|t| t == "breach") {
            if let Some(lord) = BREACHLORDS.iter().find(|lord| name.contains(*lord)) {
                tags.push("breach".to_string());
                tags.push(format!("breach:{}", lord));
            }
        }
    }
    tags
}

/// `stacks` for any stack above one, then `stacks:<k>` for every multiple
/// `k` of `interval` up to the stack size
pub fn get_stack_tags(stack_size: u32, interval: u32) -> Vec<String> {
    let mut tags = Vec::new();
    if stack_size > 1 {
        tags.push("stacks".to_string());
    }
    if interval > 0 {
        tags.extend(
            (1..=stack_size / interval).map(|multiple| format!("stacks:{}", multiple * interval)),
        );
    }
    tags
}

/// Labels of every bucket at or above `label`, or below it when `mask` is set
pub fn get_quantile_threshold_tags(label: QuantileLabel, mask: bool) -> Vec<String> {
    let range = if mask {
        1..label.value
    } else {
        label.value..label.kind.buckets() + 1
    };
    range
        .map(|value| QuantileLabel::new(label.kind, value).to_string())
        .collect()
}

/// `(operator, size)` pairs from `start` to `end`; the last pair uses `end_op`
pub fn iter_stacks(start: i64, end: i64, op: Operator, end_op: Operator) -> Vec<(Operator, i64)> {
    (start..=end)
        .map(|size| (if size < end { op } else { end_op }, size))
        .collect()
}

/// Gem name without its alternate-quality prefix
pub fn normalize_skill_gem_name(name: &str) -> &str {
    AltQuality::strip_prefix(name)
}

/// Largest multiple of `k` not above `value`
pub fn round_down(value: f64, k: i64) -> Result<i64> {
    if k == 0 {
        return Err(SdkError::Config("round_down interval must not be zero".to_string()));
    }
    let k_float = k as f64;
    Ok((k_float * (value / k_float).floor()) as i64)
}

/// Settings of [`text_color`]
#[derive(Debug, Clone, PartialEq)]
pub struct TextColorOptions {
    pub lum_threshold: f64,
    pub dark_color: Option<Color>,
    pub light_color: Option<Color>,
    pub monochrome: bool,
    pub lum_shift: f64,
}

impl Default for TextColorOptions {
    fn default() -> Self {
        Self {
            lum_threshold: 0.5,
            dark_color: None,
            light_color: None,
            monochrome: false,
            lum_shift: 0.6,
        }
    }
}

/// A text color readable on `background`.
///
/// Light backgrounds get a darker shade (or `dark_color`, or black when
/// monochrome), dark backgrounds a lighter one.
pub fn text_color(background: Color, options: &TextColorOptions) -> Color {
    let luminance = background.luminance();
    let shift = options.lum_shift.abs();
    if luminance >= options.lum_threshold {
        if let Some(dark) = options.dark_color {
            return dark;
        }
        if options.monochrome {
            return Color::rgb(0.0, 0.0, 0.0);
        }
        background.with_luminance((luminance - shift).max(0.0))
    } else {
        if let Some(light) = options.light_color {
            return light;
        }
        if options.monochrome {
            return Color::rgb(1.0, 1.0, 1.0);
        }
        background.with_luminance((luminance + shift).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> QuantileLabel {
        s.parse().unwrap()
    }

    #[test]
    fn test_item_tags() {
        assert_eq!(get_item_tags("Gilded Scarab"), vec!["scarab"]);
        assert_eq!(
            get_item_tags("Chayula's Breachstone"),
            vec!["breachstone", "breach", "breach:chayula"]
        );
        assert_eq!(
            get_item_tags("Splinter of Uul-Netol"),
            vec!["splinter", "breach", "breach:uul-netol"]
        );
        assert!(get_item_tags("Exalted Orb").is_empty());
    }

    #[test]
    fn test_stack_tags() {
        assert!(get_stack_tags(1, 5).is_empty());
        assert_eq!(get_stack_tags(4, 5), vec!["stacks"]);
        assert_eq!(get_stack_tags(12, 5), vec!["stacks", "stacks:5", "stacks:10"]);
        assert_eq!(get_stack_tags(3, 0), vec!["stacks"]);
    }

    #[test]
    fn test_quantile_threshold_tags() {
        assert_eq!(get_quantile_threshold_tags(label("QU4"), false), vec!["QU4", "QU5"]);
        assert_eq!(get_quantile_threshold_tags(label("QU4"), true), vec!["QU1", "QU2", "QU3"]);
        assert_eq!(get_quantile_threshold_tags(label("D10"), false), vec!["D10"]);
        assert!(get_quantile_threshold_tags(label("Q1"), true).is_empty());
    }

    #[test]
    fn test_iter_stacks() {
        assert_eq!(
            iter_stacks(1, 3, Operator::Eq, Operator::Ge),
            vec![(Operator::Eq, 1), (Operator::Eq, 2), (Operator::Ge, 3)]
        );
        assert!(iter_stacks(4, 3, Operator::Eq, Operator::Ge).is_empty());
    }

    #[test]
    fn test_round_down() {
        assert_eq!(round_down(17.0, 5).unwrap(), 15);
        assert_eq!(round_down(20.0, 5).unwrap(), 20);
        assert_eq!(round_down(-1.0, 5).unwrap(), -5);
        assert!(round_down(3.0, 0).is_err());
    }

    #[test]
    fn test_normalize_skill_gem_name() {
        assert_eq!(normalize_skill_gem_name("Divergent Arc"), "Arc");
        assert_eq!(normalize_skill_gem_name("Arc"), "Arc");
    }

    #[test]
    fn test_quantile_position() {
        assert_eq!(quantile_position(label("QU1")), 0.0);
        assert!((quantile_position(label("QU5")) - 0.8).abs() < 1e-12);
        assert!((quantile_position(label("D10")) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_text_color_shifts_luminance() {
        let white = Color::rgb(1.0, 1.0, 1.0);
        let dark = text_color(white, &TextColorOptions::default());
        assert!((dark.luminance() - 0.4).abs() < 1e-9);

        let black = Color::rgb(0.0, 0.0, 0.0);
        let light = text_color(black, &TextColorOptions::default());
        assert!((light.luminance() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_text_color_monochrome_and_overrides() {
        let yellow = Color::from_rgb_bytes(255, 255, 0);
        let monochrome = TextColorOptions {
            monochrome: true,
            ..TextColorOptions::default()
        };
        assert_eq!(text_color(yellow, &monochrome).hex(), "#000000");

        let red = Color::from_rgb_bytes(255, 0, 0);
        let override_dark = TextColorOptions {
            dark_color: Some(Color::from_rgb_bytes(1, 2, 3)),
            ..TextColorOptions::default()
        };
        assert_eq!(text_color(red, &override_dark).hex(), "#010203");
    }

    #[test]
    fn test_colormap_pick_log_scale() {
        let cmap = Colormap::from_colors("bw", &[Color::rgb(1.0, 1.0, 1.0), Color::rgb(0.0, 0.0, 0.0)])
            .unwrap();
        // ln(30000) is the top of the scale
        assert_eq!(colormap_pick(&cmap, 30000.0, 30000.0, 1.0, true).hex(), "#000000");
        assert_eq!(colormap_pick(&cmap, 1.0, 30000.0, 1.0, true).hex(), "#ffffff");
    }

    #[test]
    fn test_nearest_named_color_at_scale_ends() {
        let cmap = Colormap::from_colors("wr", &[Color::rgb(1.0, 1.0, 1.0), Color::rgb(1.0, 0.0, 0.0)])
            .unwrap();
        assert_eq!(nearest_named_color(&cmap, 0.0, 1.0, 0.0, false), NamedColor::White);
        assert_eq!(nearest_named_color(&cmap, 1.0, 1.0, 0.0, false), NamedColor::Red);
    }
}
