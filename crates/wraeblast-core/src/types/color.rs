//! RGBA colors with byte, hex and named-color conversions

use super::enums::NamedColor;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Palette names understood in addition to hex literals and the game colors
const PALETTE: &[(&str, [u8; 4])] = &[
    ("default", [127, 127, 127, 255]),
    ("valuedefault", [255, 255, 255, 255]),
    ("pink", [255, 192, 203, 255]),
    ("dodgerblue", [30, 144, 255, 255]),
    ("fire", [150, 0, 0, 255]),
    ("cold", [54, 100, 146, 255]),
    ("lightning", [255, 215, 0, 255]),
    ("chaos", [208, 32, 144, 255]),
    ("augmented", [136, 136, 255, 255]),
    ("crafted", [184, 218, 242, 255]),
    ("unmet", [210, 0, 0, 255]),
    ("uniqueitem", [175, 96, 37, 255]),
    ("rareitem", [255, 255, 119, 255]),
    ("magicitem", [136, 136, 255, 255]),
    ("whiteitem", [200, 200, 200, 255]),
    ("gemitem", [27, 162, 155, 255]),
    ("currencyitem", [170, 158, 130, 255]),
    ("questitem", [74, 230, 58, 255]),
    ("nemesismod", [255, 200, 0, 255]),
    ("nemesismodoutline", [255, 40, 0, 220]),
    ("title", [231, 180, 120, 255]),
    ("corrupted", [210, 0, 0, 255]),
    ("favour", [170, 158, 130, 255]),
    ("supporterpacknewitem", [180, 96, 0, 255]),
    ("supporterpackitem", [163, 141, 109, 255]),
    ("bloodlinemod", [210, 0, 220, 255]),
    ("bloodlinemodoutline", [74, 0, 160, 200]),
    ("tormentmod", [50, 230, 100, 255]),
    ("tormentmodoutline", [0, 100, 150, 200]),
    ("canttradeormodify", [210, 0, 0, 255]),
    // Common web names
    ("black", [0, 0, 0, 255]),
    ("gray", [128, 128, 128, 255]),
    ("gold", [255, 215, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("olive", [128, 128, 0, 255]),
    ("silver", [192, 192, 192, 255]),
    ("teal", [0, 128, 128, 255]),
];

/// A color with floating point channels in the 0..=1 range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    /// Create a color from 0..=1 channels, clamping out of range input
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Color {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Opaque color from 0..=1 channels
    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Color::new(red, green, blue, 1.0)
    }

    pub fn from_rgb_bytes(red: u8, green: u8, blue: u8) -> Self {
        Color::from_rgba_bytes(red, green, blue, 255)
    }

    pub fn from_rgba_bytes(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Color::new(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
            f64::from(alpha) / 255.0,
        )
    }

    /// Build a color from three or four integer channels in 0..=255
    pub fn from_channels(channels: &[i64]) -> Result<Self> {
        let bytes = channels
            .iter()
            .map(|c| {
                u8::try_from(*c).map_err(|_| {
                    CoreError::InvalidColor(format!("channel {} is outside 0-255", c))
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Color::from_rgb_bytes(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::from_rgba_bytes(*r, *g, *b, *a)),
            _ => Err(CoreError::InvalidColor(format!(
                "expected 3 or 4 channels, got {}",
                channels.len()
            ))),
        }
    }

    /// Channels as rounded bytes (red, green, blue, alpha)
    pub fn rgba_bytes(&self) -> [u8; 4] {
        [
            to_byte(self.red),
            to_byte(self.green),
            to_byte(self.blue),
            to_byte(self.alpha),
        ]
    }

    pub fn rgb_bytes(&self) -> [u8; 3] {
        let [r, g, b, _] = self.rgba_bytes();
        [r, g, b]
    }

    pub fn is_opaque(&self) -> bool {
        to_byte(self.alpha) == 255
    }

    /// HSL lightness
    pub fn luminance(&self) -> f64 {
        let (_, lightness, _) = rgb_to_hls(self.red, self.green, self.blue);
        lightness
    }

    /// Copy of this color with the HSL lightness replaced
    pub fn with_luminance(&self, luminance: f64) -> Self {
        let (hue, _, saturation) = rgb_to_hls(self.red, self.green, self.blue);
        let (r, g, b) = hls_to_rgb(hue, luminance.clamp(0.0, 1.0), saturation);
        Color::new(r, g, b, self.alpha)
    }

    /// `#rrggbb`, or `#rrggbbaa` when the color is translucent
    pub fn hex(&self) -> String {
        let [r, g, b, a] = self.rgba_bytes();
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }

    fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim_start_matches('#');
        let invalid = || CoreError::InvalidColor(hex.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => digits.to_string(),
            _ => return Err(invalid()),
        };
        let bytes = (0..expanded.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid()))
            .collect::<Result<Vec<u8>>>()?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Color::from_rgb_bytes(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::from_rgba_bytes(*r, *g, *b, *a)),
            _ => Err(invalid()),
        }
    }
}

impl From<NamedColor> for Color {
    fn from(color: NamedColor) -> Self {
        let (r, g, b) = color.rgb();
        Color::from_rgb_bytes(r, g, b)
    }
}

impl FromStr for Color {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return Color::from_hex(s);
        }
        let lowered = s.to_ascii_lowercase();
        if let Some((_, [r, g, b, a])) = PALETTE.iter().find(|(name, _)| *name == lowered) {
            return Ok(Color::from_rgba_bytes(*r, *g, *b, *a));
        }
        if let Ok(named) = s.parse::<NamedColor>() {
            return Ok(Color::from(named));
        }
        Err(CoreError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn rgb_to_hls(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (min + max) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, lightness, 0.0);
    }
    let delta = max - min;
    let saturation = if lightness <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };
    let rc = (max - r) / delta;
    let gc = (max - g) / delta;
    let bc = (max - b) / delta;
    let hue = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((hue / 6.0).rem_euclid(1.0), lightness, saturation)
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hue_channel(m1, m2, h + 1.0 / 3.0),
        hue_channel(m1, m2, h),
        hue_channel(m1, m2, h - 1.0 / 3.0),
    )
}

fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_round_trip() {
        let color = Color::from_rgb_bytes(175, 96, 37);
        assert_eq!(color.rgb_bytes(), [175, 96, 37]);
        assert!(color.is_opaque());
    }

    #[test]
    fn test_parse_palette_and_game_names() {
        let chaos: Color = "chaos".parse().unwrap();
        assert_eq!(chaos.rgb_bytes(), [208, 32, 144]);

        let unique: Color = "UniqueItem".parse().unwrap();
        assert_eq!(unique.rgb_bytes(), [175, 96, 37]);

        let outline: Color = "nemesismodoutline".parse().unwrap();
        assert_eq!(outline.rgba_bytes(), [255, 40, 0, 220]);

        let brown: Color = "Brown".parse().unwrap();
        assert_eq!(brown.rgb_bytes(), [165, 42, 42]);
    }

    #[test]
    fn test_parse_hex() {
        let red: Color = "#f00".parse().unwrap();
        assert_eq!(red.rgb_bytes(), [255, 0, 0]);

        let translucent: Color = "#00ff0080".parse().unwrap();
        assert_eq!(translucent.rgba_bytes(), [0, 255, 0, 128]);
        assert!(!translucent.is_opaque());
        assert_eq!(translucent.hex(), "#00ff0080");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("notacolor".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!(Color::from_channels(&[1, 2]).is_err());
        assert!(Color::from_channels(&[256, 0, 0]).is_err());
    }

    #[test]
    fn test_luminance() {
        let white: Color = "#ffffff".parse().unwrap();
        assert!((white.luminance() - 1.0).abs() < 1e-9);

        let red: Color = "#ff0000".parse().unwrap();
        assert!((red.luminance() - 0.5).abs() < 1e-9);

        let darker = red.with_luminance(0.25);
        assert_eq!(darker.rgb_bytes(), [128, 0, 0]);

        let black = red.with_luminance(-1.0);
        assert_eq!(black.rgb_bytes(), [0, 0, 0]);
    }
}
