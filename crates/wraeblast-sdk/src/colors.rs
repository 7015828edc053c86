//! Colormaps and perceptual color matching
//!
//! Colormaps are linear gradients through evenly spaced anchor colors,
//! sampled into a 256-entry lookup table. Named colormaps come from a
//! built-in registry:
//!
//! - `viridis`, `magma`, `gray`...: the continuous base gradient
//! - `Viridis_20`, `Curl_9`...: `N` colors taken from the base gradient,
//!   then interpolated again
//! - any name with an `_r` suffix: the reversed colormap
//!
//! Nearest-color matching converts sRGB to CIE L*a*b* (D50 white) and picks
//! the candidate with the smallest CIEDE2000 difference.

use crate::error::{Result, SdkError};
use wraeblast_core::types::NamedColor;
use wraeblast_core::Color;

/// Lookup table size of every colormap
pub const LUT_SIZE: usize = 256;

/// A linear gradient sampled into a lookup table
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    lut: Vec<Color>,
}

impl Colormap {
    /// Build a colormap interpolating linearly between `colors`
    pub fn from_colors(name: impl Into<String>, colors: &[Color]) -> Result<Self> {
        let name = name.into();
        if colors.is_empty() {
            return Err(SdkError::Config(format!(
                "colormap '{}' needs at least one color",
                name
            )));
        }
        let lut = (0..LUT_SIZE)
            .map(|i| interpolate(colors, i as f64 / (LUT_SIZE - 1) as f64))
            .collect();
        Ok(Self { name, lut })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color for a normalized position.
    ///
    /// Positions below 0 clamp to the first entry, positions at or above 1
    /// to the last one.
    pub fn color_at(&self, x: f64) -> Color {
        let last = LUT_SIZE - 1;
        let index = if x.is_nan() || x < 0.0 {
            0
        } else if x >= 1.0 {
            last
        } else {
            ((x * LUT_SIZE as f64).floor() as usize).min(last)
        };
        self.lut[index]
    }

    /// `count` colors evenly spaced along the table
    pub fn colors(&self, count: usize) -> Vec<Color> {
        match count {
            0 => Vec::new(),
            1 => vec![self.lut[0]],
            _ => (0..count)
                .map(|i| {
                    let position = i as f64 / (count - 1) as f64;
                    self.lut[(position * (LUT_SIZE - 1) as f64).round() as usize]
                })
                .collect(),
        }
    }

    /// Same gradient, last color first, named with an `_r` suffix
    pub fn reversed(&self) -> Self {
        let name = match self.name.strip_suffix("_r") {
            Some(base) => base.to_string(),
            None => format!("{}_r", self.name),
        };
        let mut lut = self.lut.clone();
        lut.reverse();
        Self { name, lut }
    }
}

fn interpolate(colors: &[Color], x: f64) -> Color {
    if colors.len() == 1 {
        return colors[0];
    }
    let segments = (colors.len() - 1) as f64;
    let scaled = x.clamp(0.0, 1.0) * segments;
    let start = (scaled.floor() as usize).min(colors.len() - 2);
    let t = scaled - start as f64;
    let (a, b) = (colors[start], colors[start + 1]);
    let mix = |from: f64, to: f64| from + (to - from) * t;
    Color::new(
        mix(a.red, b.red),
        mix(a.green, b.green),
        mix(a.blue, b.blue),
        mix(a.alpha, b.alpha),
    )
}

/// Color of `value` on a linear `vmin..vmax` scale, alpha dropped
pub fn get_color_for_value(colormap: &Colormap, value: f64, vmax: f64, vmin: f64) -> Color {
    let x = if vmax == vmin {
        0.0
    } else {
        (value - vmin) / (vmax - vmin)
    };
    let picked = colormap.color_at(x);
    Color::rgb(picked.red, picked.green, picked.blue)
}

/// Build a linear colormap from a color list
pub fn linear_colormap_from_color_list(name: &str, colors: &[Color]) -> Result<Colormap> {
    Colormap::from_colors(name, colors)
}

// Anchor colors of the built-in gradients, first to last
const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];
const MAGMA: &[u32] = &[
    0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d, 0xfd9668, 0xfeca8d,
    0xfcfdbf,
];
const INFERNO: &[u32] = &[
    0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06, 0xf7d13d,
    0xfcffa4,
];
const PLASMA: &[u32] = &[
    0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a, 0xfdca26,
    0xf0f921,
];
const CIVIDIS: &[u32] = &[
    0x00224e, 0x123570, 0x3b496c, 0x575d6d, 0x707173, 0x8a8678, 0xa59c74, 0xc3b369, 0xe1cc55,
    0xfee838,
];
const BLUYL: &[u32] = &[0xf7feae, 0xb7e6a5, 0x7ccba2, 0x46aea0, 0x089099, 0x00718b, 0x045275];
const MAGENTA: &[u32] = &[0xf3cbd3, 0xeaa9bd, 0xdd88ac, 0xca699d, 0xb14d8e, 0x91357d, 0x6c2167];
const DEVON: &[u32] = &[0x2c1a4c, 0x28418a, 0x4a6ebf, 0x9c9ff0, 0xd8d4f9, 0xffffff];
const TOKYO: &[u32] = &[
    0x1a0e34, 0x45204c, 0x6b3d5a, 0x866a66, 0x94957a, 0xa8c08e, 0xd3eeb1, 0xffffd9,
];
const HAWAII: &[u32] = &[
    0x8c0273, 0x922a59, 0x964742, 0x9b6531, 0xa38b2c, 0xa3b24e, 0x8ed58b, 0x7ae6c1, 0xb3f2fd,
];
const CURL: &[u32] = &[
    0x151d44, 0x1c5a62, 0x3f9378, 0xb3c7b5, 0xfef6f5, 0xd9a09b, 0xb05263, 0x6e1945, 0x340d35,
];
const TURBID: &[u32] = &[0xe9f6ab, 0xd1c07c, 0xb58c5a, 0x8f6042, 0x653f31, 0x3a2427, 0x221e1b];
const GRAYC: &[u32] = &[0xffffff, 0x000000];
const GRAY: &[u32] = &[0x000000, 0xffffff];

const REGISTRY: &[(&str, &[u32])] = &[
    ("viridis", VIRIDIS),
    ("magma", MAGMA),
    ("inferno", INFERNO),
    ("plasma", PLASMA),
    ("cividis", CIVIDIS),
    ("bluyl", BLUYL),
    ("magenta", MAGENTA),
    ("devon", DEVON),
    ("tokyo", TOKYO),
    ("hawaii", HAWAII),
    ("curl", CURL),
    ("turbid", TURBID),
    ("grayc", GRAYC),
    ("gray", GRAY),
    ("greys", GRAYC),
];

/// Names of the built-in base gradients
pub fn colormap_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

fn anchor_color(rgb: u32) -> Color {
    Color::from_rgb_bytes((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Look up a colormap by name (`viridis`, `Curl_20`, `GrayC_20_r`)
pub fn get_colormap_by_name(name: &str) -> Result<Colormap> {
    let unknown = || SdkError::UnknownColormap(name.to_string());
    let (base_name, reversed) = match name.strip_suffix("_r") {
        Some(base) => (base, true),
        None => (name, false),
    };
    let (family, count) = match base_name.rsplit_once('_') {
        Some((family, digits)) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            let count = digits.parse::<usize>().map_err(|_| unknown())?;
            if count == 0 {
                return Err(unknown());
            }
            (family, Some(count))
        }
        _ => (base_name, None),
    };
    let anchors = REGISTRY
        .iter()
        .find(|(registered, _)| registered.eq_ignore_ascii_case(family))
        .map(|(_, anchors)| *anchors)
        .ok_or_else(unknown)?;

    let anchors: Vec<Color> = anchors.iter().copied().map(anchor_color).collect();
    let colormap = match count {
        Some(count) => {
            let base = Colormap::from_colors(family, &anchors)?;
            Colormap::from_colors(base_name, &base.colors(count))?
        }
        None => Colormap::from_colors(base_name, &anchors)?,
    };
    Ok(if reversed { colormap.reversed() } else { colormap })
}

/// CIE L*a*b* coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl From<Color> for Lab {
    fn from(color: Color) -> Self {
        let linear = |c: f64| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        let (r, g, b) = (linear(color.red), linear(color.green), linear(color.blue));

        // sRGB (D65) to XYZ
        let x65 = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
        let y65 = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
        let z65 = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

        // Bradford adaptation to D50
        let x = 1.047_811_2 * x65 + 0.022_886_6 * y65 - 0.050_127_0 * z65;
        let y = 0.029_542_4 * x65 + 0.990_484_4 * y65 - 0.017_049_1 * z65;
        let z = -0.009_234_5 * x65 + 0.015_043_6 * y65 + 0.752_131_6 * z65;

        let f = |t: f64| {
            if t > 216.0 / 24389.0 {
                t.cbrt()
            } else {
                (24389.0 / 27.0 * t + 16.0) / 116.0
            }
        };
        let (fx, fy, fz) = (f(x / 0.964_22), f(y), f(z / 0.825_21));
        Lab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

/// CIEDE2000 color difference
pub fn delta_e_cie2000(lab1: Lab, lab2: Lab) -> f64 {
    let pow7 = |v: f64| v.powi(7);
    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);
    let c_bar = (c1 + c2) / 2.0;
    let g = 0.5 * (1.0 - (pow7(c_bar) / (pow7(c_bar) + pow7(25.0))).sqrt());

    let a1p = (1.0 + g) * lab1.a;
    let a2p = (1.0 + g) * lab2.a;
    let c1p = a1p.hypot(lab1.b);
    let c2p = a2p.hypot(lab2.b);
    let hue = |b: f64, a: f64| {
        if a == 0.0 && b == 0.0 {
            0.0
        } else {
            b.atan2(a).to_degrees().rem_euclid(360.0)
        }
    };
    let h1p = hue(lab1.b, a1p);
    let h2p = hue(lab2.b, a2p);

    let delta_lp = lab2.l - lab1.l;
    let delta_cp = c2p - c1p;
    let chroma_product = c1p * c2p;
    let delta_hp = if chroma_product == 0.0 {
        0.0
    } else {
        let diff = h2p - h1p;
        if diff.abs() <= 180.0 {
            diff
        } else if diff > 180.0 {
            diff - 360.0
        } else {
            diff + 360.0
        }
    };
    let delta_big_hp = 2.0 * chroma_product.sqrt() * (delta_hp / 2.0).to_radians().sin();

    let l_bar_p = (lab1.l + lab2.l) / 2.0;
    let c_bar_p = (c1p + c2p) / 2.0;
    let h_bar_p = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (h_bar_p - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar_p).to_radians().cos()
        + 0.32 * (3.0 * h_bar_p + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar_p - 63.0).to_radians().cos();
    let delta_theta = 30.0 * (-((h_bar_p - 275.0) / 25.0).powi(2)).exp();
    let r_c = 2.0 * (pow7(c_bar_p) / (pow7(c_bar_p) + pow7(25.0))).sqrt();
    let l_offset = (l_bar_p - 50.0).powi(2);
    let s_l = 1.0 + 0.015 * l_offset / (20.0 + l_offset).sqrt();
    let s_c = 1.0 + 0.045 * c_bar_p;
    let s_h = 1.0 + 0.015 * c_bar_p * t;
    let r_t = -(2.0 * delta_theta).to_radians().sin() * r_c;

    let dl = delta_lp / s_l;
    let dc = delta_cp / s_c;
    let dh = delta_big_hp / s_h;
    (dl * dl + dc * dc + dh * dh + r_t * dc * dh).sqrt()
}

/// Index of the candidate closest to `target`
pub fn get_nearest_color(target: Color, candidates: &[Color]) -> Option<usize> {
    let target = Lab::from(target);
    candidates
        .iter()
        .map(|candidate| delta_e_cie2000(target, Lab::from(*candidate)))
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
}

/// The game color closest to `target`
pub fn nearest_game_color(target: Color) -> NamedColor {
    let candidates: Vec<Color> = NamedColor::ALL.iter().copied().map(Color::from).collect();
    get_nearest_color(target, &candidates)
        .map(|index| NamedColor::ALL[index])
        .unwrap_or(NamedColor::White)
}
