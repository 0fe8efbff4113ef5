use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Diverging red → yellow → green scale
// ---------------------------------------------------------------------------

const RED: (u8, u8, u8) = (0xa5, 0x00, 0x26);
const YELLOW: (u8, u8, u8) = (0xff, 0xff, 0xbf);
const GREEN: (u8, u8, u8) = (0x00, 0x68, 0x37);

fn linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    let rgb: Srgb = Srgb::<u8>::new(r, g, b).into_format();
    rgb.into_linear()
}

/// Colour for `value` on a red-yellow-green scale spanning `[min, max]`.
/// A degenerate range maps to the midpoint.
pub fn red_yellow_green(value: f64, min: f64, max: f64) -> Color32 {
    let t = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0) as f32
    } else {
        0.5
    };
    let rgb = if t < 0.5 {
        linear(RED).mix(linear(YELLOW), t * 2.0)
    } else {
        linear(YELLOW).mix(linear(GREEN), (t - 0.5) * 2.0)
    };
    to_color32(Srgb::from_linear(rgb))
}

// ---------------------------------------------------------------------------
// Color mapping: category → Color32
// ---------------------------------------------------------------------------

/// Maps category labels of a column to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from category labels; colours follow sorted order
    /// so a category keeps its colour whatever the filter.
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a str>) -> Self {
        let mut sorted: Vec<&str> = categories.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();
        let palette = generate_palette(sorted.len());
        let mapping = sorted
            .into_iter()
            .zip(palette)
            .map(|(v, c)| (v.to_string(), c))
            .collect();

        ColorMap { mapping }
    }

    /// Look up the colour for a given category.
    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
