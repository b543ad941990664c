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
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Category mapping: label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of one categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the column's labels (in display order).
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a String>) -> Self {
        let labels: Vec<&String> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.clone(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging ramp for the heatmap
// ---------------------------------------------------------------------------

const COOL: (f32, f32, f32) = (0.23, 0.30, 0.75);
const NEUTRAL: (f32, f32, f32) = (0.87, 0.87, 0.87);
const WARM: (f32, f32, f32) = (0.71, 0.02, 0.15);

/// Cool-to-warm colour for `t` in `[0, 1]` (values outside are clamped).
/// Blends in linear light so the midpoint does not turn muddy.
pub fn heat_color(t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let lin = |(r, g, b): (f32, f32, f32)| -> LinSrgb { Srgb::new(r, g, b).into_linear() };

    let mixed = if t < 0.5 {
        lin(COOL).mix(lin(NEUTRAL), t * 2.0)
    } else {
        lin(NEUTRAL).mix(lin(WARM), (t - 0.5) * 2.0)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: Color32) -> Color32 {
    let luma = 0.299 * f32::from(background.r())
        + 0.587 * f32::from(background.g())
        + 0.114 * f32::from(background.b());
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length_and_distinct_colours() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
    }

    #[test]
    fn unknown_labels_fall_back_to_gray() {
        let labels = vec!["FEMENINO".to_string(), "MASCULINO".to_string()];
        let map = ColorMap::new(&labels);
        assert_ne!(map.color_for("FEMENINO"), map.color_for("MASCULINO"));
        assert_eq!(map.color_for("NO REPORTA"), Color32::GRAY);
    }

    #[test]
    fn heat_ramp_runs_from_cool_to_warm() {
        let cold = heat_color(0.0);
        let hot = heat_color(1.0);
        assert!(cold.b() > cold.r());
        assert!(hot.r() > hot.b());
        assert_eq!(heat_color(-3.0), cold);
        assert_eq!(heat_color(7.0), hot);
    }

    #[test]
    fn label_text_contrasts_with_background() {
        assert_eq!(text_color_on(Color32::WHITE), Color32::BLACK);
        assert_eq!(text_color_on(Color32::BLACK), Color32::WHITE);
    }
}
