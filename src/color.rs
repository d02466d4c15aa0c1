use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::analysis::differential::Severity;
use crate::data::model::{SurveyTable, pod_of};

/// Qualitative set repeated within every pod (first point, second point, …).
const POINT_COLORS: &[&str] = &["#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0", "#f0027f"];

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
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Parse a `#rrggbb` string; grey if malformed.
pub fn hex_color(hex: &str) -> Color32 {
    Srgb::<u8>::from_str(hex)
        .map(|c| Color32::from_rgb(c.red, c.green, c.blue))
        .unwrap_or(Color32::GRAY)
}

// ---------------------------------------------------------------------------
// Point colours: position within pod → Color32
// ---------------------------------------------------------------------------

/// Maps each monitoring point to a colour by its position within its pod.
#[derive(Debug, Clone, Default)]
pub struct PointColors {
    mapping: BTreeMap<String, Color32>,
}

impl PointColors {
    pub fn new(table: &SurveyTable) -> Self {
        let mut per_pod: BTreeMap<&str, usize> = BTreeMap::new();
        let mut positions = Vec::with_capacity(table.len());
        for point in &table.points {
            let slot = per_pod.entry(pod_of(point)).or_default();
            positions.push(*slot);
            *slot += 1;
        }

        let widest = per_pod.values().copied().max().unwrap_or(0);
        let extra = generate_palette(widest.saturating_sub(POINT_COLORS.len()));

        let mapping = table
            .points
            .iter()
            .zip(positions)
            .map(|(point, i)| {
                let color = POINT_COLORS
                    .get(i)
                    .map(|hex| hex_color(hex))
                    .or_else(|| extra.get(i - POINT_COLORS.len()).copied())
                    .unwrap_or(Color32::GRAY);
                (point.clone(), color)
            })
            .collect();

        PointColors { mapping }
    }

    pub fn color_for(&self, point: &str) -> Color32 {
        self.mapping.get(point).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Severity colours
// ---------------------------------------------------------------------------

/// Display colour of a severity class. `neutral` stands in for black so the
/// acceptable class stays readable on dark themes.
pub fn severity_color(severity: Severity, neutral: Color32) -> Color32 {
    match severity {
        Severity::Acceptable => neutral,
        Severity::Elevated => hex_color("#ffd700"),
        Severity::Warning => hex_color("#ffa500"),
        Severity::Critical => hex_color("#ff0000"),
        Severity::NoData => hex_color("#0000ff"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!(hex_color("#7fc97f"), Color32::from_rgb(0x7f, 0xc9, 0x7f));
        assert_eq!(hex_color("not a colour"), Color32::GRAY);
    }

    #[test]
    fn colours_repeat_per_pod() {
        let points: Vec<String> = ["A1-1", "A1-2", "B1-1", "A2-1", "A2-2", "A2-3", "A2-4", "A2-5", "A2-6", "A2-7"]
            .iter()
            .map(|p| p.to_string())
            .collect();
        let n = points.len();
        let table = SurveyTable::new(points, vec![], vec![vec![]; n]);
        let colors = PointColors::new(&table);

        assert_eq!(colors.color_for("A1-1"), colors.color_for("B1-1"));
        assert_eq!(colors.color_for("A1-2"), hex_color("#beaed4"));
        assert_eq!(colors.color_for("A2-6"), hex_color("#f0027f"));
        assert_ne!(colors.color_for("A2-7"), Color32::GRAY);
        assert_eq!(colors.color_for("unknown"), Color32::GRAY);
    }

    #[test]
    fn palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
