use std::collections::{BTreeMap, BTreeSet};

use image::{Rgba, RgbaImage};
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Annotation;

// ---------------------------------------------------------------------------
// Grayscale colormap
// ---------------------------------------------------------------------------

/// Map `value` from `[min, max]` onto 0..=255; a flat range maps to black.
pub fn gray_level(value: f64, min: f64, max: f64) -> u8 {
    let range = max - min;
    if !range.is_finite() || range.abs() < f64::EPSILON {
        return 0;
    }
    (((value - min) / range).clamp(0.0, 1.0) * 255.0).round() as u8
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<[u8; 3]> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: annotation label → RGB
// ---------------------------------------------------------------------------

/// Maps the positive labels of an annotation to distinct colours.
#[derive(Debug, Clone)]
pub struct LabelColorMap {
    mapping: BTreeMap<i64, [u8; 3]>,
    default_color: [u8; 3],
}

impl LabelColorMap {
    /// Build a colour map from a set of labels.
    pub fn new(labels: &BTreeSet<i64>) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels.iter().copied().zip(palette).collect();

        LabelColorMap {
            mapping,
            default_color: [128, 128, 128],
        }
    }

    /// Colour map over the positive labels present in `annotation`.
    pub fn from_annotation(annotation: &Annotation) -> Self {
        let labels: BTreeSet<i64> = annotation.iter().copied().filter(|&l| l > 0).collect();
        Self::new(&labels)
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: i64) -> [u8; 3] {
        self.mapping
            .get(&label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(i64, [u8; 3])> {
        self.mapping.iter().map(|(&l, &c)| (l, c)).collect()
    }

    /// Paint labelled pixels; unlabelled pixels stay fully transparent.
    pub fn paint(&self, annotation: &Annotation) -> RgbaImage {
        let (rows, cols) = annotation.dim();
        RgbaImage::from_fn(cols as u32, rows as u32, |x, y| {
            let label = annotation[[y as usize, x as usize]];
            if label > 0 {
                let [r, g, b] = self.color_for(label);
                Rgba([r, g, b, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn gray_level_spans_the_range() {
        assert_eq!(gray_level(2.0, 2.0, 6.0), 0);
        assert_eq!(gray_level(6.0, 2.0, 6.0), 255);
        assert_eq!(gray_level(4.0, 2.0, 6.0), 128);
        assert_eq!(gray_level(3.0, 3.0, 3.0), 0);
    }

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(4);
        assert_eq!(colours.len(), 4);
        let unique: BTreeSet<[u8; 3]> = colours.iter().copied().collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn labels_get_their_own_colour() {
        let annotation = array![[0i64, 1, 2], [2, 0, 1]];
        let map = LabelColorMap::from_annotation(&annotation);

        assert_eq!(map.legend_entries().len(), 2);
        assert_ne!(map.color_for(1), map.color_for(2));
        assert_eq!(map.color_for(9), [128, 128, 128]);

        let painted = map.paint(&annotation);
        assert_eq!(painted.dimensions(), (3, 2));
        assert_eq!(painted.get_pixel(0, 0)[3], 0);
        assert_eq!(painted.get_pixel(1, 0)[3], 255);
    }
}
