//! Automatic-adjustment collaborators.
//!
//! The clustering and prediction algorithms themselves live behind traits;
//! what belongs here is the surrounding logic: turning cluster centers
//! into color-editor selections and feeding predicted values through the
//! tone-curve edit policy.

use crate::core::colorspace;
use crate::core::image::Image;
use crate::model::color_selector::ColorSelection;
use crate::model::tone_curve::ToneCurveModel;

/// Number of histogram bins the tone-curve predictor consumes.
pub const HISTOGRAM_BINS: usize = 50;

/// Clusters Lab color samples into representative centers.
pub trait PaletteClusterer {
    /// Returns up to `n` Lab cluster centers for the given samples.
    fn cluster(&self, lab_samples: &[[f32; 3]], n: usize) -> Vec<[f32; 3]>;
}

/// Suggests tone-curve output values from a luminance distribution.
pub trait ToneCurvePredictor {
    /// Maps a cumulative luminance histogram to output values for the
    /// five interior control points (shadows through highlights).
    fn predict(&self, cumulative: &[f64; HISTOGRAM_BINS]) -> [f64; 5];
}

/// Turn Lab cluster centers into color-editor selections.
///
/// The darkest center is dropped (it tracks the image's shadow mass, not
/// a color region). The rest are ordered by hue; each region's hue range
/// runs from the midpoint with its left neighbor to the midpoint with its
/// right, with the first region starting at 0 and the last ending at 360.
/// Chroma and lightness select ±25 around the center, clamped to [0,100].
pub fn regions_from_centers(centers: &[[f32; 3]]) -> Vec<ColorSelection> {
    if centers.is_empty() {
        return Vec::new();
    }

    let mut lch: Vec<(f64, f64, f64)> = centers
        .iter()
        .map(|&[l, a, b]| {
            let (l, c, h) = colorspace::lab_to_lch(l, a, b);
            (l as f64, c as f64, h as f64)
        })
        .collect();

    // drop the darkest center
    if lch.len() > 1 {
        let darkest = lch
            .iter()
            .enumerate()
            .min_by(|a, b| a.1 .0.total_cmp(&b.1 .0))
            .map(|(i, _)| i)
            .unwrap_or(0);
        lch.remove(darkest);
    }

    lch.sort_by(|a, b| a.2.total_cmp(&b.2));

    let n = lch.len();
    lch.iter()
        .enumerate()
        .map(|(i, &(l, c, h))| {
            let hue_min = if i == 0 {
                0.0
            } else {
                (lch[i - 1].2 + h) / 2.0
            };
            let hue_max = if i == n - 1 {
                360.0
            } else {
                (h + lch[i + 1].2) / 2.0
            };
            ColorSelection {
                lightness: [(l - 25.0).clamp(0.0, 100.0), (l + 25.0).clamp(0.0, 100.0)],
                chroma: [(c - 25.0).clamp(0.0, 100.0), (c + 25.0).clamp(0.0, 100.0)],
                hue: [hue_min, hue_max],
            }
        })
        .collect()
}

/// Cumulative luminance histogram over Lab lightness, 50 bins spanning
/// [0, 100], normalized so the last bin is 1.
pub fn cumulative_luminance_histogram(image: &Image) -> [f64; HISTOGRAM_BINS] {
    let mut counts = [0u64; HISTOGRAM_BINS];
    for px in image.data().chunks_exact(3) {
        let (l, _, _) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
        let bin = ((l / 100.0 * HISTOGRAM_BINS as f32) as isize)
            .clamp(0, HISTOGRAM_BINS as isize - 1) as usize;
        counts[bin] += 1;
    }

    let total: u64 = counts.iter().sum();
    let mut cumulative = [0.0; HISTOGRAM_BINS];
    let mut acc = 0u64;
    for (i, c) in counts.iter().enumerate() {
        acc += c;
        cumulative[i] = if total == 0 {
            0.0
        } else {
            acc as f64 / total as f64
        };
    }
    cumulative
}

/// Apply a predictor's suggestion to a tone curve, interior points in
/// order, letting the auto-scale policy keep the curve monotonic.
pub fn apply_curve_prediction(model: &mut ToneCurveModel, predicted: [f64; 5]) {
    const KEYS: [&str; 5] = ["shadows", "blacks", "mediums", "whites", "highlights"];
    for (key, value) in KEYS.iter().zip(predicted) {
        model.set_value(key, value, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::colorspace::ColorSpace;

    fn lab(l: f32, a: f32, b: f32) -> [f32; 3] {
        [l, a, b]
    }

    #[test]
    fn test_regions_drop_darkest_and_sort_by_hue() {
        // centers at hue 0, ~90, ~180 plus one near-black
        let centers = vec![
            lab(60.0, 40.0, 0.0),   // hue 0
            lab(5.0, 2.0, 2.0),     // darkest, dropped
            lab(70.0, 0.0, 40.0),   // hue 90
            lab(50.0, -40.0, 0.0),  // hue 180
        ];
        let regions = regions_from_centers(&centers);
        assert_eq!(regions.len(), 3);
        // hue boundaries: first starts at 0, last ends at 360,
        // midpoints between neighbors elsewhere
        assert_eq!(regions[0].hue[0], 0.0);
        assert!((regions[0].hue[1] - 45.0).abs() < 1.0);
        assert!((regions[1].hue[0] - 45.0).abs() < 1.0);
        assert!((regions[1].hue[1] - 135.0).abs() < 1.0);
        assert_eq!(regions[2].hue[1], 360.0);
    }

    #[test]
    fn test_region_ranges_clamped() {
        let centers = vec![lab(90.0, 40.0, 0.0), lab(10.0, 5.0, 5.0)];
        let regions = regions_from_centers(&centers);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].lightness, [65.0, 100.0]);
        assert_eq!(regions[0].chroma[0], 15.0);
    }

    #[test]
    fn test_cumulative_histogram_monotonic_and_normalized() {
        let image = Image::from_data(
            vec![
                0.0, 0.0, 0.0, // black
                1.0, 1.0, 1.0, // white
                0.2, 0.2, 0.2, // mid gray
            ],
            3,
            1,
            ColorSpace::Srgb,
            true,
        )
        .unwrap();
        let hist = cumulative_luminance_histogram(&image);
        for w in hist.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert!((hist[HISTOGRAM_BINS - 1] - 1.0).abs() < 1e-9);
        // one of three pixels is black: first bin holds a third
        assert!((hist[0] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_prediction_keeps_monotonicity() {
        let mut model = ToneCurveModel::new();
        apply_curve_prediction(&mut model, [20.0, 35.0, 60.0, 75.0, 95.0]);
        let values = model.values();
        for w in values.windows(2) {
            assert!(w[0] <= w[1], "{:?}", values);
        }
    }
}
