//! Lch color region selector.
//!
//! A selector pairs a region of Lch space (lightness, chroma and hue
//! ranges, hue wrapping around 360) with the edit to apply inside it and
//! a mask toggle for visualizing the selection. Membership is a soft
//! weight with a short falloff outside each range. Five independent
//! selectors back the pipe's `colorEditor0..4` nodes.

use crate::core::params::{bool_or, pair_or, ParamValue, Params};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIGHTNESS: [f64; 2] = [0.0, 100.0];
pub const DEFAULT_CHROMA: [f64; 2] = [0.0, 100.0];
pub const DEFAULT_HUE: [f64; 2] = [0.0, 360.0];

/// The selected region of Lch space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSelection {
    pub lightness: [f64; 2],
    pub chroma: [f64; 2],
    /// Hue range in degrees; `min > max` selects across the 0/360 seam.
    pub hue: [f64; 2],
}

impl Default for ColorSelection {
    fn default() -> Self {
        Self {
            lightness: DEFAULT_LIGHTNESS,
            chroma: DEFAULT_CHROMA,
            hue: DEFAULT_HUE,
        }
    }
}

/// The edit applied inside a selection. All defaults are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorEdit {
    /// Hue shift in degrees, [-180, 180].
    pub hue: f64,
    /// Exposure in stops, [-3, 3].
    pub exposure: f64,
    /// Contrast amount, [-100, 100].
    pub contrast: f64,
    /// Saturation amount, [-100, 100].
    pub saturation: f64,
}

/// Full state of one color editor slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LchColorSelectorModel {
    pub selection: ColorSelection,
    pub edit: ColorEdit,
    /// Visualize the selection weight instead of applying the edit.
    pub mask: bool,
}

impl LchColorSelectorModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore the selection ranges to full-range defaults; the edit and
    /// mask are untouched.
    pub fn reset_selection(&mut self) {
        self.selection = ColorSelection::default();
    }

    /// Restore the edit values to no-ops; the selection and mask are
    /// untouched.
    pub fn reset_edit(&mut self) {
        self.edit = ColorEdit::default();
    }

    /// The `{selection, edit, mask}` parameter structure.
    pub fn values(&self) -> Params {
        let mut selection = Params::new();
        selection.insert("lightness".into(), self.selection.lightness.into());
        selection.insert("chroma".into(), self.selection.chroma.into());
        selection.insert("hue".into(), self.selection.hue.into());

        let mut edit = Params::new();
        edit.insert("hue".into(), self.edit.hue.into());
        edit.insert("exposure".into(), self.edit.exposure.into());
        edit.insert("contrast".into(), self.edit.contrast.into());
        edit.insert("saturation".into(), self.edit.saturation.into());

        let mut params = Params::new();
        params.insert("selection".into(), ParamValue::Map(selection));
        params.insert("edit".into(), ParamValue::Map(edit));
        params.insert("mask".into(), self.mask.into());
        params
    }

    /// Rebuild the state from a parameter structure. Missing keys fall
    /// back to their defaults.
    pub fn set_values(&mut self, params: &Params) {
        let empty = Params::new();
        let selection = params
            .get("selection")
            .and_then(|v| v.as_map())
            .unwrap_or(&empty);
        self.selection.lightness = pair_or(selection, "lightness", DEFAULT_LIGHTNESS);
        self.selection.chroma = pair_or(selection, "chroma", DEFAULT_CHROMA);
        self.selection.hue = pair_or(selection, "hue", DEFAULT_HUE);

        let edit = params.get("edit").and_then(|v| v.as_map()).unwrap_or(&empty);
        self.edit.hue = crate::core::params::float_or(edit, "hue", 0.0);
        self.edit.exposure = crate::core::params::float_or(edit, "exposure", 0.0);
        self.edit.contrast = crate::core::params::float_or(edit, "contrast", 0.0);
        self.edit.saturation = crate::core::params::float_or(edit, "saturation", 0.0);

        self.mask = bool_or(params, "mask", false);
    }

    /// Build a model from a parameter structure.
    pub fn from_values(params: &Params) -> Self {
        let mut model = Self::default();
        model.set_values(params);
        model
    }

    /// True when the edit would change nothing.
    pub fn is_identity(&self) -> bool {
        self.edit == ColorEdit::default() && !self.mask
    }

    /// Selection membership weight for one Lch pixel, in [0, 1].
    ///
    /// Soft membership: weight is 1 inside every selected range and falls
    /// off smoothly just outside each edge, so edits do not band at the
    /// selection boundary. Range edges sitting on the domain bounds stay
    /// hard, which keeps the full-range defaults selecting everything
    /// (HDR lightness above 100 included). Hue honors wraparound when the
    /// range crosses the 0/360 seam.
    pub fn weight(&self, l: f32, c: f32, h: f32) -> f32 {
        let (l, c, h) = (f64::from(l), f64::from(c), f64::from(h));
        let wl = axis_weight(l, self.selection.lightness, LIGHTNESS_FALLOFF);
        let wc = axis_weight(c, self.selection.chroma, CHROMA_FALLOFF);
        let wh = hue_weight(h, self.selection.hue);
        (wl * wc * wh) as f32
    }
}

/// Falloff widths of the soft selection edges.
const LIGHTNESS_FALLOFF: f64 = 5.0;
const CHROMA_FALLOFF: f64 = 5.0;
const HUE_FALLOFF: f64 = 10.0;

/// Smoothstep over the falloff band; `d` is the distance outside the
/// selected range (0 inside).
fn falloff_weight(d: f64, falloff: f64) -> f64 {
    if d <= 0.0 {
        1.0
    } else if d >= falloff {
        0.0
    } else {
        let t = 1.0 - d / falloff;
        t * t * (3.0 - 2.0 * t)
    }
}

/// Weight along a linear axis with domain [0, 100]. A bound sitting on a
/// domain edge does not decay past it.
fn axis_weight(v: f64, [lo, hi]: [f64; 2], falloff: f64) -> f64 {
    let d = if v < lo && lo > 0.0 {
        lo - v
    } else if v > hi && hi < 100.0 {
        v - hi
    } else {
        0.0
    };
    falloff_weight(d, falloff)
}

/// Weight along the hue circle, wrapping at the 0/360 seam.
fn hue_weight(h: f64, [h0, h1]: [f64; 2]) -> f64 {
    let span = if h0 <= h1 { h1 - h0 } else { 360.0 - h0 + h1 };
    if span >= 360.0 {
        return 1.0;
    }
    let in_range = if h0 <= h1 {
        h >= h0 && h <= h1
    } else {
        h >= h0 || h <= h1
    };
    if in_range {
        return 1.0;
    }
    let to_edge = |edge: f64| {
        let d = (h - edge).abs() % 360.0;
        d.min(360.0 - d)
    };
    falloff_weight(to_edge(h0).min(to_edge(h1)), HUE_FALLOFF)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::params_from;

    #[test]
    fn test_defaults_select_everything_and_edit_nothing() {
        let model = LchColorSelectorModel::new();
        assert_eq!(model.selection.lightness, [0.0, 100.0]);
        assert_eq!(model.selection.hue, [0.0, 360.0]);
        assert!(model.is_identity());
        assert_eq!(model.weight(50.0, 30.0, 120.0), 1.0);
    }

    #[test]
    fn test_values_round_trip() {
        let mut model = LchColorSelectorModel::new();
        model.selection.hue = [300.0, 30.0];
        model.edit.exposure = 1.5;
        model.mask = true;

        let restored = LchColorSelectorModel::from_values(&model.values());
        assert_eq!(restored, model);
    }

    #[test]
    fn test_missing_keys_default() {
        let params = params_from([(
            "edit",
            ParamValue::Map(params_from([("contrast", 40.0f64)])),
        )]);
        let model = LchColorSelectorModel::from_values(&params);
        assert_eq!(model.selection, ColorSelection::default());
        assert_eq!(model.edit.contrast, 40.0);
        assert_eq!(model.edit.exposure, 0.0);
        assert!(!model.mask);
    }

    #[test]
    fn test_reset_selection_keeps_edit() {
        let mut model = LchColorSelectorModel::new();
        model.selection.chroma = [20.0, 60.0];
        model.edit.hue = 15.0;
        model.reset_selection();
        assert_eq!(model.selection, ColorSelection::default());
        assert_eq!(model.edit.hue, 15.0);
    }

    #[test]
    fn test_reset_edit_keeps_selection() {
        let mut model = LchColorSelectorModel::new();
        model.selection.chroma = [20.0, 60.0];
        model.edit.hue = 15.0;
        model.reset_edit();
        assert_eq!(model.selection.chroma, [20.0, 60.0]);
        assert_eq!(model.edit, ColorEdit::default());
    }

    #[test]
    fn test_hue_wraparound_selection() {
        let mut model = LchColorSelectorModel::new();
        model.selection.hue = [330.0, 30.0];
        assert_eq!(model.weight(50.0, 50.0, 350.0), 1.0);
        assert_eq!(model.weight(50.0, 50.0, 10.0), 1.0);
        assert_eq!(model.weight(50.0, 50.0, 180.0), 0.0);
    }

    #[test]
    fn test_out_of_range_lightness_excluded() {
        let mut model = LchColorSelectorModel::new();
        model.selection.lightness = [40.0, 60.0];
        assert_eq!(model.weight(30.0, 50.0, 120.0), 0.0);
        assert_eq!(model.weight(50.0, 50.0, 120.0), 1.0);
    }

    #[test]
    fn test_weight_falls_off_softly_at_interior_edges() {
        let mut model = LchColorSelectorModel::new();
        model.selection.lightness = [40.0, 60.0];
        // just past the edge: partial membership, decreasing outward
        let near = model.weight(62.0, 50.0, 120.0);
        let far = model.weight(64.0, 50.0, 120.0);
        assert!(near > 0.0 && near < 1.0, "near = {}", near);
        assert!(far < near);
        assert_eq!(model.weight(66.0, 50.0, 120.0), 0.0);
    }

    #[test]
    fn test_domain_edge_bounds_stay_hard() {
        // full-range lightness keeps HDR values above 100 fully selected
        let model = LchColorSelectorModel::new();
        assert_eq!(model.weight(130.0, 50.0, 120.0), 1.0);
    }
}
