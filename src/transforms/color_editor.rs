//! Color editor: edits applied inside an Lch region selection.
//!
//! The node's parameters are the full `{selection, edit, mask}` structure
//! of an [`LchColorSelectorModel`]. Pixels get a membership weight from
//! the selection; edit amounts apply scaled by that weight. In mask mode
//! the weight itself is rendered instead of the edit.

use crate::core::colorspace;
use crate::core::error::ComputeResult;
use crate::core::image::Image;
use crate::core::params::Params;
use crate::model::color_selector::LchColorSelectorModel;
use crate::pipe::node::Transform;
use crate::transforms::saturation::saturation_gamma;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy)]
pub struct ColorEditor;

impl Transform for ColorEditor {
    fn name(&self) -> &str {
        "coloreditor"
    }

    fn default_params(&self) -> Params {
        LchColorSelectorModel::new().values()
    }

    fn validate_params(&self, params: &Params) -> Result<(), String> {
        for key in params.keys() {
            if !matches!(key.as_str(), "selection" | "edit" | "mask") {
                return Err(format!("unknown key '{}'", key));
            }
        }
        if let Some(v) = params.get("mask") {
            if v.as_bool().is_none() {
                return Err(format!("'mask': expected bool, got {}", v.type_name()));
            }
        }
        for block in ["selection", "edit"] {
            if let Some(v) = params.get(block) {
                if v.as_map().is_none() {
                    return Err(format!("'{}': expected map, got {}", block, v.type_name()));
                }
            }
        }
        let model = LchColorSelectorModel::from_values(params);
        if model.edit.hue < -180.0 || model.edit.hue > 180.0 {
            return Err(format!("edit 'hue' out of range [-180, 180]: {}", model.edit.hue));
        }
        if model.edit.exposure < -3.0 || model.edit.exposure > 3.0 {
            return Err(format!(
                "edit 'exposure' out of range [-3, 3]: {}",
                model.edit.exposure
            ));
        }
        for (name, v) in [("contrast", model.edit.contrast), ("saturation", model.edit.saturation)]
        {
            if v < -100.0 || v > 100.0 {
                return Err(format!("edit '{}' out of range [-100, 100]: {}", name, v));
            }
        }
        Ok(())
    }

    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
        let model = LchColorSelectorModel::from_values(params);
        if model.is_identity() {
            return Ok(input.clone());
        }

        let mut out = input.clone();
        if model.mask {
            out.data_mut().par_chunks_exact_mut(3).for_each(|px| {
                let (l, a, b) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
                let (l, c, h) = colorspace::lab_to_lch(l, a, b);
                let w = model.weight(l, c, h);
                px[0] = w;
                px[1] = w;
                px[2] = w;
            });
            return Ok(out);
        }

        let hue_shift = model.edit.hue as f32;
        let exposure_gain = 2f32.powf(model.edit.exposure as f32);
        let contrast_factor = ((100.0 + model.edit.contrast) / 100.0) as f32;
        let gamma = saturation_gamma(model.edit.saturation);

        out.data_mut().par_chunks_exact_mut(3).for_each(|px| {
            let (l, a, b) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
            let (l0, c0, h0) = colorspace::lab_to_lch(l, a, b);
            let w = model.weight(l0, c0, h0);
            if w == 0.0 {
                return;
            }

            let mut h = h0 + w * hue_shift;
            h = h.rem_euclid(360.0);

            let mut l = l0 * exposure_gain.powf(w);
            let contrasted = 50.0 + (l - 50.0) * contrast_factor;
            l = l * (1.0 - w) + contrasted * w;

            let edited_c = 100.0 * (c0 / 100.0).max(0.0).powf(gamma);
            let c = c0 * (1.0 - w) + edited_c * w;

            let (l, a, b) = colorspace::lch_to_lab(l.max(0.0), c, h);
            let (r, g, bb) = colorspace::lab_to_linear_rgb(l, a, b);
            px[0] = r;
            px[1] = g;
            px[2] = bb;
        });
        Ok(out)
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::{params_from, ParamValue};
    use crate::model::color_selector::LchColorSelectorModel;

    fn editor_params(edit: &mut dyn FnMut(&mut LchColorSelectorModel)) -> Params {
        let mut model = LchColorSelectorModel::new();
        edit(&mut model);
        model.values()
    }

    #[test]
    fn test_defaults_are_identity() {
        let img = Image::filled(2, 2, [0.5, 0.3, 0.2]);
        let out = ColorEditor
            .compute(&img, &ColorEditor.default_params())
            .unwrap();
        assert_eq!(out.data(), img.data());
    }

    #[test]
    fn test_edit_outside_selection_is_noop() {
        // reddish pixel (hue near 25), selection on greens only
        let img = Image::filled(1, 1, [0.5, 0.1, 0.1]);
        let params = editor_params(&mut |m| {
            m.selection.hue = [90.0, 180.0];
            m.edit.exposure = 2.0;
        });
        let out = ColorEditor.compute(&img, &params).unwrap();
        assert_eq!(out.data(), img.data());
    }

    #[test]
    fn test_exposure_edit_brightens_selected_pixels() {
        let img = Image::filled(1, 1, [0.5, 0.1, 0.1]);
        let params = editor_params(&mut |m| {
            m.edit.exposure = 1.0;
        });
        let out = ColorEditor.compute(&img, &params).unwrap();
        let (l_in, _, _) = colorspace::linear_rgb_to_lab(0.5, 0.1, 0.1);
        let o = out.pixel(0, 0);
        let (l_out, _, _) = colorspace::linear_rgb_to_lab(o[0], o[1], o[2]);
        assert!(l_out > l_in);
    }

    #[test]
    fn test_hue_shift_moves_hue() {
        let img = Image::filled(1, 1, [0.5, 0.1, 0.1]);
        let params = editor_params(&mut |m| {
            m.edit.hue = 60.0;
        });
        let out = ColorEditor.compute(&img, &params).unwrap();
        let hue = |px: [f32; 3]| {
            let (l, a, b) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
            colorspace::lab_to_lch(l, a, b).2
        };
        let shift = (hue(out.pixel(0, 0)) - hue(img.pixel(0, 0))).rem_euclid(360.0);
        assert!((shift - 60.0).abs() < 5.0, "shift was {}", shift);
    }

    #[test]
    fn test_mask_mode_renders_weight() {
        let img = Image::filled(1, 1, [0.5, 0.1, 0.1]);
        let params = editor_params(&mut |m| {
            m.mask = true;
        });
        let out = ColorEditor.compute(&img, &params).unwrap();
        // full-range selection: weight 1 everywhere
        assert_eq!(out.pixel(0, 0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_validation_rejects_out_of_range_edit() {
        let params = params_from([(
            "edit",
            ParamValue::Map(params_from([("exposure", 5.0f64)])),
        )]);
        assert!(ColorEditor.validate_params(&params).is_err());
        assert!(ColorEditor
            .validate_params(&ColorEditor.default_params())
            .is_ok());
    }
}
