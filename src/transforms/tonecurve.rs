//! Tone curve: remaps Lab lightness through the sampled B-spline.
//!
//! Preview-only: the curve shapes the SDR rendition and is skipped when
//! deriving HDR-linear output.

use crate::core::colorspace;
use crate::core::error::ComputeResult;
use crate::core::image::Image;
use crate::core::params::Params;
use crate::model::tone_curve::{ToneCurveModel, TONE_CURVE_INPUTS, TONE_CURVE_KEYS};
use crate::pipe::node::Transform;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy)]
pub struct ToneCurve;

impl Transform for ToneCurve {
    fn name(&self) -> &str {
        "tonecurve"
    }

    fn default_params(&self) -> Params {
        ToneCurveModel::new().to_params()
    }

    fn validate_params(&self, params: &Params) -> Result<(), String> {
        for (key, value) in params {
            if !TONE_CURVE_KEYS.contains(&key.as_str()) {
                return Err(format!("unknown control point '{}'", key));
            }
            if value.as_float().is_none() {
                return Err(format!(
                    "'{}': expected float, got {}",
                    key,
                    value.type_name()
                ));
            }
        }
        Ok(())
    }

    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
        let mut model = ToneCurveModel::new();
        model.set_values(params);
        if model.values() == &TONE_CURVE_INPUTS {
            return Ok(input.clone());
        }

        let polyline = model.evaluate();
        let mut out = input.clone();
        out.data_mut().par_chunks_exact_mut(3).for_each(|px| {
            let (l, a, b) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
            let l = ToneCurveModel::interpolate(&polyline, f64::from(l)) as f32;
            let (r, g, bb) = colorspace::lab_to_linear_rgb(l.max(0.0), a, b);
            px[0] = r;
            px[1] = g;
            px[2] = bb;
        });
        Ok(out)
    }

    fn preview_only(&self) -> bool {
        true
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }
}
