//! Contrast: scales Lab lightness around the midpoint.

use crate::core::colorspace;
use crate::core::error::ComputeResult;
use crate::core::image::Image;
use crate::core::params::{float_or, params_from, Params};
use crate::pipe::node::Transform;
use rayon::prelude::*;

const CONTRAST_RANGE: [f64; 2] = [-100.0, 100.0];
const PIVOT: f32 = 50.0;

#[derive(Debug, Clone, Copy)]
pub struct Contrast;

impl Transform for Contrast {
    fn name(&self) -> &str {
        "contrast"
    }

    fn default_params(&self) -> Params {
        params_from([("contrast", 0.0f64)])
    }

    fn validate_params(&self, params: &Params) -> Result<(), String> {
        match params.get("contrast") {
            None => Err("missing 'contrast'".into()),
            Some(v) => match v.as_float() {
                None => Err(format!("'contrast': expected float, got {}", v.type_name())),
                Some(c) if c < CONTRAST_RANGE[0] || c > CONTRAST_RANGE[1] => {
                    Err(format!("'contrast' out of range [-100, 100]: {}", c))
                }
                Some(_) => Ok(()),
            },
        }
    }

    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
        let amount = float_or(params, "contrast", 0.0);
        if amount == 0.0 {
            return Ok(input.clone());
        }
        let factor = ((100.0 + amount) / 100.0) as f32;
        let mut out = input.clone();
        out.data_mut().par_chunks_exact_mut(3).for_each(|px| {
            let (l, a, b) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
            let l = PIVOT + (l - PIVOT) * factor;
            let (r, g, bb) = colorspace::lab_to_linear_rgb(l.max(0.0), a, b);
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

    #[test]
    fn test_zero_contrast_is_identity() {
        let img = Image::filled(2, 2, [0.3, 0.5, 0.7]);
        let out = Contrast.compute(&img, &Contrast.default_params()).unwrap();
        assert_eq!(out.data(), img.data());
    }

    #[test]
    fn test_positive_contrast_spreads_lightness() {
        let dark = Image::filled(1, 1, [0.05, 0.05, 0.05]);
        let bright = Image::filled(1, 1, [0.7, 0.7, 0.7]);
        let params = params_from([("contrast", 50.0f64)]);

        let dark_out = Contrast.compute(&dark, &params).unwrap();
        let bright_out = Contrast.compute(&bright, &params).unwrap();
        // dark gets darker, bright gets brighter
        assert!(dark_out.data()[0] < dark.data()[0]);
        assert!(bright_out.data()[0] > bright.data()[0]);
    }

    #[test]
    fn test_mid_gray_is_fixed_point() {
        // L=50 corresponds to ~18.4% linear
        let mid = Image::filled(1, 1, [0.184, 0.184, 0.184]);
        let out = Contrast
            .compute(&mid, &params_from([("contrast", 80.0f64)]))
            .unwrap();
        assert!((out.data()[0] - 0.184).abs() < 2e-3);
    }

    #[test]
    fn test_validation_range() {
        assert!(Contrast
            .validate_params(&params_from([("contrast", 150.0f64)]))
            .is_err());
        assert!(Contrast.validate_params(&Params::new()).is_err());
    }
}
