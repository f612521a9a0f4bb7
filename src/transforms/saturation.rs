//! Saturation: gamma curve on Lch chroma.

use crate::core::colorspace;
use crate::core::error::ComputeResult;
use crate::core::image::Image;
use crate::core::params::{float_or, params_from, Params};
use crate::pipe::node::Transform;
use rayon::prelude::*;

const SATURATION_RANGE: [f64; 2] = [-100.0, 100.0];
/// Chroma normalization for the gamma curve.
const CHROMA_SCALE: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct Saturation;

/// Gamma exponent for a saturation amount: positive amounts lift chroma,
/// negative amounts compress it.
pub fn saturation_gamma(amount: f64) -> f32 {
    2f32.powf(-(amount as f32) / 100.0)
}

impl Transform for Saturation {
    fn name(&self) -> &str {
        "saturation"
    }

    fn default_params(&self) -> Params {
        params_from([
            ("saturation", crate::core::params::ParamValue::Float(0.0)),
            ("method", "gamma".into()),
        ])
    }

    fn validate_params(&self, params: &Params) -> Result<(), String> {
        match params.get("saturation") {
            None => return Err("missing 'saturation'".into()),
            Some(v) => match v.as_float() {
                None => {
                    return Err(format!(
                        "'saturation': expected float, got {}",
                        v.type_name()
                    ))
                }
                Some(s) if s < SATURATION_RANGE[0] || s > SATURATION_RANGE[1] => {
                    return Err(format!("'saturation' out of range [-100, 100]: {}", s))
                }
                Some(_) => {}
            },
        }
        if let Some(method) = params.get("method") {
            match method.as_str() {
                Some("gamma") => {}
                Some(other) => return Err(format!("unknown saturation method '{}'", other)),
                None => return Err("'method': expected string".into()),
            }
        }
        Ok(())
    }

    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
        let amount = float_or(params, "saturation", 0.0);
        if amount == 0.0 {
            return Ok(input.clone());
        }
        let gamma = saturation_gamma(amount);
        let mut out = input.clone();
        out.data_mut().par_chunks_exact_mut(3).for_each(|px| {
            let (l, a, b) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
            let (l, c, h) = colorspace::lab_to_lch(l, a, b);
            let c = CHROMA_SCALE * (c / CHROMA_SCALE).max(0.0).powf(gamma);
            let (l, a, b) = colorspace::lch_to_lab(l, c, h);
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

    #[test]
    fn test_zero_is_identity() {
        let img = Image::filled(2, 2, [0.4, 0.3, 0.2]);
        let out = Saturation
            .compute(&img, &Saturation.default_params())
            .unwrap();
        assert_eq!(out.data(), img.data());
    }

    fn chroma_of(px: [f32; 3]) -> f32 {
        let (l, a, b) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
        colorspace::lab_to_lch(l, a, b).1
    }

    #[test]
    fn test_positive_amount_raises_chroma() {
        let img = Image::filled(1, 1, [0.4, 0.2, 0.2]);
        let out = Saturation
            .compute(
                &img,
                &params_from([
                    ("saturation", crate::core::params::ParamValue::Float(50.0)),
                    ("method", "gamma".into()),
                ]),
            )
            .unwrap();
        assert!(chroma_of(out.pixel(0, 0)) > chroma_of(img.pixel(0, 0)));
    }

    #[test]
    fn test_negative_amount_lowers_chroma() {
        let img = Image::filled(1, 1, [0.4, 0.2, 0.2]);
        let out = Saturation
            .compute(&img, &params_from([("saturation", -50.0f64)]))
            .unwrap();
        assert!(chroma_of(out.pixel(0, 0)) < chroma_of(img.pixel(0, 0)));
    }

    #[test]
    fn test_neutral_gray_unchanged() {
        let img = Image::filled(1, 1, [0.3, 0.3, 0.3]);
        let out = Saturation
            .compute(&img, &params_from([("saturation", 80.0f64)]))
            .unwrap();
        for (a, b) in img.data().iter().zip(out.data()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_validation_method() {
        assert!(Saturation
            .validate_params(&params_from([
                ("saturation", crate::core::params::ParamValue::Float(10.0)),
                ("method", "lut".into()),
            ]))
            .is_err());
    }
}
