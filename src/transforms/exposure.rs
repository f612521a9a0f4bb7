//! Exposure: scales linear RGB by a power of two.

use crate::core::error::ComputeResult;
use crate::core::image::Image;
use crate::core::params::{float_or, params_from, Params};
use crate::pipe::node::Transform;
use rayon::prelude::*;

/// Exposure range accepted from parameters, in stops.
const EV_RANGE: [f64; 2] = [-10.0, 10.0];

/// Mid-gray luminance an auto exposure targets (18% reflectance).
const MID_GRAY: f32 = 0.18;

#[derive(Debug, Clone, Copy)]
pub struct Exposure;

impl Transform for Exposure {
    fn name(&self) -> &str {
        "exposure"
    }

    fn default_params(&self) -> Params {
        params_from([("EV", 0.0f64)])
    }

    fn validate_params(&self, params: &Params) -> Result<(), String> {
        match params.get("EV") {
            None => Err("missing 'EV'".into()),
            Some(v) => match v.as_float() {
                None => Err(format!("'EV': expected float, got {}", v.type_name())),
                Some(ev) if ev < EV_RANGE[0] || ev > EV_RANGE[1] => {
                    Err(format!("'EV' out of range [{}, {}]: {}", EV_RANGE[0], EV_RANGE[1], ev))
                }
                Some(_) => Ok(()),
            },
        }
    }

    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
        let ev = float_or(params, "EV", 0.0);
        if ev == 0.0 {
            return Ok(input.clone());
        }
        let gain = 2f32.powf(ev as f32);
        let mut out = input.clone();
        out.data_mut().par_iter_mut().for_each(|v| *v *= gain);
        Ok(out)
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }
}

/// EV that brings the image's median luminance to mid-gray.
pub fn auto_exposure(image: &Image) -> f64 {
    let mut luma: Vec<f32> = image
        .data()
        .chunks_exact(3)
        .map(|px| 0.2126 * px[0] + 0.7152 * px[1] + 0.0722 * px[2])
        .filter(|y| *y > 0.0)
        .collect();
    if luma.is_empty() {
        return 0.0;
    }
    let mid = luma.len() / 2;
    luma.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    let median = luma[mid];
    f64::from((MID_GRAY / median).log2())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::ParamValue;

    #[test]
    fn test_scales_by_power_of_two() {
        let img = Image::filled(2, 2, [0.1, 0.2, 0.3]);
        let out = Exposure
            .compute(&img, &params_from([("EV", 1.0f64)]))
            .unwrap();
        assert!((out.data()[0] - 0.2).abs() < 1e-6);
        assert!((out.data()[2] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_zero_ev_is_identity() {
        let img = Image::filled(2, 2, [0.4, 0.4, 0.4]);
        let out = Exposure.compute(&img, &Exposure.default_params()).unwrap();
        assert_eq!(out.data(), img.data());
    }

    #[test]
    fn test_validation() {
        assert!(Exposure.validate_params(&params_from([("EV", 3.0f64)])).is_ok());
        assert!(Exposure.validate_params(&Params::new()).is_err());
        assert!(Exposure
            .validate_params(&params_from([("EV", ParamValue::Bool(true))]))
            .is_err());
        assert!(Exposure
            .validate_params(&params_from([("EV", 40.0f64)]))
            .is_err());
    }

    #[test]
    fn test_auto_exposure_targets_mid_gray() {
        let img = Image::filled(4, 4, [0.09, 0.09, 0.09]);
        let ev = auto_exposure(&img);
        assert!((ev - 1.0).abs() < 1e-5);
    }
}
