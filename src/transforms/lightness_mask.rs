//! Lightness mask: visualizes the enabled lightness bands.
//!
//! Pixels whose Lab lightness falls in an enabled band are rendered as
//! neutral gray of the same lightness. Preview-only.

use crate::core::colorspace;
use crate::core::error::ComputeResult;
use crate::core::image::Image;
use crate::core::params::Params;
use crate::model::masks::{LightnessMaskModel, MASK_BANDS};
use crate::pipe::node::Transform;
use rayon::prelude::*;

#[derive(Debug, Clone, Copy)]
pub struct LightnessMask;

impl Transform for LightnessMask {
    fn name(&self) -> &str {
        "lightnessmask"
    }

    fn default_params(&self) -> Params {
        LightnessMaskModel::new().values()
    }

    fn validate_params(&self, params: &Params) -> Result<(), String> {
        for (key, value) in params {
            if !MASK_BANDS.contains(&key.as_str()) {
                return Err(format!("unknown band '{}'", key));
            }
            if value.as_bool().is_none() {
                return Err(format!("'{}': expected bool, got {}", key, value.type_name()));
            }
        }
        Ok(())
    }

    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
        let mut model = LightnessMaskModel::new();
        model.set_values(params);
        let bands = model.bands();
        if bands.iter().all(|b| !b) {
            return Ok(input.clone());
        }

        let mut out = input.clone();
        out.data_mut().par_chunks_exact_mut(3).for_each(|px| {
            let (l, _, _) = colorspace::linear_rgb_to_lab(px[0], px[1], px[2]);
            if bands[LightnessMaskModel::band_of(l)] {
                let (r, g, b) = colorspace::lab_to_linear_rgb(l.clamp(0.0, 100.0), 0.0, 0.0);
                px[0] = r;
                px[1] = g;
                px[2] = b;
            }
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
