//! Geometry: rotation about the image center and an aspect-ratio crop.
//!
//! Always the last pipe stage, and the only one that needs full-frame
//! context: the export path strips it from per-tile pipes and applies it
//! once on the merged result.

use crate::core::error::{ComputeError, ComputeResult};
use crate::core::image::Image;
use crate::core::params::Params;
use crate::model::masks::GeometryModel;
use crate::pipe::node::Transform;
use image::{Rgb, Rgb32FImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

#[derive(Debug, Clone, Copy)]
pub struct Geometry;

impl Transform for Geometry {
    fn name(&self) -> &str {
        "geometry"
    }

    fn default_params(&self) -> Params {
        GeometryModel::new().values()
    }

    fn validate_params(&self, params: &Params) -> Result<(), String> {
        for key in params.keys() {
            if !matches!(key.as_str(), "ratio" | "up" | "rotation") {
                return Err(format!("unknown key '{}'", key));
            }
        }
        let mut model = GeometryModel::new();
        model.set_values(params);
        if model.ratio[0] <= 0.0 || model.ratio[1] <= 0.0 {
            return Err(format!("'ratio' parts must be positive: {:?}", model.ratio));
        }
        if model.rotation < -180.0 || model.rotation > 180.0 {
            return Err(format!(
                "'rotation' out of range [-180, 180]: {}",
                model.rotation
            ));
        }
        Ok(())
    }

    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image> {
        let mut model = GeometryModel::new();
        model.set_values(params);

        let rotated = if model.rotation != 0.0 {
            let buf = Rgb32FImage::from_raw(
                input.width() as u32,
                input.height() as u32,
                input.data().to_vec(),
            )
            .ok_or_else(|| ComputeError::ShapeMismatch("image buffer".into()))?;
            let theta = (model.rotation as f32).to_radians();
            let rotated =
                rotate_about_center(&buf, theta, Interpolation::Bilinear, Rgb([0.0, 0.0, 0.0]));
            let mut out = Image::from_data(
                rotated.into_raw(),
                input.width(),
                input.height(),
                input.color_space,
                input.linear,
            )?;
            out.path = input.path.clone();
            out
        } else {
            input.clone()
        };

        crop_to_ratio(&rotated, model.ratio, model.up)
    }

    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(*self)
    }
}

/// Largest crop window with the target aspect ratio, centered, shifted
/// vertically by `up` (positive moves the window up) and clamped to the
/// frame. An image already at the target ratio passes through unchanged.
fn crop_to_ratio(image: &Image, ratio: [f64; 2], up: f64) -> ComputeResult<Image> {
    let (w, h) = (image.width(), image.height());
    let aspect = ratio[0] / ratio[1];

    let mut crop_w = w;
    let mut crop_h = (w as f64 / aspect).round() as usize;
    if crop_h > h {
        crop_h = h;
        crop_w = ((h as f64 * aspect).round() as usize).min(w);
    }
    if crop_w == w && crop_h == h && up == 0.0 {
        return Ok(image.clone());
    }
    let crop_w = crop_w.max(1);
    let crop_h = crop_h.max(1);

    let x0 = (w - crop_w) / 2;
    let centered_y = ((h - crop_h) / 2) as f64;
    let y0 = (centered_y - up).clamp(0.0, (h - crop_h) as f64) as usize;

    let mut data = Vec::with_capacity(crop_w * crop_h * 3);
    for y in y0..y0 + crop_h {
        let start = (y * w + x0) * 3;
        data.extend_from_slice(&image.data()[start..start + crop_w * 3]);
    }
    let mut out = Image::from_data(data, crop_w, crop_h, image.color_space, image.linear)?;
    out.path = image.path.clone();
    Ok(out)
}
