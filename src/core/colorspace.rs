//! Working color spaces and conversions between them.
//!
//! The pipe's working representation is linear sRGB; transforms that edit
//! lightness or color regions convert to CIE Lab / Lch (D65) and back.
//! All conversions are pure per-pixel functions plus slice-level helpers
//! that walk an interleaved 3-channel buffer in place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the color space an image buffer is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// sRGB primaries; `linear` flag on the image says whether the CCTF
    /// has been decoded.
    Srgb,
    /// CIE XYZ, D65.
    Xyz,
    /// CIE L*a*b*, D65.
    Lab,
    /// Cylindrical Lab: lightness, chroma, hue (degrees).
    Lch,
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpace::Srgb => write!(f, "sRGB"),
            ColorSpace::Xyz => write!(f, "XYZ"),
            ColorSpace::Lab => write!(f, "Lab"),
            ColorSpace::Lch => write!(f, "Lch"),
        }
    }
}

// D65 reference white.
const D65_X: f32 = 0.950_47;
const D65_Y: f32 = 1.000_00;
const D65_Z: f32 = 1.088_83;

const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.412_456_4, 0.357_576_1, 0.180_437_5],
    [0.212_672_9, 0.715_152_2, 0.072_175_0],
    [0.019_333_9, 0.119_192_0, 0.950_304_1],
];

const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.240_454_2, -1.537_138_5, -0.498_531_4],
    [-0.969_266_0, 1.876_010_8, 0.041_556_0],
    [0.055_643_4, -0.204_025_9, 1.057_225_2],
];

/// Decode one sRGB-encoded channel value to linear.
#[inline]
pub fn srgb_cctf_decode(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode one linear channel value with the sRGB CCTF.
#[inline]
pub fn srgb_cctf_encode(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn linear_rgb_to_xyz(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let x = SRGB_TO_XYZ[0][0] * r + SRGB_TO_XYZ[0][1] * g + SRGB_TO_XYZ[0][2] * b;
    let y = SRGB_TO_XYZ[1][0] * r + SRGB_TO_XYZ[1][1] * g + SRGB_TO_XYZ[1][2] * b;
    let z = SRGB_TO_XYZ[2][0] * r + SRGB_TO_XYZ[2][1] * g + SRGB_TO_XYZ[2][2] * b;
    (x, y, z)
}

#[inline]
fn xyz_to_linear_rgb(x: f32, y: f32, z: f32) -> (f32, f32, f32) {
    let r = XYZ_TO_SRGB[0][0] * x + XYZ_TO_SRGB[0][1] * y + XYZ_TO_SRGB[0][2] * z;
    let g = XYZ_TO_SRGB[1][0] * x + XYZ_TO_SRGB[1][1] * y + XYZ_TO_SRGB[1][2] * z;
    let b = XYZ_TO_SRGB[2][0] * x + XYZ_TO_SRGB[2][1] * y + XYZ_TO_SRGB[2][2] * z;
    (r, g, b)
}

#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA;
    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// Linear sRGB to CIE Lab (D65). L in 0-100 for in-gamut SDR input;
/// HDR-linear input maps to L above 100, which the tone stages rely on.
#[inline]
pub fn linear_rgb_to_lab(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let (x, y, z) = linear_rgb_to_xyz(r.max(0.0), g.max(0.0), b.max(0.0));
    let fx = lab_f(x / D65_X);
    let fy = lab_f(y / D65_Y);
    let fz = lab_f(z / D65_Z);
    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);
    (l, a, b)
}

/// CIE Lab (D65) back to linear sRGB. Out-of-gamut colors may leave 0-1.
#[inline]
pub fn lab_to_linear_rgb(l: f32, a: f32, b: f32) -> (f32, f32, f32) {
    let fy = (l + 16.0) / 116.0;
    let fx = a / 500.0 + fy;
    let fz = fy - b / 200.0;
    let x = D65_X * lab_f_inv(fx);
    let y = D65_Y * lab_f_inv(fy);
    let z = D65_Z * lab_f_inv(fz);
    xyz_to_linear_rgb(x, y, z)
}

/// Lab to cylindrical Lch. Hue in degrees, wrapped to [0, 360).
#[inline]
pub fn lab_to_lch(l: f32, a: f32, b: f32) -> (f32, f32, f32) {
    let c = (a * a + b * b).sqrt();
    let mut h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h += 360.0;
    }
    (l, c, h)
}

/// Lch back to Lab.
#[inline]
pub fn lch_to_lab(l: f32, c: f32, h: f32) -> (f32, f32, f32) {
    let hr = h.to_radians();
    (l, c * hr.cos(), c * hr.sin())
}

/// Convert an interleaved buffer in place between two pixel forms.
fn convert_slice(data: &mut [f32], f: impl Fn(f32, f32, f32) -> (f32, f32, f32) + Sync) {
    use rayon::prelude::*;
    data.par_chunks_exact_mut(3).for_each(|px| {
        let (a, b, c) = f(px[0], px[1], px[2]);
        px[0] = a;
        px[1] = b;
        px[2] = c;
    });
}

/// Linear sRGB buffer → Lch, in place.
pub fn slice_linear_rgb_to_lch(data: &mut [f32]) {
    convert_slice(data, |r, g, b| {
        let (l, a, bb) = linear_rgb_to_lab(r, g, b);
        lab_to_lch(l, a, bb)
    });
}

/// Lch buffer → linear sRGB, in place.
pub fn slice_lch_to_linear_rgb(data: &mut [f32]) {
    convert_slice(data, |l, c, h| {
        let (l, a, b) = lch_to_lab(l, c, h);
        lab_to_linear_rgb(l, a, b)
    });
}

/// Linear sRGB buffer → Lab, in place.
pub fn slice_linear_rgb_to_lab(data: &mut [f32]) {
    convert_slice(data, linear_rgb_to_lab);
}

/// Lab buffer → linear sRGB, in place.
pub fn slice_lab_to_linear_rgb(data: &mut [f32]) {
    convert_slice(data, lab_to_linear_rgb);
}

/// Decode an sRGB-encoded buffer to linear, in place.
pub fn slice_cctf_decode(data: &mut [f32]) {
    use rayon::prelude::*;
    data.par_iter_mut().for_each(|v| *v = srgb_cctf_decode(*v));
}

/// Encode a linear buffer with the sRGB CCTF, in place. Values are clamped
/// to [0, 1] first: this is the display/preview edge of the pipeline.
pub fn slice_cctf_encode(data: &mut [f32]) {
    use rayon::prelude::*;
    data.par_iter_mut()
        .for_each(|v| *v = srgb_cctf_encode(v.clamp(0.0, 1.0)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_cctf_round_trip() {
        for v in [0.0f32, 0.01, 0.2, 0.5, 1.0] {
            let back = srgb_cctf_decode(srgb_cctf_encode(v));
            assert!(close(v, back, 1e-5), "{} -> {}", v, back);
        }
    }

    #[test]
    fn test_lab_round_trip() {
        let (l, a, b) = linear_rgb_to_lab(0.4, 0.2, 0.6);
        let (r, g, bb) = lab_to_linear_rgb(l, a, b);
        assert!(close(r, 0.4, 1e-3));
        assert!(close(g, 0.2, 1e-3));
        assert!(close(bb, 0.6, 1e-3));
    }

    #[test]
    fn test_white_maps_to_l100() {
        let (l, a, b) = linear_rgb_to_lab(1.0, 1.0, 1.0);
        assert!(close(l, 100.0, 0.1));
        assert!(close(a, 0.0, 0.1));
        assert!(close(b, 0.0, 0.1));
    }

    #[test]
    fn test_lch_hue_wraps_positive() {
        // a color with negative b lands in (180, 360)
        let (_, _, h) = lab_to_lch(50.0, 10.0, -10.0);
        assert!(h > 180.0 && h < 360.0);
    }

    #[test]
    fn test_slice_round_trip() {
        let orig = vec![0.1f32, 0.5, 0.9, 0.3, 0.2, 0.7];
        let mut data = orig.clone();
        slice_linear_rgb_to_lch(&mut data);
        slice_lch_to_linear_rgb(&mut data);
        for (a, b) in orig.iter().zip(&data) {
            assert!(close(*a, *b, 1e-3));
        }
    }
}
