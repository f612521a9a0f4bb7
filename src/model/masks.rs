//! Lightness-band mask and geometry models.

use crate::core::params::{bool_or, float_or, pair_or, Params};
use serde::{Deserialize, Serialize};

/// The five lightness bands, 20 L-units each.
pub const MASK_BANDS: [&str; 5] = ["shadows", "blacks", "mediums", "whites", "highlights"];

/// Toggleable visualization of the five lightness bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightnessMaskModel {
    pub shadows: bool,
    pub blacks: bool,
    pub mediums: bool,
    pub whites: bool,
    pub highlights: bool,
}

impl LightnessMaskModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle one band. An unknown band name changes nothing. Returns the
    /// updated band states in canonical order.
    pub fn mask_change(&mut self, band: &str, on: bool) -> [bool; 5] {
        match band {
            "shadows" => self.shadows = on,
            "blacks" => self.blacks = on,
            "mediums" => self.mediums = on,
            "whites" => self.whites = on,
            "highlights" => self.highlights = on,
            _ => {}
        }
        self.bands()
    }

    /// Band states in canonical order.
    pub fn bands(&self) -> [bool; 5] {
        [
            self.shadows,
            self.blacks,
            self.mediums,
            self.whites,
            self.highlights,
        ]
    }

    /// Index of the band containing a lightness value, bands covering
    /// [0,20), [20,40), [40,60), [60,80), [80,∞).
    pub fn band_of(lightness: f32) -> usize {
        ((lightness / 20.0).floor() as isize).clamp(0, 4) as usize
    }

    pub fn values(&self) -> Params {
        MASK_BANDS
            .iter()
            .zip(self.bands())
            .map(|(k, v)| (k.to_string(), v.into()))
            .collect()
    }

    pub fn set_values(&mut self, params: &Params) {
        self.shadows = bool_or(params, "shadows", false);
        self.blacks = bool_or(params, "blacks", false);
        self.mediums = bool_or(params, "mediums", false);
        self.whites = bool_or(params, "whites", false);
        self.highlights = bool_or(params, "highlights", false);
    }
}

/// Final-stage geometry: aspect-ratio crop with vertical adjustment,
/// plus rotation about the image center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryModel {
    /// Target aspect ratio as (width, height) parts.
    pub ratio: [f64; 2],
    /// Vertical shift of the crop window, in pixels of the source.
    pub up: f64,
    /// Rotation in degrees, counter-clockwise.
    pub rotation: f64,
}

impl Default for GeometryModel {
    fn default() -> Self {
        Self {
            ratio: [16.0, 9.0],
            up: 0.0,
            rotation: 0.0,
        }
    }
}

impl GeometryModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Params {
        let mut params = Params::new();
        params.insert("ratio".into(), self.ratio.into());
        params.insert("up".into(), self.up.into());
        params.insert("rotation".into(), self.rotation.into());
        params
    }

    pub fn set_values(&mut self, params: &Params) {
        self.ratio = pair_or(params, "ratio", [16.0, 9.0]);
        self.up = float_or(params, "up", 0.0);
        self.rotation = float_or(params, "rotation", 0.0);
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0
    }
}
