//! Editing models: the structured state behind each pipe stage.

pub mod auto;
pub mod color_selector;
pub mod masks;
pub mod tone_curve;

pub use color_selector::{ColorEdit, ColorSelection, LchColorSelectorModel};
pub use masks::{GeometryModel, LightnessMaskModel, MASK_BANDS};
pub use tone_curve::{ToneCurveModel, TONE_CURVE_INPUTS, TONE_CURVE_KEYS};
