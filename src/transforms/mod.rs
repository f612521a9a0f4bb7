//! Built-in image transforms and their registry.
//!
//! Every transform is a stateless unit struct; node parameters carry all
//! per-instance state. Transforms that edit lightness or color convert to
//! Lab/Lch internally and hand linear sRGB back to the pipe.

pub mod color_editor;
pub mod contrast;
pub mod exposure;
pub mod geometry;
pub mod lightness_mask;
pub mod registry;
pub mod saturation;
pub mod tonecurve;

pub use color_editor::ColorEditor;
pub use contrast::Contrast;
pub use exposure::{auto_exposure, Exposure};
pub use geometry::Geometry;
pub use lightness_mask::LightnessMask;
pub use registry::TransformRegistry;
pub use saturation::Saturation;
pub use tonecurve::ToneCurve;
