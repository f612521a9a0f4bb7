//! Core data model: images, color spaces, parameters, errors, metadata.

pub mod colorspace;
pub mod error;
pub mod image;
pub mod metadata;
pub mod params;

pub use colorspace::ColorSpace;
pub use error::{ComputeError, ComputeResult, ExportError, HdrPipeError, HdrPipeResult, PipeError, PipeResult};
pub use image::Image;
pub use metadata::ImageMetadata;
pub use params::{ParamValue, Params};
