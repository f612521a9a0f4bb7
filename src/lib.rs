//! # hdrpipe - HDR Photo Process-Pipe Engine
//!
//! hdrpipe is the computation engine of an HDR photo editor: a linear,
//! ordered pipeline of parametric image transforms with per-node caching,
//! incremental recomputation, and concurrent execution strategies for
//! interactive preview and full-resolution export.
//!
//! ## Features
//!
//! - **Process Pipe**: an append-only chain of named transform nodes with
//!   positional dirty propagation, so editing one stage recomputes only
//!   from that stage to the end
//! - **Dual output branches**: tone-mapped SDR preview and HDR-linear
//!   output from the same pipe, preview-only stages skipped on the linear
//!   branch
//! - **Coalescing scheduler**: at most one compute task in flight per
//!   pipe; slider edits arriving mid-run are merged per node and settled
//!   by a single follow-up task
//! - **Tiled export**: full-resolution runs split into a parallel tile
//!   grid, geometry applied once post-merge
//! - **Persisted edits**: pipe state and metadata round-trip through JSON
//!   sidecars next to the image
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hdrpipe::prelude::*;
//!
//! // Build the canonical editing pipe around an image
//! let image = Image::read("photo.hdr")?;
//! let mut pipe = pipe_for_image(image);
//!
//! // Edit: +1 stop of exposure
//! let id = pipe.node_index_by_name("exposure")?;
//! pipe.set_parameters(id, params_from([("EV", 1.0f64)]))?;
//! pipe.compute()?;
//!
//! // Tone-mapped preview
//! let preview = pipe.get_image(true)?;
//!
//! // Full-resolution tiled export for the configured HDR display
//! let config = AppConfig::default();
//! exec::export(&pipe, &config, "photo_out.hdr", 3, 2, &|pct| {
//!     println!("{}%", pct);
//! })?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: images, color spaces, parameter values, errors, metadata
//! - [`pipe`]: the transform protocol, the pipe itself, serialization and
//!   the canonical builder
//! - [`transforms`]: built-in transforms and their registry
//! - [`model`]: tone-curve, color-selector, mask and geometry models
//! - [`exec`]: scheduler, tiled export, gallery loading, display hand-off
//! - [`config`]: application configuration and HDR display profiles

pub mod config;
pub mod core;
pub mod exec;
pub mod model;
pub mod pipe;
pub mod transforms;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::config::{AppConfig, DisplayProfile};
    pub use crate::core::{
        ColorSpace, ComputeError, HdrPipeError, HdrPipeResult, Image, ImageMetadata, ParamValue,
        Params, PipeError,
    };
    pub use crate::core::params::{params_from, float_or, bool_or, pair_or};
    pub use crate::exec::{ComputeScheduler, HdrDisplay, PreviewEvent};
    pub use crate::model::{
        GeometryModel, LchColorSelectorModel, LightnessMaskModel, ToneCurveModel,
    };
    pub use crate::pipe::{
        default_pipe, pipe_for_image, NodeState, PipeState, ProcessNode, ProcessPipe, Transform,
    };
    pub use crate::transforms::TransformRegistry;
}
