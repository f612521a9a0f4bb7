//! The process pipe: nodes, the chain itself, its persisted form and the
//! canonical builder.

pub mod builder;
pub mod node;
#[allow(clippy::module_inception)]
pub mod pipe;
pub mod serialization;

pub use builder::{default_pipe, full_resolution_pipe, pipe_for_image, COLOR_EDITOR_COUNT};
pub use node::{ProcessNode, Transform};
pub use pipe::{ProcessPipe, DEFAULT_WORKING_CAP};
pub use serialization::{NodeState, PipeState};
