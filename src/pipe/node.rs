//! The transform protocol and the per-node state a pipe keeps.

use crate::core::error::ComputeResult;
use crate::core::image::Image;
use crate::core::params::Params;
use std::fmt;

/// One image transformation type.
///
/// Implementations are stateless: everything an application of the
/// transform depends on travels in the parameter map, so a node can be
/// recomputed, serialized and restored from `{name, params}` alone.
pub trait Transform: Send + Sync {
    /// Transform type id (stable, used in persisted pipe state).
    fn name(&self) -> &str;

    /// The parameter map a fresh node of this type starts with.
    fn default_params(&self) -> Params;

    /// Check a parameter map's shape before it is accepted into a node.
    /// Returns a human-readable reason on rejection.
    fn validate_params(&self, params: &Params) -> Result<(), String>;

    /// Apply the transform to an input image.
    fn compute(&self, input: &Image, params: &Params) -> ComputeResult<Image>;

    /// True for stages that only make sense on the SDR preview branch
    /// and are skipped when deriving HDR-linear output.
    fn preview_only(&self) -> bool {
        false
    }

    fn clone_box(&self) -> Box<dyn Transform>;
}

impl Clone for Box<dyn Transform> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Debug for Box<dyn Transform> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform({})", self.name())
    }
}

/// One stage of a process pipe: a named transform instance plus its
/// current parameters and cached output.
#[derive(Debug, Clone)]
pub struct ProcessNode {
    /// Node name, unique within its pipe (e.g. `colorEditor2`).
    pub name: String,
    pub transform: Box<dyn Transform>,
    pub params: Params,
    /// Cached output of the last compute, if any.
    pub output: Option<Image>,
    /// Set when parameters upstream or on this node changed since the
    /// cached output was produced.
    pub dirty: bool,
}

impl ProcessNode {
    pub fn new(name: impl Into<String>, transform: Box<dyn Transform>, params: Params) -> Self {
        Self {
            name: name.into(),
            transform,
            params,
            output: None,
            dirty: true,
        }
    }
}
