//! Error types for hdrpipe.
//!
//! Uses thiserror for structured errors with context. The taxonomy follows
//! three categories: configuration errors (pipe structure and parameters,
//! surfaced synchronously and never leaving the pipe half-mutated),
//! computation errors (a transform failing on an image), and export errors
//! (tiled full-resolution runs, where any tile failure is fatal).

use thiserror::Error;

/// Errors related to process-pipe structure and configuration.
///
/// All of these are detected synchronously, before any node cache is
/// touched, so a failed call leaves the pipe exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipeError {
    #[error("a process node named '{0}' already exists in the pipe")]
    DuplicateName(String),

    #[error("no process node named '{0}' in the pipe")]
    NodeNotFound(String),

    #[error("process node index {index} out of range (pipe has {len} nodes)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("pipe has no input image attached")]
    MissingInputImage,

    #[error("pipe output requested before compute() has run")]
    NotComputed,

    #[error("invalid parameters for node '{node}': {reason}")]
    InvalidParameters { node: String, reason: String },

    #[error("unknown transform '{0}' in persisted pipe state")]
    UnknownTransform(String),
}

/// Errors raised while a transform processes an image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("transform '{node}' failed: {reason}")]
    Transform { node: String, reason: String },

    #[error("image buffers have incompatible shapes: {0}")]
    ShapeMismatch(String),
}

/// Errors from the tiled full-resolution export path.
///
/// A failing tile aborts the whole export: there is no partial-result
/// delivery, the caller gets the first error encountered.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("tile ({x},{y}) failed: {source}")]
    TileFailed {
        x: usize,
        y: usize,
        #[source]
        source: HdrPipeError,
    },

    #[error("pipe error: {0}")]
    Pipe(#[from] PipeError),

    #[error("merge failed: {0}")]
    Merge(#[from] ComputeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Top-level error type for hdrpipe.
#[derive(Error, Debug)]
pub enum HdrPipeError {
    #[error("pipe error: {0}")]
    Pipe(#[from] PipeError),

    #[error("compute error: {0}")]
    Compute(#[from] ComputeError),

    #[error("export error: {0}")]
    Export(#[from] Box<ExportError>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ExportError> for HdrPipeError {
    fn from(e: ExportError) -> Self {
        HdrPipeError::Export(Box::new(e))
    }
}

/// Result type alias for hdrpipe operations.
pub type HdrPipeResult<T> = Result<T, HdrPipeError>;

/// Result type alias for pipe-structure operations.
pub type PipeResult<T> = Result<T, PipeError>;

/// Result type alias for transform computations.
pub type ComputeResult<T> = Result<T, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_error_display() {
        let err = PipeError::DuplicateName("exposure".to_string());
        assert!(err.to_string().contains("exposure"));

        let err = PipeError::IndexOutOfRange { index: 12, len: 12 };
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_error_conversion() {
        let err: HdrPipeError = PipeError::MissingInputImage.into();
        assert!(matches!(err, HdrPipeError::Pipe(_)));

        let err: HdrPipeError = ComputeError::ShapeMismatch("2x2 vs 3x3".into()).into();
        assert!(matches!(err, HdrPipeError::Compute(_)));
    }
}
