//! The process pipe: a linear, ordered chain of process nodes with
//! positional dirty tracking and incremental recompute.

use crate::core::colorspace;
use crate::core::error::{HdrPipeError, HdrPipeResult, PipeError, PipeResult};
use crate::core::image::Image;
use crate::core::params::Params;
use crate::pipe::node::{ProcessNode, Transform};

/// Default cap on the longest side of the working image.
pub const DEFAULT_WORKING_CAP: usize = 1200;

/// A linear chain of image transformations over one source image.
///
/// Nodes are append-only and evaluated strictly in order. Each node caches
/// its output; editing node `i` invalidates `i` and everything after it,
/// and the next [`ProcessPipe::compute`] resumes from the earliest dirty
/// node instead of the head of the chain.
#[derive(Debug, Clone)]
pub struct ProcessPipe {
    input: Option<Image>,
    /// Full-resolution source, kept when the working cap downsampled it.
    original_input: Option<Image>,
    nodes: Vec<ProcessNode>,
    limit_working_size: bool,
    working_cap: usize,
}

impl Default for ProcessPipe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessPipe {
    /// An empty pipe with the working-size cap enabled.
    pub fn new() -> Self {
        Self {
            input: None,
            original_input: None,
            nodes: Vec::new(),
            limit_working_size: true,
            working_cap: DEFAULT_WORKING_CAP,
        }
    }

    /// An empty pipe that processes the source at full resolution.
    /// The tiled export path uses this for per-tile pipes.
    pub fn new_full_resolution() -> Self {
        Self {
            limit_working_size: false,
            ..Self::new()
        }
    }

    /// Override the working-size cap.
    pub fn with_working_cap(mut self, cap: usize) -> Self {
        self.working_cap = cap;
        self
    }

    /// Enable or disable the working-size cap. Affects the next
    /// [`ProcessPipe::set_image`]; the current working image is kept.
    pub fn set_limit_working_size(&mut self, limit: bool) {
        self.limit_working_size = limit;
    }

    /// Change the working-size cap in place.
    pub fn set_working_cap(&mut self, cap: usize) {
        self.working_cap = cap;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ProcessNode] {
        &self.nodes
    }

    /// The working image the chain evaluates over, if one is attached.
    pub fn input_image(&self) -> Option<&Image> {
        self.input.as_ref()
    }

    /// The full-resolution source (the working image itself when no
    /// downsampling happened).
    pub fn original_image(&self) -> Option<&Image> {
        self.original_input.as_ref().or(self.input.as_ref())
    }

    /// Append a node to the end of the chain.
    ///
    /// Names must be unique within the pipe; a duplicate is rejected and
    /// the pipe is left unchanged. Returns the new node's index.
    pub fn append(
        &mut self,
        transform: Box<dyn Transform>,
        params: Params,
        name: impl Into<String>,
    ) -> PipeResult<usize> {
        let name = name.into();
        if self.nodes.iter().any(|n| n.name == name) {
            return Err(PipeError::DuplicateName(name));
        }
        transform
            .validate_params(&params)
            .map_err(|reason| PipeError::InvalidParameters {
                node: name.clone(),
                reason,
            })?;
        self.nodes.push(ProcessNode::new(name, transform, params));
        Ok(self.nodes.len() - 1)
    }

    /// Attach or replace the source image, invalidating the whole chain.
    /// When the working cap is enabled the pipe operates on a downsampled
    /// copy and keeps the original for export.
    pub fn set_image(&mut self, image: Image) {
        if self.limit_working_size {
            let working = image.resized_to_fit(self.working_cap);
            if working.width() != image.width() || working.height() != image.height() {
                log::debug!(
                    "working image capped to {}x{}",
                    working.width(),
                    working.height()
                );
                self.original_input = Some(image);
            } else {
                self.original_input = None;
            }
            self.input = Some(working);
        } else {
            self.original_input = None;
            self.input = Some(image);
        }
        for node in &mut self.nodes {
            node.dirty = true;
            node.output = None;
        }
    }

    /// Index of the node with the given name.
    pub fn node_index_by_name(&self, name: &str) -> PipeResult<usize> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .ok_or_else(|| PipeError::NodeNotFound(name.to_string()))
    }

    /// The node with the given name.
    pub fn node_by_name(&self, name: &str) -> PipeResult<&ProcessNode> {
        self.node_index_by_name(name).map(|i| &self.nodes[i])
    }

    fn check_index(&self, index: usize) -> PipeResult<()> {
        if index >= self.nodes.len() {
            return Err(PipeError::IndexOutOfRange {
                index,
                len: self.nodes.len(),
            });
        }
        Ok(())
    }

    /// Current parameters of node `index`.
    pub fn get_parameters(&self, index: usize) -> PipeResult<&Params> {
        self.check_index(index)?;
        Ok(&self.nodes[index].params)
    }

    /// Replace the parameters of node `index` and mark it and every node
    /// after it dirty. No computation happens here; a rejected parameter
    /// map leaves the pipe untouched.
    pub fn set_parameters(&mut self, index: usize, params: Params) -> PipeResult<()> {
        self.check_index(index)?;
        let node = &self.nodes[index];
        node.transform
            .validate_params(&params)
            .map_err(|reason| PipeError::InvalidParameters {
                node: node.name.clone(),
                reason,
            })?;
        self.nodes[index].params = params;
        for node in &mut self.nodes[index..] {
            node.dirty = true;
        }
        log::debug!("node {} dirty, invalidated {} downstream", index, self.nodes.len() - index - 1);
        Ok(())
    }

    /// Recompute the chain from the earliest dirty node.
    ///
    /// Caches of nodes before that point are not touched. On success every
    /// node holds a clean cached output. A transform failure leaves the
    /// failing node and its successors dirty; an immediate retry resumes
    /// there.
    pub fn compute(&mut self) -> HdrPipeResult<()> {
        let input = self
            .input
            .as_ref()
            .ok_or(PipeError::MissingInputImage)?;

        let first_dirty = match self
            .nodes
            .iter()
            .position(|n| n.dirty || n.output.is_none())
        {
            Some(i) => i,
            None => return Ok(()),
        };

        let mut current = if first_dirty == 0 {
            input.clone()
        } else {
            self.nodes[first_dirty - 1]
                .output
                .clone()
                .ok_or(PipeError::NotComputed)?
        };

        log::debug!(
            "compute: resuming at node {} of {}",
            first_dirty,
            self.nodes.len()
        );
        for i in first_dirty..self.nodes.len() {
            let node = &self.nodes[i];
            let output = node.transform.compute(&current, &node.params)?;
            current = output.clone();
            let node = &mut self.nodes[i];
            node.output = Some(output);
            node.dirty = false;
        }
        Ok(())
    }

    /// The pipe's output image.
    ///
    /// With `tone_map` set, returns the last node's cached output encoded
    /// with the sRGB CCTF for display; [`PipeError::NotComputed`] when
    /// [`ProcessPipe::compute`] has not produced it yet.
    ///
    /// Without `tone_map`, derives the HDR-linear result by re-running the
    /// chain with preview-only stages skipped. Node caches are not
    /// disturbed by this branch.
    pub fn get_image(&self, tone_map: bool) -> HdrPipeResult<Image> {
        let input = self
            .input
            .as_ref()
            .ok_or(PipeError::MissingInputImage)?;

        if tone_map {
            let mut out = if self.nodes.is_empty() {
                input.clone()
            } else {
                let last = self.nodes.last().expect("non-empty");
                if last.dirty {
                    return Err(PipeError::NotComputed.into());
                }
                last.output.clone().ok_or(PipeError::NotComputed)?
            };
            if out.linear {
                colorspace::slice_cctf_encode(out.data_mut());
                out.linear = false;
            }
            Ok(out)
        } else {
            let mut current = input.clone();
            for node in &self.nodes {
                if node.transform.preview_only() {
                    continue;
                }
                current = node
                    .transform
                    .compute(&current, &node.params)
                    .map_err(HdrPipeError::Compute)?;
            }
            Ok(current)
        }
    }

    /// Remove the node at `index`, returning it. Downstream nodes become
    /// dirty. Used by the export path to strip the geometry stage from
    /// per-tile pipes.
    pub fn remove(&mut self, index: usize) -> PipeResult<ProcessNode> {
        self.check_index(index)?;
        let node = self.nodes.remove(index);
        let start = index.min(self.nodes.len());
        for node in &mut self.nodes[start..] {
            node.dirty = true;
        }
        Ok(node)
    }
}
