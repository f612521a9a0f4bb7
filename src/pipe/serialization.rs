//! Persisted form of a process pipe.
//!
//! A pipe serializes as the ordered list of its `{name, params}` records.
//! Transforms themselves are not persisted: on restore the transform type
//! is resolved from the node name (trailing instance digits stripped)
//! through the registry, so `colorEditor2` comes back as a `coloreditor`
//! node named `colorEditor2`.

use crate::core::error::{HdrPipeResult, PipeError, PipeResult};
use crate::core::params::Params;
use crate::pipe::pipe::ProcessPipe;
use crate::transforms::registry::TransformRegistry;
use serde::{Deserialize, Serialize};

/// Persisted state of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub name: String,
    pub params: Params,
}

/// Persisted state of a whole pipe, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeState {
    pub nodes: Vec<NodeState>,
}

/// Transform type id for a node name: the name lowercased with any
/// trailing instance digits removed.
pub fn transform_id_for(node_name: &str) -> String {
    node_name
        .trim_end_matches(|c: char| c.is_ascii_digit())
        .to_ascii_lowercase()
}

impl ProcessPipe {
    /// Snapshot the pipe's structure and parameters. Images and caches are
    /// not part of the state.
    pub fn to_state(&self) -> PipeState {
        PipeState {
            nodes: self
                .nodes()
                .iter()
                .map(|n| NodeState {
                    name: n.name.clone(),
                    params: n.params.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a pipe from persisted state. All nodes start dirty; attach
    /// an image and `compute()` to populate caches.
    pub fn from_state(registry: &TransformRegistry, state: &PipeState) -> PipeResult<ProcessPipe> {
        let mut pipe = ProcessPipe::new();
        for node in &state.nodes {
            let id = transform_id_for(&node.name);
            let transform = registry
                .create(&id)
                .ok_or_else(|| PipeError::UnknownTransform(id.clone()))?;
            pipe.append(transform, node.params.clone(), node.name.clone())?;
        }
        Ok(pipe)
    }

    /// Serialize the pipe state to JSON.
    pub fn to_json(&self) -> HdrPipeResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_state())?)
    }

    /// Restore a pipe from its JSON state.
    pub fn from_json(registry: &TransformRegistry, json: &str) -> HdrPipeResult<ProcessPipe> {
        let state: PipeState = serde_json::from_str(json)?;
        Ok(ProcessPipe::from_state(registry, &state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::builder::default_pipe;

    #[test]
    fn test_transform_id_strips_instance_digits() {
        assert_eq!(transform_id_for("colorEditor3"), "coloreditor");
        assert_eq!(transform_id_for("exposure"), "exposure");
        assert_eq!(transform_id_for("tonecurve"), "tonecurve");
    }

    #[test]
    fn test_state_round_trip_preserves_order_and_params() {
        let registry = TransformRegistry::builtin();
        let pipe = default_pipe();
        let state = pipe.to_state();

        let restored = ProcessPipe::from_state(&registry, &state).unwrap();
        assert_eq!(restored.to_state(), state);
        let names: Vec<_> = restored.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "exposure",
                "contrast",
                "tonecurve",
                "lightnessmask",
                "saturation",
                "colorEditor0",
                "colorEditor1",
                "colorEditor2",
                "colorEditor3",
                "colorEditor4",
                "geometry"
            ]
        );
    }

    #[test]
    fn test_json_round_trip() {
        let registry = TransformRegistry::builtin();
        let pipe = default_pipe();
        let json = pipe.to_json().unwrap();
        let restored = ProcessPipe::from_json(&registry, &json).unwrap();
        assert_eq!(restored.to_state(), pipe.to_state());
    }

    #[test]
    fn test_unknown_transform_rejected() {
        let registry = TransformRegistry::builtin();
        let state = PipeState {
            nodes: vec![NodeState {
                name: "vortex7".into(),
                params: Params::new(),
            }],
        };
        let err = ProcessPipe::from_state(&registry, &state);
        assert_eq!(err.err(), Some(PipeError::UnknownTransform("vortex".into())));
    }
}
