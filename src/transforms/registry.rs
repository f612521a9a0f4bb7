//! Transform registry: maps transform type ids to factories.
//!
//! Deserialization resolves persisted node names through the registry,
//! so restoring a pipe never hard-codes the transform set.

use crate::pipe::node::Transform;
use crate::transforms::{
    ColorEditor, Contrast, Exposure, Geometry, LightnessMask, Saturation, ToneCurve,
};
use indexmap::IndexMap;

type Factory = fn() -> Box<dyn Transform>;

/// Registry of available transform types.
pub struct TransformRegistry {
    factories: IndexMap<String, Factory>,
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Registry with all built-in transforms.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("exposure", || Box::new(Exposure));
        registry.register("contrast", || Box::new(Contrast));
        registry.register("tonecurve", || Box::new(ToneCurve));
        registry.register("lightnessmask", || Box::new(LightnessMask));
        registry.register("saturation", || Box::new(Saturation));
        registry.register("coloreditor", || Box::new(ColorEditor));
        registry.register("geometry", || Box::new(Geometry));
        registry
    }

    /// Register a factory under a transform type id. Replaces any earlier
    /// registration for the same id.
    pub fn register(&mut self, id: impl Into<String>, factory: Factory) {
        self.factories.insert(id.into(), factory);
    }

    /// Instantiate the transform registered under `id`.
    pub fn create(&self, id: &str) -> Option<Box<dyn Transform>> {
        self.factories.get(id).map(|f| f())
    }

    /// Registered transform type ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_canonical_stages() {
        let registry = TransformRegistry::builtin();
        for id in [
            "exposure",
            "contrast",
            "tonecurve",
            "lightnessmask",
            "saturation",
            "coloreditor",
            "geometry",
        ] {
            let transform = registry.create(id).unwrap_or_else(|| panic!("{}", id));
            assert_eq!(transform.name(), id);
        }
        assert!(registry.create("blur").is_none());
    }

    #[test]
    fn test_register_overrides() {
        let mut registry = TransformRegistry::builtin();
        registry.register("exposure", || Box::new(Contrast));
        assert_eq!(registry.create("exposure").unwrap().name(), "contrast");
    }
}
