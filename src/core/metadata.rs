//! Per-image metadata sidecars.
//!
//! Edits never touch the source file. Everything the editor knows about an
//! image beyond its pixels lives in a JSON sidecar next to it: EXIF-style
//! key/value pairs captured at load, the serialized process-pipe state, and
//! user-defined tag groups.

use crate::core::error::HdrPipeResult;
use crate::pipe::serialization::PipeState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tag groups: group name → tag name → checked.
pub type TagGroups = Vec<IndexMap<String, IndexMap<String, bool>>>;

/// Sidecar metadata for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub filename: String,
    pub path: String,
    #[serde(default)]
    pub exif: IndexMap<String, String>,
    /// Serialized process-pipe state, when the image has been edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processpipe: Option<PipeState>,
    #[serde(default)]
    pub tags: TagGroups,
}

impl ImageMetadata {
    /// Fresh metadata for an image file.
    pub fn for_image(image_path: impl AsRef<Path>) -> Self {
        let image_path = image_path.as_ref();
        Self {
            filename: image_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: image_path
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Sidecar location for an image: same directory, `.json` extension
    /// appended to the full filename (`img.jpg` → `img.jpg.json`).
    pub fn sidecar_path(image_path: impl AsRef<Path>) -> PathBuf {
        let image_path = image_path.as_ref();
        let mut name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.push_str(".json");
        image_path.with_file_name(name)
    }

    /// Load the sidecar for an image. `Ok(None)` when no sidecar exists.
    pub fn load(image_path: impl AsRef<Path>) -> HdrPipeResult<Option<Self>> {
        let sidecar = Self::sidecar_path(&image_path);
        if !sidecar.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&sidecar)?;
        let meta = serde_json::from_str(&text)?;
        log::debug!("loaded sidecar {}", sidecar.display());
        Ok(Some(meta))
    }

    /// Save the sidecar next to the image it describes.
    pub fn save(&self, image_path: impl AsRef<Path>) -> HdrPipeResult<()> {
        let sidecar = Self::sidecar_path(&image_path);
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&sidecar, text)?;
        log::debug!("saved sidecar {}", sidecar.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path() {
        let p = ImageMetadata::sidecar_path("/photos/shot.jpg");
        assert_eq!(p, PathBuf::from("/photos/shot.jpg.json"));
    }

    #[test]
    fn test_for_image_splits_path() {
        let meta = ImageMetadata::for_image("/photos/shot.hdr");
        assert_eq!(meta.filename, "shot.hdr");
        assert_eq!(meta.path, "/photos");
        assert!(meta.processpipe.is_none());
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("shot.jpg");

        let mut meta = ImageMetadata::for_image(&image_path);
        meta.exif.insert("ISO".into(), "100".into());
        let mut group = IndexMap::new();
        let mut tags = IndexMap::new();
        tags.insert("landscape".to_string(), true);
        group.insert("subject".to_string(), tags);
        meta.tags.push(group);

        meta.save(&image_path).unwrap();
        let back = ImageMetadata::load(&image_path).unwrap().unwrap();
        assert_eq!(meta, back);
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ImageMetadata::load(dir.path().join("nope.jpg")).unwrap();
        assert!(loaded.is_none());
    }
}
