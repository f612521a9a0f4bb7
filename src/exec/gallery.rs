//! Gallery loading: directory scan and parallel thumbnail pipes.
//!
//! Each image in the browsed directory gets its own thumbnail-scale pipe,
//! restored from the metadata sidecar when one exists. Loads within a
//! page run in parallel; pages are independent so browsing never loads
//! the whole directory at once.

use crate::core::error::{HdrPipeError, HdrPipeResult};
use crate::core::image::Image;
use crate::core::metadata::ImageMetadata;
use crate::pipe::builder::default_pipe;
use crate::pipe::pipe::ProcessPipe;
use crate::transforms::TransformRegistry;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Longest thumbnail side for gallery pipes.
pub const THUMBNAIL_CAP: usize = 200;

/// One loaded gallery slot.
pub struct GalleryItem {
    pub path: PathBuf,
    pub pipe: ProcessPipe,
    pub metadata: ImageMetadata,
}

/// Image files in a directory (non-recursive), sorted by name.
/// Recognized extensions: `.jpg` and `.hdr`, case-insensitive.
pub fn scan_directory(dir: impl AsRef<Path>) -> HdrPipeResult<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir.as_ref())
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("hdr"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    log::debug!("scan found {} images", paths.len());
    Ok(paths)
}

/// Load one page of gallery slots in parallel. Each slot reports its own
/// result; one failing image does not sink the page.
pub fn load_page(paths: &[PathBuf]) -> Vec<HdrPipeResult<GalleryItem>> {
    let registry = TransformRegistry::builtin();
    paths
        .par_iter()
        .map(|path| load_item(&registry, path))
        .collect()
}

/// Load one gallery slot: read the image (one retry on I/O failure),
/// build its thumbnail pipe, restore persisted edit state, compute.
pub fn load_item(registry: &TransformRegistry, path: &Path) -> HdrPipeResult<GalleryItem> {
    let image = read_with_retry(path)?;

    let metadata = match ImageMetadata::load(path)? {
        Some(meta) => meta,
        None => ImageMetadata::for_image(path),
    };

    let mut pipe = match &metadata.processpipe {
        Some(state) => ProcessPipe::from_state(registry, state)?,
        None => default_pipe(),
    };
    pipe.set_limit_working_size(true);
    pipe.set_working_cap(THUMBNAIL_CAP);
    pipe.set_image(image);
    pipe.compute()?;

    Ok(GalleryItem {
        path: path.to_path_buf(),
        pipe,
        metadata,
    })
}

fn read_with_retry(path: &Path) -> HdrPipeResult<Image> {
    match Image::read(path) {
        Ok(image) => Ok(image),
        Err(first @ (HdrPipeError::Io(_) | HdrPipeError::Image(image::ImageError::IoError(_)))) => {
            log::warn!("retrying read of {}: {}", path.display(), first);
            Image::read(path)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_jpg(path: &Path) {
        let img = Image::filled(8, 8, [0.5, 0.4, 0.3]);
        img.write(path).unwrap();
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write_jpg(&dir.path().join("b.jpg"));
        write_jpg(&dir.path().join("a.JPG"));
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let paths = scan_directory(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.jpg"]);
    }

    #[test]
    fn test_load_page_builds_computed_pipes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        write_jpg(&path);

        let items = load_page(&[path.clone()]);
        assert_eq!(items.len(), 1);
        let item = items.into_iter().next().unwrap().unwrap();
        assert_eq!(item.path, path);
        assert!(item.pipe.get_image(true).is_ok());
        assert!(item.metadata.processpipe.is_none());
    }

    #[test]
    fn test_sidecar_state_restored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.jpg");
        write_jpg(&path);

        // persist an edited pipe next to the image
        let mut edited = default_pipe();
        let id = edited.node_index_by_name("exposure").unwrap();
        edited
            .set_parameters(id, crate::core::params::params_from([("EV", 1.5f64)]))
            .unwrap();
        let mut meta = ImageMetadata::for_image(&path);
        meta.processpipe = Some(edited.to_state());
        meta.save(&path).unwrap();

        let registry = TransformRegistry::builtin();
        let item = load_item(&registry, &path).unwrap();
        let ev = crate::core::params::float_or(
            item.pipe.get_parameters(id).unwrap(),
            "EV",
            0.0,
        );
        assert_eq!(ev, 1.5);
    }

    #[test]
    fn test_missing_file_reports_error() {
        let registry = TransformRegistry::builtin();
        let err = load_item(&registry, Path::new("/nonexistent/shot.jpg"));
        assert!(err.is_err());
    }
}
