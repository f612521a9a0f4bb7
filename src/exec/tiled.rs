//! Tiled full-resolution computation and export.
//!
//! The working pipe runs at preview resolution; export re-runs the same
//! parameters at native resolution, split into a grid of tiles computed
//! in parallel. The geometry stage is stripped from the per-tile pipes
//! (crop and rotation need the full frame) and applied once after the
//! merge barrier.

use crate::config::AppConfig;
use crate::core::error::{ExportError, HdrPipeResult, PipeError};
use crate::core::image::Image;
use crate::pipe::node::Transform;
use crate::pipe::pipe::ProcessPipe;
use crate::pipe::serialization::{transform_id_for, NodeState};
use crate::transforms::{Geometry, TransformRegistry};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Progress callback, called with a percentage after each finished tile.
pub type Progress<'a> = &'a (dyn Fn(usize) + Sync);

/// No-op progress callback.
pub fn silent_progress() -> impl Fn(usize) + Sync {
    |_| {}
}

/// Re-run a pipe's parameters over its full-resolution source, tiled
/// `nb_w` x `nb_h`.
///
/// Tile pipes share the source pipe's serialized parameter state and own
/// only their tile buffers. Any tile failure aborts the whole run. The
/// result has the geometry stage applied exactly once, post-merge.
pub fn compute_tiled(
    pipe: &ProcessPipe,
    nb_w: usize,
    nb_h: usize,
    tone_map: bool,
    progress: Progress<'_>,
) -> Result<Image, ExportError> {
    let source = pipe
        .original_image()
        .ok_or(PipeError::MissingInputImage)?
        .clone();

    let mut state = pipe.to_state();
    let geometry: Option<NodeState> = match state.nodes.last() {
        Some(node) if transform_id_for(&node.name) == "geometry" => state.nodes.pop(),
        _ => None,
    };

    let registry = TransformRegistry::builtin();
    let total = nb_w * nb_h;
    let done = AtomicUsize::new(0);
    log::info!(
        "tiled compute: {}x{} tiles over {}x{}",
        nb_w,
        nb_h,
        source.width(),
        source.height()
    );

    let tiles: Vec<(usize, usize, Image)> = source
        .split(nb_w, nb_h)
        .into_iter()
        .enumerate()
        .flat_map(|(ty, row)| {
            row.into_iter()
                .enumerate()
                .map(move |(tx, tile)| (tx, ty, tile))
        })
        .collect();

    let mut computed: Vec<(usize, usize, Image)> = tiles
        .into_par_iter()
        .map(|(tx, ty, tile)| {
            let result = compute_one_tile(&registry, &state, tile, tone_map)
                .map_err(|source| ExportError::TileFailed {
                    x: tx,
                    y: ty,
                    source,
                })?;
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            progress(finished * 100 / total);
            Ok((tx, ty, result))
        })
        .collect::<Result<_, ExportError>>()?;

    // single-threaded merge barrier
    computed.sort_by_key(|(tx, ty, _)| (*ty, *tx));
    let mut grid: Vec<Vec<Image>> = Vec::with_capacity(nb_h);
    let mut iter = computed.into_iter();
    for _ in 0..nb_h {
        grid.push((&mut iter).take(nb_w).map(|(_, _, img)| img).collect());
    }
    let merged = Image::merge(&grid)?;

    let result = match geometry {
        Some(node) => {
            log::info!("applying geometry post-merge");
            Geometry.compute(&merged, &node.params)?
        }
        None => merged,
    };
    Ok(result)
}

fn compute_one_tile(
    registry: &TransformRegistry,
    state: &crate::pipe::serialization::PipeState,
    tile: Image,
    tone_map: bool,
) -> HdrPipeResult<Image> {
    let mut tile_pipe = ProcessPipe::from_state(registry, state)?;
    tile_pipe.set_limit_working_size(false);
    tile_pipe.set_image(tile);
    tile_pipe.compute()?;
    tile_pipe.get_image(tone_map)
}

/// Export the pipe's result to `path`, tiled at full resolution.
///
/// An `.hdr` destination gets the HDR-linear branch scaled by the
/// configured display profile; other formats get the tone-mapped branch.
/// The display profile's postfix is appended to the output filename.
/// Returns the actual path written.
pub fn export(
    pipe: &ProcessPipe,
    config: &AppConfig,
    path: impl AsRef<Path>,
    nb_w: usize,
    nb_h: usize,
    progress: Progress<'_>,
) -> HdrPipeResult<PathBuf> {
    let path = path.as_ref();
    let profile = config.current_display()?;
    let is_hdr = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("hdr"))
        .unwrap_or(false);

    let mut image = compute_tiled(pipe, nb_w, nb_h, !is_hdr, progress)?;
    if is_hdr && profile.scaling != 1.0 {
        let scaling = profile.scaling as f32;
        for v in image.data_mut() {
            *v *= scaling;
        }
    }

    let out_path = postfixed_path(path, &profile.post);
    image.write(&out_path)?;
    log::info!("exported {}", out_path.display());
    Ok(out_path)
}

/// `dir/name.ext` → `dir/name<postfix>.ext`.
fn postfixed_path(path: &Path, postfix: &str) -> PathBuf {
    if postfix.is_empty() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().and_then(|e| e.to_str());
    let name = match ext {
        Some(ext) => format!("{}{}.{}", stem, postfix, ext),
        None => format!("{}{}", stem, postfix),
    };
    path.with_file_name(name)
}
