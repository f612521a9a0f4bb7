//! Execution strategies over the process pipe: the interactive scheduler,
//! tiled full-resolution export, gallery loading and the HDR display
//! hand-off.

pub mod display;
pub mod gallery;
pub mod scheduler;
pub mod tiled;

pub use display::HdrDisplay;
pub use gallery::{load_page, scan_directory, GalleryItem, THUMBNAIL_CAP};
pub use scheduler::{ComputeScheduler, PreviewEvent};
pub use tiled::{compute_tiled, export};
