//! Hand-off to an external HDR display viewer.
//!
//! A file-based, one-way interface: the current image is written to a
//! well-known filename scaled for the target display, and an external
//! viewer process is (re)spawned to read it. There is no return channel.

use crate::config::DisplayProfile;
use crate::core::error::HdrPipeResult;
use crate::core::image::Image;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

/// Well-known filename the viewer watches.
const DISPLAY_FILE: &str = "current.hdr";

/// Connection to the external HDR viewer.
pub struct HdrDisplay {
    output_path: PathBuf,
    /// Viewer executable; `None` writes the file without spawning.
    viewer: Option<String>,
    child: Option<Child>,
}

impl HdrDisplay {
    /// A display hand-off writing into `dir`.
    pub fn new(dir: impl AsRef<Path>, viewer: Option<String>) -> Self {
        Self {
            output_path: dir.as_ref().join(DISPLAY_FILE),
            viewer,
            child: None,
        }
    }

    /// Path of the hand-off file.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Publish an image to the display: scale per the profile, fit to the
    /// display resolution, write the hand-off file, replace the viewer
    /// process.
    pub fn show(&mut self, image: &Image, profile: &DisplayProfile) -> HdrPipeResult<()> {
        let longest_side = profile.shape[0].max(profile.shape[1]) as usize;
        let mut scaled = image.resized_to_fit(longest_side);
        if profile.scaling != 1.0 {
            let scaling = profile.scaling as f32;
            for v in scaled.data_mut() {
                *v *= scaling;
            }
        }
        scaled.write(&self.output_path)?;

        if let Some(viewer) = self.viewer.clone() {
            self.kill_viewer();
            match Command::new(&viewer).arg(&self.output_path).spawn() {
                Ok(child) => self.child = Some(child),
                Err(e) => log::warn!("could not spawn viewer '{}': {}", viewer, e),
            }
        }
        Ok(())
    }

    /// Stop the viewer process, if one is running.
    pub fn close(&mut self) {
        self.kill_viewer();
    }

    fn kill_viewer(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for HdrDisplay {
    fn drop(&mut self) {
        self.kill_viewer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_show_writes_wellknown_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = HdrDisplay::new(dir.path(), None);
        let config = AppConfig::default();

        let img = Image::filled(8, 8, [0.2, 0.2, 0.2]);
        display.show(&img, config.current_display().unwrap()).unwrap();

        assert!(dir.path().join("current.hdr").exists());
    }

    #[test]
    fn test_show_applies_display_scaling() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = HdrDisplay::new(dir.path(), None);
        let config = AppConfig::default();
        let profile = config.current_display().unwrap(); // scaling 12

        let img = Image::filled(4, 4, [0.1, 0.1, 0.1]);
        display.show(&img, profile).unwrap();

        let back = Image::read(display.output_path()).unwrap();
        assert!((back.data()[0] - 1.2).abs() < 0.05);
    }
}
