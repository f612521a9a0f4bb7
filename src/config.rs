//! Application configuration.
//!
//! An explicit context object, loaded from and saved to a TOML file and
//! passed by reference into pipe construction and export. Holds the HDR
//! display profile table, the selected display, the working-resolution
//! cap and the last image directory.

use crate::core::error::{HdrPipeError, HdrPipeResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One HDR display profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayProfile {
    /// Display resolution as (height, width).
    pub shape: [u32; 2],
    /// Scaling applied to linear values when exporting for this display.
    pub scaling: f64,
    /// Postfix appended to exported filenames.
    pub post: String,
    /// Profile tag, equal to its table key.
    pub tag: String,
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Known HDR display profiles, keyed by tag.
    pub displays: IndexMap<String, DisplayProfile>,
    /// Tag of the display currently exported for.
    pub display: String,
    /// Cap on the longest side of the working image.
    pub max_working: usize,
    /// Last directory images were opened from.
    pub image_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut displays = IndexMap::new();
        displays.insert(
            "none".to_string(),
            DisplayProfile {
                shape: [2160, 3840],
                scaling: 1.0,
                post: String::new(),
                tag: "none".into(),
            },
        );
        displays.insert(
            "vesaDisplayHDR1000".to_string(),
            DisplayProfile {
                shape: [2160, 3840],
                scaling: 12.0,
                post: "_vesa_DISPLAY_HDR_1000".into(),
                tag: "vesaDisplayHDR1000".into(),
            },
        );
        displays.insert(
            "vesaDisplayHDR400".to_string(),
            DisplayProfile {
                shape: [2160, 3840],
                scaling: 4.8,
                post: "_vesa_DISPLAY_HDR_400".into(),
                tag: "vesaDisplayHDR400".into(),
            },
        );
        displays.insert(
            "HLG1".to_string(),
            DisplayProfile {
                shape: [2160, 3840],
                scaling: 1.0,
                post: "_HLG_1".into(),
                tag: "HLG1".into(),
            },
        );
        Self {
            displays,
            display: "vesaDisplayHDR1000".into(),
            max_working: 1200,
            image_path: ".".into(),
        }
    }
}

impl AppConfig {
    /// The selected display's profile.
    pub fn current_display(&self) -> HdrPipeResult<&DisplayProfile> {
        self.displays
            .get(&self.display)
            .ok_or_else(|| HdrPipeError::Config(format!("unknown display '{}'", self.display)))
    }

    /// Load configuration from a TOML file; defaults when absent.
    pub fn load(path: impl AsRef<Path>) -> HdrPipeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| HdrPipeError::Config(e.to_string()))
    }

    /// Save configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> HdrPipeResult<()> {
        let text =
            toml::to_string_pretty(self).map_err(|e| HdrPipeError::Config(e.to_string()))?;
        fs::write(path.as_ref(), text)?;
        Ok(())
    }
}
