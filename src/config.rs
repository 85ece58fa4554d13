// SPDX-License-Identifier: GPL-3.0-only

use crate::camera::Facing;
use crate::constants::{MAX_DECODE_DIMENSION, PREFERRED_HEIGHT, PREFERRED_WIDTH};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// User configuration, stored as JSON under the user config directory.
///
/// Missing or unreadable files fall back to defaults; unknown or absent
/// fields fall back per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred camera facing
    pub facing: Facing,
    /// Explicit capture node path, skips enumeration when set
    pub camera_path: Option<String>,
    /// Advisory capture width (driver may adjust)
    pub preferred_width: u32,
    /// Advisory capture height (driver may adjust)
    pub preferred_height: u32,
    /// Frames larger than this are downscaled before decoding
    pub max_decode_dimension: u32,
    /// Mirror the preview horizontally (selfie view). Decoding always
    /// sees the unmirrored frame.
    pub mirror_preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            camera_path: None,
            preferred_width: PREFERRED_WIDTH,
            preferred_height: PREFERRED_HEIGHT,
            max_decode_dimension: MAX_DECODE_DIMENSION,
            // Rear-camera scanning reads naturally unmirrored
            mirror_preview: false,
        }
    }
}

impl Config {
    /// Load the configuration, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist the configuration.
    pub fn save(&self) -> AppResult<()> {
        let path = Self::path()
            .ok_or_else(|| AppError::Config("no config directory available".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("creating {}: {}", parent.display(), e)))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, contents)
            .map_err(|e| AppError::Config(format!("writing {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Config file location: `<config dir>/qrscan/config.json`
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qrscan").join("config.json"))
    }
}
