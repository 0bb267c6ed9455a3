//! Runtime settings
//!
//! Loaded from a JSON file by the native binary. Every field has a default,
//! so a partial file (or none at all) is fine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_HEIGHT_ADJUSTMENT, SCREEN_WIDTH, TICK_MILLIS};
use crate::error::ConfigError;
use crate::levels::LEVEL_ONE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Play field ===
    pub screen_width: f32,
    pub screen_height: f32,

    // === Timing ===
    /// Tick period in milliseconds
    pub tick_millis: u64,

    // === Determinism ===
    /// Master seed; a random one is drawn when absent
    pub seed: Option<u64>,

    /// Level the controller launches first
    pub start_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            tick_millis: TICK_MILLIS,
            seed: None,
            start_level: LEVEL_ONE.to_string(),
        }
    }
}

impl Settings {
    /// Read and validate a JSON settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.screen_width.is_finite() && self.screen_width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "screen_width must be positive, got {}",
                self.screen_width
            )));
        }
        // Enemies spawn in [0, height - adjustment), so the field must be taller
        if !(self.screen_height.is_finite() && self.screen_height > SCREEN_HEIGHT_ADJUSTMENT) {
            return Err(ConfigError::Invalid(format!(
                "screen_height must exceed {}, got {}",
                SCREEN_HEIGHT_ADJUSTMENT, self.screen_height
            )));
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Invalid("tick_millis must be at least 1".into()));
        }
        if self.start_level.trim().is_empty() {
            return Err(ConfigError::Invalid("start_level is empty".into()));
        }
        Ok(())
    }
}
