//! Runtime settings
//!
//! Sizing and seeding for the services built by [`crate::Runtime`], stored as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MOTION_CAPACITY, DEFAULT_TICK_CAPACITY, MAX_FRAME_DELTA};
use crate::error::SettingsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Initial slot and pool capacity of the tick scheduler
    pub tick_capacity: usize,
    /// Initial slot and pool capacity of the motion pool
    pub motion_capacity: usize,
    /// Construct pooled instances up front instead of on first use
    pub prewarm: bool,
    /// Longest frame delta (seconds) passed on to the scheduler and motion pool
    pub max_frame_delta: f32,
    /// Fixed seed for loot rolls; random when absent
    pub loot_seed: Option<u64>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            tick_capacity: DEFAULT_TICK_CAPACITY,
            motion_capacity: DEFAULT_MOTION_CAPACITY,
            prewarm: false,
            max_frame_delta: MAX_FRAME_DELTA,
            loot_seed: None,
        }
    }
}

impl RuntimeSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded runtime settings from {}", path.display());
                Ok(settings)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("{} not found, using default settings", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Frame delta actually applied for a raw `delta`
    pub fn clamp_delta(&self, delta: f32) -> f32 {
        delta.clamp(0.0, self.max_frame_delta.max(0.0))
    }
}
