//! Device configuration
//!
//! The three values the renderer reads from a device (playback speed,
//! master volume, digi flag) plus the host output rate, loadable from JSON.

use crate::{PcmError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master volume at unity gain (100%)
pub const MAX_VOLUME: u16 = 256;

/// Default host output sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default number of native cycles per output frame
pub const DEFAULT_PLAYBACK_SPEED: u32 = 4;

/// Renderer-facing device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Host output rate in Hz
    pub sample_rate: u32,
    /// Native cycles per emitted frame
    pub playback_speed: u32,
    /// 0 (silent) to 256 (unity)
    pub master_volume: u16,
    /// Layer the digi channel over the synthesized voices
    pub digi_mixing: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            playback_speed: DEFAULT_PLAYBACK_SPEED,
            master_volume: MAX_VOLUME,
            digi_mixing: true,
        }
    }
}

impl DeviceSettings {
    /// Set the decimation ratio
    pub fn with_playback_speed(mut self, speed: u32) -> Self {
        self.playback_speed = speed;
        self
    }

    /// Set the master volume (0..=256)
    pub fn with_master_volume(mut self, volume: u16) -> Self {
        self.master_volume = volume;
        self
    }

    /// Enable or disable digi mixing
    pub fn with_digi_mixing(mut self, enabled: bool) -> Self {
        self.digi_mixing = enabled;
        self
    }

    /// Set the host output rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Native chip rate: one cycle per `playback_speed` per output frame
    pub fn native_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(self.playback_speed.max(1))
    }

    /// Master volume as a percentage (0.0 - 100.0)
    pub fn volume_percent(&self) -> f32 {
        self.master_volume as f32 * 100.0 / MAX_VOLUME as f32
    }

    /// Check the values the renderer treats as preconditions
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(PcmError::ConfigError(
                "sample_rate must be greater than 0".to_string(),
            ));
        }
        if self.playback_speed == 0 {
            return Err(PcmError::ConfigError(
                "playback_speed must be at least 1".to_string(),
            ));
        }
        if self.master_volume > MAX_VOLUME {
            return Err(PcmError::ConfigError(format!(
                "master_volume {} exceeds {}",
                self.master_volume, MAX_VOLUME
            )));
        }
        if self.sample_rate.checked_mul(self.playback_speed).is_none() {
            return Err(PcmError::ConfigError(format!(
                "native rate {} Hz x {} overflows",
                self.sample_rate, self.playback_speed
            )));
        }
        Ok(())
    }

    /// Parse and validate settings from a JSON document
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: DeviceSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        log::debug!("loaded device settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }
}
