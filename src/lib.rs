//! Stereo PCM renderer for emulated YM2149-style sound devices
//!
//! Turns the state of an emulated sound chip into interleaved 16-bit
//! little-endian stereo PCM, ready to be handed to a host audio callback.
//! The chip is clocked at its native rate and decimated by an integer
//! playback-speed ratio, an optional mono digi channel is layered on both
//! outputs, and every sample is saturated to the 16-bit range before the
//! master volume is applied.
//!
//! # Features
//! - Zero-allocation [`fill_buffer`] hot path
//! - Exact 16-bit saturation of the synthesized + digi sum
//! - Integer-ratio decimation (no interpolation)
//! - Reference three-voice [`PsgDevice`] with a digi voice
//! - JSON-configurable [`DeviceSettings`]
//!
//! # Crate feature flags
//! - `export-wav` (default): render a device to a WAV file (`export`)
//! - `streaming` (opt-in): real-time playback through rodio (`streaming`)
//!
//! # Quick start
//! ```
//! use ym2149_pcm::{fill_buffer, DeviceSettings, PsgDevice};
//!
//! let settings = DeviceSettings::default().with_playback_speed(4);
//! let mut device = PsgDevice::new(settings);
//! device.voice_mut(0).set_frequency(440.0, settings.native_rate());
//! device.voice_mut(0).set_level(15);
//!
//! let mut chunk = [0u8; 4 * 512];
//! fill_buffer(&mut device, &mut chunk);
//! ```
//!
//! Any emulator can be plugged in by implementing [`SoundDevice`].

#![warn(missing_docs)]

pub mod device;
pub mod fill;
pub mod pcm;
pub mod psg;
pub mod sample;
pub mod settings;

#[cfg(feature = "export-wav")]
pub mod export;
#[cfg(feature = "streaming")]
pub mod streaming;

/// Error types for configuration, export and audio output
///
/// The sample path itself never fails; these only come from the code around it.
#[derive(thiserror::Error, Debug)]
pub enum PcmError {
    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Settings could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for PcmError {
    /// Converts a String into `PcmError::Other`.
    ///
    /// Prefer a specific variant (`ConfigError`, `AudioFileError`, ...) where one fits.
    fn from(msg: String) -> Self {
        PcmError::Other(msg)
    }
}

impl From<&str> for PcmError {
    fn from(msg: &str) -> Self {
        PcmError::Other(msg.to_string())
    }
}

/// Result type for renderer operations
pub type Result<T> = std::result::Result<T, PcmError>;

// Public API exports
pub use device::{fill_shared, shared, RawStereo, SharedDevice, SoundDevice};
pub use fill::{fill_buffer, scale_volume};
pub use pcm::{render_frames, BYTES_PER_FRAME};
pub use psg::{DigiVoice, Pan, PsgDevice, ToneVoice, VoiceMask};
pub use sample::{generate_sample, saturate, StereoSample};
pub use settings::{DeviceSettings, MAX_VOLUME};

#[cfg(feature = "export-wav")]
pub use export::export_wav;
#[cfg(feature = "streaming")]
pub use streaming::{AudioOutput, DeviceSource, StreamConfig};
