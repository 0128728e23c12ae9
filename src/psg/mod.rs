//! Reference three-voice PSG device
//!
//! A small YM2149-flavoured sound device: three square-wave tone voices with
//! per-voice stereo panning and one digi voice. It implements
//! [`SoundDevice`] so it can be rendered directly, and doubles as a test
//! signal source for hosts without an external emulator.

mod digi;
mod tone;

pub use digi::DigiVoice;
pub use tone::{ToneVoice, LEVELS};

use crate::device::{RawStereo, SoundDevice};
use crate::settings::DeviceSettings;
use bitflags::bitflags;
use std::sync::Arc;

/// Number of tone voices
pub const NUM_VOICES: usize = 3;

bitflags! {
    /// Muted tone voices
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VoiceMask: u8 {
        /// Voice A
        const A = 0x01;
        /// Voice B
        const B = 0x02;
        /// Voice C
        const C = 0x04;
    }
}

impl VoiceMask {
    /// Mask bit for a voice index (0=A, 1=B, 2=C)
    pub fn voice(index: usize) -> Self {
        match index {
            0 => VoiceMask::A,
            1 => VoiceMask::B,
            2 => VoiceMask::C,
            _ => VoiceMask::empty(),
        }
    }
}

/// Stereo placement of a voice, as left/right gains out of 256
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pan {
    /// Left gain (256 = full)
    pub left: u16,
    /// Right gain (256 = full)
    pub right: u16,
}

impl Pan {
    /// Create a pan from raw gains
    pub const fn new(left: u16, right: u16) -> Self {
        Self { left, right }
    }

    /// Mostly left
    pub const LEFT: Pan = Pan::new(256, 96);
    /// Equal power-ish center
    pub const CENTER: Pan = Pan::new(192, 192);
    /// Mostly right
    pub const RIGHT: Pan = Pan::new(96, 256);
    /// Both channels at full gain
    pub const MONO: Pan = Pan::new(256, 256);

    /// Split a mono level into its stereo contribution
    #[inline]
    pub fn apply(self, level: i32) -> (i32, i32) {
        (
            level * self.left as i32 / 256,
            level * self.right as i32 / 256,
        )
    }
}

fn warn_if_invalid(settings: &DeviceSettings) {
    if let Err(e) = settings.validate() {
        log::warn!("psg device settings out of contract: {}", e);
    }
}

/// Three-voice PSG with a digi channel
#[derive(Debug, Clone)]
pub struct PsgDevice {
    settings: DeviceSettings,
    voices: [ToneVoice; NUM_VOICES],
    pans: [Pan; NUM_VOICES],
    muted: VoiceMask,
    digi: DigiVoice,
    cycles: u64,
}

impl PsgDevice {
    /// Create a silent device with ABC stereo placement
    pub fn new(settings: DeviceSettings) -> Self {
        log::debug!(
            "psg device: {} Hz out, speed {}, native {} Hz, volume {:.0}%, digi {}",
            settings.sample_rate,
            settings.playback_speed,
            settings.native_rate(),
            settings.volume_percent(),
            if settings.digi_mixing { "on" } else { "off" }
        );
        warn_if_invalid(&settings);
        Self {
            settings,
            voices: Default::default(),
            pans: [Pan::LEFT, Pan::CENTER, Pan::RIGHT],
            muted: VoiceMask::empty(),
            digi: DigiVoice::new(),
            cycles: 0,
        }
    }

    /// Current settings
    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    /// Replace the settings
    ///
    /// Voice periods are in native cycles, so retune after changing the
    /// sample rate or playback speed.
    pub fn set_settings(&mut self, settings: DeviceSettings) {
        warn_if_invalid(&settings);
        self.settings = settings;
    }

    /// Set master volume (0..=256)
    pub fn set_master_volume(&mut self, volume: u16) {
        self.settings.master_volume = volume;
    }

    /// Enable or disable digi mixing
    pub fn set_digi_mixing(&mut self, enabled: bool) {
        self.settings.digi_mixing = enabled;
    }

    /// Tone voice by index (0=A, 1=B, 2=C)
    pub fn voice(&self, index: usize) -> &ToneVoice {
        &self.voices[index]
    }

    /// Mutable tone voice by index (0=A, 1=B, 2=C)
    pub fn voice_mut(&mut self, index: usize) -> &mut ToneVoice {
        &mut self.voices[index]
    }

    /// Place a voice in the stereo field
    pub fn set_pan(&mut self, index: usize, pan: Pan) {
        self.pans[index] = pan;
    }

    /// Mute or unmute a voice; muted voices keep running silently
    pub fn set_voice_muted(&mut self, index: usize, mute: bool) {
        self.muted.set(VoiceMask::voice(index), mute);
    }

    /// Check if a voice is muted
    pub fn is_voice_muted(&self, index: usize) -> bool {
        self.muted.contains(VoiceMask::voice(index))
    }

    /// Start a digi sample at `freq` samples per second
    pub fn trigger_digi(&mut self, sample: Arc<[u8]>, freq: u32) {
        log::debug!("digi start: {} bytes at {} Hz", sample.len(), freq);
        self.digi.start(sample, freq, self.settings.native_rate());
    }

    /// Stop the digi voice
    pub fn stop_digi(&mut self) {
        self.digi.stop();
    }

    /// Digi voice state
    pub fn digi(&self) -> &DigiVoice {
        &self.digi
    }

    /// Native cycles run since creation or reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Silence all voices and clear the cycle count; settings are kept
    pub fn reset(&mut self) {
        self.voices = Default::default();
        self.muted = VoiceMask::empty();
        self.digi.stop();
        self.cycles = 0;
    }
}

impl SoundDevice for PsgDevice {
    fn step_cycle(&mut self) -> RawStereo {
        self.cycles += 1;
        let mut out = RawStereo::default();
        for (index, voice) in self.voices.iter_mut().enumerate() {
            let level = voice.tick();
            if self.muted.contains(VoiceMask::voice(index)) {
                continue;
            }
            let (left, right) = self.pans[index].apply(level);
            out.left += left;
            out.right += right;
        }
        out
    }

    fn decode_digi(&mut self) -> i32 {
        self.digi.next_value()
    }

    fn playback_speed(&self) -> u32 {
        self.settings.playback_speed
    }

    fn master_volume(&self) -> i32 {
        self.settings.master_volume as i32
    }

    fn digi_mixing(&self) -> bool {
        self.settings.digi_mixing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcm::samples;
    use crate::{fill_buffer, generate_sample};

    fn loud_device(settings: DeviceSettings) -> PsgDevice {
        let mut dev = PsgDevice::new(settings);
        for index in 0..NUM_VOICES {
            dev.voice_mut(index).set_half_period(1);
            dev.voice_mut(index).set_level(15);
            dev.set_pan(index, Pan::MONO);
        }
        dev
    }

    #[test]
    fn test_new_device_is_silent() {
        let mut dev = PsgDevice::new(DeviceSettings::default());
        let mut buf = [0xFFu8; 64];
        fill_buffer(&mut dev, &mut buf);
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(dev.cycles(), 16 * 4);
    }

    #[test]
    fn test_pan_splits_level() {
        assert_eq!(Pan::MONO.apply(1000), (1000, 1000));
        assert_eq!(Pan::LEFT.apply(1024), (1024, 384));
        assert_eq!(Pan::RIGHT.apply(-1024), (-384, -1024));
    }

    #[test]
    fn test_voices_sum_per_channel() {
        let mut dev = loud_device(DeviceSettings::default());
        // half period 1: first tick flips to the high phase
        assert_eq!(dev.step_cycle(), RawStereo::mono(3 * 8191));
        assert_eq!(dev.step_cycle(), RawStereo::mono(-3 * 8191));
    }

    #[test]
    fn test_muted_voice_drops_out() {
        let mut dev = loud_device(DeviceSettings::default());
        dev.set_voice_muted(1, true);
        assert!(dev.is_voice_muted(1));
        assert!(!dev.is_voice_muted(0));
        assert_eq!(dev.step_cycle(), RawStereo::mono(2 * 8191));
    }

    #[test]
    fn test_digi_overlay_clips_loud_voices() {
        let settings = DeviceSettings::default().with_playback_speed(1);
        let mut dev = loud_device(settings);
        dev.trigger_digi(Arc::from(vec![255u8; 64]), settings.native_rate());
        // 3 * 8191 + 127 * 256 exceeds the 16-bit range
        assert_eq!(generate_sample(&mut dev).left, i16::MAX);
        // low phase: -24573 + 32512 stays in range
        assert_eq!(generate_sample(&mut dev).left, 7939);
    }

    #[test]
    fn test_digi_ignored_when_mixing_disabled() {
        let settings = DeviceSettings::default()
            .with_playback_speed(1)
            .with_digi_mixing(false);
        let mut dev = PsgDevice::new(settings);
        dev.trigger_digi(Arc::from(vec![255u8; 8]), settings.native_rate());
        let mut buf = [0u8; 16];
        fill_buffer(&mut dev, &mut buf);
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(dev.digi().position(), 0, "decoder never advanced");
    }

    #[test]
    fn test_digi_rate_follows_native_rate() {
        let settings = DeviceSettings::default()
            .with_sample_rate(1000)
            .with_playback_speed(4);
        let mut dev = PsgDevice::new(settings);
        // one byte per output frame
        dev.trigger_digi(Arc::from(&[128u8, 255, 0][..]), 1000);
        let mut buf = [0u8; 12];
        fill_buffer(&mut dev, &mut buf);
        let lefts: Vec<i16> = samples(&buf).map(|s| s.left).collect();
        assert_eq!(lefts, vec![0, 127 << 8, -128 << 8]);
        assert!(!dev.digi().is_active());
    }

    #[test]
    fn test_volume_from_settings() {
        let mut dev = loud_device(DeviceSettings::default().with_playback_speed(1));
        dev.set_master_volume(128);
        let mut buf = [0u8; 4];
        fill_buffer(&mut dev, &mut buf);
        let frame = samples(&buf).next().unwrap();
        assert_eq!(frame.left, (3 * 8191 * 128 / 256) as i16);
    }

    #[test]
    fn test_reset_silences_and_keeps_settings() {
        let settings = DeviceSettings::default().with_master_volume(100);
        let mut dev = loud_device(settings);
        dev.set_voice_muted(0, true);
        dev.step_cycle();
        dev.reset();
        assert_eq!(dev.cycles(), 0);
        assert!(!dev.is_voice_muted(0));
        assert_eq!(dev.step_cycle(), RawStereo::default());
        assert_eq!(dev.settings().master_volume, 100);
    }
}
