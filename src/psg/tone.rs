//! Square-wave tone voice

/// Output level per 4-bit amplitude step (1.5 dB apart, like the YM2149 DAC)
pub const LEVELS: [i32; 16] = [
    0, 730, 868, 1031, 1226, 1457, 1731, 2057, 2445, 2906, 3454, 4105, 4879, 5799, 6892, 8191,
];

/// Tone generator for a single voice
///
/// The counter runs in native cycles and flips the output every
/// `half_period` cycles. A half period of 0 keeps the voice silent.
#[derive(Clone, Debug, Default)]
pub struct ToneVoice {
    counter: u32,
    half_period: u32,
    high: bool,
    level: u8,
}

impl ToneVoice {
    /// Create a silent voice
    pub fn new() -> Self {
        Self::default()
    }

    /// Tune to `hz` given the chip's native cycle rate
    ///
    /// Non-positive or non-finite frequencies silence the voice.
    pub fn set_frequency(&mut self, hz: f32, native_rate: u32) {
        if !hz.is_finite() || hz <= 0.0 {
            self.half_period = 0;
            return;
        }
        let cycles = (native_rate as f32 / (2.0 * hz)).round();
        self.half_period = (cycles as u32).max(1);
    }

    /// Set the half period directly, in native cycles
    #[inline]
    pub fn set_half_period(&mut self, cycles: u32) {
        self.half_period = cycles;
    }

    /// Current half period in native cycles
    #[inline]
    pub fn half_period(&self) -> u32 {
        self.half_period
    }

    /// Set the 4-bit amplitude (upper bits ignored)
    #[inline]
    pub fn set_level(&mut self, level: u8) {
        self.level = level & 0x0F;
    }

    /// Current 4-bit amplitude
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Restart the waveform from its low phase
    pub fn reset_phase(&mut self) {
        self.counter = 0;
        self.high = false;
    }

    /// Advance one native cycle and return the bipolar output level
    #[inline]
    pub fn tick(&mut self) -> i32 {
        if self.half_period == 0 {
            return 0;
        }
        self.counter += 1;
        if self.counter >= self.half_period {
            self.counter = 0;
            self.high = !self.high;
        }
        let amplitude = LEVELS[self.level as usize];
        if self.high {
            amplitude
        } else {
            -amplitude
        }
    }
}
