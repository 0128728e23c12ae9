//! Digi voice: one-shot 8-bit sample playback
//!
//! Plays unsigned 8-bit samples (digidrums) at an arbitrary frequency using a
//! fixed-point position accumulator. Each call yields one signed correction
//! sample to be layered on top of the tone voices.

use std::sync::Arc;

/// Fractional bits of the playback position
const DIGI_PREC: u32 = 15;

/// One-shot sample player
#[derive(Debug, Clone)]
pub struct DigiVoice {
    /// Sample data (8-bit unsigned, shared to avoid cloning)
    data: Arc<[u8]>,
    /// Playback position (fixed-point, DIGI_PREC fractional bits)
    pos: u64,
    /// Position increment per native cycle
    step: u64,
    active: bool,
}

impl Default for DigiVoice {
    fn default() -> Self {
        Self {
            data: Arc::from([]),
            pos: 0,
            step: 0,
            active: false,
        }
    }
}

impl DigiVoice {
    /// Create an idle voice
    pub fn new() -> Self {
        Self::default()
    }

    /// Start playing `data` at `freq` samples per second
    pub fn start(&mut self, data: Arc<[u8]>, freq: u32, native_rate: u32) {
        self.step = ((freq as u64) << DIGI_PREC) / native_rate.max(1) as u64;
        self.pos = 0;
        self.active = !data.is_empty() && self.step > 0;
        self.data = data;
    }

    /// Stop playback
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Whether a sample is still playing
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Index of the byte that will be played next
    #[inline]
    pub fn position(&self) -> usize {
        (self.pos >> DIGI_PREC) as usize
    }

    /// Return the current signed level and advance one native cycle
    ///
    /// Idle or finished voices return 0.
    #[inline]
    pub fn next_value(&mut self) -> i32 {
        if !self.active {
            return 0;
        }
        let Some(&byte) = self.data.get(self.position()) else {
            self.active = false;
            return 0;
        };
        self.pos += self.step;
        if self.position() >= self.data.len() {
            self.active = false;
        }
        (byte as i32 - 128) << 8
    }
}
