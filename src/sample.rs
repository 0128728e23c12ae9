//! Per-cycle sample generation
//!
//! One call clocks the device once, layers the digi channel on top and
//! saturates the result to the signed 16-bit range. This is the only place
//! in the crate where clipping happens.

use crate::device::SoundDevice;

/// Largest representable output level
pub const SAMPLE_MAX: i16 = i16::MAX;
/// Smallest representable output level
pub const SAMPLE_MIN: i16 = i16::MIN;

/// Finished stereo sample, always within the 16-bit range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StereoSample {
    /// Left channel
    pub left: i16,
    /// Right channel
    pub right: i16,
}

impl StereoSample {
    /// Create a sample from two 16-bit levels
    pub const fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }

    /// Digital silence
    pub const SILENCE: Self = Self::new(0, 0);
}

/// Clamp a wide accumulator value to the signed 16-bit range
///
/// Values at or beyond a boundary map to that boundary; everything strictly
/// inside passes through unchanged.
#[inline]
pub fn saturate(value: i64) -> i16 {
    if value >= SAMPLE_MAX as i64 {
        SAMPLE_MAX
    } else if value <= SAMPLE_MIN as i64 {
        SAMPLE_MIN
    } else {
        value as i16
    }
}

/// Clock the device one cycle and return the saturated stereo sample
///
/// When the device has digi mixing enabled, one digi sample is decoded and
/// added to both channels before clipping, so the overlay itself can drive
/// the output into saturation.
#[inline]
pub fn generate_sample<D: SoundDevice + ?Sized>(device: &mut D) -> StereoSample {
    let raw = device.step_cycle();
    let mut left = raw.left as i64;
    let mut right = raw.right as i64;

    if device.digi_mixing() {
        let digi = device.decode_digi() as i64;
        left += digi;
        right += digi;
    }

    StereoSample::new(saturate(left), saturate(right))
}
