//! Device abstraction consumed by the renderer
//!
//! The renderer never owns the emulator. It borrows anything implementing
//! [`SoundDevice`], clocks it one native cycle at a time and reads three
//! configuration values from it.

use parking_lot::Mutex;
use std::sync::Arc;

/// Raw stereo pair produced by one emulation cycle
///
/// Fields are not limited to the 16-bit range; saturation happens later in
/// [`generate_sample`](crate::generate_sample).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawStereo {
    /// Left channel level
    pub left: i32,
    /// Right channel level
    pub right: i32,
}

impl RawStereo {
    /// Create a raw pair
    pub const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }

    /// Same level on both channels
    pub const fn mono(level: i32) -> Self {
        Self::new(level, level)
    }
}

/// Capability interface of an emulated sound device
///
/// Implementors are deterministic state machines: each call to
/// [`step_cycle`](Self::step_cycle) advances the chip by exactly one native
/// cycle. Any emulator satisfying this trait can be rendered, and tests use
/// small stub devices that return scripted values.
///
/// # Example
///
/// ```
/// use ym2149_pcm::{fill_buffer, RawStereo, SoundDevice};
///
/// struct Dc(i32);
///
/// impl SoundDevice for Dc {
///     fn step_cycle(&mut self) -> RawStereo {
///         RawStereo::mono(self.0)
///     }
///     fn decode_digi(&mut self) -> i32 {
///         0
///     }
///     fn playback_speed(&self) -> u32 {
///         1
///     }
///     fn master_volume(&self) -> i32 {
///         256
///     }
///     fn digi_mixing(&self) -> bool {
///         false
///     }
/// }
///
/// let mut buf = [0u8; 4];
/// fill_buffer(&mut Dc(0x0102), &mut buf);
/// assert_eq!(buf, [0x02, 0x01, 0x02, 0x01]);
/// ```
pub trait SoundDevice {
    /// Advance emulation by one native cycle and return its raw stereo output
    fn step_cycle(&mut self) -> RawStereo;

    /// Produce the next mono digi-channel correction sample
    ///
    /// Only called while [`digi_mixing`](Self::digi_mixing) is true.
    fn decode_digi(&mut self) -> i32;

    /// Native cycles per emitted output frame (contract: >= 1)
    fn playback_speed(&self) -> u32;

    /// Master volume, 0 (silent) to 256 (unity)
    fn master_volume(&self) -> i32;

    /// Whether the digi channel is layered over the synthesized output
    fn digi_mixing(&self) -> bool;
}

impl<D: SoundDevice + ?Sized> SoundDevice for Box<D> {
    fn step_cycle(&mut self) -> RawStereo {
        (**self).step_cycle()
    }

    fn decode_digi(&mut self) -> i32 {
        (**self).decode_digi()
    }

    fn playback_speed(&self) -> u32 {
        (**self).playback_speed()
    }

    fn master_volume(&self) -> i32 {
        (**self).master_volume()
    }

    fn digi_mixing(&self) -> bool {
        (**self).digi_mixing()
    }
}

/// Device handle shared between a control thread and an audio callback
pub type SharedDevice<D> = Arc<Mutex<D>>;

/// Wrap a device for sharing across threads
pub fn shared<D: SoundDevice>(device: D) -> SharedDevice<D> {
    Arc::new(Mutex::new(device))
}

/// Fill `buffer` from a shared device
///
/// The lock is held for exactly one [`fill_buffer`](crate::fill_buffer) call,
/// so register writes from other threads land between chunks, never inside one.
pub fn fill_shared<D: SoundDevice + ?Sized>(device: &SharedDevice<D>, buffer: &mut [u8]) {
    let mut guard = device.lock();
    crate::fill::fill_buffer(&mut *guard, buffer);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant;

    impl SoundDevice for Constant {
        fn step_cycle(&mut self) -> RawStereo {
            RawStereo::new(100, -100)
        }
        fn decode_digi(&mut self) -> i32 {
            0
        }
        fn playback_speed(&self) -> u32 {
            1
        }
        fn master_volume(&self) -> i32 {
            256
        }
        fn digi_mixing(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_raw_stereo_mono() {
        assert_eq!(RawStereo::mono(-7), RawStereo::new(-7, -7));
    }

    #[test]
    fn test_boxed_device_forwards() {
        let mut boxed: Box<dyn SoundDevice> = Box::new(Constant);
        assert_eq!(boxed.step_cycle(), RawStereo::new(100, -100));
        assert_eq!(boxed.playback_speed(), 1);
        assert_eq!(boxed.master_volume(), 256);
        assert!(!boxed.digi_mixing());
    }

    #[test]
    fn test_fill_shared_writes_frames() {
        let device = shared(Constant);
        let mut buf = [0u8; 8];
        fill_shared(&device, &mut buf);
        assert_eq!(buf, [0x64, 0x00, 0x9C, 0xFF, 0x64, 0x00, 0x9C, 0xFF]);
    }

    #[test]
    fn test_shared_device_usable_from_other_thread() {
        let device = shared(Constant);
        let worker = {
            let device = Arc::clone(&device);
            std::thread::spawn(move || {
                let mut buf = [0u8; 4];
                fill_shared(&device, &mut buf);
                buf
            })
        };
        assert_eq!(worker.join().unwrap(), [0x64, 0x00, 0x9C, 0xFF]);
    }
}
