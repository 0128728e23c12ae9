//! Output buffer filling
//!
//! Realizes rate conversion by integer decimation: the device runs
//! `playback_speed` native cycles per output frame and only the last cycle's
//! sample is kept. The kept sample is scaled by the master volume and packed
//! as interleaved 16-bit little-endian stereo.

use crate::device::SoundDevice;
use crate::pcm::{pack_frame, BYTES_PER_FRAME};
use crate::sample::{generate_sample, StereoSample};
use crate::settings::MAX_VOLUME;

/// Scale a saturated level by the master volume (`level * volume / 256`)
///
/// Division truncates toward zero. Volumes outside `0..=256` are clamped,
/// so the result always shrinks toward zero and never overflows.
#[inline]
pub fn scale_volume(level: i16, volume: i32) -> i16 {
    let volume = volume.clamp(0, MAX_VOLUME as i32);
    ((level as i32 * volume) / MAX_VOLUME as i32) as i16
}

/// Run one output frame worth of cycles and return the audible sample
///
/// Exactly `playback_speed` samples are generated; a speed of 0 behaves as 1.
#[inline]
fn decimate<D: SoundDevice + ?Sized>(device: &mut D) -> StereoSample {
    let mut sample = generate_sample(device);
    for _ in 1..device.playback_speed() {
        sample = generate_sample(device);
    }
    sample
}

/// Fill `buffer` with interleaved 16-bit little-endian stereo frames
///
/// Every complete 4-byte slot is written in ascending order. A trailing
/// partial slot (length not a multiple of 4) is left untouched. No
/// allocation, no locking, and the work is bounded by
/// `frames * playback_speed` device cycles.
///
/// # Example
///
/// ```
/// use ym2149_pcm::{fill_buffer, DeviceSettings, PsgDevice};
///
/// let mut device = PsgDevice::new(DeviceSettings::default());
/// let mut chunk = vec![0u8; 4 * 882]; // one 50 Hz frame at 44.1 kHz
/// fill_buffer(&mut device, &mut chunk);
/// ```
pub fn fill_buffer<D: SoundDevice + ?Sized>(device: &mut D, buffer: &mut [u8]) {
    for frame in buffer.chunks_exact_mut(BYTES_PER_FRAME) {
        let sample = decimate(device);
        let volume = device.master_volume();
        let scaled = StereoSample::new(
            scale_volume(sample.left, volume),
            scale_volume(sample.right, volume),
        );
        pack_frame(frame, scaled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RawStereo;

    /// Emits the cycle index on the left and its negation on the right
    struct Counter {
        cycles: i32,
        speed: u32,
        volume: i32,
    }

    impl Counter {
        fn new(speed: u32) -> Self {
            Self {
                cycles: 0,
                speed,
                volume: 256,
            }
        }
    }

    impl SoundDevice for Counter {
        fn step_cycle(&mut self) -> RawStereo {
            self.cycles += 1;
            RawStereo::new(self.cycles, -self.cycles)
        }
        fn decode_digi(&mut self) -> i32 {
            0
        }
        fn playback_speed(&self) -> u32 {
            self.speed
        }
        fn master_volume(&self) -> i32 {
            self.volume
        }
        fn digi_mixing(&self) -> bool {
            false
        }
    }

    /// Constant raw output with configurable volume
    struct Fixed {
        raw: RawStereo,
        speed: u32,
        volume: i32,
    }

    impl SoundDevice for Fixed {
        fn step_cycle(&mut self) -> RawStereo {
            self.raw
        }
        fn decode_digi(&mut self) -> i32 {
            0
        }
        fn playback_speed(&self) -> u32 {
            self.speed
        }
        fn master_volume(&self) -> i32 {
            self.volume
        }
        fn digi_mixing(&self) -> bool {
            false
        }
    }

    fn frame_at(buf: &[u8], index: usize) -> (i16, i16) {
        let f = &buf[index * 4..index * 4 + 4];
        (
            i16::from_le_bytes([f[0], f[1]]),
            i16::from_le_bytes([f[2], f[3]]),
        )
    }

    #[test]
    fn test_scale_volume_truncates() {
        assert_eq!(scale_volume(1000, 128), 500);
        assert_eq!(scale_volume(1000, 256), 1000);
        assert_eq!(scale_volume(1000, 0), 0);
        assert_eq!(scale_volume(3, 128), 1);
        assert_eq!(scale_volume(-3, 128), -1, "truncation is toward zero");
        assert_eq!(scale_volume(i16::MIN, 256), i16::MIN);
        assert_eq!(scale_volume(i16::MAX, 255), 32639);
    }

    #[test]
    fn test_scale_volume_out_of_contract_is_clamped() {
        assert_eq!(scale_volume(1000, 512), 1000);
        assert_eq!(scale_volume(1000, -10), 0);
    }

    #[test]
    fn test_oversampling_keeps_last_cycle() {
        let mut dev = Counter::new(3);
        let mut buf = [0u8; 12];
        fill_buffer(&mut dev, &mut buf);

        assert_eq!(dev.cycles, 9, "three cycles per frame");
        assert_eq!(frame_at(&buf, 0), (3, -3));
        assert_eq!(frame_at(&buf, 1), (6, -6));
        assert_eq!(frame_at(&buf, 2), (9, -9));
    }

    #[test]
    fn test_speed_one_emits_every_cycle() {
        let mut dev = Counter::new(1);
        let mut buf = [0u8; 8];
        fill_buffer(&mut dev, &mut buf);
        assert_eq!(dev.cycles, 2);
        assert_eq!(frame_at(&buf, 0), (1, -1));
        assert_eq!(frame_at(&buf, 1), (2, -2));
    }

    #[test]
    fn test_speed_zero_behaves_as_one() {
        let mut dev = Counter::new(0);
        let mut buf = [0u8; 4];
        fill_buffer(&mut dev, &mut buf);
        assert_eq!(dev.cycles, 1);
        assert_eq!(frame_at(&buf, 0), (1, -1));
    }

    #[test]
    fn test_state_carries_across_calls() {
        let mut dev = Counter::new(2);
        let mut buf = [0u8; 4];
        fill_buffer(&mut dev, &mut buf);
        fill_buffer(&mut dev, &mut buf);
        assert_eq!(frame_at(&buf, 0), (4, -4));
    }

    #[test]
    fn test_volume_applied_after_saturation() {
        let mut dev = Fixed {
            raw: RawStereo::new(100_000, -100_000),
            speed: 1,
            volume: 128,
        };
        let mut buf = [0u8; 4];
        fill_buffer(&mut dev, &mut buf);
        // 32767 * 128 / 256 = 16383, -32768 * 128 / 256 = -16384
        assert_eq!(frame_at(&buf, 0), (16383, -16384));
    }

    #[test]
    fn test_packing_is_little_endian() {
        let mut dev = Fixed {
            raw: RawStereo::new(0x1234, -2),
            speed: 1,
            volume: 256,
        };
        let mut buf = [0u8; 4];
        fill_buffer(&mut dev, &mut buf);
        assert_eq!(buf, [0x34, 0x12, 0xFE, 0xFF]);
    }

    #[test]
    fn test_end_to_end_single_frame() {
        let mut dev = Fixed {
            raw: RawStereo::new(100, -100),
            speed: 2,
            volume: 256,
        };
        let mut buf = [0u8; 4];
        fill_buffer(&mut dev, &mut buf);
        assert_eq!(buf, [0x64, 0x00, 0x9C, 0xFF]);
    }

    #[test]
    fn test_partial_trailing_slot_untouched() {
        let mut dev = Counter::new(1);
        let mut buf = [0xAAu8; 7];
        fill_buffer(&mut dev, &mut buf);
        assert_eq!(dev.cycles, 1);
        assert_eq!(frame_at(&buf, 0), (1, -1));
        assert_eq!(&buf[4..], &[0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_empty_buffer_does_not_clock() {
        let mut dev = Counter::new(4);
        fill_buffer(&mut dev, &mut []);
        assert_eq!(dev.cycles, 0);
    }
}
