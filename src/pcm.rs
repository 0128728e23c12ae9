//! PCM byte layout helpers
//!
//! Frames are 16-bit signed, little-endian, interleaved stereo:
//! `L.lo L.hi R.lo R.hi`.

use crate::device::SoundDevice;
use crate::fill::fill_buffer;
use crate::sample::StereoSample;

/// Bytes per stereo frame (2 channels x 2 bytes)
pub const BYTES_PER_FRAME: usize = 4;

/// Number of complete frames that fit in `len` bytes
#[inline]
pub fn frames_in(len: usize) -> usize {
    len / BYTES_PER_FRAME
}

/// Write one frame into a 4-byte slot
#[inline]
pub fn pack_frame(slot: &mut [u8], sample: StereoSample) {
    let [l0, l1] = sample.left.to_le_bytes();
    let [r0, r1] = sample.right.to_le_bytes();
    slot[0] = l0;
    slot[1] = l1;
    slot[2] = r0;
    slot[3] = r1;
}

/// Read one frame back from a 4-byte slot
#[inline]
pub fn unpack_frame(slot: &[u8]) -> StereoSample {
    StereoSample::new(
        i16::from_le_bytes([slot[0], slot[1]]),
        i16::from_le_bytes([slot[2], slot[3]]),
    )
}

/// Iterate the complete frames of a packed buffer
pub fn samples(bytes: &[u8]) -> impl Iterator<Item = StereoSample> + '_ {
    bytes.chunks_exact(BYTES_PER_FRAME).map(unpack_frame)
}

/// Render `frames` output frames into a freshly allocated buffer
///
/// Convenience for offline rendering; real-time callers should reuse their
/// own buffer with [`fill_buffer`].
pub fn render_frames<D: SoundDevice + ?Sized>(device: &mut D, frames: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; frames * BYTES_PER_FRAME];
    fill_buffer(device, &mut bytes);
    bytes
}
