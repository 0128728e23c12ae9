//! WAV file export
//!
//! Renders a device offline through the same [`fill_buffer`] path used for
//! real-time output and writes the frames as 16-bit stereo WAV.

use crate::device::SoundDevice;
use crate::fill::fill_buffer;
use crate::pcm::{samples, BYTES_PER_FRAME};
use crate::{PcmError, Result};
use std::path::Path;

/// Frames rendered per chunk while exporting
const EXPORT_CHUNK_FRAMES: usize = 4096;

fn write_error(e: hound::Error) -> PcmError {
    PcmError::AudioFileError(format!("Failed to write sample: {}", e))
}

/// Render `frames` output frames from `device` into a WAV file
///
/// `sample_rate` is written to the WAV header and should match the rate the
/// device was configured for. Returns the number of frames written.
///
/// # Examples
///
/// ```no_run
/// use ym2149_pcm::{export_wav, DeviceSettings, PsgDevice};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = DeviceSettings::default();
/// let mut device = PsgDevice::new(settings);
/// export_wav(&mut device, settings.sample_rate, "out.wav", 44_100)?;
/// # Ok(())
/// # }
/// ```
pub fn export_wav<D, P>(
    device: &mut D,
    sample_rate: u32,
    output_path: P,
    frames: usize,
) -> Result<usize>
where
    D: SoundDevice + ?Sized,
    P: AsRef<Path>,
{
    let path = output_path.as_ref();
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    log::info!(
        "Rendering {} frames ({:.1}s) to {}",
        frames,
        frames as f32 / sample_rate.max(1) as f32,
        path.display()
    );

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| PcmError::AudioFileError(format!("Failed to create WAV file: {}", e)))?;

    let mut chunk = vec![0u8; EXPORT_CHUNK_FRAMES * BYTES_PER_FRAME];
    let mut remaining = frames;
    while remaining > 0 {
        let count = remaining.min(EXPORT_CHUNK_FRAMES);
        let bytes = &mut chunk[..count * BYTES_PER_FRAME];
        fill_buffer(device, bytes);

        for frame in samples(bytes) {
            writer.write_sample(frame.left).map_err(write_error)?;
            writer.write_sample(frame.right).map_err(write_error)?;
        }
        remaining -= count;
    }

    writer.finalize().map_err(|e| {
        PcmError::AudioFileError(format!("Failed to finalize WAV file: {}", e))
    })?;

    log::info!("Export complete: {}", path.display());
    Ok(frames)
}
