//! Real-time playback through rodio
//!
//! [`DeviceSource`] pulls chunks from a shared device with
//! [`fill_shared`] and hands the decoded 16-bit samples to rodio. The chunk
//! buffer is allocated once; refills do not allocate.

use crate::device::{fill_shared, SharedDevice, SoundDevice};
use crate::pcm::BYTES_PER_FRAME;
use crate::{PcmError, Result};
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Streaming chunk configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Output frames rendered per device lock
    pub chunk_frames: usize,
}

impl StreamConfig {
    /// Small chunks: register changes are heard sooner
    pub fn low_latency() -> Self {
        Self { chunk_frames: 256 }
    }

    /// Large chunks: fewer lock round trips
    pub fn stable() -> Self {
        Self { chunk_frames: 4096 }
    }

    /// Chunk length in milliseconds at `sample_rate`
    pub fn latency_ms(&self, sample_rate: u32) -> f32 {
        self.chunk_frames as f32 * 1000.0 / sample_rate.max(1) as f32
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { chunk_frames: 1024 }
    }
}

/// rodio source rendering a shared device on demand
pub struct DeviceSource<D: SoundDevice> {
    device: SharedDevice<D>,
    sample_rate: u32,
    chunk: Vec<u8>,
    /// Byte offset of the next sample in `chunk`
    pos: usize,
    finished: Arc<AtomicBool>,
}

impl<D: SoundDevice> DeviceSource<D> {
    /// Create a source that renders `config.chunk_frames` frames per refill
    pub fn new(
        device: SharedDevice<D>,
        sample_rate: u32,
        config: StreamConfig,
        finished: Arc<AtomicBool>,
    ) -> Self {
        let len = config.chunk_frames.max(1) * BYTES_PER_FRAME;
        Self {
            device,
            sample_rate,
            chunk: vec![0u8; len],
            pos: len,
            finished,
        }
    }

    fn refill(&mut self) {
        fill_shared(&self.device, &mut self.chunk);
        self.pos = 0;
    }
}

impl<D: SoundDevice> Iterator for DeviceSource<D> {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.finished.load(Ordering::Relaxed) {
            return None;
        }
        if self.pos >= self.chunk.len() {
            self.refill();
        }
        let sample = i16::from_le_bytes([self.chunk[self.pos], self.chunk[self.pos + 1]]);
        self.pos += 2;
        Some(sample)
    }
}

impl<D: SoundDevice> Source for DeviceSource<D> {
    fn current_frame_len(&self) -> Option<usize> {
        // samples left before the next refill, at least one chunk
        let left = (self.chunk.len() - self.pos.min(self.chunk.len())) / 2;
        Some(if left == 0 { self.chunk.len() / 2 } else { left })
    }

    fn channels(&self) -> u16 {
        2
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Audio playback device using rodio
pub struct AudioOutput {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioOutput {
    /// Open the default output and start playing `device`
    pub fn new<D>(device: SharedDevice<D>, sample_rate: u32, config: StreamConfig) -> Result<Self>
    where
        D: SoundDevice + Send + 'static,
    {
        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| {
            PcmError::AudioDeviceError(format!("Failed to create audio stream: {}", e))
        })?;
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| PcmError::AudioDeviceError(format!("Failed to create audio sink: {}", e)))?;

        let finished = Arc::new(AtomicBool::new(false));
        let source = DeviceSource::new(device, sample_rate, config, Arc::clone(&finished));

        log::info!(
            "audio output open: {} Hz stereo, {} frame chunks ({:.1} ms)",
            sample_rate,
            config.chunk_frames,
            config.latency_ms(sample_rate)
        );
        sink.append(source);
        sink.play();

        Ok(Self {
            _stream: stream,
            sink,
            finished,
        })
    }

    /// Pause playback; the device is not clocked while paused
    pub fn pause(&self) {
        self.sink.pause();
    }

    /// Resume playback
    pub fn resume(&self) {
        self.sink.play();
    }

    /// Stop playback and end the source
    pub fn stop(&self) {
        self.finished.store(true, Ordering::Relaxed);
        self.sink.stop();
    }

    /// Whether playback has been stopped
    pub fn is_stopped(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
        log::debug!("audio output closed");
    }
}
