use std::time::Duration;

use cpal::{BufferSize, StreamConfig};

/// Fixed capture format: mono, 16-bit signed integer PCM at 16 kHz.
///
/// Only the buffer quantum is tunable. Every other parameter is fixed so the
/// WAV header written by [`SessionWriter`](crate::SessionWriter) always
/// matches what the capture channel delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    buffer_frames: u32,
}

impl CaptureFormat {
    /// Number of interleaved channels.
    pub const CHANNELS: u16 = 1;
    /// Sample rate in Hz.
    pub const SAMPLE_RATE: u32 = 16_000;
    /// Width of one sample in bits.
    pub const BITS_PER_SAMPLE: u16 = 16;
    /// Default buffer quantum in frames.
    pub const DEFAULT_BUFFER_FRAMES: u32 = 1024;

    /// Create a format with the given buffer quantum.
    pub fn new(buffer_frames: u32) -> Self {
        Self { buffer_frames }
    }

    /// Frames per delivered buffer.
    pub fn buffer_frames(&self) -> u32 {
        self.buffer_frames
    }

    /// Bytes occupied by one frame (all channels).
    pub fn bytes_per_frame(&self) -> u32 {
        u32::from(Self::CHANNELS) * u32::from(Self::BITS_PER_SAMPLE / 8)
    }

    /// Wall-clock duration of one buffer quantum.
    pub fn buffer_duration(&self) -> Duration {
        self.duration_of_frames(u64::from(self.buffer_frames))
    }

    /// Wall-clock duration of `frames` frames at the fixed sample rate.
    pub fn duration_of_frames(&self, frames: u64) -> Duration {
        const NANOS_PER_SEC: u64 = 1_000_000_000;
        Duration::from_nanos(frames.saturating_mul(NANOS_PER_SEC) / u64::from(Self::SAMPLE_RATE))
    }

    /// WAV header parameters for this format.
    pub fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: Self::CHANNELS,
            sample_rate: Self::SAMPLE_RATE,
            bits_per_sample: Self::BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// CPAL stream configuration requesting a fixed buffer size.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            channels: Self::CHANNELS,
            sample_rate: Self::SAMPLE_RATE,
            buffer_size: BufferSize::Fixed(self.buffer_frames),
        }
    }
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_FRAMES)
    }
}
