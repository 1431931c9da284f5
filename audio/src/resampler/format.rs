//! Audio format for resampling.

use std::time::Duration;

/// Bytes per 16-bit mono sample.
pub const SAMPLE_BYTES: usize = 2;

/// Describes a 16-bit signed little-endian mono PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Format {
    /// Sample rate in Hz (e.g., 8000, 48000).
    pub sample_rate: u32,
}

impl Format {
    /// Creates a new mono format with the given sample rate.
    pub const fn mono(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Returns the number of channels. Always 1.
    pub fn channels(&self) -> u32 {
        1
    }

    /// Returns the number of bytes per sample frame.
    pub fn sample_bytes(&self) -> usize {
        SAMPLE_BYTES
    }

    /// Returns the byte rate of the stream.
    pub fn bytes_rate(&self) -> u64 {
        self.sample_rate as u64 * SAMPLE_BYTES as u64
    }

    /// Returns the number of whole samples that fit in `duration`.
    ///
    /// Partial samples are dropped, so 10ms at 22050 Hz is 220 samples.
    pub fn samples_in_duration(&self, duration: Duration) -> usize {
        (self.sample_rate as u128 * duration.as_millis() / 1000) as usize
    }

    /// Returns the number of bytes that hold `duration` of audio.
    /// The result is always a multiple of [`SAMPLE_BYTES`].
    pub fn bytes_in_duration(&self, duration: Duration) -> usize {
        self.samples_in_duration(duration) * SAMPLE_BYTES
    }

    /// Returns the number of samples held in `bytes` bytes.
    pub fn samples(&self, bytes: usize) -> usize {
        bytes / SAMPLE_BYTES
    }

    /// Returns the playback duration of `bytes` bytes.
    pub fn duration(&self, bytes: usize) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let samples = self.samples(bytes) as u64;
        Duration::from_nanos(samples * 1_000_000_000 / self.sample_rate as u64)
    }
}

// Common format presets
impl Format {
    /// 8kHz mono, the fixed client rate.
    pub const CLIENT: Format = Format::mono(8000);
    /// 16kHz mono
    pub const MONO_16K: Format = Format::mono(16000);
    /// 24kHz mono
    pub const MONO_24K: Format = Format::mono(24000);
    /// 48kHz mono
    pub const MONO_48K: Format = Format::mono(48000);
}
