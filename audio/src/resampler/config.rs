//! Stream resampler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::converter::Quality;
use super::error::ResampleError;
use super::format::Format;

/// Fixed client endpoint rate in Hz.
pub const CLIENT_SAMPLE_RATE: u32 = 8000;

/// Provider rate used when none is configured.
pub const DEFAULT_PROVIDER_RATE: u32 = 24000;

/// Provider chunks batched into one downsample pass.
pub const DEFAULT_BATCH_FACTOR: usize = 2;

/// Lowest provider rate that still yields a non-empty 10ms chunk.
pub const MIN_PROVIDER_RATE: u32 = 100;

/// Largest batch factor, one second of provider audio per pass.
pub const MAX_BATCH_FACTOR: usize = 100;

const PROVIDER_CHUNK: Duration = Duration::from_millis(10);
const CLIENT_CHUNK: Duration = Duration::from_millis(20);

/// Configuration for a [`StreamResampler`](super::StreamResampler).
///
/// Every field has a default, so a partial YAML/JSON document is accepted:
///
/// ```yaml
/// provider_rate: 48000
/// quality: medium
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Provider-side sample rate in Hz.
    pub provider_rate: u32,
    /// Provider chunks consumed per downsample pass. Larger values trade
    /// latency for fewer converter calls.
    pub batch_factor: usize,
    /// Quality recipe for both converters.
    pub quality: Quality,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            provider_rate: DEFAULT_PROVIDER_RATE,
            batch_factor: DEFAULT_BATCH_FACTOR,
            quality: Quality::default(),
        }
    }
}

impl StreamConfig {
    /// Creates a config for the given provider rate with default tuning.
    pub fn with_provider_rate(provider_rate: u32) -> Self {
        Self {
            provider_rate,
            ..Self::default()
        }
    }

    /// Checks the config for values that would produce empty chunks.
    pub fn validate(&self) -> Result<(), ResampleError> {
        if self.provider_rate < MIN_PROVIDER_RATE {
            return Err(ResampleError::InvalidConfig(format!(
                "provider_rate {} is below {MIN_PROVIDER_RATE} Hz",
                self.provider_rate
            )));
        }
        if self.batch_factor == 0 || self.batch_factor > MAX_BATCH_FACTOR {
            return Err(ResampleError::InvalidConfig(format!(
                "batch_factor {} is outside 1..={MAX_BATCH_FACTOR}",
                self.batch_factor
            )));
        }
        if self.provider_chunk_bytes().checked_mul(self.batch_factor).is_none() {
            return Err(ResampleError::InvalidConfig(format!(
                "batch_factor {} overflows the pass window",
                self.batch_factor
            )));
        }
        Ok(())
    }

    pub fn provider_format(&self) -> Format {
        Format::mono(self.provider_rate)
    }

    pub fn client_format(&self) -> Format {
        Format::CLIENT
    }

    /// Bytes in 10ms of provider audio.
    pub fn provider_chunk_bytes(&self) -> usize {
        self.provider_format().bytes_in_duration(PROVIDER_CHUNK)
    }

    /// Bytes in 20ms of client audio. Always 320.
    pub fn client_chunk_bytes(&self) -> usize {
        self.client_format().bytes_in_duration(CLIENT_CHUNK)
    }

    /// Provider bytes consumed by one downsample pass.
    ///
    /// Saturates for configs that [`validate`](Self::validate) rejects.
    pub fn downsample_threshold_bytes(&self) -> usize {
        self.provider_chunk_bytes().saturating_mul(self.batch_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.provider_rate, 24000);
        assert_eq!(cfg.batch_factor, 2);
        assert_eq!(cfg.quality, Quality::High);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_chunk_sizes_48k() {
        let cfg = StreamConfig::with_provider_rate(48000);
        assert_eq!(cfg.provider_chunk_bytes(), 960);
        assert_eq!(cfg.client_chunk_bytes(), 320);
        assert_eq!(cfg.downsample_threshold_bytes(), 1920);
    }

    #[test]
    fn test_chunk_sizes_24k() {
        let cfg = StreamConfig::default();
        assert_eq!(cfg.provider_chunk_bytes(), 480);
        assert_eq!(cfg.downsample_threshold_bytes(), 960);
    }

    #[test]
    fn test_chunk_sizes_are_even_and_positive() {
        for rate in (100..=96000).step_by(50) {
            let cfg = StreamConfig::with_provider_rate(rate);
            let p = cfg.provider_chunk_bytes();
            assert!(p > 0 && p % 2 == 0, "rate {rate}: {p}");
            assert_eq!(p, (rate as usize / 100) * 2);
        }
    }

    #[test]
    fn test_batch_factor_scales_threshold() {
        let cfg = StreamConfig {
            provider_rate: 16000,
            batch_factor: 5,
            ..StreamConfig::default()
        };
        assert_eq!(cfg.downsample_threshold_bytes(), 320 * 5);
    }

    #[test]
    fn test_validate_rejects() {
        let cfg = StreamConfig::with_provider_rate(99);
        assert!(matches!(cfg.validate(), Err(ResampleError::InvalidConfig(_))));

        let cfg = StreamConfig {
            batch_factor: 0,
            ..StreamConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ResampleError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_huge_batch_factor() {
        let cfg = StreamConfig {
            provider_rate: 48000,
            batch_factor: usize::MAX / 2,
            ..StreamConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ResampleError::InvalidConfig(_))));
        assert_eq!(cfg.downsample_threshold_bytes(), usize::MAX);

        let cfg = StreamConfig {
            batch_factor: MAX_BATCH_FACTOR + 1,
            ..StreamConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = StreamConfig {
            provider_rate: 48000,
            batch_factor: MAX_BATCH_FACTOR,
            ..StreamConfig::default()
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.downsample_threshold_bytes(), 96000);
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let yaml = "provider_rate: 48000\nquality: medium\n";
        let cfg: StreamConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.provider_rate, 48000);
        assert_eq!(cfg.batch_factor, 2);
        assert_eq!(cfg.quality, Quality::Medium);
    }

    #[test]
    fn test_deserialize_json() {
        let cfg: StreamConfig = serde_json::from_str(r#"{"batch_factor": 4}"#).unwrap();
        assert_eq!(cfg.provider_rate, 24000);
        assert_eq!(cfg.batch_factor, 4);
    }
}
