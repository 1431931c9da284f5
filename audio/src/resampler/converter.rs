//! Sample-rate conversion primitive interface.
//!
//! A [`Converter`] maps normalized mono f32 samples at one rate to samples at
//! another rate. It is stateful: filter history and any input that does not
//! yet fill an internal block stay inside the converter between calls, and
//! [`Converter::drain`] pushes the held input out at stream end.
//!
//! Converters are created through a [`ConverterFactory`] so the stream
//! resampler can own them without knowing the algorithm behind them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ConvertError;
use super::rubato_impl::RubatoConverter;

/// Quality recipe, from cheapest to most accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Linear interpolation.
    Quick,
    /// Cubic interpolation.
    Low,
    /// Short windowed sinc.
    Medium,
    /// Long windowed sinc.
    #[default]
    High,
    /// FFT-based synchronous resampling.
    VeryHigh,
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" | "qq" => Ok(Quality::Quick),
            "low" | "lq" => Ok(Quality::Low),
            "medium" | "mq" => Ok(Quality::Medium),
            "high" | "hq" => Ok(Quality::High),
            "very_high" | "very-high" | "vhq" => Ok(Quality::VeryHigh),
            other => Err(format!("unknown quality {other:?}")),
        }
    }
}

/// Parameters a converter is bound to for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterSpec {
    /// Channel count. Only mono (1) is supported.
    pub channels: u16,
    /// Input sample rate in Hz.
    pub source_rate: u32,
    /// Output sample rate in Hz.
    pub dest_rate: u32,
    pub quality: Quality,
    /// Typical number of input frames per call, used to size internal blocks.
    pub chunk_frames: usize,
}

impl ConverterSpec {
    /// Creates a mono spec.
    pub fn mono(source_rate: u32, dest_rate: u32, quality: Quality, chunk_frames: usize) -> Self {
        Self {
            channels: 1,
            source_rate,
            dest_rate,
            quality,
            chunk_frames,
        }
    }

    /// Returns dest_rate / source_rate.
    pub fn ratio(&self) -> f64 {
        self.dest_rate as f64 / self.source_rate as f64
    }

    /// Returns true when no rate conversion is needed.
    pub fn is_passthrough(&self) -> bool {
        self.source_rate == self.dest_rate
    }
}

/// A stateful single-channel sample-rate converter.
///
/// Calls on one converter never overlap; the owner holds it by `&mut`.
#[async_trait]
pub trait Converter: Send {
    /// Returns the parameters this converter was created with.
    fn spec(&self) -> &ConverterSpec;

    /// Converts the next stretch of input, returning whatever output is ready.
    async fn process(&mut self, input: &[f32]) -> Result<Vec<f32>, ConvertError>;

    /// Converts any input still held internally. Used at stream end.
    async fn drain(&mut self) -> Result<Vec<f32>, ConvertError> {
        Ok(Vec::new())
    }

    /// Forgets all internal state so the next call starts a fresh stream.
    fn reset(&mut self) {}
}

/// Creates converters for a [`ConverterSpec`].
pub trait ConverterFactory: Send + Sync {
    fn create(&self, spec: &ConverterSpec) -> Result<Box<dyn Converter>, ConvertError>;
}

/// Converter for equal rates. Output is a copy of the input.
#[derive(Debug)]
pub struct Passthrough {
    spec: ConverterSpec,
}

impl Passthrough {
    pub fn new(spec: ConverterSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl Converter for Passthrough {
    fn spec(&self) -> &ConverterSpec {
        &self.spec
    }

    async fn process(&mut self, input: &[f32]) -> Result<Vec<f32>, ConvertError> {
        Ok(input.to_vec())
    }
}

/// Default factory backed by rubato.
///
/// Equal rates get a [`Passthrough`]; everything else a [`RubatoConverter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RubatoFactory;

impl ConverterFactory for RubatoFactory {
    fn create(&self, spec: &ConverterSpec) -> Result<Box<dyn Converter>, ConvertError> {
        if spec.channels != 1 {
            return Err(ConvertError::UnsupportedChannels(spec.channels));
        }
        if spec.is_passthrough() {
            return Ok(Box::new(Passthrough::new(*spec)));
        }
        Ok(Box::new(RubatoConverter::new(*spec)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_str() {
        assert_eq!("quick".parse::<Quality>().unwrap(), Quality::Quick);
        assert_eq!("HQ".parse::<Quality>().unwrap(), Quality::High);
        assert_eq!("very-high".parse::<Quality>().unwrap(), Quality::VeryHigh);
        assert!("best".parse::<Quality>().is_err());
    }

    #[test]
    fn test_quality_serde_names() {
        let q: Quality = serde_json::from_str("\"very_high\"").unwrap();
        assert_eq!(q, Quality::VeryHigh);
        assert_eq!(serde_json::to_string(&Quality::Medium).unwrap(), "\"medium\"");
        assert_eq!(Quality::default(), Quality::High);
    }

    #[test]
    fn test_spec_ratio() {
        let spec = ConverterSpec::mono(48000, 8000, Quality::High, 960);
        assert_eq!(spec.channels, 1);
        assert!((spec.ratio() - 1.0 / 6.0).abs() < 1e-12);
        assert!(!spec.is_passthrough());
        assert!(ConverterSpec::mono(8000, 8000, Quality::High, 160).is_passthrough());
    }

    #[tokio::test]
    async fn test_passthrough_copies() {
        let spec = ConverterSpec::mono(8000, 8000, Quality::High, 160);
        let mut conv = RubatoFactory.create(&spec).unwrap();
        let out = conv.process(&[0.25, -0.5, 0.0]).await.unwrap();
        assert_eq!(out, vec![0.25, -0.5, 0.0]);
        assert!(conv.drain().await.unwrap().is_empty());
        assert_eq!(conv.spec(), &spec);
    }

    #[test]
    fn test_factory_rejects_stereo() {
        let mut spec = ConverterSpec::mono(48000, 8000, Quality::High, 960);
        spec.channels = 2;
        let err = RubatoFactory.create(&spec).err().unwrap();
        assert!(matches!(err, ConvertError::UnsupportedChannels(2)));
    }

    #[test]
    fn test_factory_builds_rubato() {
        for quality in [
            Quality::Quick,
            Quality::Low,
            Quality::Medium,
            Quality::High,
            Quality::VeryHigh,
        ] {
            let spec = ConverterSpec::mono(48000, 8000, quality, 960);
            assert!(RubatoFactory.create(&spec).is_ok(), "{quality:?}");
        }
    }
}
