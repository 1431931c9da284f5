use thiserror::Error;

/// Errors returned by a conversion primitive.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("converter: construction failed: {0}")]
    Construction(String),

    #[error("converter: process failed: {0}")]
    Process(String),

    #[error("converter: unsupported channel count {0}")]
    UnsupportedChannels(u16),
}

impl From<rubato::ResamplerConstructionError> for ConvertError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        ConvertError::Construction(e.to_string())
    }
}

impl From<rubato::ResampleError> for ConvertError {
    fn from(e: rubato::ResampleError) -> Self {
        ConvertError::Process(e.to_string())
    }
}

/// Errors returned by [`StreamResampler`](super::StreamResampler) operations.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("resampler: invalid input: {0}")]
    InvalidInput(String),

    #[error("resampler: conversion failed: {0}")]
    ConversionFailure(#[from] ConvertError),

    #[error("resampler: {0}")]
    Lifecycle(&'static str),

    #[error("resampler: invalid config: {0}")]
    InvalidConfig(String),
}

impl ResampleError {
    pub(crate) fn odd_length(len: usize) -> Self {
        ResampleError::InvalidInput(format!(
            "buffer length {len} is not a multiple of 2 bytes"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResampleError::odd_length(3);
        assert!(err.to_string().contains("length 3"));

        let err = ResampleError::Lifecycle("destroyed");
        assert_eq!(err.to_string(), "resampler: destroyed");

        let err = ResampleError::InvalidConfig("provider_rate".to_string());
        assert!(err.to_string().contains("provider_rate"));
    }

    #[test]
    fn test_conversion_failure_keeps_source() {
        use std::error::Error as _;

        let err: ResampleError = ConvertError::Process("out of memory".to_string()).into();
        assert!(matches!(err, ResampleError::ConversionFailure(ConvertError::Process(_))));
        assert!(err.to_string().contains("out of memory"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_convert_error_display() {
        assert!(ConvertError::UnsupportedChannels(2).to_string().contains("2"));
        assert!(ConvertError::Construction("bad ratio".into()).to_string().contains("bad ratio"));
    }
}
