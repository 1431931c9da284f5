//! Streaming PCM resampling between a provider rate and the 8kHz client rate.
//!
//! The conversion itself sits behind the [`Converter`] trait. The default
//! [`RubatoFactory`] builds rubato-backed converters; tests and embedders
//! can inject their own through [`StreamResampler::with_factory`].
//!
//! # Example
//!
//! ```ignore
//! use telebridge_audio::resampler::{StreamConfig, StreamResampler};
//!
//! let mut rs = StreamResampler::new(StreamConfig::with_provider_rate(48000))?;
//!
//! // 10ms of 48kHz audio is buffered until a full pass window exists.
//! assert!(rs.process_downsample(&[0u8; 960]).await?.is_empty());
//! let chunks = rs.process_downsample(&[0u8; 960]).await?;
//! assert!(chunks.iter().all(|c| c.len() == 320));
//! ```

pub mod codec;
mod config;
mod converter;
mod error;
pub mod format;
mod rubato_impl;
mod stream;

pub use config::*;
pub use converter::*;
pub use error::*;
pub use format::*;
pub use rubato_impl::RubatoConverter;
pub use stream::*;
