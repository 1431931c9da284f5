//! Audio processing utilities.
//!
//! This crate bridges PCM audio between a provider endpoint (e.g. a 24kHz or
//! 48kHz media stream) and an 8kHz client endpoint:
//!
//! - `resampler`: chunked, stateful stream resampling in both directions
//!
//! # Example
//!
//! ```rust
//! use telebridge_audio::Format;
//! use telebridge_audio::resampler::StreamConfig;
//! use std::time::Duration;
//!
//! let config = StreamConfig::with_provider_rate(48000);
//! assert_eq!(config.provider_chunk_bytes(), 960);
//! assert_eq!(config.client_chunk_bytes(), 320);
//!
//! // Bytes in 20ms of 8kHz audio
//! assert_eq!(Format::CLIENT.bytes_in_duration(Duration::from_millis(20)), 320);
//! ```

pub mod resampler;

pub use resampler::Format;
