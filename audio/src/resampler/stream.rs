//! Streaming resampler between a provider rate and the 8kHz client rate.
//!
//! Audio arrives in chunks of any even size. The downsample lane buffers
//! provider bytes until a full pass window exists, converts it, and cuts
//! the result into fixed 20ms client chunks, carrying leftovers forward.
//! The upsample lane converts each client buffer in one pass.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::codec::{self, ensure_aligned};
use super::config::{CLIENT_SAMPLE_RATE, StreamConfig};
use super::converter::{Converter, ConverterFactory, ConverterSpec, RubatoFactory};
use super::error::ResampleError;
use super::format::SAMPLE_BYTES;

/// Observable lifecycle of a [`StreamResampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Destroyed,
}

enum State {
    Uninitialized,
    Ready(Lanes),
    Destroyed,
}

struct Lanes {
    down: Downsampler,
    up: Upsampler,
}

impl Lanes {
    fn new(config: &StreamConfig, factory: &dyn ConverterFactory) -> Result<Self, ResampleError> {
        let down_spec = ConverterSpec::mono(
            config.provider_rate,
            CLIENT_SAMPLE_RATE,
            config.quality,
            config.downsample_threshold_bytes() / SAMPLE_BYTES,
        );
        let up_spec = ConverterSpec::mono(
            CLIENT_SAMPLE_RATE,
            config.provider_rate,
            config.quality,
            config.client_chunk_bytes() / SAMPLE_BYTES,
        );
        let down = factory.create(&down_spec)?;
        let up = factory.create(&up_spec)?;
        Ok(Self {
            down: Downsampler::new(
                down,
                config.downsample_threshold_bytes(),
                config.client_chunk_bytes(),
            ),
            up: Upsampler::new(up),
        })
    }
}

/// Bidirectional stream resampler.
///
/// Converters are created on [`initialize`](Self::initialize) or lazily by
/// the first processing call. After [`destroy`](Self::destroy) every call
/// fails with [`ResampleError::Lifecycle`].
///
/// # Example
///
/// ```rust,ignore
/// use telebridge_audio::resampler::{StreamConfig, StreamResampler};
///
/// let mut rs = StreamResampler::new(StreamConfig::with_provider_rate(48000))?;
/// for chunk in rs.process_downsample(&provider_bytes).await? {
///     send_to_client(chunk); // always 320 bytes
/// }
/// let reply = rs.process_upsample(&client_bytes).await?;
/// for chunk in rs.flush().await? {
///     send_to_client(chunk);
/// }
/// rs.destroy();
/// ```
pub struct StreamResampler {
    config: StreamConfig,
    factory: Arc<dyn ConverterFactory>,
    state: State,
}

impl fmt::Debug for StreamResampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResampler")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("pending", &self.pending_bytes())
            .finish()
    }
}

impl StreamResampler {
    /// Creates a resampler backed by rubato converters.
    pub fn new(config: StreamConfig) -> Result<Self, ResampleError> {
        Self::with_factory(config, Arc::new(RubatoFactory))
    }

    /// Creates a resampler whose converters come from `factory`.
    pub fn with_factory(
        config: StreamConfig,
        factory: Arc<dyn ConverterFactory>,
    ) -> Result<Self, ResampleError> {
        config.validate()?;
        Ok(Self {
            config,
            factory,
            state: State::Uninitialized,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        match self.state {
            State::Uninitialized => LifecycleState::Uninitialized,
            State::Ready(_) => LifecycleState::Initialized,
            State::Destroyed => LifecycleState::Destroyed,
        }
    }

    /// Returns the (pre-resample, post-resample) residual sizes in bytes of
    /// the downsample lane.
    pub fn pending_bytes(&self) -> (usize, usize) {
        match &self.state {
            State::Ready(lanes) => lanes.down.pending_bytes(),
            _ => (0, 0),
        }
    }

    /// Creates both converters. Does nothing if already initialized.
    pub fn initialize(&mut self) -> Result<(), ResampleError> {
        match self.state {
            State::Ready(_) => Ok(()),
            State::Destroyed => Err(ResampleError::Lifecycle("initialize after destroy")),
            State::Uninitialized => {
                let lanes = Lanes::new(&self.config, self.factory.as_ref())?;
                self.state = State::Ready(lanes);
                info!(
                    provider_rate = self.config.provider_rate,
                    client_rate = CLIENT_SAMPLE_RATE,
                    quality = ?self.config.quality,
                    threshold = self.config.downsample_threshold_bytes(),
                    "resampler: initialized"
                );
                Ok(())
            }
        }
    }

    fn lanes(&mut self) -> Result<&mut Lanes, ResampleError> {
        if let State::Uninitialized = self.state {
            self.initialize()?;
        }
        match &mut self.state {
            State::Ready(lanes) => Ok(lanes),
            State::Destroyed => {
                warn!("resampler: used after destroy");
                Err(ResampleError::Lifecycle("resampler used after destroy"))
            }
            State::Uninitialized => Err(ResampleError::Lifecycle("resampler not initialized")),
        }
    }

    /// Feeds provider-rate bytes and returns the client chunks now complete.
    pub async fn process_downsample(
        &mut self,
        audio: &[u8],
    ) -> Result<Vec<Vec<u8>>, ResampleError> {
        self.lanes()?.down.process(audio).await
    }

    /// Converts one client-rate buffer to the provider rate.
    pub async fn process_upsample(&mut self, audio: &[u8]) -> Result<Vec<u8>, ResampleError> {
        self.lanes()?.up.process(audio).await
    }

    /// Drains the downsample lane at stream end, zero-padding the last chunk.
    pub async fn flush(&mut self) -> Result<Vec<Vec<u8>>, ResampleError> {
        match &mut self.state {
            // Nothing was ever buffered.
            State::Uninitialized => Ok(Vec::new()),
            State::Destroyed => Err(ResampleError::Lifecycle("flush after destroy")),
            State::Ready(lanes) => {
                let chunks = lanes.down.flush().await?;
                info!(chunks = chunks.len(), "resampler: flushed");
                Ok(chunks)
            }
        }
    }

    /// Drains audio still held inside the upsample converter.
    pub async fn flush_upsample(&mut self) -> Result<Vec<u8>, ResampleError> {
        match &mut self.state {
            State::Uninitialized => Ok(Vec::new()),
            State::Destroyed => Err(ResampleError::Lifecycle("flush after destroy")),
            State::Ready(lanes) => lanes.up.flush().await,
        }
    }

    /// Borrows both lanes so the two directions can run concurrently.
    pub fn split(&mut self) -> Result<(&mut Downsampler, &mut Upsampler), ResampleError> {
        let lanes = self.lanes()?;
        Ok((&mut lanes.down, &mut lanes.up))
    }

    /// Releases both converters and all buffered audio.
    pub fn destroy(&mut self) {
        match std::mem::replace(&mut self.state, State::Destroyed) {
            State::Ready(lanes) => {
                let (pre, post) = lanes.down.pending_bytes();
                if pre + post > 0 {
                    warn!(pre, post, "resampler: destroyed with unflushed audio");
                }
                drop(lanes);
                info!("resampler: destroyed");
            }
            State::Uninitialized => info!("resampler: destroyed"),
            State::Destroyed => debug!("resampler: already destroyed"),
        }
    }
}

/// Provider -> client lane.
///
/// Keeps two residuals: provider bytes not yet converted and converted
/// bytes not yet forming a whole client chunk.
pub struct Downsampler {
    converter: Box<dyn Converter>,
    threshold: usize,
    chunk_bytes: usize,
    pending_input: Vec<u8>,
    pending_output: Vec<u8>,
}

impl Downsampler {
    fn new(converter: Box<dyn Converter>, threshold: usize, chunk_bytes: usize) -> Self {
        Self {
            converter,
            threshold,
            chunk_bytes,
            pending_input: Vec::new(),
            pending_output: Vec::new(),
        }
    }

    /// Returns the (pre-resample, post-resample) residual sizes in bytes.
    pub fn pending_bytes(&self) -> (usize, usize) {
        (self.pending_input.len(), self.pending_output.len())
    }

    /// Appends `audio` and runs as many conversion passes as it allows.
    ///
    /// On error both byte residuals are left as they were before the call.
    /// The converter is not rolled back: windows that passed through it
    /// before the failing one have already advanced its filter state.
    pub async fn process(&mut self, audio: &[u8]) -> Result<Vec<Vec<u8>>, ResampleError> {
        ensure_aligned(audio)?;

        let mut input = Vec::with_capacity(self.pending_input.len() + audio.len());
        input.extend_from_slice(&self.pending_input);
        input.extend_from_slice(audio);
        let mut output = self.pending_output.clone();

        let mut chunks = Vec::new();
        let mut consumed = 0;
        while input.len() - consumed >= self.threshold {
            let window = &input[consumed..consumed + self.threshold];
            let resampled = convert(self.converter.as_mut(), window).await?;
            consumed += self.threshold;
            output.extend_from_slice(&resampled);
            take_chunks(&mut output, self.chunk_bytes, &mut chunks);
            debug!(
                window = self.threshold,
                produced = resampled.len(),
                pending = output.len(),
                "resampler: downsample pass"
            );
        }

        input.drain(..consumed);
        self.pending_input = input;
        self.pending_output = output;
        Ok(chunks)
    }

    /// Converts what is left, including audio still inside the converter,
    /// and emits it as whole client chunks, the last one padded with
    /// silence. Both residuals are empty afterwards.
    pub async fn flush(&mut self) -> Result<Vec<Vec<u8>>, ResampleError> {
        let mut output = self.pending_output.clone();
        if !self.pending_input.is_empty() {
            let resampled = convert(self.converter.as_mut(), &self.pending_input).await?;
            output.extend_from_slice(&resampled);
        }
        let tail = self.converter.drain().await.inspect_err(|e| {
            warn!(error = %e, "resampler: converter drain failed");
        })?;
        output.extend_from_slice(&codec::encode(&tail));

        let mut chunks = Vec::new();
        take_chunks(&mut output, self.chunk_bytes, &mut chunks);
        if !output.is_empty() {
            debug!(partial = output.len(), "resampler: padding final chunk");
            output.resize(self.chunk_bytes, 0);
            chunks.push(output);
        }

        self.pending_input.clear();
        self.pending_output.clear();
        self.converter.reset();
        Ok(chunks)
    }
}

/// Client -> provider lane. No buffering on this side.
pub struct Upsampler {
    converter: Box<dyn Converter>,
}

impl Upsampler {
    fn new(converter: Box<dyn Converter>) -> Self {
        Self { converter }
    }

    /// Converts `audio` in one pass. The output length is whatever the
    /// converter produced and is always even.
    pub async fn process(&mut self, audio: &[u8]) -> Result<Vec<u8>, ResampleError> {
        convert(self.converter.as_mut(), audio).await
    }

    /// Returns audio still held by the converter and resets it.
    pub async fn flush(&mut self) -> Result<Vec<u8>, ResampleError> {
        let tail = self.converter.drain().await?;
        self.converter.reset();
        Ok(codec::encode(&tail))
    }
}

async fn convert(converter: &mut dyn Converter, audio: &[u8]) -> Result<Vec<u8>, ResampleError> {
    let samples = codec::decode(audio)?;
    let resampled = converter.process(&samples).await.inspect_err(|e| {
        let spec = converter.spec();
        warn!(
            error = %e,
            source_rate = spec.source_rate,
            dest_rate = spec.dest_rate,
            "resampler: conversion failed"
        );
    })?;
    Ok(codec::encode(&resampled))
}

/// Moves every whole `size`-byte chunk from the front of `buf` into `chunks`.
fn take_chunks(buf: &mut Vec<u8>, size: usize, chunks: &mut Vec<Vec<u8>>) {
    let whole = buf.len() / size * size;
    if whole == 0 {
        return;
    }
    chunks.extend(buf[..whole].chunks_exact(size).map(<[u8]>::to_vec));
    buf.drain(..whole);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_chunks() {
        let mut buf: Vec<u8> = (0..10).collect();
        let mut chunks = Vec::new();
        take_chunks(&mut buf, 4, &mut chunks);
        assert_eq!(chunks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
        assert_eq!(buf, vec![8, 9]);

        take_chunks(&mut buf, 4, &mut chunks);
        assert_eq!(chunks.len(), 2);
        assert_eq!(buf, vec![8, 9]);
    }

    #[test]
    fn test_new_validates_config() {
        let err = StreamResampler::new(StreamConfig::with_provider_rate(50)).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidConfig(_)));
    }

    #[test]
    fn test_new_rejects_overflowing_batch_factor() {
        let config = StreamConfig {
            provider_rate: 48000,
            batch_factor: usize::MAX / 2,
            ..StreamConfig::default()
        };
        let err = StreamResampler::new(config).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidConfig(_)));
    }

    #[test]
    fn test_debug_output() {
        let rs = StreamResampler::new(StreamConfig::default()).unwrap();
        let s = format!("{rs:?}");
        assert!(s.contains("StreamResampler"));
        assert!(s.contains("Uninitialized"));
    }
}
