//! Rubato-based converter implementation.
//!
//! This module provides sample rate conversion using the rubato library, a
//! pure Rust implementation without any FFI dependencies.
//!
//! Rubato's fixed-input resamplers consume exact block sizes. Input is
//! accumulated until a full block exists; a trailing partial block stays
//! pending until [`Converter::drain`] pushes it through `process_partial`.
//!
//! The engine's leading delay is cut from the output and its delay line is
//! flushed on drain, so `n` input frames always come out as
//! `n * dest_rate / source_rate` frames once the stream is drained.

use async_trait::async_trait;
use rubato::{
    FastFixedIn, FftFixedIn, PolynomialDegree, Resampler as RubatoResampler, SincFixedIn,
    SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::converter::{Converter, ConverterSpec, Quality};
use super::error::ConvertError;

/// Relative ratio headroom. The ratio never changes after creation.
const MAX_RATIO_RELATIVE: f64 = 1.1;

/// FFT sub-chunks for [`Quality::VeryHigh`].
const FFT_SUB_CHUNKS: usize = 2;

impl Quality {
    fn sinc_params(self) -> SincInterpolationParameters {
        match self {
            Quality::Medium => SincInterpolationParameters {
                sinc_len: 64,
                f_cutoff: 0.91,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 128,
                window: WindowFunction::Blackman2,
            },
            _ => SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            },
        }
    }
}

/// Rubato's trait is not object-safe, so the concrete resamplers are
/// wrapped in an enum.
enum Engine {
    Poly(FastFixedIn<f32>),
    Sinc(SincFixedIn<f32>),
    Fft(FftFixedIn<f32>),
}

impl Engine {
    fn new(spec: &ConverterSpec) -> Result<Self, ConvertError> {
        let chunk_size = spec.chunk_frames.max(1);
        let ratio = spec.ratio();
        let engine = match spec.quality {
            Quality::Quick => Engine::Poly(FastFixedIn::new(
                ratio,
                MAX_RATIO_RELATIVE,
                PolynomialDegree::Linear,
                chunk_size,
                1,
            )?),
            Quality::Low => Engine::Poly(FastFixedIn::new(
                ratio,
                MAX_RATIO_RELATIVE,
                PolynomialDegree::Cubic,
                chunk_size,
                1,
            )?),
            Quality::Medium | Quality::High => Engine::Sinc(SincFixedIn::new(
                ratio,
                MAX_RATIO_RELATIVE,
                spec.quality.sinc_params(),
                chunk_size,
                1,
            )?),
            Quality::VeryHigh => Engine::Fft(FftFixedIn::new(
                spec.source_rate as usize,
                spec.dest_rate as usize,
                chunk_size,
                FFT_SUB_CHUNKS,
                1,
            )?),
        };
        Ok(engine)
    }

    fn input_frames_next(&self) -> usize {
        match self {
            Engine::Poly(r) => r.input_frames_next(),
            Engine::Sinc(r) => r.input_frames_next(),
            Engine::Fft(r) => r.input_frames_next(),
        }
    }

    fn process(&mut self, block: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ConvertError> {
        let out = match self {
            Engine::Poly(r) => r.process(block, None)?,
            Engine::Sinc(r) => r.process(block, None)?,
            Engine::Fft(r) => r.process(block, None)?,
        };
        Ok(out)
    }

    /// Runs a zero-padded partial block, or pure zeros when `block` is None.
    fn process_partial(
        &mut self,
        block: Option<&[Vec<f32>]>,
    ) -> Result<Vec<Vec<f32>>, ConvertError> {
        let out = match self {
            Engine::Poly(r) => r.process_partial(block, None)?,
            Engine::Sinc(r) => r.process_partial(block, None)?,
            Engine::Fft(r) => r.process_partial(block, None)?,
        };
        Ok(out)
    }

    fn output_delay(&self) -> usize {
        match self {
            Engine::Poly(r) => r.output_delay(),
            Engine::Sinc(r) => r.output_delay(),
            Engine::Fft(r) => r.output_delay(),
        }
    }

    fn reset(&mut self) {
        match self {
            Engine::Poly(r) => r.reset(),
            Engine::Sinc(r) => r.reset(),
            Engine::Fft(r) => r.reset(),
        }
    }
}

/// Converter backed by a rubato fixed-input resampler.
pub struct RubatoConverter {
    spec: ConverterSpec,
    engine: Engine,
    /// Input not yet forming a full rubato block.
    pending: Vec<f32>,
    /// Leading delay frames still to be cut from the output.
    skip: usize,
    /// Input frames accepted since the last reset.
    consumed: u64,
    /// Output frames returned since the last reset.
    emitted: u64,
}

impl RubatoConverter {
    /// Creates a converter for a mono spec.
    pub fn new(spec: ConverterSpec) -> Result<Self, ConvertError> {
        if spec.channels != 1 {
            return Err(ConvertError::UnsupportedChannels(spec.channels));
        }
        if spec.source_rate == 0 || spec.dest_rate == 0 {
            return Err(ConvertError::Construction(format!(
                "invalid rates {} -> {}",
                spec.source_rate, spec.dest_rate
            )));
        }
        let engine = Engine::new(&spec)?;
        Ok(Self {
            skip: engine.output_delay(),
            engine,
            spec,
            pending: Vec::new(),
            consumed: 0,
            emitted: 0,
        })
    }

    /// Returns the number of input samples held for the next block.
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Output frames the input accepted so far is worth.
    fn expected_frames(&self) -> u64 {
        self.consumed * self.spec.dest_rate as u64 / self.spec.source_rate as u64
    }

    /// Appends channel 0 of `out` to `output`, minus any leading delay.
    fn emit(&mut self, out: Vec<Vec<f32>>, output: &mut Vec<f32>) {
        let Some(channel) = out.into_iter().next() else {
            return;
        };
        let cut = self.skip.min(channel.len());
        self.skip -= cut;
        self.emitted += (channel.len() - cut) as u64;
        output.extend_from_slice(&channel[cut..]);
    }
}

#[async_trait]
impl Converter for RubatoConverter {
    fn spec(&self) -> &ConverterSpec {
        &self.spec
    }

    async fn process(&mut self, input: &[f32]) -> Result<Vec<f32>, ConvertError> {
        self.pending.extend_from_slice(input);
        self.consumed += input.len() as u64;

        let mut output = Vec::new();
        loop {
            let frames_needed = self.engine.input_frames_next();
            if self.pending.len() < frames_needed {
                break;
            }
            let rest = self.pending.split_off(frames_needed);
            let block = [std::mem::replace(&mut self.pending, rest)];
            match self.engine.process(&block) {
                Ok(out) => self.emit(out, &mut output),
                Err(e) => {
                    // Put the block back so the caller may retry.
                    let [mut block] = block;
                    block.extend_from_slice(&self.pending);
                    self.pending = block;
                    return Err(e);
                }
            }
        }
        Ok(output)
    }

    async fn drain(&mut self) -> Result<Vec<f32>, ConvertError> {
        let mut output = Vec::new();
        if !self.pending.is_empty() {
            let block = [std::mem::take(&mut self.pending)];
            let out = self.engine.process_partial(Some(&block[..]))?;
            self.emit(out, &mut output);
        }

        // Push silence through until the delay line has given up its tail.
        let target = self.expected_frames();
        while self.emitted < target {
            let out = self.engine.process_partial(None)?;
            if out.first().is_none_or(|c| c.is_empty()) {
                break;
            }
            self.emit(out, &mut output);
        }

        if self.emitted > target {
            let extra = ((self.emitted - target) as usize).min(output.len());
            output.truncate(output.len() - extra);
            self.emitted -= extra as u64;
        }
        Ok(output)
    }

    fn reset(&mut self) {
        self.engine.reset();
        self.pending.clear();
        self.skip = self.engine.output_delay();
        self.consumed = 0;
        self.emitted = 0;
    }
}
