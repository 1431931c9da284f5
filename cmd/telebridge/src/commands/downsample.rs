//! Provider -> client conversion command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use telebridge_audio::resampler::StreamResampler;
use tracing::{debug, info};

use super::{check_chunk_bytes, output_result, resolve_config};
use crate::Cli;

/// Convert raw provider-rate PCM into 8kHz client chunks.
///
/// The input is fed in pieces of `--chunk-bytes` (default: 10ms at the
/// provider rate). The stream is flushed at the end, so the output length
/// is always a whole number of 20ms chunks.
#[derive(Args)]
pub struct DownsampleCommand {
    /// Input file (raw s16le mono at the provider rate)
    input: PathBuf,

    /// Output file (raw s16le mono at 8kHz)
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Bytes per feed call
    #[arg(long)]
    chunk_bytes: Option<usize>,
}

impl DownsampleCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = resolve_config(cli)?;
        let chunk_bytes =
            check_chunk_bytes(self.chunk_bytes.unwrap_or(config.provider_chunk_bytes()))?;

        let input = tokio::fs::read(&self.input)
            .await
            .with_context(|| format!("reading {}", self.input.display()))?;
        anyhow::ensure!(
            input.len() % 2 == 0,
            "{} has an odd length ({} bytes)",
            self.input.display(),
            input.len()
        );

        info!(
            input = %self.input.display(),
            bytes = input.len(),
            provider_rate = config.provider_rate,
            chunk_bytes,
            "downsample: start"
        );

        let mut resampler = StreamResampler::new(config)?;
        let mut output = Vec::new();
        let mut emitted = 0;
        for piece in input.chunks(chunk_bytes) {
            for chunk in resampler.process_downsample(piece).await? {
                output.extend_from_slice(&chunk);
                emitted += 1;
            }
        }
        let flushed = resampler.flush().await?;
        debug!(chunks = flushed.len(), "downsample: flushed");
        for chunk in flushed {
            output.extend_from_slice(&chunk);
            emitted += 1;
        }
        resampler.destroy();

        tokio::fs::write(&self.output, &output)
            .await
            .with_context(|| format!("writing {}", self.output.display()))?;

        let result = serde_json::json!({
            "input_bytes": input.len(),
            "output_bytes": output.len(),
            "chunks": emitted,
            "chunk_bytes": config.client_chunk_bytes(),
            "output_file": self.output.display().to_string(),
        });
        output_result(&result, cli.json)
    }
}
