//! Client -> provider conversion command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use telebridge_audio::resampler::StreamResampler;
use tracing::info;

use super::{check_chunk_bytes, output_result, resolve_config};
use crate::Cli;

/// Convert raw 8kHz client PCM to the provider rate.
#[derive(Args)]
pub struct UpsampleCommand {
    /// Input file (raw s16le mono at 8kHz)
    input: PathBuf,

    /// Output file (raw s16le mono at the provider rate)
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Bytes per feed call (default: 20ms at 8kHz)
    #[arg(long)]
    chunk_bytes: Option<usize>,
}

impl UpsampleCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = resolve_config(cli)?;
        let chunk_bytes =
            check_chunk_bytes(self.chunk_bytes.unwrap_or(config.client_chunk_bytes()))?;

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
            "upsample: start"
        );

        let mut resampler = StreamResampler::new(config)?;
        let mut output = Vec::new();
        for piece in input.chunks(chunk_bytes) {
            output.extend(resampler.process_upsample(piece).await?);
        }
        output.extend(resampler.flush_upsample().await?);
        resampler.destroy();

        tokio::fs::write(&self.output, &output)
            .await
            .with_context(|| format!("writing {}", self.output.display()))?;

        let result = serde_json::json!({
            "input_bytes": input.len(),
            "output_bytes": output.len(),
            "provider_rate": config.provider_rate,
            "output_file": self.output.display().to_string(),
        });
        output_result(&result, cli.json)
    }
}
