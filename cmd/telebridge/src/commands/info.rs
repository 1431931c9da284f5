//! Configuration inspection command.

use clap::Args;
use telebridge_audio::resampler::CLIENT_SAMPLE_RATE;

use super::{output_result, resolve_config};
use crate::Cli;

/// Show the effective configuration and the chunk sizes it implies.
#[derive(Args)]
pub struct InfoCommand {}

impl InfoCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = resolve_config(cli)?;
        let result = serde_json::json!({
            "provider_rate": config.provider_rate,
            "client_rate": CLIENT_SAMPLE_RATE,
            "quality": config.quality,
            "batch_factor": config.batch_factor,
            "provider_chunk_bytes": config.provider_chunk_bytes(),
            "client_chunk_bytes": config.client_chunk_bytes(),
            "downsample_threshold_bytes": config.downsample_threshold_bytes(),
        });
        output_result(&result, cli.json)
    }
}
