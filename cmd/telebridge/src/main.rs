//! Telebridge CLI - resample raw PCM files between a provider rate and 8kHz.

use clap::{Parser, Subcommand};
use telebridge_audio::resampler::Quality;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{DownsampleCommand, InfoCommand, UpsampleCommand};

/// Telebridge CLI - stream resampler for telephony audio.
///
/// Input and output files are raw 16-bit signed little-endian mono PCM.
/// The input is fed to the resampler in fixed-size pieces, the same way a
/// media stream would deliver it, so the output matches what a live bridge
/// would emit.
///
/// Settings come from an optional YAML or JSON config file; command-line
/// flags override individual fields.
#[derive(Parser)]
#[command(name = "telebridge")]
#[command(about = "Stream resampler CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (YAML or JSON)
    #[arg(short = 'f', long, global = true)]
    pub config: Option<String>,

    /// Provider sample rate in Hz
    #[arg(long, global = true)]
    pub provider_rate: Option<u32>,

    /// Provider chunks per downsample pass
    #[arg(long, global = true)]
    pub batch_factor: Option<usize>,

    /// Resampling quality (quick, low, medium, high, very_high)
    #[arg(long, global = true)]
    pub quality: Option<Quality>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert provider-rate audio to 8kHz client chunks
    Downsample(DownsampleCommand),
    /// Convert 8kHz client audio to the provider rate
    Upsample(UpsampleCommand),
    /// Show the effective configuration and chunk sizes
    Info(InfoCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match &cli.command {
        Commands::Downsample(cmd) => cmd.run(&cli).await,
        Commands::Upsample(cmd) => cmd.run(&cli).await,
        Commands::Info(cmd) => cmd.run(&cli).await,
    }
}
