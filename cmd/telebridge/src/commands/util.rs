//! Shared helpers for CLI commands.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use telebridge_audio::resampler::StreamConfig;
use thiserror::Error;

use crate::Cli;

/// Error type for config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file: {0}")]
    ReadFile(#[from] io::Error),
    #[error("failed to parse YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("failed to parse file (tried YAML and JSON)")]
    ParseFailed,
}

/// Loads a YAML or JSON document into the provided type.
pub fn load_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let data = fs::read(path.as_ref())?;
    parse_file(&data, path.as_ref())
}

/// Parses data based on file extension, falling back to YAML then JSON.
pub fn parse_file<T: DeserializeOwned>(
    data: &[u8],
    path: impl AsRef<Path>,
) -> Result<T, ConfigError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => {
            if let Ok(v) = serde_yaml::from_slice(data) {
                return Ok(v);
            }
            if let Ok(v) = serde_json::from_slice(data) {
                return Ok(v);
            }
            Err(ConfigError::ParseFailed)
        }
    }
}

/// Builds the effective stream config: file first, then flag overrides.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<StreamConfig> {
    let mut config = match &cli.config {
        Some(path) => load_file::<StreamConfig>(path)
            .with_context(|| format!("loading config {path}"))?,
        None => StreamConfig::default(),
    };
    if let Some(rate) = cli.provider_rate {
        config.provider_rate = rate;
    }
    if let Some(factor) = cli.batch_factor {
        config.batch_factor = factor;
    }
    if let Some(quality) = cli.quality {
        config.quality = quality;
    }
    config.validate()?;
    Ok(config)
}

/// Checks a feed size before it reaches the resampler.
pub fn check_chunk_bytes(chunk_bytes: usize) -> anyhow::Result<usize> {
    anyhow::ensure!(
        chunk_bytes > 0 && chunk_bytes % 2 == 0,
        "chunk size must be a positive even number of bytes, got {chunk_bytes}"
    );
    Ok(chunk_bytes)
}

/// Prints a result as JSON or as `key: value` lines.
pub fn output_result(value: &serde_json::Value, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
        return Ok(());
    }
    if let Some(map) = value.as_object() {
        for (key, v) in map {
            match v {
                serde_json::Value::String(s) => println!("{key}: {s}"),
                other => println!("{key}: {other}"),
            }
        }
    }
    Ok(())
}
