use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub format: Option<String>,
    pub timeout_ms: Option<u64>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".octofhir");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("measure.toml"))
}

pub fn load_all(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let cfg: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(cfg)
}

pub fn load_profile(path: &Path, profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all(path)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Applies `key = value` to a profile, rejecting unknown keys.
pub fn set_key(config: &mut ProfileConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "server" => config.server = Some(value.to_string()),
        "format" => {
            let format = OutputFormat::from_str(value, true)
                .map_err(|_| anyhow::anyhow!("Invalid format: {value}. Valid formats: json, table"))?;
            config.format = format.to_possible_value().map(|v| v.get_name().to_string());
        }
        "timeout_ms" => {
            let ms = value
                .parse::<u64>()
                .with_context(|| format!("Invalid timeout_ms: {value}"))?;
            config.timeout_ms = Some(ms);
        }
        other => anyhow::bail!("Unknown config key: {other}. Valid keys: server, format, timeout_ms"),
    }
    Ok(())
}

pub fn resolve_server(cli_server: &Option<String>, profile: &ProfileConfig) -> Result<String> {
    // 1. --server flag / OCTOFHIR_MEASURE_URL env
    if let Some(s) = cli_server {
        return Ok(s.clone());
    }
    // 2. profile in measure.toml
    if let Some(s) = &profile.server {
        return Ok(s.clone());
    }
    anyhow::bail!(
        "No server URL configured. Use --server, set OCTOFHIR_MEASURE_URL env var, or run: octofhir-measure config set server <url>"
    )
}
