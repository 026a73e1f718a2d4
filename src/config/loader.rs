// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::core::AnalyzerConfig;
use super::validation::ConfigValidator;

pub struct ConfigLoader {
    config_path: PathBuf,
    format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref().to_path_buf();
        let format = Self::detect_format(&path)?;

        Ok(Self {
            config_path: path,
            format,
        })
    }

    pub fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine file format of {:?}", path))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported file format: {}", extension)),
        }
    }

    pub fn load_config(&self) -> Result<AnalyzerConfig> {
        let mut config: AnalyzerConfig = read_document(&self.config_path, self.format)?;

        apply_env_overrides(&mut config)?;
        ConfigValidator::validate_config(&config)?;

        debug!(path = ?self.config_path, "Configuration loaded");
        Ok(config)
    }
}

/// Read a YAML, TOML or JSON document, format picked by extension
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigLoader::detect_format(path)?;
    read_document(path, format)
}

fn read_document<T: DeserializeOwned>(path: &Path, format: ConfigFormat) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    let document = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML in {:?}", path))?,
        ConfigFormat::Toml => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML in {:?}", path))?,
        ConfigFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {:?}", path))?,
    };

    Ok(document)
}

/// Load the config file when given, otherwise defaults; environment
/// overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => ConfigLoader::new(path)?.load_config(),
        None => {
            let mut config = AnalyzerConfig::default();
            apply_env_overrides(&mut config)?;
            ConfigValidator::validate_config(&config)?;
            Ok(config)
        }
    }
}

pub fn apply_env_overrides(config: &mut AnalyzerConfig) -> Result<()> {
    if let Ok(proxy) = std::env::var("BAC_PROXY") {
        if !proxy.trim().is_empty() {
            config.http.proxy = Some(proxy);
        }
    }

    if let Ok(base_url) = std::env::var("BAC_BASE_URL") {
        if !base_url.trim().is_empty() {
            config.base_url = Some(base_url);
        }
    }

    if let Ok(timeout) = std::env::var("BAC_TIMEOUT_SECS") {
        config.http.timeout_secs = timeout.parse().context("Invalid BAC_TIMEOUT_SECS")?;
    }

    if let Ok(concurrency) = std::env::var("BAC_CONCURRENCY") {
        config.http.concurrency = concurrency.parse().context("Invalid BAC_CONCURRENCY")?;
    }

    if let Ok(log_level) = std::env::var("LOG_LEVEL") {
        config.logging.level = log_level;
    }

    Ok(())
}
