//! Config file loading

use crate::domain::StructuredConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a launcher config file, choosing the parser from its extension.
pub fn load_config(config_file: &Path) -> Result<StructuredConfig> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => parse_yaml_config(&content, config_file)?,
        "toml" => parse_toml_config(&content, config_file)?,
        "json" => serde_json::from_str::<StructuredConfig>(&content)
            .with_context(|| format!("Invalid JSON config: {}", config_file.display()))?,
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    };

    tracing::debug!("Loaded launcher config from {}", config_file.display());
    Ok(parsed)
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<StructuredConfig> {
    // An empty document parses to null; treat it as a config with no groups.
    if content.trim().is_empty() {
        return Ok(StructuredConfig::default());
    }
    serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn parse_toml_config(content: &str, config_file: &Path) -> Result<StructuredConfig> {
    toml::from_str(content).with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}
