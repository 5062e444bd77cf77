//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.benefits-chat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::ModelOption;
use crate::inference::bedrock::default_base_url;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub bedrock: BedrockConfig,
    #[serde(default)]
    pub models: Vec<ModelOption>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_model: Option<String>,
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BedrockConfig {
    pub region: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MODEL: &str = "claude";
pub const DEFAULT_REGION: &str = "us-east-1";
const CONFIG_DIR: &str = ".benefits-chat";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model: String,
    pub data_dir: PathBuf,
    pub region: String,
    pub bedrock_base_url: String,
    pub bedrock_api_key: Option<String>,
    pub models: Vec<ModelOption>,
}

/// CLI flag values; `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.benefits-chat`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_DIR))
}

/// Returns the path to `~/.benefits-chat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.benefits-chat/config.toml`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(AppConfig::default())
        }
    }
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `AppConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AppConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: general={:?}, models={}", config.general, config.models.len());
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# benefits-chat configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_model = "claude"           # "claude", "titan", "llama"
# data_dir = "/var/lib/benefits-chat" # Defaults to ~/.benefits-chat

# [bedrock]
# region = "us-east-1"               # Or set AWS_REGION
# base_url = "https://bedrock-runtime.us-east-1.amazonaws.com"
# api_key = "..."                    # Or set AWS_BEARER_TOKEN_BEDROCK

# [[models]]
# id = "claude"
# name = "Anthropic Claude 3 Sonnet"
# description = "Stronger reasoning, slower"
# model_id = "anthropic.claude-3-sonnet-20240229-v1:0"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &AppConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &AppConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Model: CLI → env → config → default
    let model = cli
        .model
        .clone()
        .or_else(|| env("BENEFITS_MODEL"))
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    // Data dir: CLI → env → config → ~/.benefits-chat → ./.benefits-chat
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| env("BENEFITS_DATA_DIR").map(PathBuf::from))
        .or_else(|| config.general.data_dir.as_ref().map(PathBuf::from))
        .or_else(config_dir)
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR));

    // Region: env → config → default
    let region = env("AWS_REGION")
        .or_else(|| config.bedrock.region.clone())
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    // Base URL: env → config → derived from region
    let bedrock_base_url = env("BEDROCK_BASE_URL")
        .or_else(|| config.bedrock.base_url.clone())
        .unwrap_or_else(|| default_base_url(&region));

    // API key: env → config
    let bedrock_api_key = env("AWS_BEARER_TOKEN_BEDROCK").or_else(|| config.bedrock.api_key.clone());

    ResolvedConfig {
        model,
        data_dir,
        region,
        bedrock_base_url,
        bedrock_api_key,
        models: config.models.clone(),
    }
}
