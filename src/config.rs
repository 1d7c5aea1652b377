use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Override for the completion API base URL (no trailing slash).
    #[serde(default)]
    pub api_base: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_timeout_secs(),
            api_base: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_system_prompt() -> String {
    "You are a helpful AI assistant.".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RevealConfig {
    /// Delay between revealed answer characters.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Delay between typed placeholder characters in prompt mode.
    #[serde(default = "default_placeholder_interval_ms")]
    pub placeholder_interval_ms: u64,
    /// How long a fully typed placeholder is held before rotating.
    #[serde(default = "default_placeholder_hold_ms")]
    pub placeholder_hold_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            placeholder_interval_ms: default_placeholder_interval_ms(),
            placeholder_hold_ms: default_placeholder_hold_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    20
}
fn default_placeholder_interval_ms() -> u64 {
    70
}
fn default_placeholder_hold_ms() -> u64 {
    2000
}

impl RevealConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Where the recent-queries log lives. Defaults to the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            path: None,
        }
    }
}

fn default_max_entries() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7361".to_string()
}

/// Load configuration from a TOML file.
///
/// A missing file is not an error — every setting has a default, so the
/// CLI works out of the box with just `OPENAI_API_KEY` set.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.completion.provider.as_str() {
        "openai" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown completion provider: '{}'. Must be openai or disabled.",
            other
        ),
    }

    if !(0.0..=2.0).contains(&config.completion.temperature) {
        anyhow::bail!("completion.temperature must be in [0.0, 2.0]");
    }

    if config.completion.timeout_secs == 0 {
        anyhow::bail!("completion.timeout_secs must be > 0");
    }

    if config.reveal.placeholder_interval_ms == 0 {
        anyhow::bail!("reveal.placeholder_interval_ms must be > 0");
    }

    if config.history.max_entries == 0 {
        anyhow::bail!("history.max_entries must be >= 1");
    }

    Ok(())
}
