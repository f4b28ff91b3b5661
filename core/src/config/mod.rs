//! Configuration management
//!
//! Supports a YAML configuration file with environment-variable overrides
//! for the upstream credentials and model selection. The loaded `Config` is
//! passed explicitly into the client and pipeline at construction time and
//! treated as immutable for the life of the process.

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "memsum.yaml";

/// Default config directory name
const CONFIG_DIR_NAME: &str = "memsum";

/// Default completion service base URL (OpenAI-compatible, `/v1` suffix)
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Fixed fallback model when neither override is configured
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Upstream completion service settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for the upstream completion service
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the API endpoint (including /v1 suffix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key for authentication
    ///
    /// Absence is a hard precondition failure for every upstream call.
    /// Can also be set via the OPENROUTER_API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Model override for memory extraction calls
    #[serde(default)]
    pub memory_model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Bind address for the gateway
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            memory_model: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, with fallback to defaults
    ///
    /// Environment overrides are applied after the file is read, so a key
    /// set in the environment always wins.
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file() {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = serde_yml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Apply environment-variable overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup table
    ///
    /// Split out from [`apply_env`](Self::apply_env) so tests can drive the
    /// override rules without mutating the process environment.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(key) = get("OPENROUTER_API_KEY").filter(|k| !k.is_empty()) {
            self.upstream.api_key = Some(key);
        }
        if let Some(model) = get("OPENROUTER_MODEL_ID").filter(|m| !m.is_empty()) {
            self.upstream.model = model;
        }
        if let Some(model) = get("OPENROUTER_MEMORY_MODEL").filter(|m| !m.is_empty()) {
            self.upstream.memory_model = Some(model);
        }
    }
}

impl UpstreamConfig {
    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Model used for memory extraction: the memory override when set,
    /// otherwise the default model
    pub fn memory_model(&self) -> &str {
        self.memory_model.as_deref().unwrap_or(&self.model)
    }
}

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    // Check current directory first
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Some(path);
        }
    }

    // Check config directory
    config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
