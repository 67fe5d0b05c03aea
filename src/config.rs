//! Configuration for kbchat-rs
//!
//! Defaults preserve the observed behavior of the service this front end
//! talks to: no request timeout and no retry unless explicitly enabled.

use crate::error::{KbChatError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub kb: KbConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Knowledgebase source configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct KbConfig {
    /// Path to the knowledgebase CSV. A missing source at startup is fatal.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Generation service configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bounded request timeout in seconds. `None` keeps requests unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Retry once on a transient network failure.
    #[serde(default)]
    pub retry_transient: bool,
}

fn default_endpoint() -> String {
    "http://localhost:8000/generate/".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: None,
            retry_transient: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Apply environment overrides: `KBCHAT_ENDPOINT`, `KBCHAT_TIMEOUT_SECS`,
    /// `KBCHAT_RETRY`.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(endpoint) = std::env::var("KBCHAT_ENDPOINT") {
            self.generation.endpoint = endpoint;
        }
        if let Ok(raw) = std::env::var("KBCHAT_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                KbChatError::Config(format!("invalid KBCHAT_TIMEOUT_SECS '{}': {}", raw, e))
            })?;
            self.generation.timeout_secs = Some(secs);
        }
        if let Ok(raw) = std::env::var("KBCHAT_RETRY") {
            self.generation.retry_transient = matches!(raw.as_str(), "1" | "true" | "yes");
        }
        Ok(self)
    }
}
