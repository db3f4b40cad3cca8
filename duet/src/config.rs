//! Assistant configuration: TOML settings plus environment-provided keys.
//!
//! The config is constructed once at startup and passed by reference into
//! the generation clients; nothing reads the environment after load. The
//! TOML file is meant to be edited by humans and missing fields default to
//! sensible values. API keys only ever come from the environment.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Model id for the stage-1 processor.
    pub processor_model: String,

    /// Model id for the stage-2 responder.
    pub responder_model: String,

    /// Token cap for processor completions.
    pub max_tokens: u32,

    /// Sampling temperature for the processor.
    pub temperature: f32,

    /// Per-request HTTP timeout for both clients.
    pub request_timeout_secs: u64,

    #[serde(skip)]
    pub openai_api_key: String,

    #[serde(skip)]
    pub gemini_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processor_model: "gpt-4o".to_string(),
            responder_model: "gemini-2.5-flash".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            request_timeout_secs: 30,
            openai_api_key: String::new(),
            gemini_api_key: String::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.processor_model.trim().is_empty() {
            return Err(anyhow!("processor_model must be non-empty"));
        }
        if self.responder_model.trim().is_empty() {
            return Err(anyhow!("responder_model must be non-empty"));
        }
        if self.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be > 0"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be > 0"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(anyhow!("temperature must be within 0.0..=2.0"));
        }
        Ok(())
    }

    /// True when both stages have an API key.
    pub fn api_keys_configured(&self) -> bool {
        !self.openai_api_key.is_empty() && !self.gemini_api_key.is_empty()
    }

    /// One-line redacted view for startup logging.
    pub fn summarize(&self) -> String {
        format!(
            "processor={} responder={} max_tokens={} timeout={}s openai_key={} gemini_key={}",
            self.processor_model,
            self.responder_model,
            self.max_tokens,
            self.request_timeout_secs,
            if self.openai_api_key.is_empty() { "unset" } else { "set" },
            if self.gemini_api_key.is_empty() { "unset" } else { "set" },
        )
    }
}

/// Load config from a TOML file, then apply environment overrides.
///
/// If the file is missing, returns `Config::default()` (plus overrides).
pub fn load_config(path: &Path) -> Result<Config> {
    let mut cfg = if path.exists() {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(model) = env::var("OPENAI_MODEL") {
        cfg.processor_model = model;
    }
    if let Ok(model) = env::var("GEMINI_MODEL") {
        cfg.responder_model = model;
    }
    cfg.openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
    cfg.gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
}
