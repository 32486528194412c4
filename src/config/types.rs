//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (`$XDG_CONFIG_HOME/boonforge/`) and project
//! (`./boonforge.toml`) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::{CatalogPolicy, PinPolicy, ProviderConfig, TimeoutConfig};
use crate::constants::network;
use crate::types::{ForgeError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation service settings
    pub llm: LlmConfig,

    /// Reference catalog settings
    pub catalog: CatalogConfig,

    /// Post-parse conformance policies
    pub validation: ValidationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            catalog: CatalogConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ForgeError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ForgeError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ForgeError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(ForgeError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.llm.provider.as_str(), "gemini" | "openai" | "ollama") {
            return Err(ForgeError::Config(format!(
                "Unknown provider: {}. Supported: gemini, openai, ollama",
                self.llm.provider
            )));
        }

        if let Some(base) = &self.llm.api_base {
            url::Url::parse(base).map_err(|e| {
                ForgeError::Config(format!("Invalid llm.api_base '{}': {}", base, e))
            })?;
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// API keys are never serialized and are redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: gemini, openai, ollama
    pub provider: String,

    /// Model name (provider default when unset)
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Custom endpoint (OpenAI-compatible proxy, remote Ollama, etc.)
    pub api_base: Option<String>,

    /// Falls back to the provider's environment variable when unset
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Retries for retryable service failures; 0 disables retrying
    pub max_retries: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            max_tokens: 8192,
            api_base: None,
            api_key: None,
            max_retries: 0,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl LlmConfig {
    /// Provider settings for `create_provider`
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }

    pub fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Catalog Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog replacing the embedded tables
    pub path: Option<PathBuf>,
}

// =============================================================================
// Validation Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Handling of pinned items the generator altered or dropped
    pub pins: PinPolicy,

    /// Handling of recommendations missing from the catalog
    pub catalog: CatalogPolicy,
}

// =============================================================================
// Tests
// =============================================================================
