//! Completion Client
//!
//! Defines the `LlmProvider` trait: a thin adapter that sends one prompt to
//! an external generation service and returns its raw text. Providers do no
//! parsing and no retrying; both are caller decisions.
//!
//! Failures map onto two outcomes:
//! - `ForgeError::ServiceUnavailable` for transport/provider errors
//! - `ForgeError::EmptyResponse` for empty or content-filtered completions

mod gemini;
mod ollama;
mod openai;

pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai::timeout::TimeoutConfig;
use crate::types::{ErrorClassifier, ForgeError, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Raw completion text plus usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Untrusted generated text
    pub content: String,
    pub usage: TokenUsage,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Shared provider handle used by sessions
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers
///
/// API keys are never serialized and are redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "gemini", "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub temperature: f32,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ProviderConfig {
    pub fn timeouts(&self) -> TimeoutConfig {
        TimeoutConfig::from_secs(self.timeout_secs)
    }
}

fn default_max_tokens() -> usize {
    8192
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            timeout_secs: crate::constants::network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            api_key: None,
            api_base: None,
            max_tokens: default_max_tokens(),
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// One network round-trip per `complete` call
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the prompt and return the raw completion text
    async fn complete(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.clone())?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(ForgeError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai, ollama",
            config.provider
        ))),
    }
}

// =============================================================================
// Shared Failure Mapping
// =============================================================================

pub(crate) fn http_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeouts.llm_request)
        .connect_timeout(timeouts.connection.min(timeouts.llm_request))
        .build()
        .map_err(|e| ForgeError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure onto `ServiceUnavailable`
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ForgeError {
    let message = if err.is_timeout() {
        format!("{} request timed out", provider)
    } else if err.is_connect() {
        format!("Failed to connect to {}: {}", provider, err)
    } else {
        format!("{} request failed: {}", provider, err)
    };
    ForgeError::ServiceUnavailable(ErrorClassifier::classify(&message, provider))
}

/// Map a non-success HTTP response onto `ServiceUnavailable`
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> ForgeError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ForgeError::ServiceUnavailable(ErrorClassifier::classify_http_status(
        status.as_u16(),
        &format!("{} API error ({}): {}", provider, status, body),
        provider,
    ))
}

/// Reject absent or whitespace-only completions
pub(crate) fn require_text(text: Option<String>) -> Result<String> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ForgeError::EmptyResponse),
    }
}

// =============================================================================
// Test Support
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(matches!(require_text(None), Err(ForgeError::EmptyResponse)));
        assert!(matches!(
            require_text(Some("  \n".to_string())),
            Err(ForgeError::EmptyResponse)
        ));
        assert_eq!(require_text(Some("{}".to_string())).unwrap(), "{}");
    }

    #[test]
    fn test_token_usage_total_saturates() {
        assert_eq!(TokenUsage::new(120, 30).total(), 150);
        assert_eq!(TokenUsage::new(u32::MAX, 5).total(), u32::MAX);
    }

    #[test]
    fn test_provider_timeouts() {
        let config = ProviderConfig {
            timeout_secs: 10,
            ..Default::default()
        };
        let timeouts = config.timeouts();
        assert_eq!(timeouts.llm_request.as_secs(), 10);
        assert_eq!(timeouts.connection.as_secs(), 30);
        assert!(http_client(&timeouts).is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ProviderConfig {
            provider: "claude-code".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_provider(&config),
            Err(ForgeError::Config(_))
        ));
    }
}
