//! AI Integration Layer
//!
//! Completion clients, prompt construction, and the extraction and
//! validation stages that turn untrusted completions into guides.

pub mod extract;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use extract::{ExtractionTier, Extracted, extract_json};
pub use prompt::{PromptBuilder, PromptSection};
pub use provider::{
    GeminiProvider, LlmProvider, LlmResponse, OllamaProvider, OpenAiProvider, ProviderConfig,
    SharedProvider, TokenUsage, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
pub use validation::{
    CatalogPolicy, ConformanceChecker, ConformanceReport, PinPolicy, normalize,
};
