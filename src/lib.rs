//! Boonforge - AI-Generated Hades II Build Guides
//!
//! Turns a weapon/aspect selection into a structured build guide by asking
//! a text-generation service, then extracting, validating, and
//! constraint-checking its reply against a local reference catalog.
//!
//! ## Core Features
//!
//! - **Catalog-Grounded Prompts**: boons, duos, and weapon hammers are sent
//!   as the only allowed choices
//! - **Pinning**: chosen boons, hammers, and synergies survive refinement
//! - **Tolerant Extraction**: fenced, prose-wrapped, or bare JSON replies
//! - **Strict Schema**: exactly five slots, normalized provenance
//! - **Providers**: Gemini, OpenAI-compatible, and Ollama backends
//!
//! ## Quick Start
//!
//! ```ignore
//! use boonforge::{GuidePipeline, GuideSession, Selection, StaticCatalog, create_provider};
//!
//! let catalog = StaticCatalog::embedded()?.into_shared();
//! let provider = create_provider(&ProviderConfig::default())?;
//! let session = GuideSession::new(GuidePipeline::new(provider, catalog));
//!
//! let guide = session.generate(Selection::new("Witch's Staff", "Aspect of Circe")).await?;
//! let mut pins = PinSet::new();
//! pins.toggle_boon(&guide, Slot::Attack);
//! let refined = session.regenerate(pins).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider abstraction, prompt building, extraction, validation
//! - [`catalog`]: reference tables and weapon/aspect selection
//! - [`guide`]: constraint aggregation, prompt composition, sessions
//! - [`config`]: layered configuration
//! - [`types`]: guide data model, pins, errors

pub mod ai;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod guide;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, ForgeError, Result};

// Domain
pub use types::{BuildGuide, PinSet, Slot};

// Catalog
pub use catalog::{Catalog, SharedCatalog, StaticCatalog};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use guide::{
    ConstraintBundle, GeneratedGuide, GuidePipeline, GuideSession, Selection, SessionState,
    aggregate, compose,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    LlmProvider, LlmResponse, ProviderConfig, SharedProvider, TimeoutConfig, create_provider,
    extract_json, normalize, with_timeout,
};
