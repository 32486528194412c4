//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/boonforge/config.toml`)
//! 3. Project config (`./boonforge.toml`)
//! 4. Environment variables (`BOONFORGE_*`)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
