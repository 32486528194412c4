//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (`<config dir>/boonforge/config.toml`)
//! 3. Project config (`./boonforge.toml`)
//! 4. Environment variables (`BOONFORGE_` prefix, `__` between levels)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{ForgeError, Result};

const APP_NAME: &str = "boonforge";
const PROJECT_FILE: &str = "boonforge.toml";
const ENV_PREFIX: &str = "BOONFORGE_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Resolution chain with explicit file locations; missing files are skipped
    pub fn load_from(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // BOONFORGE_LLM__TIMEOUT_SECS -> llm.timeout_secs
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ForgeError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ForgeError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Platform config directory for boonforge
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(PROJECT_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| ForgeError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default global config; existing files are kept unless `force`
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            ForgeError::Config("Cannot determine global config directory".to_string())
        })?;
        fs::create_dir_all(&global_dir)?;

        let config_path = global_dir.join("config.toml");
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    /// Write `boonforge.toml` into `dir`; existing files are kept unless `force`
    pub fn init_project(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let config_path = dir.join(PROJECT_FILE);
        Self::write_default(&config_path, force)?;
        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(());
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# Boonforge Configuration
# Project settings in ./boonforge.toml override the global file.
# API keys come from the environment (GEMINI_API_KEY, OPENAI_API_KEY)
# or from llm.api_key / BOONFORGE_LLM__API_KEY.

version = "1.0"

# Generation service
[llm]
provider = "gemini"      # gemini | openai | ollama
# model = "gemini-2.5-flash"
timeout_secs = 120
temperature = 0.7
max_tokens = 8192
max_retries = 0

# Reference catalog (embedded tables when unset)
[catalog]
# path = "catalog.json"

# Post-parse checks
[validation]
pins = "reject"          # reject | restore | ignore
catalog = "warn"         # warn | reject | off
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{CatalogPolicy, PinPolicy};
    use tempfile::TempDir;

    #[test]
    fn test_load_without_files_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_from(None, &temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&global, "[llm]\nprovider = \"openai\"\ntemperature = 0.2\n").unwrap();
        fs::write(&project, "[llm]\ntemperature = 0.9\n[validation]\npins = \"restore\"\n")
            .unwrap();

        let config = ConfigLoader::load_from(Some(&global), &project).unwrap();
        assert_eq!(config.llm.provider, "openai");
        assert!((config.llm.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.validation.pins, PinPolicy::Restore);
    }

    #[test]
    fn test_api_key_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("boonforge.toml");
        fs::write(&project, "[llm]\nprovider = \"openai\"\napi_key = \"sk-file\"\n").unwrap();

        let config = ConfigLoader::load_from(None, &project).unwrap();
        assert_eq!(config.llm.provider_config().api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("boonforge.toml");
        fs::write(&project, "[llm]\ntimeout_secs = 0\n").unwrap();

        let err = ConfigLoader::load_from(None, &project).unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
    }

    #[test]
    fn test_init_project_writes_loadable_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::init_project(temp_dir.path(), false).unwrap();
        assert!(path.ends_with("boonforge.toml"));

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.validation.catalog, CatalogPolicy::Warn);
        assert_eq!(config.llm.max_retries, 0);
    }

    #[test]
    fn test_init_project_keeps_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("boonforge.toml");
        fs::write(&path, "[llm]\nprovider = \"ollama\"\n").unwrap();

        ConfigLoader::init_project(temp_dir.path(), false).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("ollama"));

        ConfigLoader::init_project(temp_dir.path(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("gemini"));
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: No other test reads this variable
        unsafe {
            std::env::set_var("BOONFORGE_VALIDATION__CATALOG", "off");
        }
        let config = ConfigLoader::load_from(None, &temp_dir.path().join("none.toml"));
        unsafe {
            std::env::remove_var("BOONFORGE_VALIDATION__CATALOG");
        }
        assert_eq!(config.unwrap().validation.catalog, CatalogPolicy::Off);
    }
}
