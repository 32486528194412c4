//! CLI Common Utilities
//!
//! Shared initialization for commands that talk to the generation service.

use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::ai::create_provider;
use crate::catalog::{SharedCatalog, StaticCatalog, find_aspect, find_weapon};
use crate::config::{Config, ConfigLoader};
use crate::constants::retry;
use crate::guide::{GuidePipeline, GuideSession, Selection};
use crate::types::{ForgeError, Result};

/// Per-invocation overrides on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// Command execution context
///
/// Resolved configuration plus the catalog, ready to build sessions.
pub struct CommandContext {
    pub config: Config,
    pub catalog: SharedCatalog,
}

impl CommandContext {
    /// Load configuration from all sources, apply overrides, and open the catalog
    pub fn load(overrides: ServiceOverrides) -> Result<Self> {
        let mut config = ConfigLoader::load()?;
        if let Some(provider) = overrides.provider {
            config.llm.provider = provider;
        }
        if overrides.model.is_some() {
            config.llm.model = overrides.model;
        }
        config.validate()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let catalog = StaticCatalog::load(config.catalog.path.as_deref())?.into_shared();
        Ok(Self { config, catalog })
    }

    /// Fresh session wired to the configured provider and policies
    pub fn session(&self) -> Result<GuideSession> {
        let provider = create_provider(&self.config.llm.provider_config())?;
        let pipeline = GuidePipeline::new(provider, self.catalog.clone())
            .with_policies(
                self.config.validation.pins,
                self.config.validation.catalog,
            )
            .with_timeouts(self.config.llm.timeouts());
        Ok(GuideSession::new(pipeline))
    }

    /// Run `attempt` with exponential backoff on recoverable failures.
    ///
    /// A provider delay hint (rate limits) stretches the backoff step.
    /// `llm.max_retries = 0` runs the attempt exactly once.
    pub async fn with_retries<T, F, Fut>(&self, attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(retry::BASE_DELAY_MS))
            .with_max_delay(Duration::from_secs(retry::MAX_DELAY_SECS))
            .with_max_times(self.config.llm.max_retries);

        attempt
            .retry(backoff)
            .when(ForgeError::is_recoverable)
            .adjust(|err: &ForgeError, delay: Option<Duration>| {
                delay.map(|delay| err.retry_delay().map_or(delay, |hint| delay.max(hint)))
            })
            .notify(|err: &ForgeError, delay: Duration| {
                warn!("Retrying in {:?} after: {}", delay, err);
            })
            .await
    }
}

/// Resolve a weapon/aspect pair against the selection tables.
///
/// Matching is case-insensitive; the returned selection carries the
/// canonical display names.
pub fn resolve_selection(weapon: &str, aspect: &str) -> Result<Selection> {
    let weapon = find_weapon(weapon)
        .ok_or_else(|| ForgeError::UnknownSelection(format!("weapon '{}'", weapon)))?;
    let aspect = find_aspect(weapon.id, aspect).ok_or_else(|| {
        ForgeError::UnknownSelection(format!("aspect '{}' for {}", aspect, weapon.name))
    })?;
    Ok(Selection::new(weapon.name, aspect.name))
}

/// Write a guide (or any serializable value) as pretty JSON
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::mock::ScriptedProvider;
    use crate::types::{ErrorCategory, LlmError};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn context(max_retries: usize) -> CommandContext {
        let mut config = Config::default();
        config.llm.max_retries = max_retries;
        CommandContext::from_config(config).unwrap()
    }

    #[test]
    fn test_resolve_selection_canonicalizes() {
        let selection = resolve_selection("witch's staff", "aspect of circe").unwrap();
        assert_eq!(selection.weapon, "Witch's Staff");
        assert_eq!(selection.aspect, "Aspect of Circe");
    }

    #[test]
    fn test_resolve_selection_rejects_unknown() {
        assert!(matches!(
            resolve_selection("Lute", "Aspect of Orpheus"),
            Err(ForgeError::UnknownSelection(_))
        ));
        assert!(matches!(
            resolve_selection("Witch's Staff", "Aspect of Nobody"),
            Err(ForgeError::UnknownSelection(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_recoverable_errors() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = context(2)
            .with_retries(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ForgeError::ServiceUnavailable(LlmError::new(
                        ErrorCategory::Network,
                        "connection reset",
                    )))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_runs_once() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<()> = context(0)
            .with_retries(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ForgeError::timeout("guide completion", Duration::from_secs(1)))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parse_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result: Result<()> = context(3)
            .with_retries(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ForgeError::parse("missing field"))
            })
            .await;
        assert!(matches!(result, Err(ForgeError::Parse { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_for_hint() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let start = tokio::time::Instant::now();
        let result = context(1)
            .with_retries(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ForgeError::ServiceUnavailable(
                        LlmError::new(ErrorCategory::RateLimit, "quota exceeded")
                            .retry_after(Duration::from_secs(30)),
                    ))
                } else {
                    Ok(())
                }
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_retry_recovers_after_failure() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(ForgeError::ServiceUnavailable(LlmError::new(
                ErrorCategory::RateLimit,
                "slow down",
            ))),
            Ok(crate::types::testing::sample_guide_json()),
        ]));
        let ctx = context(1);
        let session = GuideSession::new(GuidePipeline::new(provider, ctx.catalog.clone()));
        let selection = resolve_selection("Witch's Staff", "Aspect of Circe").unwrap();

        let guide = ctx
            .with_retries(|| session.generate(selection.clone()))
            .await
            .unwrap();
        assert_eq!(guide.aspect_name, "Aspect of Circe");
    }

    #[test]
    fn test_write_json_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("guides/circe.json");
        write_json(&path, &crate::types::testing::sample_guide()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("aspectName"));
    }
}
