//! Timeout Handling
//!
//! Wraps async operations so a stalled generation surfaces as
//! `ForgeError::Timeout` instead of hanging the session.

use std::future::Future;
use std::time::Duration;

use crate::constants::network as net_constants;
use crate::types::{ForgeError, Result};

/// Timeouts for guide generation
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for one completion request (default: 2 minutes)
    pub llm_request: Duration,
    /// Timeout for establishing connections (default: 30 seconds)
    pub connection: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_request: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
            connection: Duration::from_secs(net_constants::CONNECTION_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    /// Config with the completion timeout taken from `llm.timeout_secs`
    pub fn from_secs(llm_request_secs: u64) -> Self {
        Self {
            llm_request: Duration::from_secs(llm_request_secs),
            ..Self::default()
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
///
/// ```ignore
/// let response = with_timeout(
///     Duration::from_secs(30),
///     provider.complete(&prompt),
///     "guide completion",
/// ).await?;
/// ```
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ForgeError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.llm_request.as_secs(), 120);
        assert_eq!(config.connection.as_secs(), 30);
    }

    #[test]
    fn test_timeout_config_from_secs() {
        let config = TimeoutConfig::from_secs(5);
        assert_eq!(config.llm_request, Duration::from_secs(5));
        assert_eq!(config.connection.as_secs(), 30);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, ForgeError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, ForgeError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), ForgeError::Timeout { .. }));
    }
}
