//! Retry policy for RPC operations
//!
//! Exponential backoff with a cap, a timeout wrapper for blocking client calls,
//! and the classification of node errors that must not be retried.

use crate::config::BitcoinRpcConfig;
use crate::errors::RpcResult;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

/// Node messages for a transaction that does not exist; retrying cannot help
const NOT_FOUND_MESSAGES: &[&str] = &[
    "No such mempool or blockchain transaction",
    "Invalid or non-wallet transaction id",
];

/// Attempts, timeout and backoff schedule taken from the RPC configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub timeout_seconds: u64,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff_seconds: u64,
}

impl RetryPolicy {
    /// Backoff to wait after the given number of failed attempts
    ///
    /// ```
    /// use omni_codec::config::BitcoinRpcConfig;
    /// use omni_codec::rpc::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::from(&BitcoinRpcConfig::default());
    /// assert_eq!(policy.backoff_after(1), Duration::from_millis(100));
    /// assert_eq!(policy.backoff_after(3), Duration::from_millis(400));
    /// ```
    pub fn backoff_after(&self, failures: usize) -> Duration {
        let mut backoff = self.initial_backoff;
        for _ in 1..failures {
            backoff = calculate_next_backoff(backoff, self.multiplier, self.max_backoff_seconds);
        }
        backoff
    }

    /// At least one attempt is always made
    pub fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }
}

impl From<&BitcoinRpcConfig> for RetryPolicy {
    fn from(config: &BitcoinRpcConfig) -> Self {
        Self {
            max_attempts: config.max_retries,
            timeout_seconds: config.timeout_seconds,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            multiplier: config.backoff_multiplier,
            max_backoff_seconds: config.max_backoff_seconds,
        }
    }
}

/// `min(current * multiplier, max)`
pub fn calculate_next_backoff(
    current_backoff: Duration,
    multiplier: f64,
    max_backoff_seconds: u64,
) -> Duration {
    Duration::from_millis((current_backoff.as_millis() as f64 * multiplier) as u64)
        .min(Duration::from_secs(max_backoff_seconds))
}

/// Whether a node error means the transaction does not exist
pub fn is_not_found(message: &str) -> bool {
    NOT_FOUND_MESSAGES
        .iter()
        .any(|pattern| message.contains(pattern))
}

/// Run a blocking RPC call on the blocking pool, bounded by a timeout
///
/// Outer `Err` is the elapsed timeout, the middle one a failed blocking task, the
/// inner one the call's own result.
pub async fn execute_with_timeout<T, F>(
    timeout_seconds: u64,
    operation: F,
) -> Result<Result<RpcResult<T>, JoinError>, Elapsed>
where
    T: Send + 'static,
    F: FnOnce() -> RpcResult<T> + Send + 'static,
{
    timeout(
        Duration::from_secs(timeout_seconds),
        tokio::task::spawn_blocking(operation),
    )
    .await
}
