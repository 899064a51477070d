//! Bounded retry of transient provider failures.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use klaxon_config::DispatchConfig;
use klaxon_core::request::{CallRequest, Channel, SmsRequest};
use tracing::warn;

use crate::error::ProviderError;
use crate::notifier::{Notifier, ProviderReceipt};

/// `max_attempts` includes the first try. The delay before attempt `n + 1`
/// is `backoff * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

impl From<&DispatchConfig> for RetryPolicy {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Runs `operation` until it succeeds, fails permanently or the attempt
    /// budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(
        &self,
        channel: Channel,
        mut operation: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff * attempt;
                    warn!(
                        %channel,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient dispatch failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wraps a notifier with a retry policy.
pub struct Retrying<N> {
    inner: N,
    policy: RetryPolicy,
}

impl<N: Notifier> Retrying<N> {
    pub fn new(inner: N, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for Retrying<N> {
    async fn send_sms(&self, request: &SmsRequest) -> Result<ProviderReceipt, ProviderError> {
        self.policy
            .run(Channel::Sms, || self.inner.send_sms(request))
            .await
    }

    async fn place_call(&self, request: &CallRequest) -> Result<ProviderReceipt, ProviderError> {
        self.policy
            .run(Channel::Voice, || self.inner.place_call(request))
            .await
    }
}
