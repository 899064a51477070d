//! Dispatch retry parameters.
//!
//! A single attempt per channel is the default; raising `max_attempts`
//! enables bounded retries of transient provider failures.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct DispatchConfig {
    /// Attempts per channel, including the first. Timeouts are never retried:
    /// a POST that did land would send a second SMS or call.
    #[validate(range(min = 1, max = 10))]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay between attempts (milliseconds); grows linearly per attempt.
    #[validate(range(max = 60_000))]
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}
