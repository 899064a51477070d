//! Telephony provider credentials and endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

const REDACTED: &str = "********";

/// Provider account and transport settings.
#[derive(Serialize, Deserialize, Validate, Clone)]
pub struct ProviderConfig {
    /// Account identifier used as the basic-auth user.
    #[validate(custom(function = validation::validate_account_sid))]
    #[serde(default)]
    pub account_sid: String,

    /// Secret token used as the basic-auth password.
    #[validate(length(min = 1, message = "auth token must be provided"))]
    #[serde(default)]
    pub auth_token: String,

    /// REST API base URL.
    #[validate(url)]
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout (seconds).
    #[validate(range(min = 1, max = 120))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.twilio.com".into()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Copy with the auth token masked, for display.
    pub fn redacted(&self) -> Self {
        let auth_token = if self.auth_token.is_empty() {
            String::new()
        } else {
            REDACTED.into()
        };
        Self {
            auth_token,
            ..self.clone()
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &REDACTED)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
