//! Defines the Notifier trait for issuing provider requests.

use async_trait::async_trait;
use klaxon_core::request::{CallRequest, SmsRequest};
use serde::Deserialize;
use tracing::info;

use crate::error::ProviderError;

/// What the provider returned for an accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderReceipt {
    /// Provider-assigned resource identifier.
    pub sid: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one SMS.
    async fn send_sms(&self, request: &SmsRequest) -> Result<ProviderReceipt, ProviderError>;

    /// Places one voice call driven by the document at `request.callback_url`.
    async fn place_call(&self, request: &CallRequest) -> Result<ProviderReceipt, ProviderError>;
}

/// Logs requests instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunNotifier;

const DRY_RUN_SID: &str = "dry-run";

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send_sms(&self, request: &SmsRequest) -> Result<ProviderReceipt, ProviderError> {
        info!(to = %request.to, from = %request.from, body = %request.body, "dry run: SMS not sent");
        Ok(ProviderReceipt {
            sid: DRY_RUN_SID.into(),
            status: None,
        })
    }

    async fn place_call(&self, request: &CallRequest) -> Result<ProviderReceipt, ProviderError> {
        info!(
            to = %request.to,
            from = %request.from,
            url = %request.callback_url,
            "dry run: call not placed"
        );
        Ok(ProviderReceipt {
            sid: DRY_RUN_SID.into(),
            status: None,
        })
    }
}
