//! ## klaxon-dispatch::twilio
//! **Twilio-compatible REST client**
//!
//! Requests are assembled by `sms_request` / `call_request` and executed
//! separately, so the wire format can be checked without a network.

use std::time::Duration;

use async_trait::async_trait;
use klaxon_config::ProviderConfig;
use klaxon_core::request::{CallRequest, Channel, SmsRequest};
use reqwest::{Request, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::notifier::{Notifier, ProviderReceipt};

const API_VERSION: &str = "2010-04-01";

/// Error document returned with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

pub struct TwilioClient {
    http: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("klaxon/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!(
            "{}/{}/Accounts/{}/{}.json",
            self.api_base, API_VERSION, self.account_sid, resource
        )
    }

    fn post(&self, resource: &str, form: &[(&str, &str)]) -> Result<Request, ProviderError> {
        self.http
            .post(self.endpoint(resource))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .build()
            .map_err(ProviderError::from)
    }

    /// `POST .../Messages.json` with `To`, `From`, `Body`.
    pub fn sms_request(&self, request: &SmsRequest) -> Result<Request, ProviderError> {
        self.post(
            "Messages",
            &[
                ("To", request.to.as_str()),
                ("From", request.from.as_str()),
                ("Body", request.body.as_str()),
            ],
        )
    }

    /// `POST .../Calls.json` with `To`, `From`, `Url`.
    pub fn call_request(&self, request: &CallRequest) -> Result<Request, ProviderError> {
        self.post(
            "Calls",
            &[
                ("To", request.to.as_str()),
                ("From", request.from.as_str()),
                ("Url", request.callback_url.as_str()),
            ],
        )
    }

    async fn execute(
        &self,
        channel: Channel,
        request: Request,
    ) -> Result<ProviderReceipt, ProviderError> {
        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%channel, status = status.as_u16(), "provider responded");
        interpret(status, &body)
    }
}

/// Maps a provider response onto a receipt or an error.
fn interpret(status: StatusCode, body: &str) -> Result<ProviderReceipt, ProviderError> {
    if status.is_success() {
        return serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()));
    }

    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(api) => (
            api.code,
            api.message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
        ),
        None => (
            None,
            status.canonical_reason().unwrap_or("unknown").to_string(),
        ),
    };
    Err(ProviderError::Rejected {
        status: status.as_u16(),
        code,
        message,
    })
}

#[async_trait]
impl Notifier for TwilioClient {
    #[instrument(level = "info", name = "send_sms", skip(self, request), fields(to = %request.to))]
    async fn send_sms(&self, request: &SmsRequest) -> Result<ProviderReceipt, ProviderError> {
        let http_request = self.sms_request(request)?;
        self.execute(Channel::Sms, http_request).await
    }

    #[instrument(level = "info", name = "place_call", skip(self, request), fields(to = %request.to))]
    async fn place_call(&self, request: &CallRequest) -> Result<ProviderReceipt, ProviderError> {
        let http_request = self.call_request(request)?;
        self.execute(Channel::Voice, http_request).await
    }
}
