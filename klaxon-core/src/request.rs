//! Outbound request values.
//!
//! These carry no credentials; the dispatcher owns authentication.

use std::fmt;

/// Notification channel, used in logs, metrics and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Sms,
    Voice,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Sms => f.write_str("sms"),
            Channel::Voice => f.write_str("voice"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsRequest {
    pub to: String,
    pub from: String,
    pub body: String,
}

/// Places a call whose instructions the provider fetches from `callback_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: String,
    pub from: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchRequest {
    Sms(SmsRequest),
    Voice(CallRequest),
}

impl DispatchRequest {
    pub fn channel(&self) -> Channel {
        match self {
            DispatchRequest::Sms(_) => Channel::Sms,
            DispatchRequest::Voice(_) => Channel::Voice,
        }
    }
}

impl From<SmsRequest> for DispatchRequest {
    fn from(request: SmsRequest) -> Self {
        DispatchRequest::Sms(request)
    }
}

impl From<CallRequest> for DispatchRequest {
    fn from(request: CallRequest) -> Self {
        DispatchRequest::Voice(request)
    }
}
