//! # Klaxon Dispatch
//!
//! Outbound notification plumbing: the `Notifier` seam, the Twilio REST
//! client behind it, a logging-only notifier for dry runs and a bounded
//! retry wrapper.

pub mod error;
pub mod notifier;
pub mod retry;
pub mod twilio;

pub use error::ProviderError;
pub use notifier::{DryRunNotifier, Notifier, ProviderReceipt};
pub use retry::{RetryPolicy, Retrying};
pub use twilio::TwilioClient;
