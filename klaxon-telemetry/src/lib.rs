//! # Klaxon Telemetry
//!
//! Crate for logging and metrics of the alert pipeline.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
