//! # klaxon-engine
//!
//! Shared implementation of the alert pipeline so any frontend runs the
//! same stages in the same order.

pub mod locate;
pub mod pipeline;

pub use locate::locate;
pub use pipeline::{
    prepare_alert, AlertPipeline, AlertSettings, ChannelOutcome, Delivered, DispatchReport,
    PersistedAlert, PreparedAlert,
};
