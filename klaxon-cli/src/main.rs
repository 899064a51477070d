//! ## klaxon-cli
//! **Operator interface for the alert pipeline**
//!
//! Reads the current location, publishes the voice-response document and
//! notifies the configured recipients by SMS and voice call.
//!
//! Exit status is non-zero on any read, write, configuration or dispatch
//! failure.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
