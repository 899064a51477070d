use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use klaxon_config::{ConfigError, KlaxonConfig};
use klaxon_dispatch::{DryRunNotifier, Notifier, RetryPolicy, Retrying, TwilioClient};
use klaxon_engine::{prepare_alert, AlertPipeline, AlertSettings, Delivered, DispatchReport};
use klaxon_telemetry::{EventLogger, MetricsRecorder};

#[derive(Parser)]
#[command(name = "klaxon", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the location, write the voice document, send the SMS and place the call
    Send(SendArgs),
    /// Print both messages and the voice document without writing or sending
    Render(RenderArgs),
    /// Write the first GPS fix found in an NMEA capture as the location file
    Locate(LocateArgs),
    /// Validate configuration and print it with secrets redacted
    Check(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file; replaces config/klaxon.yaml and config/<env>.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Location file overriding `location.path`
    #[arg(short, long)]
    pub location: Option<PathBuf>,
    /// Write the voice document but only log the two requests
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
    /// Print Prometheus metrics to stdout when done
    #[arg(long, default_value_t = false)]
    pub print_metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Location file overriding `location.path`
    #[arg(short, long)]
    pub location: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LocateArgs {
    /// NMEA capture from the GPS receiver
    #[arg(long)]
    pub nmea: PathBuf,
    /// Location file to write; defaults to `location.path` from configuration
    #[arg(short, long, conflicts_with = "config")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Send(args) => send(args).await,
        Commands::Render(args) => render(args),
        Commands::Locate(args) => locate(args),
        Commands::Check(args) => check(args),
    }
}

/// Loads configuration and starts logging at the configured level. If
/// loading fails, logging starts at `info` so the failure is still visible.
fn load_config(
    path: Option<&Path>,
    loader: fn(Option<&Path>) -> Result<KlaxonConfig, ConfigError>,
) -> anyhow::Result<KlaxonConfig> {
    match loader(path) {
        Ok(config) => {
            EventLogger::init(&config.telemetry.log_level);
            Ok(config)
        }
        Err(e) => {
            EventLogger::init("info");
            Err(e).context("failed to load configuration")
        }
    }
}

fn settings(config: &KlaxonConfig, location: Option<PathBuf>) -> AlertSettings {
    let mut settings = AlertSettings::from(config);
    if let Some(location) = location {
        settings.location_path = location;
    }
    settings
}

async fn send(args: SendArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.config.as_deref(), KlaxonConfig::load)?;
    let settings = settings(&config, args.location);
    let metrics = MetricsRecorder::new().context("failed to register metrics")?;

    let report = if args.dry_run {
        run_pipeline(settings, DryRunNotifier, metrics.clone()).await?
    } else {
        let client =
            TwilioClient::new(&config.provider).context("failed to build provider client")?;
        let notifier = Retrying::new(client, RetryPolicy::from(&config.dispatch));
        run_pipeline(settings, notifier, metrics.clone()).await?
    };

    if args.print_metrics {
        print!("{}", metrics.gather_metrics()?);
    }

    let delivered = delivery(report)?;
    info!(sms = %delivered.sms.sid, call = %delivered.call.sid, "alert delivered");
    Ok(())
}

/// Turns a dispatch report into the command result. Any failed channel is an
/// error; when both fail, both are named.
fn delivery(report: DispatchReport) -> anyhow::Result<Delivered> {
    let failures = report.failures();
    if failures.len() > 1 {
        bail!(
            "alert not delivered: {}",
            failures
                .iter()
                .map(|(channel, e)| format!("{}: {}", channel, e))
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
    Ok(report.into_result()?)
}

async fn run_pipeline<N: Notifier>(
    settings: AlertSettings,
    notifier: N,
    metrics: MetricsRecorder,
) -> anyhow::Result<DispatchReport> {
    let pipeline = AlertPipeline::new(settings, notifier, metrics);
    Ok(pipeline.run().await?)
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.config.as_deref(), KlaxonConfig::load_for_render)?;
    let settings = settings(&config, args.location);
    let prepared = prepare_alert(&settings)?;

    println!("# law enforcement (voice call)");
    println!("{}", prepared.messages.law_enforcement.as_str());
    println!();
    println!("# public (SMS)");
    println!("{}", prepared.messages.public.as_str());
    println!();
    println!("# voice document -> {}", settings.document_path.display());
    print!("{}", prepared.document.render()?);
    Ok(())
}

fn locate(args: LocateArgs) -> anyhow::Result<()> {
    let output = match args.output {
        Some(output) => {
            EventLogger::init("info");
            output
        }
        None => {
            load_config(args.config.config.as_deref(), KlaxonConfig::load_for_render)?
                .location
                .path
        }
    };
    let fix = klaxon_engine::locate(&args.nmea, &output)?;
    println!("{}", fix.to_location_string());
    Ok(())
}

fn check(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref(), KlaxonConfig::load)?;
    print!("{}", serde_yaml::to_string(&config.redacted())?);
    Ok(())
}
