//! spinnaker-datadog CLI
//!
//! Feeds Spinnaker webhook payloads through the Datadog event templates.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use spinnaker_datadog_bridge::{
    classify, BridgeConfig, DatadogClient, DispatchResult, Dispatcher, DogStatsdClient,
    DryRunBackend, EventPoster, IncomingWebhook, Spout, TimingEmitter,
};

#[derive(Parser)]
#[command(name = "spinnaker-datadog")]
#[command(about = "Republish Spinnaker webhooks as Datadog events and metrics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one webhook payload with every template
    Handle {
        /// Template file (YAML or JSON)
        #[arg(long, short)]
        templates: PathBuf,
        /// Webhook payload file; reads stdin when omitted
        #[arg(long, short)]
        payload: Option<PathBuf>,
        /// Config file (defaults to ~/.config/spinnaker-datadog-bridge/config.json)
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Print events and metrics instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Check that every template compiles
    Validate {
        /// Template file (YAML or JSON)
        #[arg(long, short)]
        templates: PathBuf,
    },
    /// Decode a `<source>:<domain>:<status>` event type
    Classify {
        event_type: String,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("spinnaker_datadog_bridge=info,spinnaker_datadog=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Handle {
            templates,
            payload,
            config,
            dry_run,
        } => {
            let incoming = read_payload(payload.as_deref())?;
            let (poster, emitter) = build_backends(config.as_deref(), dry_run)?;
            let spout = Spout::from_template_file(poster, emitter, &templates)?;

            let mut dispatcher = Dispatcher::new();
            spout.attach_to_dispatcher(&mut dispatcher);
            if dispatcher.handler_count() == 0 {
                anyhow::bail!("No templates in {}", templates.display());
            }

            let results = dispatcher.dispatch(&incoming);
            let mut failed = 0;
            for (name, result) in &results {
                match result {
                    DispatchResult::Handled => println!("✅ {}", name),
                    DispatchResult::Failed(e) => {
                        failed += 1;
                        println!("❌ {}: {}", name, e);
                    }
                }
            }

            if failed > 0 {
                anyhow::bail!("{} of {} handlers failed", failed, results.len());
            }
        }
        Commands::Validate { templates } => {
            let backend = Arc::new(DryRunBackend::new());
            let spout = Spout::from_template_file(backend.clone(), backend, &templates)?;
            let failures = spout.validate();

            for (name, e) in &failures {
                println!("❌ {}: {}", name, e);
            }
            if !failures.is_empty() {
                anyhow::bail!(
                    "{} of {} templates failed to compile",
                    failures.len(),
                    spout.total_templates()
                );
            }
            println!("✅ {} templates OK", spout.total_templates());
        }
        Commands::Classify { event_type } => {
            let classified = classify(&event_type)?;
            println!("domain: {}", classified.domain);
            println!("status: {}", classified.status);
        }
    }

    Ok(())
}

fn read_payload(path: Option<&Path>) -> Result<IncomingWebhook> {
    let body = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read payload {}", path.display()))?,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Cannot read payload from stdin")?;
            body
        }
    };

    let incoming = IncomingWebhook::from_json(&body).context("Invalid webhook payload")?;
    debug!(event_type = %incoming.details.event_type, "Parsed webhook payload");
    Ok(incoming)
}

fn build_backends(
    config: Option<&Path>,
    dry_run: bool,
) -> Result<(Arc<dyn EventPoster>, Arc<dyn TimingEmitter>)> {
    if dry_run {
        info!("Dry-run mode, nothing will be sent");
        let backend = Arc::new(DryRunBackend::new());
        let poster: Arc<dyn EventPoster> = backend.clone();
        let emitter: Arc<dyn TimingEmitter> = backend;
        return Ok((poster, emitter));
    }

    let config = BridgeConfig::load(config)?;
    let poster: Arc<dyn EventPoster> = Arc::new(DatadogClient::new(config.datadog.clone())?);
    let emitter: Arc<dyn TimingEmitter> = Arc::new(
        DogStatsdClient::new(&config.statsd)
            .with_context(|| format!("Cannot reach DogStatsD at {}", config.statsd.addr))?,
    );
    info!(host = %config.datadog.host, statsd = %config.statsd.addr, "Datadog backends ready");

    Ok((poster, emitter))
}
