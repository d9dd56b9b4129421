//! Ingress configuration synthesizer.
//!
//! # Architecture Overview
//!
//! ```text
//!   settings.toml ──→ config ──────────────────────────────┐
//!                                                          ▼
//!   snapshot.toml ──→ controller::snapshot ──→ controller::Reconciler
//!                                              │  annotations (+ resolver)
//!                                              │  backend slot store
//!                                              │  render (template)
//!                                              ▼
//!                                     stdout / --output file
//! ```
//!
//! Runs a single reconciliation cycle. Watching the cluster and reloading
//! the proxy are left to the surrounding tooling.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use ingress_synth::annotations::AnnotationExtractor;
use ingress_synth::config::{load_config, ControllerConfig};
use ingress_synth::controller::{ClusterSnapshot, Reconciler};
use ingress_synth::observability::{logging, metrics};
use ingress_synth::render::ConfigRenderer;
use ingress_synth::resolver::FileCertificateResolver;

#[derive(Parser)]
#[command(name = "ingress-synth")]
#[command(about = "Render proxy configuration from routing resources", long_about = None)]
struct Cli {
    /// Controller settings (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration template.
    #[arg(short, long, default_value = "templates/haproxy.tmpl")]
    template: PathBuf,

    /// Cluster snapshot with routes and endpoints (TOML).
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Write the document here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the assembled model as JSON instead of the document.
    #[arg(long)]
    dump_model: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ControllerConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ingress-synth starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let renderer = match ConfigRenderer::from_file(&cli.template) {
        Ok(renderer) => Arc::new(renderer),
        Err(e) => {
            tracing::error!(template = %cli.template.display(), error = %e, "Template unusable");
            return Err(e.into());
        }
    };

    let resolver = Arc::new(FileCertificateResolver::new(
        &config.controller.secrets_dir,
        &config.controller.default_namespace,
    ));
    let extractor = AnnotationExtractor::standard(&config, resolver);
    tracing::info!(
        parsers = ?extractor.parser_names(),
        prefix = %config.controller.annotation_prefix,
        slot_increment = config.proxy.backend_server_slots_increment,
        "Configuration loaded"
    );

    let reconciler = Reconciler::new(Arc::new(config), extractor, renderer);
    let snapshot = ClusterSnapshot::load(&cli.snapshot)?;
    let report = reconciler.reconcile(&snapshot).await?;

    if !report.denials.is_empty() {
        tracing::warn!(denials = report.denials.len(), "Some route features were denied");
    }

    let output = if cli.dump_model {
        serde_json::to_vec_pretty(&report.rendered.model)?
    } else {
        report.rendered.document.clone()
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            tracing::info!(path = %path.display(), bytes = output.len(), "Configuration written");
        }
        None => std::io::stdout().write_all(&output)?,
    }

    Ok(())
}
