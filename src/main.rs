// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use cds_sync::{
    config::{Cli, Settings},
    constants::{ENV_LOG_FORMAT, TOKIO_WORKER_THREADS},
    dnssec::{DnssecValidator, HickoryCdsResolver},
    metrics,
    reconciler::ReconciliationEngine,
    registry::RipeDbClient,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let settings = Cli::parse().into_settings()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("cds-sync")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(settings))
}

/// Initialize logging.
///
/// Format: timestamp file:line LEVEL message. Respects `RUST_LOG` (default
/// `info`) and `RUST_LOG_FORMAT=json`.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(settings: Settings) -> Result<()> {
    init_tracing();

    info!(
        maintainer = %settings.maintainer,
        dry_run = settings.dry_run,
        "Starting CDS sync"
    );
    debug!(settings = ?settings, "Configuration loaded");

    if settings.password.is_none() {
        warn!("No update password set; the registry will reject updates");
    }

    let resolver = match settings.resolver {
        Some(server) => HickoryCdsResolver::new(server, settings.dns_timeout),
        None => HickoryCdsResolver::from_system_config(settings.dns_timeout),
    };
    info!(resolver = %resolver.server(), "Using validating resolver");

    let registry = RipeDbClient::new(&settings.api_url, settings.password.clone())
        .context("Failed to create RIPE database client")?;

    let engine = ReconciliationEngine::new(
        DnssecValidator::new(Arc::new(resolver)),
        Arc::new(registry),
        settings.dry_run,
    );

    let result = engine.run_pass(&settings.maintainer).await;

    if let Some(path) = &settings.metrics_file {
        match metrics::write_metrics_file(path) {
            Ok(()) => debug!(path = %path.display(), "Metrics written"),
            Err(e) => warn!("Failed to write metrics: {e:#}"),
        }
    }

    let summary = result.context("Failed to list maintained domains")?;
    info!("{summary}");
    Ok(())
}
