// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for cds-sync.
//!
//! All metrics use the namespace prefix `cds_sync_`. A pass is a short-lived
//! process, so metrics are not served over HTTP; the binary writes them to a
//! file for the node-exporter textfile collector when `--metrics-file` is set.
//!
//! # Metrics
//!
//! - `cds_sync_domains_processed_total{outcome}` - domains by result
//!   (`updated`, `no_action`, `error`)
//! - `cds_sync_validation_failures_total{reason}` - CDS answers rejected by validation
//! - `cds_sync_registry_updates_total{mode}` - updates sent (`dry_run`, `live`)
//! - `cds_sync_domain_duration_seconds` - time spent per domain
//!
//! # Example
//!
//! ```rust,no_run
//! use cds_sync::metrics::{gather_metrics, record_domain_outcome};
//!
//! record_domain_outcome("updated", std::time::Duration::from_millis(120));
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "cds_sync";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Domains processed by outcome
///
/// Labels:
/// - `outcome`: `updated`, `no_action` or `error`
pub static DOMAINS_PROCESSED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_domains_processed_total"),
        "Total number of domain objects processed by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// CDS answers rejected by validation
///
/// Labels:
/// - `reason`: `DnsError`, `ResponseFailure`, `Unauthenticated`, `MissingSignature`, `StaleSignature`
pub static VALIDATION_FAILURES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_validation_failures_total"),
        "Total number of CDS answers rejected by validation",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Registry updates sent
///
/// Labels:
/// - `mode`: `dry_run` or `live`
pub static REGISTRY_UPDATES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_registry_updates_total"),
        "Total number of registry updates sent",
    );
    let counter = CounterVec::new(opts, &["mode"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Time spent on one domain, DNS query and update included
pub static DOMAIN_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_domain_duration_seconds"),
        "Duration of processing one domain object in seconds",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = Histogram::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Record the outcome of processing one domain
///
/// # Arguments
/// * `outcome` - `updated`, `no_action` or `error`
/// * `duration` - Time spent on the domain
pub fn record_domain_outcome(outcome: &str, duration: Duration) {
    DOMAINS_PROCESSED_TOTAL.with_label_values(&[outcome]).inc();
    DOMAIN_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record a rejected CDS answer
pub fn record_validation_failure(reason: &str) {
    VALIDATION_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}

/// Record an update sent to the registry
pub fn record_registry_update(dry_run: bool) {
    let mode = if dry_run { "dry_run" } else { "live" };
    REGISTRY_UPDATES_TOTAL.with_label_values(&[mode]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

/// Write all metrics to `path` for the textfile collector.
///
/// The file is written next to its final location and renamed into place so a
/// scrape never sees a partial file.
///
/// # Errors
/// Returns error if encoding or writing fails
pub fn write_metrics_file(path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    let text = gather_metrics().context("Failed to encode metrics")?;
    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, text)
        .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move metrics into {}", path.display()))?;
    Ok(())
}
