// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of registry DS records with published CDS records.
//!
//! One pass works through every `domain` object a maintainer owns:
//!
//! 1. **Read** - domain name, `last-modified` and current `ds-rdata` values
//! 2. **Validate** - query and check the child's CDS RRset
//! 3. **Update** - rewrite the `ds-rdata` attributes and submit the object
//! 4. **Echo** - log the registry's copy of the result as RPSL text
//!
//! Domains are processed strictly one after another. A failure on one domain is
//! logged and counted, then the pass moves on.
//!
//! # Example
//!
//! ```rust,no_run
//! use cds_sync::dnssec::{DnssecValidator, HickoryCdsResolver};
//! use cds_sync::reconciler::ReconciliationEngine;
//! use cds_sync::registry::RipeDbClient;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = HickoryCdsResolver::from_system_config(Duration::from_secs(5));
//! let registry = RipeDbClient::new("https://rest.db.ripe.net", Some("s3cr3t".into()))?;
//! let engine = ReconciliationEngine::new(
//!     DnssecValidator::new(Arc::new(resolver)),
//!     Arc::new(registry),
//!     true,
//! );
//!
//! let summary = engine.run_pass("EXAMPLE-MNT").await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

use crate::constants::ATTR_DS_RDATA;
use crate::dnssec::{DnssecValidator, DsOutcome};
use crate::errors::{ReconcileError, RegistryError};
use crate::metrics;
use crate::registry::Registry;
use crate::rpsl::RpslObject;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Result of processing one domain object.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Nothing was submitted
    NoAction,
    /// An update was submitted; holds the registry's copy of the object
    Updated(RpslObject),
}

/// Counts for one pass over a maintainer's domains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Domain objects returned by the search
    pub total: usize,
    /// Domains for which an update was submitted
    pub updated: usize,
    /// Domains that needed no update or failed validation
    pub unchanged: usize,
    /// Domains that hit an attribute or registry error
    pub failed: usize,
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} domains: {} updated, {} unchanged, {} failed",
            self.total, self.updated, self.unchanged, self.failed
        )
    }
}

/// Rewrite the `ds-rdata` attributes of `object` for `outcome`.
///
/// Returns `true` if the object changed and should be submitted.
pub fn apply_ds_outcome(object: &mut RpslObject, outcome: &DsOutcome) -> bool {
    match outcome {
        DsOutcome::Matching | DsOutcome::NoChange => false,
        DsOutcome::DeleteAll => {
            object.remove_attributes_named(ATTR_DS_RDATA);
            true
        }
        DsOutcome::Divergent(dns_set) => {
            object.remove_attributes_named(ATTR_DS_RDATA);
            object.insert_ds_records(dns_set.iter());
            true
        }
    }
}

/// Drives validation and registry updates for domain objects.
pub struct ReconciliationEngine {
    validator: DnssecValidator,
    registry: Arc<dyn Registry>,
    dry_run: bool,
}

impl ReconciliationEngine {
    /// Create an engine. With `dry_run` the registry validates updates without
    /// storing them.
    pub fn new(validator: DnssecValidator, registry: Arc<dyn Registry>, dry_run: bool) -> Self {
        Self {
            validator,
            registry,
            dry_run,
        }
    }

    /// Process one domain object.
    ///
    /// Validation failures are logged and yield [`ProcessOutcome::NoAction`].
    ///
    /// # Errors
    ///
    /// Returns an error if the object lacks `domain` or `last-modified`, or if
    /// the registry update fails.
    pub async fn process(&self, mut object: RpslObject) -> Result<ProcessOutcome, ReconcileError> {
        let domain = object.domain_name()?;
        info!(domain = %domain, "Domain: {domain}");

        let last_modified = object.last_modified()?;
        let registry_set = object.ds_record_set();

        let outcome = match self
            .validator
            .validate(&domain, last_modified, &registry_set)
            .await
        {
            Ok(outcome) => outcome,
            Err(failure) => {
                warn!(domain = %domain, reason = failure.reason(), "{failure}");
                metrics::record_validation_failure(failure.reason());
                return Ok(ProcessOutcome::NoAction);
            }
        };

        debug!(domain = %domain, outcome = ?outcome, "Classified CDS records");

        if !apply_ds_outcome(&mut object, &outcome) {
            return Ok(ProcessOutcome::NoAction);
        }

        info!(domain = %domain, dry_run = self.dry_run, "updating DB record");
        let echo = self
            .registry
            .update_domain(&domain, &object, self.dry_run)
            .await?;
        metrics::record_registry_update(self.dry_run);

        info!(domain = %domain, "\n{}", echo.to_rpsl_text());

        Ok(ProcessOutcome::Updated(echo))
    }

    /// Process every domain object maintained by `maintainer`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the domain search itself fails; per-domain
    /// errors are logged and counted in the summary.
    pub async fn run_pass(&self, maintainer: &str) -> Result<PassSummary, RegistryError> {
        let domains = self.registry.maintained_domains(maintainer).await?;
        info!(
            maintainer = %maintainer,
            count = domains.len(),
            "Found {} domain objects",
            domains.len()
        );

        let mut summary = PassSummary {
            total: domains.len(),
            ..PassSummary::default()
        };

        for object in domains {
            let start = Instant::now();
            let label = match self.process(object).await {
                Ok(ProcessOutcome::Updated(_)) => {
                    summary.updated += 1;
                    "updated"
                }
                Ok(ProcessOutcome::NoAction) => {
                    summary.unchanged += 1;
                    "no_action"
                }
                Err(e) => {
                    error!(reason = e.status_reason(), "Failed to process domain: {e}");
                    summary.failed += 1;
                    "error"
                }
            };
            metrics::record_domain_outcome(label, start.elapsed());
        }

        info!(maintainer = %maintainer, "Pass complete: {summary}");
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
