// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CDS validation.
//!
//! The [`DnssecValidator`] asks a validating resolver for the CDS RRset of a
//! domain and only lets the answer through when:
//!
//! - the query succeeded with NOERROR (NXDOMAIN and SERVFAIL count as DNS
//!   errors, like timeouts),
//! - the resolver set the AD (authenticated data) flag,
//! - an RRSIG covering the CDS RRset is present,
//! - that signature's inception is strictly later than the registry's
//!   `last-modified` time.
//!
//! Signatures are not verified here; the AD flag from the resolver is trusted.
//! The surviving records are reduced to a [`DsRecordSet`] and classified
//! against the registry's current set as a [`DsOutcome`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cds_sync::dnssec::{DnssecValidator, HickoryCdsResolver};
//! use cds_sync::ds::DsRecordSet;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let resolver = HickoryCdsResolver::from_system_config(Duration::from_secs(5));
//! let validator = DnssecValidator::new(Arc::new(resolver));
//!
//! let last_modified = chrono::Utc::now();
//! let outcome = validator
//!     .validate("example.org", last_modified, &DsRecordSet::new())
//!     .await;
//! # }
//! ```

pub mod resolver;

pub use resolver::HickoryCdsResolver;

use crate::ds::{DsRecord, DsRecordSet};
use crate::errors::ValidationFailure;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hickory_client::op::ResponseCode;
use hickory_client::rr::RecordType;
use std::sync::Arc;
use tracing::{debug, info};

/// RRSIG fields needed for the freshness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    /// Record type the signature covers
    pub type_covered: RecordType,
    /// Time from which the signature is valid
    pub inception: DateTime<Utc>,
}

/// Result of one CDS query, reduced to what validation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDnsAnswer {
    /// AD flag from the response header
    pub authenticated: bool,
    /// Response code from the response header
    pub response_code: ResponseCode,
    /// CDS records owned by the query name
    pub records: Vec<DsRecord>,
    /// RRSIGs owned by the query name
    pub signatures: Vec<SignatureInfo>,
}

/// Transport that performs the CDS query.
#[async_trait]
pub trait CdsResolver: Send + Sync {
    /// Query the CDS RRset of `domain` with RD, AD and DNSSEC OK set.
    ///
    /// # Errors
    ///
    /// Returns an error for any transport or resolution failure.
    async fn query_cds(&self, domain: &str) -> anyhow::Result<SignedDnsAnswer>;
}

/// What the CDS RRset asks the registry to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DsOutcome {
    /// The child publishes exactly what the registry has
    Matching,
    /// The child publishes no CDS records
    NoChange,
    /// The child publishes a different, non-empty set of DS records
    Divergent(DsRecordSet),
    /// The child publishes only the delete-all sentinel
    DeleteAll,
}

/// Classify the DNS set against the registry set.
///
/// The sentinel is compared like any other set, so it yields `DeleteAll` even
/// against a registry without DS records.
#[must_use]
pub fn classify(dns_set: &DsRecordSet, registry_set: &DsRecordSet) -> DsOutcome {
    if dns_set.is_empty() {
        DsOutcome::NoChange
    } else if !dns_set.divergent(registry_set) {
        DsOutcome::Matching
    } else if dns_set.is_delete_all() {
        DsOutcome::DeleteAll
    } else {
        DsOutcome::Divergent(dns_set.clone())
    }
}

/// Gatekeeper between the child zone's CDS RRset and the registry.
#[derive(Clone)]
pub struct DnssecValidator {
    resolver: Arc<dyn CdsResolver>,
}

impl DnssecValidator {
    /// Create a validator over the given resolver.
    pub fn new(resolver: Arc<dyn CdsResolver>) -> Self {
        Self { resolver }
    }

    /// Query, check and classify the CDS RRset of `domain`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] if the answer cannot be trusted; callers
    /// treat every failure as "do nothing for this domain".
    pub async fn validate(
        &self,
        domain: &str,
        last_modified: DateTime<Utc>,
        registry_set: &DsRecordSet,
    ) -> Result<DsOutcome, ValidationFailure> {
        debug!(domain = %domain, "Querying CDS records");

        let answer =
            self.resolver
                .query_cds(domain)
                .await
                .map_err(|e| ValidationFailure::DnsError {
                    domain: domain.to_string(),
                    reason: format!("{e:#}"),
                })?;

        // NXDOMAIN and SERVFAIL arrive as answers but are resolution failures
        if matches!(
            answer.response_code,
            ResponseCode::NXDomain | ResponseCode::ServFail
        ) {
            return Err(ValidationFailure::DnsError {
                domain: domain.to_string(),
                reason: format!("resolver answered {:?}", answer.response_code),
            });
        }

        if answer.response_code != ResponseCode::NoError {
            return Err(ValidationFailure::ResponseFailure {
                domain: domain.to_string(),
                response_code: format!("{:?}", answer.response_code),
            });
        }

        if !answer.authenticated {
            return Err(ValidationFailure::Unauthenticated {
                domain: domain.to_string(),
            });
        }

        let inception = answer
            .signatures
            .iter()
            .find(|sig| sig.type_covered == RecordType::CDS)
            .map(|sig| sig.inception)
            .ok_or_else(|| ValidationFailure::MissingSignature {
                domain: domain.to_string(),
            })?;

        let dns_set: DsRecordSet = answer.records.into_iter().collect();

        info!(
            domain = %domain,
            inception = %inception,
            last_modified = %last_modified,
            "Inception: {inception}, last modified: {last_modified}"
        );
        info!(domain = %domain, "RIPE rdataset: {registry_set}");
        info!(domain = %domain, "DNS  rdataset: {dns_set}");

        if inception <= last_modified {
            return Err(ValidationFailure::StaleSignature {
                domain: domain.to_string(),
                inception,
                last_modified,
            });
        }

        Ok(classify(&dns_set, registry_set))
    }
}
