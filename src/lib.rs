// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # cds-sync - DNSSEC CDS to RIPE database synchronisation
//!
//! cds-sync reads the `domain` objects a maintainer owns in the RIPE database,
//! asks a validating resolver for each zone's CDS RRset, and rewrites the
//! object's `ds-rdata` attributes when the child publishes a fresh, authenticated
//! and different set of records (RFC 7344, RFC 8078).
//!
//! ## Modules
//!
//! - [`rpsl`] - Ordered attribute model of registry objects
//! - [`ds`] - DS record parsing and set comparison
//! - [`dnssec`] - CDS queries and validation gates
//! - [`registry`] - RIPE database REST API client
//! - [`reconciler`] - Per-domain processing and full passes
//! - [`config`] - Command-line and environment configuration
//! - [`metrics`] - Prometheus counters
//!
//! ## Example
//!
//! ```rust
//! use cds_sync::dnssec::{classify, DsOutcome};
//! use cds_sync::ds::DsRecordSet;
//!
//! let registry = DsRecordSet::from_values(["12345 8 2 ABCD"]);
//! let dns = DsRecordSet::from_values(["12345 8 2 abcd"]);
//!
//! assert_eq!(classify(&dns, &registry), DsOutcome::Matching);
//! ```

pub mod config;
pub mod constants;
pub mod dnssec;
pub mod ds;
pub mod errors;
pub mod metrics;
pub mod reconciler;
pub mod registry;
pub mod rpsl;
