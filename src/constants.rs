// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for cds-sync.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// RPSL Attribute Names
// ============================================================================

/// Primary key attribute of a `domain` object
pub const ATTR_DOMAIN: &str = "domain";

/// Registry-assigned timestamp of the last write
pub const ATTR_LAST_MODIFIED: &str = "last-modified";

/// Registry-assigned creation timestamp
pub const ATTR_CREATED: &str = "created";

/// Nameserver attribute; `ds-rdata` attributes must follow the last one
pub const ATTR_NSERVER: &str = "nserver";

/// Delegation signer attribute, one per DS record
pub const ATTR_DS_RDATA: &str = "ds-rdata";

/// Attributes assigned by the registry that must not be submitted on update
pub const SERVER_ASSIGNED_ATTRIBUTES: &[&str] = &[ATTR_CREATED, ATTR_LAST_MODIFIED];

/// Column width of the `"<name>:"` key in RPSL text output
pub const RPSL_KEY_COLUMN_WIDTH: usize = 19;

/// Timestamp format of `created` / `last-modified` values
pub const RPSL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// ============================================================================
// RIPE Database REST API Constants
// ============================================================================

/// Default base URL of the RIPE database REST API
pub const DEFAULT_RIPE_API_URL: &str = "https://rest.db.ripe.net";

/// Registry source queried and updated
pub const RIPE_SOURCE: &str = "RIPE";

/// Lowercase source segment used in update URLs
pub const RIPE_SOURCE_PATH: &str = "ripe";

/// Object type handled by this tool
pub const OBJECT_TYPE_DOMAIN: &str = "domain";

/// Inverse lookup attribute used to enumerate maintained objects
pub const INVERSE_ATTRIBUTE_MNT_BY: &str = "mnt-by";

/// Search flags sent with the domain enumeration query
pub const SEARCH_FLAGS: &[&str] = &["no-referenced", "no-irt", "no-filtering"];

/// Error message severity that rejects an update
pub const SEVERITY_ERROR: &str = "Error";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port for queries
pub const DNS_PORT: u16 = 53;

/// Advertised EDNS0 UDP payload size for CDS queries
pub const EDNS_UDP_PAYLOAD_SIZE: u16 = 512;

/// EDNS version sent with queries
pub const EDNS_VERSION: u8 = 0;

/// Default DNS query timeout in seconds
pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;

/// Resolver used when none is configured and `/etc/resolv.conf` has none
pub const FALLBACK_RESOLVER: &str = "127.0.0.1:53";

/// System resolver configuration file
pub const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Fixed RRSIG RDATA header length up to and including the key tag (RFC 4034 §3.1)
pub const RRSIG_FIXED_HEADER_LEN: usize = 18;

/// Fixed DS RDATA header length before the digest (RFC 4034 §5.1)
pub const DS_FIXED_HEADER_LEN: usize = 4;

// ============================================================================
// Environment Variables
// ============================================================================

/// Environment variable carrying the maintainer password for updates
pub const ENV_PASSWORD: &str = "CDS_SYNC_PASSWORD";

/// Environment variable selecting the maintainer when `--maintainer` is absent
pub const ENV_MAINTAINER: &str = "CDS_SYNC_MAINTAINER";

/// Environment variable selecting the log output format (`text` or `json`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
