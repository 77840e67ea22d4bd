// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for cds-sync.
//!
//! This module provides specialized error types for:
//! - RPSL object access (missing or malformed required attributes)
//! - DS record parsing (text and wire forms)
//! - CDS validation (DNS failures, unauthenticated or stale answers)
//! - RIPE database REST API operations
//!
//! Validation failures are per-domain outcomes: the reconciler logs them and moves
//! on. Only attribute and registry errors surface from `process`, and even those
//! never stop a pass over the remaining domains.

use thiserror::Error;

/// Errors raised while reading attributes of an RPSL object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpslError {
    /// A required attribute is absent from the object.
    #[error("Required attribute '{attribute}' missing from object")]
    MissingAttribute {
        /// The attribute name that was looked up
        attribute: String,
    },

    /// A timestamp attribute could not be parsed.
    #[error("Attribute '{attribute}' has invalid timestamp '{value}': {reason}")]
    InvalidTimestamp {
        /// The attribute name
        attribute: String,
        /// The raw attribute value
        value: String,
        /// Parser error message
        reason: String,
    },
}

/// Errors raised while parsing a DS record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DsParseError {
    /// Text form does not have the four DS fields.
    #[error("DS record '{input}' must have key tag, algorithm, digest type and digest")]
    MissingField {
        /// The offending text
        input: String,
    },

    /// A numeric field is out of range or not a number.
    #[error("DS record field '{field}' has invalid value '{value}'")]
    InvalidNumber {
        /// Field name (`key tag`, `algorithm`, `digest type`)
        field: &'static str,
        /// The offending value
        value: String,
    },

    /// The digest is not valid hexadecimal.
    #[error("DS record digest '{digest}' is not valid hexadecimal")]
    InvalidDigest {
        /// The offending digest text
        digest: String,
    },

    /// Wire RDATA shorter than the fixed DS header.
    #[error("DS RDATA truncated: {len} bytes")]
    Truncated {
        /// Length of the RDATA that was received
        len: usize,
    },
}

/// Reasons a CDS answer is not trusted to drive a registry write.
///
/// Every variant is recoverable: the reconciler logs it and treats the domain as
/// needing no action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The resolver failed (timeout, NXDOMAIN, malformed answer, ...).
    #[error("DNS exception for '{domain}': {reason}")]
    DnsError {
        /// Queried domain
        domain: String,
        /// Transport error message
        reason: String,
    },

    /// The response code was not NOERROR.
    #[error("DNS response failure for '{domain}': {response_code}")]
    ResponseFailure {
        /// Queried domain
        domain: String,
        /// Response code returned by the resolver
        response_code: String,
    },

    /// The AD flag was not set on the response.
    #[error("Unauthenticated DNS response for '{domain}'")]
    Unauthenticated {
        /// Queried domain
        domain: String,
    },

    /// No RRSIG covering the CDS RRset was present in the answer.
    #[error("No RRSIG covering CDS for '{domain}'")]
    MissingSignature {
        /// Queried domain
        domain: String,
    },

    /// The signature was made at or before the last registry change.
    #[error("Signature inception too early for '{domain}': inception {inception}, last modified {last_modified}")]
    StaleSignature {
        /// Queried domain
        domain: String,
        /// RRSIG inception time
        inception: chrono::DateTime<chrono::Utc>,
        /// Registry `last-modified` time
        last_modified: chrono::DateTime<chrono::Utc>,
    },
}

impl ValidationFailure {
    /// Short machine-readable reason, used as a metrics label.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::DnsError { .. } => "DnsError",
            Self::ResponseFailure { .. } => "ResponseFailure",
            Self::Unauthenticated { .. } => "Unauthenticated",
            Self::MissingSignature { .. } => "MissingSignature",
            Self::StaleSignature { .. } => "StaleSignature",
        }
    }
}

/// Errors that can occur while talking to the RIPE database REST API.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        /// Requested URL, without credentials
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON document.
    #[error("Unexpected response body from {url}: {reason}")]
    Decode {
        /// Requested URL, without credentials
        url: String,
        /// Decoder error message
        reason: String,
    },

    /// The base URL or a path segment could not form a valid URL.
    #[error("Invalid registry URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Parser error message
        reason: String,
    },

    /// The update response contained no object.
    #[error("Registry returned no object for '{domain}' (HTTP {status})")]
    EmptyResponse {
        /// Domain being updated
        domain: String,
        /// HTTP status code of the response
        status: u16,
    },

    /// The registry reported at least one `Error` severity message.
    #[error("Registry rejected update of '{domain}': {}", .messages.join("; "))]
    Rejected {
        /// Domain being updated
        domain: String,
        /// Error messages as `<severity>: <text>`
        messages: Vec<String>,
    },
}

/// Composite error type returned by the reconciler for a single domain.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A required attribute was missing or malformed
    #[error(transparent)]
    Rpsl(#[from] RpslError),

    /// The registry update failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ReconcileError {
    /// Returns the status reason code for this error, used as a metrics label.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Rpsl(RpslError::MissingAttribute { .. }) => "MissingAttribute",
            Self::Rpsl(RpslError::InvalidTimestamp { .. }) => "InvalidTimestamp",
            Self::Registry(RegistryError::Http { .. }) => "RegistryHttpError",
            Self::Registry(RegistryError::Decode { .. }) => "RegistryDecodeError",
            Self::Registry(RegistryError::InvalidUrl { .. }) => "RegistryInvalidUrl",
            Self::Registry(RegistryError::EmptyResponse { .. }) => "RegistryEmptyResponse",
            Self::Registry(RegistryError::Rejected { .. }) => "RegistryRejected",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
