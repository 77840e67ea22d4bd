// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Delegation signer (DS) records and record sets.
//!
//! CDS records published by a child zone and `ds-rdata` attributes stored in the
//! registry are both reduced to the canonical DS presentation form
//! (`<key tag> <algorithm> <digest type> <hex digest>`, lowercase hex, no digest
//! chunking) so the two sides can be compared as plain string sets.
//!
//! # Delete-all sentinel
//!
//! RFC 8078 §4 reserves the CDS record `0 0 0 00` to mean "remove every DS record
//! for this delegation". It is a normal-looking record on the wire but an empty
//! set semantically, so [`DsRecordSet::is_delete_all`] is the only place that
//! recognizes it.

use crate::constants::DS_FIXED_HEADER_LEN;
use crate::errors::DsParseError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A single DS (or CDS) record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DsRecord {
    /// Key tag of the referenced DNSKEY
    pub key_tag: u16,
    /// DNSSEC algorithm number
    pub algorithm: u8,
    /// Digest algorithm number
    pub digest_type: u8,
    /// Raw digest bytes
    pub digest: Vec<u8>,
}

impl DsRecord {
    /// The RFC 8078 delete-all record: all fields zero, one zero digest byte.
    #[must_use]
    pub fn delete_all() -> Self {
        Self {
            key_tag: 0,
            algorithm: 0,
            digest_type: 0,
            digest: vec![0],
        }
    }

    /// Returns true if this is the delete-all record.
    #[must_use]
    pub fn is_delete_all(&self) -> bool {
        self.key_tag == 0 && self.algorithm == 0 && self.digest_type == 0 && self.digest == [0]
    }

    /// Decode DS/CDS RDATA in wire format (RFC 4034 §5.1).
    ///
    /// # Errors
    ///
    /// Returns [`DsParseError::Truncated`] if the RDATA is shorter than the fixed header.
    pub fn from_wire(rdata: &[u8]) -> Result<Self, DsParseError> {
        if rdata.len() < DS_FIXED_HEADER_LEN {
            return Err(DsParseError::Truncated { len: rdata.len() });
        }

        Ok(Self {
            key_tag: u16::from_be_bytes([rdata[0], rdata[1]]),
            algorithm: rdata[2],
            digest_type: rdata[3],
            digest: rdata[DS_FIXED_HEADER_LEN..].to_vec(),
        })
    }
}

impl fmt::Display for DsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            hex::encode(&self.digest)
        )
    }
}

impl FromStr for DsRecord {
    type Err = DsParseError;

    /// Parse the presentation form. The digest may be split by whitespace and
    /// may use either hex case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let missing = || DsParseError::MissingField {
            input: s.to_string(),
        };

        let key_tag = parse_field(fields.next().ok_or_else(missing)?, "key tag")?;
        let algorithm = parse_field(fields.next().ok_or_else(missing)?, "algorithm")?;
        let digest_type = parse_field(fields.next().ok_or_else(missing)?, "digest type")?;

        let digest_text: String = fields.collect();
        if digest_text.is_empty() {
            return Err(missing());
        }
        let digest = hex::decode(&digest_text).map_err(|_| DsParseError::InvalidDigest {
            digest: digest_text.clone(),
        })?;

        Ok(Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }
}

fn parse_field<T: FromStr>(value: &str, field: &'static str) -> Result<T, DsParseError> {
    value.parse().map_err(|_| DsParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Reduce a DS value to its canonical text form.
///
/// Values that do not parse as DS records are kept, lowercased with whitespace
/// collapsed, so a malformed registry entry still compares unequal to any DNS record.
#[must_use]
pub fn canonical_ds_text(value: &str) -> String {
    match value.parse::<DsRecord>() {
        Ok(record) => record.to_string(),
        Err(_) => value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase(),
    }
}

/// An unordered, deduplicated set of DS records in canonical text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DsRecordSet(BTreeSet<String>);

impl DsRecordSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw DS text values (registry `ds-rdata` attributes).
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            values
                .into_iter()
                .map(|v| canonical_ds_text(v.as_ref()))
                .collect(),
        )
    }

    /// Returns true if the set is exactly the delete-all sentinel and nothing else.
    #[must_use]
    pub fn is_delete_all(&self) -> bool {
        self.0.len() == 1 && self.0.contains(&DsRecord::delete_all().to_string())
    }

    /// Returns true if the two sets differ. Symmetric; a set never diverges from itself.
    #[must_use]
    pub fn divergent(&self, other: &Self) -> bool {
        self.0 != other.0
    }

    /// Returns true if the set has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the canonical text forms in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<DsRecord> for DsRecordSet {
    fn from_iter<T: IntoIterator<Item = DsRecord>>(iter: T) -> Self {
        Self(iter.into_iter().map(|r| r.to_string()).collect())
    }
}

impl fmt::Display for DsRecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{value}'")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
#[path = "ds_tests.rs"]
mod ds_tests;
