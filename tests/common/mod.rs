// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cds_sync::dnssec::{CdsResolver, SignatureInfo, SignedDnsAnswer};
use cds_sync::ds::DsRecord;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hickory_client::op::ResponseCode;
use hickory_client::rr::RecordType;
use serde_json::{json, Value};
use std::collections::HashMap;

/// `last-modified` of every fixture object
pub const LAST_MODIFIED: &str = "2024-03-01T12:00:00Z";

pub fn last_modified() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A `domain` object as returned by the REST API.
pub fn domain_json(domain: &str, ds: &[&str]) -> Value {
    let mut attributes = vec![
        json!({"name": "domain", "value": domain}),
        json!({"name": "descr", "value": "integration test zone"}),
        json!({"name": "nserver", "value": "ns1.example.net"}),
        json!({"name": "nserver", "value": "ns2.example.net"}),
    ];
    for value in ds {
        attributes.push(json!({"name": "ds-rdata", "value": value}));
    }
    attributes.push(json!({"name": "mnt-by", "value": "EXAMPLE-MNT", "referenced-type": "mntner"}));
    attributes.push(json!({"name": "created", "value": "2020-01-01T00:00:00Z"}));
    attributes.push(json!({"name": "last-modified", "value": LAST_MODIFIED}));
    attributes.push(json!({"name": "source", "value": "RIPE"}));

    json!({
        "type": "domain",
        "link": {"type": "locator", "href": format!("https://rest.db.ripe.net/ripe/domain/{domain}")},
        "source": {"id": "ripe"},
        "primary-key": {"attribute": [{"name": "domain", "value": domain}]},
        "attributes": {"attribute": attributes}
    })
}

/// Attribute list as it should be submitted: no `created` or `last-modified`.
pub fn submitted_attributes(domain: &str, ds: &[&str]) -> Value {
    let mut attributes = vec![
        json!({"name": "domain", "value": domain}),
        json!({"name": "descr", "value": "integration test zone"}),
        json!({"name": "nserver", "value": "ns1.example.net"}),
        json!({"name": "nserver", "value": "ns2.example.net"}),
    ];
    for value in ds {
        attributes.push(json!({"name": "ds-rdata", "value": value}));
    }
    attributes.push(json!({"name": "mnt-by", "value": "EXAMPLE-MNT", "referenced-type": "mntner"}));
    attributes.push(json!({"name": "source", "value": "RIPE"}));
    Value::Array(attributes)
}

/// Signed, authenticated CDS answer with the given inception.
pub fn signed_answer(records: &[&str], inception: DateTime<Utc>) -> SignedDnsAnswer {
    SignedDnsAnswer {
        authenticated: true,
        response_code: ResponseCode::NoError,
        records: records
            .iter()
            .map(|text| text.parse::<DsRecord>().unwrap())
            .collect(),
        signatures: vec![SignatureInfo {
            type_covered: RecordType::CDS,
            inception,
        }],
    }
}

/// Signed answer with an inception one hour after [`LAST_MODIFIED`].
pub fn fresh_answer(records: &[&str]) -> SignedDnsAnswer {
    signed_answer(records, last_modified() + Duration::hours(1))
}

/// Resolver serving canned answers; unknown domains fail like a timeout.
#[derive(Default)]
pub struct CannedResolver {
    answers: HashMap<String, SignedDnsAnswer>,
}

impl CannedResolver {
    pub fn with(mut self, domain: &str, answer: SignedDnsAnswer) -> Self {
        self.answers.insert(domain.to_string(), answer);
        self
    }
}

#[async_trait]
impl CdsResolver for CannedResolver {
    async fn query_cds(&self, domain: &str) -> anyhow::Result<SignedDnsAnswer> {
        self.answers
            .get(domain)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("query timed out"))
    }
}
