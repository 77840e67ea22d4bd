// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CDS queries via hickory-client.
//!
//! Queries go over UDP to one recursive, validating resolver. The query sets
//! RD and AD and carries an EDNS0 OPT record with DO set and a 512 byte payload,
//! so the resolver returns the RRSIGs alongside the CDS RRset and reports the
//! validation result in the AD flag. A truncated UDP answer is retried over TCP.
//!
//! hickory is built without its DNSSEC record types, so CDS and RRSIG arrive as
//! opaque RDATA and are decoded here. The typed CDS decoder rejects the RFC 8078
//! delete-all record (digest type 0), which must reach the validator intact.

use super::{CdsResolver, SignatureInfo, SignedDnsAnswer};
use crate::constants::{
    DNS_PORT, EDNS_UDP_PAYLOAD_SIZE, EDNS_VERSION, FALLBACK_RESOLVER, RESOLV_CONF_PATH,
    RRSIG_FIXED_HEADER_LEN,
};
use crate::ds::DsRecord;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_client::rr::{Name, RecordType};
use hickory_client::tcp::TcpClientConnection;
use hickory_client::udp::UdpClientConnection;
use hickory_proto::serialize::binary::BinEncodable;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// [`CdsResolver`] backed by a single upstream resolver.
#[derive(Debug, Clone)]
pub struct HickoryCdsResolver {
    server: SocketAddr,
    timeout: Duration,
}

impl HickoryCdsResolver {
    /// Create a resolver that queries `server`.
    #[must_use]
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        Self { server, timeout }
    }

    /// Create a resolver using the first nameserver in `/etc/resolv.conf`.
    ///
    /// Falls back to `127.0.0.1:53` if the file is unreadable or lists none.
    #[must_use]
    pub fn from_system_config(timeout: Duration) -> Self {
        let server = std::fs::read_to_string(RESOLV_CONF_PATH)
            .ok()
            .and_then(|contents| first_nameserver(&contents))
            .unwrap_or_else(|| {
                warn!(
                    "No nameserver found in {}, using {}",
                    RESOLV_CONF_PATH, FALLBACK_RESOLVER
                );
                SocketAddr::from(([127, 0, 0, 1], DNS_PORT))
            });

        Self::new(server, timeout)
    }

    /// The upstream resolver address.
    #[must_use]
    pub fn server(&self) -> SocketAddr {
        self.server
    }
}

#[async_trait]
impl CdsResolver for HickoryCdsResolver {
    async fn query_cds(&self, domain: &str) -> Result<SignedDnsAnswer> {
        let domain_str = domain.to_string();
        let server = self.server;
        let timeout = self.timeout;

        // hickory's SyncClient blocks; keep it off the async worker threads
        tokio::task::spawn_blocking(move || {
            let qname = Name::from_str(&format!("{}.", domain_str.trim_end_matches('.')))
                .with_context(|| format!("Invalid domain name: {domain_str}"))?;

            let response = exchange_with_tcp_fallback(
                || {
                    let conn = UdpClientConnection::with_timeout(server, timeout)
                        .context("Failed to create UDP connection for query")?;
                    debug!(server = %server, qname = %qname, "Sending CDS query over UDP");
                    send_query(&SyncClient::new(conn), &qname)
                },
                || {
                    let conn = TcpClientConnection::with_timeout(server, timeout)
                        .context("Failed to create TCP connection for query")?;
                    debug!(
                        server = %server,
                        qname = %qname,
                        "Retrying truncated CDS query over TCP"
                    );
                    send_query(&SyncClient::new(conn), &qname)
                },
            )?;

            answer_from_response(&qname, &response)
        })
        .await
        .context("DNS query task failed")?
    }
}

/// Send one CDS query and return the first response.
fn send_query<C: Client>(client: &C, qname: &Name) -> Result<Message> {
    let response = client
        .send(build_cds_query(qname.clone()))
        .into_iter()
        .next()
        .context("Resolver returned no response")?
        .with_context(|| format!("Failed to query CDS record for {qname}"))?;

    Ok((*response).clone())
}

/// Run the UDP exchange and repeat it with `tcp` if the answer came back truncated.
///
/// # Errors
///
/// Returns the error of whichever exchange was used last.
pub fn exchange_with_tcp_fallback<U, T>(udp: U, tcp: T) -> Result<Message>
where
    U: FnOnce() -> Result<Message>,
    T: FnOnce() -> Result<Message>,
{
    let response = udp()?;
    if !response.truncated() {
        return Ok(response);
    }

    debug!("UDP answer truncated");
    tcp()
}

/// Build the CDS query message: RD, AD, EDNS0 with DO and a 512 byte payload.
#[must_use]
pub fn build_cds_query(qname: Name) -> Message {
    let mut message = Message::new();
    message
        .set_id(rand::random::<u16>())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .set_authentic_data(true)
        .add_query(Query::query(qname, RecordType::CDS));

    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_UDP_PAYLOAD_SIZE);
    edns.set_version(EDNS_VERSION);
    edns.set_dnssec_ok(true);
    message.set_edns(edns);

    message
}

/// Reduce a response to the CDS records and RRSIGs owned by `qname`.
///
/// # Errors
///
/// Returns an error if a CDS or RRSIG record cannot be decoded.
pub fn answer_from_response(qname: &Name, response: &Message) -> Result<SignedDnsAnswer> {
    let mut rdata = Vec::new();
    for record in response.answers() {
        if record.name() != qname {
            continue;
        }
        let Some(data) = record.data() else {
            continue;
        };
        let bytes = data
            .to_bytes()
            .with_context(|| format!("Failed to encode {} RDATA", record.record_type()))?;
        rdata.push((record.record_type(), bytes));
    }

    answer_from_rdata(response.authentic_data(), response.response_code(), rdata)
}

/// Build a [`SignedDnsAnswer`] from `(type, wire RDATA)` pairs of the answer section.
///
/// # Errors
///
/// Returns an error if a CDS or RRSIG record cannot be decoded.
pub fn answer_from_rdata<I>(
    authenticated: bool,
    response_code: hickory_client::op::ResponseCode,
    rdata: I,
) -> Result<SignedDnsAnswer>
where
    I: IntoIterator<Item = (RecordType, Vec<u8>)>,
{
    let mut records = Vec::new();
    let mut signatures = Vec::new();

    for (record_type, bytes) in rdata {
        match record_type {
            RecordType::CDS => {
                records.push(DsRecord::from_wire(&bytes).context("Malformed CDS RDATA")?);
            }
            RecordType::RRSIG => signatures.push(parse_rrsig(&bytes)?),
            _ => {}
        }
    }

    Ok(SignedDnsAnswer {
        authenticated,
        response_code,
        records,
        signatures,
    })
}

/// Decode the type-covered and inception fields of RRSIG RDATA (RFC 4034 §3.1).
///
/// # Errors
///
/// Returns an error if the RDATA is shorter than the fixed RRSIG header.
pub fn parse_rrsig(rdata: &[u8]) -> Result<SignatureInfo> {
    if rdata.len() < RRSIG_FIXED_HEADER_LEN {
        bail!("RRSIG RDATA truncated: {} bytes", rdata.len());
    }

    let type_covered = RecordType::from(u16::from_be_bytes([rdata[0], rdata[1]]));
    let inception_secs = u32::from_be_bytes([rdata[12], rdata[13], rdata[14], rdata[15]]);
    let inception = DateTime::<Utc>::from_timestamp(i64::from(inception_secs), 0)
        .context("RRSIG inception out of range")?;

    Ok(SignatureInfo {
        type_covered,
        inception,
    })
}

/// First `nameserver` entry of a resolv.conf file, on port 53.
#[must_use]
pub fn first_nameserver(resolv_conf: &str) -> Option<SocketAddr> {
    resolv_conf
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("nameserver") => parts.next(),
                _ => None,
            }
        })
        // Drop an IPv6 zone index (fe80::1%eth0)
        .filter_map(|addr| addr.split('%').next()?.parse::<IpAddr>().ok())
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .next()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
