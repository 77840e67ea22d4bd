// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Flags come from [`Cli`]; the maintainer may also come from
//! `CDS_SYNC_MAINTAINER` and the update password only ever comes from
//! `CDS_SYNC_PASSWORD`, so it never shows up in a process listing.

use crate::constants::{
    DEFAULT_DNS_TIMEOUT_SECS, DEFAULT_RIPE_API_URL, DNS_PORT, ENV_MAINTAINER, ENV_PASSWORD,
};
use anyhow::{bail, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Propagate DNSSEC CDS records into RIPE database domain objects.
#[derive(Debug, Clone, Parser)]
#[command(name = "cds-sync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// RIPE database REST API base URL
    #[arg(long, default_value = DEFAULT_RIPE_API_URL)]
    pub api_url: String,

    /// Maintainer whose domain objects are processed (or CDS_SYNC_MAINTAINER)
    #[arg(long)]
    pub maintainer: Option<String>,

    /// Validating resolver as IP or IP:port (default: first nameserver in /etc/resolv.conf)
    #[arg(long, value_parser = parse_resolver)]
    pub resolver: Option<SocketAddr>,

    /// DNS query timeout in seconds
    #[arg(long, default_value_t = DEFAULT_DNS_TIMEOUT_SECS)]
    pub dns_timeout_secs: u64,

    /// Store updates instead of asking the registry for a dry run
    #[arg(long)]
    pub apply: bool,

    /// Write Prometheus metrics to this file after the pass
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,
}

/// Validated runtime settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the RIPE database REST API
    pub api_url: String,
    /// Maintainer whose `domain` objects are reconciled
    pub maintainer: String,
    /// Maintainer password from `CDS_SYNC_PASSWORD`, required unless dry run
    pub password: Option<String>,
    /// Validating resolver; `None` falls back to `/etc/resolv.conf`
    pub resolver: Option<SocketAddr>,
    /// Timeout for each CDS query
    pub dns_timeout: Duration,
    /// Submit updates with `dry-run` so the database stores nothing
    pub dry_run: bool,
    /// Prometheus textfile written after the pass
    pub metrics_file: Option<PathBuf>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url)
            .field("maintainer", &self.maintainer)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("resolver", &self.resolver)
            .field("dns_timeout", &self.dns_timeout)
            .field("dry_run", &self.dry_run)
            .field("metrics_file", &self.metrics_file)
            .finish()
    }
}

impl Cli {
    /// Merge the flags with the process environment.
    ///
    /// # Errors
    ///
    /// See [`Cli::into_settings_with`].
    pub fn into_settings(self) -> Result<Settings> {
        self.into_settings_with(|name| std::env::var(name).ok())
    }

    /// Merge the flags with variables looked up through `env`.
    ///
    /// Empty variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if no maintainer is given, if `--apply` is set without a
    /// password, or if the DNS timeout is zero.
    pub fn into_settings_with<F>(self, env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let Some(maintainer) = self
            .maintainer
            .filter(|m| !m.trim().is_empty())
            .or_else(|| lookup(ENV_MAINTAINER))
        else {
            bail!("No maintainer given: pass --maintainer or set {ENV_MAINTAINER}");
        };

        let password = lookup(ENV_PASSWORD);
        if self.apply && password.is_none() {
            bail!("--apply needs the update password in {ENV_PASSWORD}");
        }

        if self.dns_timeout_secs == 0 {
            bail!("--dns-timeout-secs must be at least 1");
        }

        Ok(Settings {
            api_url: self.api_url,
            maintainer: maintainer.trim().to_string(),
            password,
            resolver: self.resolver,
            dns_timeout: Duration::from_secs(self.dns_timeout_secs),
            dry_run: !self.apply,
            metrics_file: self.metrics_file,
        })
    }
}

/// Parse `IP`, `IP:port` or `[IPv6]:port`; a bare address gets port 53.
///
/// # Errors
///
/// Returns a message if the value is neither form.
pub fn parse_resolver(value: &str) -> std::result::Result<SocketAddr, String> {
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }
    value
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| format!("'{value}' is not an IP address or IP:port"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
