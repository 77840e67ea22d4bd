// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RIPE database REST API operations.
//!
//! Two calls are used:
//!
//! - `GET <base>/search.json` with an inverse `mnt-by` lookup to enumerate the
//!   `domain` objects a maintainer is responsible for,
//! - `PUT <base>/ripe/domain/<domain>` to replace one object.
//!
//! Both exchange the `whois-resources` JSON document. Error messages in a response
//! are logged with their severity; an `Error` severity message on an update is
//! returned as [`RegistryError::Rejected`].
//!
//! # Example
//!
//! ```rust,no_run
//! use cds_sync::registry::{Registry, RipeDbClient};
//!
//! # async fn example() -> Result<(), cds_sync::errors::RegistryError> {
//! let client = RipeDbClient::new("https://rest.db.ripe.net", Some("secret".to_string()))?;
//! for object in client.maintained_domains("EXAMPLE-MNT").await? {
//!     println!("{}", object.to_rpsl_text());
//! }
//! # Ok(())
//! # }
//! ```

use crate::constants::{
    INVERSE_ATTRIBUTE_MNT_BY, OBJECT_TYPE_DOMAIN, RIPE_SOURCE, RIPE_SOURCE_PATH, SEARCH_FLAGS,
    SEVERITY_ERROR,
};
use crate::errors::RegistryError;
use crate::rpsl::RpslObject;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// `whois-resources` document exchanged with the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisResources {
    /// Objects carried by the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<WhoisObjects>,
    /// Messages reported by the registry
    #[serde(
        default,
        rename = "errormessages",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_messages: Option<ErrorMessages>,
}

impl WhoisResources {
    /// Wrap a single object for submission.
    #[must_use]
    pub fn single(object: RpslObject) -> Self {
        Self {
            objects: Some(WhoisObjects {
                object: vec![object],
            }),
            error_messages: None,
        }
    }

    /// Take the carried objects, leaving none behind.
    pub fn take_objects(&mut self) -> Vec<RpslObject> {
        self.objects
            .take()
            .map(|objects| objects.object)
            .unwrap_or_default()
    }

    /// Messages reported by the registry, in response order.
    #[must_use]
    pub fn messages(&self) -> &[ErrorMessage] {
        self.error_messages
            .as_ref()
            .map(|m| m.error_message.as_slice())
            .unwrap_or_default()
    }
}

/// The `objects` member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoisObjects {
    /// Objects in response order
    #[serde(default)]
    pub object: Vec<RpslObject>,
}

/// The `errormessages` member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessages {
    /// Messages in response order
    #[serde(default, rename = "errormessage")]
    pub error_message: Vec<ErrorMessage>,
}

/// One registry message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// `Error`, `Warning` or `Info`
    pub severity: String,
    /// Message text with `%s` placeholders
    pub text: String,
    /// Placeholder values
    #[serde(default)]
    pub args: Vec<ErrorMessageArg>,
}

/// A placeholder value of an [`ErrorMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessageArg {
    /// Substituted value
    pub value: String,
}

impl ErrorMessage {
    /// Message text with each `%s` replaced by the next argument.
    #[must_use]
    pub fn formatted(&self) -> String {
        let mut args = self.args.iter();
        let mut parts = self.text.split("%s");
        let mut out = parts.next().unwrap_or_default().to_string();
        for part in parts {
            match args.next() {
                Some(arg) => out.push_str(&arg.value),
                None => out.push_str("%s"),
            }
            out.push_str(part);
        }
        out
    }

    /// Returns true if this message rejects the request.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case(SEVERITY_ERROR)
    }
}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.formatted())
    }
}

/// Registry operations used by the reconciler.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Every `domain` object maintained by `maintainer`, in response order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not JSON.
    async fn maintained_domains(&self, maintainer: &str) -> Result<Vec<RpslObject>, RegistryError>;

    /// Replace the object of `domain` and return the registry's copy of the result.
    ///
    /// `created` and `last-modified` are stripped before submission. With
    /// `dry_run` the registry validates the update without storing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the registry reports an `Error`
    /// message, or the response carries no object.
    async fn update_domain(
        &self,
        domain: &str,
        object: &RpslObject,
        dry_run: bool,
    ) -> Result<RpslObject, RegistryError>;
}

/// Build the API base URL, accepting a bare host as well as a full URL.
pub(crate) fn build_api_url(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", server.trim_end_matches('/'))
    }
}

/// URL text safe to log: credentials in the query string are dropped.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

/// [`Registry`] backed by the RIPE database REST API.
#[derive(Clone)]
pub struct RipeDbClient {
    /// HTTP client for API requests
    client: Arc<HttpClient>,
    /// API base URL, without trailing slash
    base_url: Url,
    /// Maintainer password sent with updates
    password: Option<Arc<String>>,
}

impl RipeDbClient {
    /// Create a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if `base_url` is not a valid base URL.
    pub fn new(base_url: &str, password: Option<String>) -> Result<Self, RegistryError> {
        Self::with_client(HttpClient::new(), base_url, password)
    }

    /// Create a client over an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] if `base_url` is not a valid base URL.
    pub fn with_client(
        client: HttpClient,
        base_url: &str,
        password: Option<String>,
    ) -> Result<Self, RegistryError> {
        let normalized = build_api_url(base_url);
        let base_url = Url::parse(&normalized).map_err(|e| RegistryError::InvalidUrl {
            url: normalized.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::InvalidUrl {
                url: normalized,
                reason: "cannot be a base URL".to_string(),
            });
        }

        Ok(Self {
            client: Arc::new(client),
            base_url,
            password: password.map(Arc::new),
        })
    }

    /// Base URL with `segments` appended to its path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RegistryError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of the domain search.
    fn search_url(&self, maintainer: &str) -> Result<Url, RegistryError> {
        let mut url = self.endpoint(&["search.json"])?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("query-string", maintainer)
                .append_pair("inverse-attribute", INVERSE_ATTRIBUTE_MNT_BY)
                .append_pair("type-filter", OBJECT_TYPE_DOMAIN);
            for flag in SEARCH_FLAGS {
                query.append_pair("flags", flag);
            }
            query.append_pair("source", RIPE_SOURCE);
        }
        Ok(url)
    }

    /// URL of the domain update, including credentials.
    fn update_url(&self, domain: &str, dry_run: bool) -> Result<Url, RegistryError> {
        let mut url = self.endpoint(&[RIPE_SOURCE_PATH, OBJECT_TYPE_DOMAIN, domain])?;

        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(password) = &self.password {
            params.push(("password", password.as_str()));
        }
        if dry_run {
            params.push(("dry-run", "true"));
        }
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Send a request and decode the `whois-resources` body, whatever the status.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<(u16, WhoisResources), RegistryError> {
        let safe_url = redacted(url);

        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| RegistryError::Http {
                url: safe_url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|source| RegistryError::Http {
                url: safe_url.clone(),
                source,
            })?;

        debug!(url = %safe_url, status = status, "HTTP API response from RIPE database");

        let resources =
            serde_json::from_str::<WhoisResources>(&text).map_err(|e| RegistryError::Decode {
                url: safe_url,
                reason: format!("HTTP {status}: {e}"),
            })?;

        Ok((status, resources))
    }
}

#[async_trait]
impl Registry for RipeDbClient {
    async fn maintained_domains(&self, maintainer: &str) -> Result<Vec<RpslObject>, RegistryError> {
        let url = self.search_url(maintainer)?;
        info!(
            method = "GET",
            url = %redacted(&url),
            maintainer = %maintainer,
            "HTTP API request to RIPE database"
        );

        let (status, mut resources) = self.execute(self.client.get(url.clone()), &url).await?;

        // A search without hits answers 404 with an explanatory message
        for message in resources.messages() {
            warn!(maintainer = %maintainer, status = status, "{message}");
        }

        let objects = resources.take_objects();
        info!(
            maintainer = %maintainer,
            count = objects.len(),
            "Found maintained domain objects"
        );
        Ok(objects)
    }

    async fn update_domain(
        &self,
        domain: &str,
        object: &RpslObject,
        dry_run: bool,
    ) -> Result<RpslObject, RegistryError> {
        let url = self.update_url(domain, dry_run)?;
        let body = WhoisResources::single(object.prepare_for_submission());

        info!(
            method = "PUT",
            url = %redacted(&url),
            dry_run = dry_run,
            auth_enabled = self.password.is_some(),
            "HTTP API request to RIPE database"
        );

        let (status, mut resources) = self
            .execute(self.client.put(url.clone()).json(&body), &url)
            .await?;

        let mut rejected = Vec::new();
        for message in resources.messages() {
            if message.is_error() {
                error!(domain = %domain, status = status, "{message}");
                rejected.push(message.to_string());
            } else {
                warn!(domain = %domain, status = status, "{message}");
            }
        }

        if !rejected.is_empty() {
            return Err(RegistryError::Rejected {
                domain: domain.to_string(),
                messages: rejected,
            });
        }

        resources
            .take_objects()
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::EmptyResponse {
                domain: domain.to_string(),
                status,
            })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
