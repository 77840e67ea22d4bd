// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RPSL objects as returned by the RIPE database REST API.
//!
//! An object is an ordered list of `(name, value)` attributes. Names repeat
//! (`nserver`, `ds-rdata`, `mnt-by`, ...) and their order matters: the registry
//! requires every `ds-rdata` attribute to follow the nameservers. The accessors
//! here keep that ordering rule in one place.
//!
//! JSON members this crate does not interpret (`type`, `link`, `source`,
//! `primary-key`, per-attribute `referenced-type`, ...) are carried through
//! untouched so an object can be submitted back as it was read.

use crate::constants::{
    ATTR_DOMAIN, ATTR_DS_RDATA, ATTR_LAST_MODIFIED, ATTR_NSERVER, RPSL_KEY_COLUMN_WIDTH,
    RPSL_TIMESTAMP_FORMAT, SERVER_ASSIGNED_ATTRIBUTES,
};
use crate::ds::DsRecordSet;
use crate::errors::RpslError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write as _;

/// One `name: value` line of an RPSL object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, e.g. `nserver`
    pub name: String,
    /// Attribute value as stored by the registry
    pub value: String,
    /// Extra JSON members (`link`, `referenced-type`, `comment`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attribute {
    /// Create an attribute with no extra JSON members.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            extra: Map::new(),
        }
    }
}

/// The `attributes` member of an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeList {
    /// Attributes in registry order
    #[serde(default)]
    pub attribute: Vec<Attribute>,
}

/// A registry object, typically of type `domain`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpslObject {
    /// Ordered attribute list
    pub attributes: AttributeList,
    /// Other object members (`type`, `link`, `source`, `primary-key`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RpslObject {
    /// Build an object from `(name, value)` pairs.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            attributes: AttributeList {
                attribute: pairs
                    .into_iter()
                    .map(|(name, value)| Attribute::new(name, value))
                    .collect(),
            },
            extra: Map::new(),
        }
    }

    /// Attributes in registry order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes.attribute
    }

    /// Lowercased values of every attribute called `name`, in order.
    pub fn attributes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = String> + 'a {
        self.attributes()
            .iter()
            .filter(move |a| a.name == name)
            .map(|a| a.value.to_lowercase())
    }

    /// Lowercased value of the first attribute called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RpslError::MissingAttribute`] if the object has no such attribute.
    pub fn first_attribute_named(&self, name: &str) -> Result<String, RpslError> {
        self.attributes_named(name)
            .next()
            .ok_or_else(|| RpslError::MissingAttribute {
                attribute: name.to_string(),
            })
    }

    /// The `domain` primary key.
    ///
    /// # Errors
    ///
    /// Returns [`RpslError::MissingAttribute`] if the attribute is absent.
    pub fn domain_name(&self) -> Result<String, RpslError> {
        self.first_attribute_named(ATTR_DOMAIN)
    }

    /// The `last-modified` timestamp as UTC.
    ///
    /// # Errors
    ///
    /// Returns [`RpslError::MissingAttribute`] if the attribute is absent, or
    /// [`RpslError::InvalidTimestamp`] if it is not `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn last_modified(&self) -> Result<DateTime<Utc>, RpslError> {
        let value = self.first_attribute_named(ATTR_LAST_MODIFIED)?;

        // Values are lowercased on read; the format literals are uppercase.
        NaiveDateTime::parse_from_str(&value.to_uppercase(), RPSL_TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| RpslError::InvalidTimestamp {
                attribute: ATTR_LAST_MODIFIED.to_string(),
                value,
                reason: e.to_string(),
            })
    }

    /// The `ds-rdata` values currently on the object.
    #[must_use]
    pub fn ds_record_set(&self) -> DsRecordSet {
        DsRecordSet::from_values(self.attributes_named(ATTR_DS_RDATA))
    }

    /// Remove every attribute called `name`, keeping the order of the rest.
    pub fn remove_attributes_named(&mut self, name: &str) {
        self.attributes.attribute.retain(|a| a.name != name);
    }

    /// Insert one `ds-rdata` attribute per value directly after the last `nserver`.
    ///
    /// Without any `nserver` attribute the records go to the start of the list.
    pub fn insert_ds_records<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = self
            .attributes()
            .iter()
            .rposition(|a| a.name == ATTR_NSERVER)
            .map_or(0, |i| i + 1);

        let new_attributes = values
            .into_iter()
            .map(|value| Attribute::new(ATTR_DS_RDATA, value));

        self.attributes
            .attribute
            .splice(index..index, new_attributes);
    }

    /// Render the object as RPSL text, one `name: value` line per attribute.
    ///
    /// Used for log output only; updates are always submitted as JSON.
    #[must_use]
    pub fn to_rpsl_text(&self) -> String {
        let mut out = String::new();
        for attribute in self.attributes() {
            let key = format!("{}:", attribute.name);
            let _ = writeln!(
                out,
                "{key:width$} {}",
                attribute.value,
                width = RPSL_KEY_COLUMN_WIDTH
            );
        }
        out
    }

    /// Copy of the object without the registry-assigned `created` and
    /// `last-modified` attributes.
    #[must_use]
    pub fn prepare_for_submission(&self) -> Self {
        let mut prepared = self.clone();
        prepared
            .attributes
            .attribute
            .retain(|a| !SERVER_ASSIGNED_ATTRIBUTES.contains(&a.name.as_str()));
        prepared
    }
}

#[cfg(test)]
#[path = "rpsl_tests.rs"]
mod rpsl_tests;
