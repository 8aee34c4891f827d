use crate::error::{DataStoreError, DataStoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Configuration field holding the endpoint identifier.
pub const CONFIG_LDAP_ID: &str = "LDAP ID";
/// Filter field holding the search base.
pub const FILTER_BASE_DN: &str = "Base DN";
/// Filter field holding the LDAP filter expression.
pub const FILTER_LDAP_FILTER: &str = "Filter";
/// The one field this data store produces.
pub const RESULT_FIELD: &str = "searchResult";

/// Identifier of a registered LDAP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bind credentials. Never printed.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credentials(****)")
    }
}

/// Connection parameters of a registered endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionParams {
    pub principal: String,
    pub credentials: Credentials,
    #[serde(alias = "serverUrl")]
    pub server_url: String,
}

impl ConnectionParams {
    pub fn new(
        principal: impl Into<String>,
        credentials: impl Into<String>,
        server_url: impl Into<String>,
    ) -> Self {
        Self {
            principal: principal.into(),
            credentials: Credentials::new(credentials),
            server_url: server_url.into(),
        }
    }
}

/// Host-style list of named field values, used for both the configuration
/// push and the per-call filter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldList {
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A single subtree search, taken verbatim from the filter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base_dn: String,
    pub filter: String,
}

impl SearchRequest {
    pub fn new(base_dn: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            filter: filter.into(),
        }
    }

    /// Build a request from the filter configuration. Both fields must be
    /// present; their text is not validated.
    pub fn from_fields(fields: Option<&FieldList>) -> DataStoreResult<Self> {
        let lookup = |field: &'static str| {
            fields
                .and_then(|f| f.field_value(field))
                .map(String::from)
                .ok_or(DataStoreError::MissingField { field })
        };

        Ok(Self {
            base_dn: lookup(FILTER_BASE_DN)?,
            filter: lookup(FILTER_LDAP_FILTER)?,
        })
    }
}

/// Entry DNs in the order the server yielded them.
pub type SearchResultSet = Vec<String>;

/// Typed container for a multi-valued result attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeValue(Vec<String>);

impl AttributeValue {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of `retrieve_values`: field name to value.
pub type ResultMap = HashMap<String, AttributeValue>;
