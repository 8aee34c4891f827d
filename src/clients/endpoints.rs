use crate::domain::models::{ConnectionParams, EndpointId};
use crate::domain::resolver::EndpointResolver;
use crate::error::{DataStoreError, DataStoreResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

/// Resolves LDAP endpoints through the endpoint service.
pub struct HttpEndpointResolver {
    client: Client,
    base_url: String,
    internal_api_key: Option<String>,
}

impl HttpEndpointResolver {
    /// Create with an optional internal API key for S2S authentication.
    pub fn with_api_key(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            internal_api_key: api_key,
        }
    }

    /// The endpoint id is one escaped path segment, so `#`, `?` and `/` in it
    /// never address a different endpoint.
    fn endpoint_url(&self, endpoint_id: &EndpointId) -> DataStoreResult<Url> {
        let id = endpoint_id.as_str();
        // Dot segments are dropped by URL normalization
        if id == "." || id == ".." {
            return Err(DataStoreError::Resolution {
                message: format!("LDAP ID '{}' cannot be looked up", id),
            });
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| DataStoreError::Resolution {
            message: format!("Invalid endpoint service URL {}: {}", self.base_url, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| DataStoreError::Resolution {
                message: format!("Endpoint service URL {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["api", "internal", "ldap-endpoints"])
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl EndpointResolver for HttpEndpointResolver {
    /// Calls: GET {ENDPOINT_SERVICE_URL}/api/internal/ldap-endpoints/{id}
    async fn resolve(&self, endpoint_id: &EndpointId) -> DataStoreResult<Option<ConnectionParams>> {
        let url = self.endpoint_url(endpoint_id)?;

        debug!("Resolving LDAP endpoint from: {}", url);

        let mut request = self.client.get(url);

        if let Some(ref api_key) = self.internal_api_key {
            request = request.header("X-Internal-Api-Key", api_key);
        }

        let response = request.send().await.map_err(|e| DataStoreError::Resolution {
            message: format!("Endpoint service request failed: {}", e),
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DataStoreError::Resolution {
                message: format!("Endpoint service returned {}: {}", status, body),
            });
        }

        let params: ConnectionParams = response.json().await.map_err(|e| DataStoreError::Resolution {
            message: format!("Failed to parse endpoint response: {}", e),
        })?;

        Ok(Some(params))
    }
}
