use crate::domain::models::{ConnectionParams, EndpointId};
use crate::domain::resolver::EndpointResolver;
use crate::error::{DataStoreError, DataStoreResult};
use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::info;

/// In-memory registry of LDAP endpoints.
pub struct InMemoryEndpointRegistry {
    endpoints: RwLock<HashMap<String, ConnectionParams>>,
}

impl InMemoryEndpointRegistry {
    pub fn new() -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
        }
    }

    /// Load endpoints from a JSON object keyed by endpoint id:
    /// `{"LDAP1": {"principal": "...", "credentials": "...", "server_url": "ldap://..."}}`
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading LDAP endpoints from {}", path.display()))?;
        let endpoints: HashMap<String, ConnectionParams> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing LDAP endpoints in {}", path.display()))?;

        info!("Loaded {} LDAP endpoints from {}", endpoints.len(), path.display());

        Ok(Self {
            endpoints: RwLock::new(endpoints),
        })
    }

    /// Register or replace an endpoint. Replacements apply to the next lookup.
    pub fn register(&self, endpoint_id: impl Into<String>, params: ConnectionParams) -> DataStoreResult<()> {
        let mut endpoints = self.endpoints.write().map_err(|_| DataStoreError::Resolution {
            message: "Lock poisoned".to_string(),
        })?;
        endpoints.insert(endpoint_id.into(), params);
        Ok(())
    }

    pub fn len(&self) -> DataStoreResult<usize> {
        let endpoints = self.endpoints.read().map_err(|_| DataStoreError::Resolution {
            message: "Lock poisoned".to_string(),
        })?;
        Ok(endpoints.len())
    }
}

impl Default for InMemoryEndpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EndpointResolver for InMemoryEndpointRegistry {
    async fn resolve(&self, endpoint_id: &EndpointId) -> DataStoreResult<Option<ConnectionParams>> {
        let endpoints = self.endpoints.read().map_err(|_| DataStoreError::Resolution {
            message: "Lock poisoned".to_string(),
        })?;
        Ok(endpoints.get(endpoint_id.as_str()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_resolve_registered_and_unknown() {
        let registry = InMemoryEndpointRegistry::new();
        registry
            .register("LDAP1", ConnectionParams::new("cn=admin", "secret", "ldap://localhost"))
            .unwrap();

        let params = registry.resolve(&EndpointId::new("LDAP1")).await.unwrap().unwrap();
        assert_eq!(params.server_url, "ldap://localhost");
        assert!(registry.resolve(&EndpointId::new("BAD_ID")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_replaces_credentials() {
        let registry = InMemoryEndpointRegistry::new();
        registry
            .register("LDAP1", ConnectionParams::new("cn=admin", "old", "ldap://localhost"))
            .unwrap();
        registry
            .register("LDAP1", ConnectionParams::new("cn=admin", "rotated", "ldap://localhost"))
            .unwrap();

        let params = registry.resolve(&EndpointId::new("LDAP1")).await.unwrap().unwrap();
        assert_eq!(params.credentials.expose(), "rotated");
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("ldap-endpoints-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"LDAP1": {{"principal": "cn=admin", "credentials": "secret", "serverUrl": "ldaps://dir:636"}}}}"#
        )
        .unwrap();

        let registry = InMemoryEndpointRegistry::from_json_file(&path).unwrap();
        assert_eq!(registry.len().unwrap(), 1);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_poisoned_registry_is_resolution_failure() {
        let registry = std::sync::Arc::new(InMemoryEndpointRegistry::new());
        let poisoner = std::sync::Arc::clone(&registry);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.endpoints.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        let err = registry.len().unwrap_err();
        assert!(matches!(err, DataStoreError::Resolution { .. }));
        assert!(registry
            .register("LDAP1", ConnectionParams::new("cn=admin", "secret", "ldap://localhost"))
            .is_err());
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = InMemoryEndpointRegistry::from_json_file("/nonexistent/endpoints.json")
            .err()
            .unwrap();
        assert!(err.to_string().contains("reading LDAP endpoints"));
    }
}
