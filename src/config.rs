use crate::domain::data_store::TestConnectionMode;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3020)
    pub port: u16,
    /// LDAP ID pushed to the data store at startup (optional)
    pub ldap_id: Option<String>,
    /// JSON file of registered LDAP endpoints for the in-memory registry
    pub endpoints_file: Option<String>,
    /// Endpoint service URL; when set, endpoints are resolved over HTTP instead
    pub endpoint_service_url: Option<String>,
    /// Internal API key sent to the endpoint service
    pub internal_api_key: Option<String>,
    /// Connect timeout for directory sessions (transport default when unset)
    pub connect_timeout: Option<Duration>,
    /// How thorough the connection test is
    pub test_connection_mode: TestConnectionMode,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3020),
            ldap_id: non_empty_var("LDAP_ID"),
            endpoints_file: non_empty_var("LDAP_ENDPOINTS_FILE"),
            endpoint_service_url: non_empty_var("ENDPOINT_SERVICE_URL"),
            internal_api_key: non_empty_var("INTERNAL_API_KEY"),
            connect_timeout: env::var("LDAP_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            test_connection_mode: env::var("LDAP_TEST_CONNECTION_MODE")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or_default(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
