//! Custom LDAP data store: runs parameterized subtree searches against a
//! registered LDAP endpoint and returns the DNs of matching entries.

pub mod api;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod storage;

use chrono::{DateTime, Utc};
use config::Config;
use domain::directory::DirectoryTransport;
use domain::models::FieldList;
use domain::{EndpointResolver, LdapDataStore};
use error::{AppError, AppResult};
use std::sync::{Arc, RwLock};
use std::time::Instant;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Config,
    pub resolver: Arc<dyn EndpointResolver>,
    pub transport: Arc<dyn DirectoryTransport>,
    data_store: RwLock<ConfiguredStore>,
    pub started_at: Instant,
}

struct ConfiguredStore {
    store: Arc<LdapDataStore>,
    configured_at: Option<DateTime<Utc>>,
}

impl AppState {
    /// Create state holding an unconfigured data store.
    pub fn new(
        config: Config,
        resolver: Arc<dyn EndpointResolver>,
        transport: Arc<dyn DirectoryTransport>,
    ) -> Self {
        let store = LdapDataStore::new(Arc::clone(&resolver), Arc::clone(&transport))
            .with_test_connection_mode(config.test_connection_mode);

        Self {
            config,
            resolver,
            transport,
            data_store: RwLock::new(ConfiguredStore {
                store: Arc::new(store),
                configured_at: None,
            }),
            started_at: Instant::now(),
        }
    }

    /// The current data store and when it was configured.
    pub fn current(&self) -> AppResult<(Arc<LdapDataStore>, Option<DateTime<Utc>>)> {
        let slot = self.data_store.read()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        Ok((Arc::clone(&slot.store), slot.configured_at))
    }

    pub fn current_store(&self) -> AppResult<Arc<LdapDataStore>> {
        self.current().map(|(store, _)| store)
    }

    /// Push a configuration. A new instance replaces the current one, so calls
    /// already running finish against the instance they started with.
    pub fn configure(
        &self,
        configuration: &FieldList,
    ) -> AppResult<(Arc<LdapDataStore>, DateTime<Utc>)> {
        let mut store = LdapDataStore::new(Arc::clone(&self.resolver), Arc::clone(&self.transport))
            .with_test_connection_mode(self.config.test_connection_mode);
        store.configure(configuration);
        let store = Arc::new(store);

        let configured_at = Utc::now();

        let mut slot = self.data_store.write()
            .map_err(|_| AppError::Internal("Lock poisoned".to_string()))?;
        *slot = ConfiguredStore {
            store: Arc::clone(&store),
            configured_at: Some(configured_at),
        };
        Ok((store, configured_at))
    }
}
