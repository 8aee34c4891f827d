use crate::domain::collector::collect_names;
use crate::domain::directory::{DirectorySession, DirectoryTransport};
use crate::domain::models::{
    AttributeValue, ConnectionParams, EndpointId, FieldList, ResultMap, SearchRequest, SearchResultSet,
    CONFIG_LDAP_ID, RESULT_FIELD,
};
use crate::domain::resolver::EndpointResolver;
use crate::error::{DataStoreError, DataStoreResult, FailureKind};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// How much `test_connection` exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestConnectionMode {
    /// Only check that the LDAP ID resolves to connection parameters.
    #[default]
    Resolver,
    /// Also open and close a bound session.
    Bind,
}

impl FromStr for TestConnectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resolver" => Ok(TestConnectionMode::Resolver),
            "bind" => Ok(TestConnectionMode::Bind),
            other => Err(format!("Unknown test connection mode: {}", other)),
        }
    }
}

/// The fields this data store can produce. Never varies.
pub fn available_fields() -> Vec<String> {
    vec![RESULT_FIELD.to_string()]
}

/// Runs subtree searches against one registered LDAP endpoint and returns the
/// DNs of matching entries.
///
/// Every public operation swallows failures: `retrieve_values` answers with an
/// empty map and `test_connection` with `false`. [`LdapDataStore::search`]
/// keeps the underlying error for callers that need it.
pub struct LdapDataStore {
    resolver: Arc<dyn EndpointResolver>,
    transport: Arc<dyn DirectoryTransport>,
    endpoint_id: Option<EndpointId>,
    test_mode: TestConnectionMode,
}

impl LdapDataStore {
    pub fn new(resolver: Arc<dyn EndpointResolver>, transport: Arc<dyn DirectoryTransport>) -> Self {
        Self {
            resolver,
            transport,
            endpoint_id: None,
            test_mode: TestConnectionMode::default(),
        }
    }

    pub fn with_test_connection_mode(mut self, mode: TestConnectionMode) -> Self {
        self.test_mode = mode;
        self
    }

    /// Store the LDAP ID. Nothing is contacted until the first operation.
    pub fn configure(&mut self, configuration: &FieldList) {
        self.endpoint_id = configuration.field_value(CONFIG_LDAP_ID).map(EndpointId::new);
    }

    pub fn endpoint_id(&self) -> Option<&EndpointId> {
        self.endpoint_id.as_ref()
    }

    pub fn available_fields(&self) -> Vec<String> {
        available_fields()
    }

    /// Whether the configured LDAP ID is usable. In the default mode this only
    /// resolves the endpoint; the directory itself is not contacted.
    pub async fn test_connection(&self) -> bool {
        match self.check_connection().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Connection test for LDAP ID {} failed: {}", self.label(), e);
                false
            }
        }
    }

    /// Search and map the result to `{"searchResult": [dn, ...]}`.
    ///
    /// `requested_fields` is accepted but not used; the single available field
    /// is always produced. Any failure yields an empty map.
    pub async fn retrieve_values(
        &self,
        _requested_fields: &[String],
        filter_configuration: Option<&FieldList>,
    ) -> ResultMap {
        let outcome = match SearchRequest::from_fields(filter_configuration) {
            Ok(request) => self.search(&request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(names) => {
                info!("LDAP ID {} search returned {} entries", self.label(), names.len());
                let mut values = ResultMap::new();
                values.insert(RESULT_FIELD.to_string(), AttributeValue::new(names));
                values
            }
            Err(e) => {
                warn!(
                    "Search against LDAP ID {} failed during {}: {}",
                    self.label(),
                    e.kind(),
                    e
                );
                ResultMap::new()
            }
        }
    }

    /// Resolve, bind, search and collect. The session is closed on every path
    /// once it has been opened.
    pub async fn search(&self, request: &SearchRequest) -> DataStoreResult<SearchResultSet> {
        let params = guarded(FailureKind::Resolution, self.resolve()).await?;
        let mut session = guarded(FailureKind::Connection, self.transport.open(&params)).await?;

        let outcome = guarded(FailureKind::Search, run_search(session.as_mut(), request)).await;
        let closed = guarded(FailureKind::Connection, session.close()).await;

        match (outcome, closed) {
            (Ok(names), Ok(())) => Ok(names),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!("Closing session to {} also failed: {}", params.server_url, close_err);
                Err(e)
            }
        }
    }

    async fn check_connection(&self) -> DataStoreResult<()> {
        let params = guarded(FailureKind::Resolution, self.resolve()).await?;

        if self.test_mode == TestConnectionMode::Bind {
            let session = guarded(FailureKind::Connection, self.transport.open(&params)).await?;
            guarded(FailureKind::Connection, session.close()).await?;
        }

        Ok(())
    }

    /// Fetch connection parameters fresh; they are never cached.
    async fn resolve(&self) -> DataStoreResult<ConnectionParams> {
        let endpoint_id = self.endpoint_id.as_ref().ok_or(DataStoreError::NotConfigured)?;

        self.resolver
            .resolve(endpoint_id)
            .await?
            .ok_or_else(|| DataStoreError::EndpointNotFound {
                endpoint_id: endpoint_id.to_string(),
            })
    }

    fn label(&self) -> &str {
        self.endpoint_id.as_ref().map(EndpointId::as_str).unwrap_or("<unconfigured>")
    }
}

async fn run_search(
    session: &mut (dyn DirectorySession + '_),
    request: &SearchRequest,
) -> DataStoreResult<SearchResultSet> {
    let mut stream = session.search(&request.base_dn, &request.filter).await?;
    collect_names(stream.as_mut()).await
}

/// Turn a panic inside `stage` into an ordinary error.
async fn guarded<T, F>(stage: FailureKind, operation: F) -> DataStoreResult<T>
where
    F: Future<Output = DataStoreResult<T>>,
{
    AssertUnwindSafe(operation)
        .catch_unwind()
        .await
        .unwrap_or(Err(DataStoreError::Panicked { stage }))
}
