use crate::domain::models::{ConnectionParams, EndpointId};
use crate::error::DataStoreResult;
use async_trait::async_trait;

/// Looks up the connection parameters of a registered LDAP endpoint.
///
/// `Ok(None)` means the endpoint is not registered; `Err` means the lookup
/// itself failed. Implementations must not cache: every call reflects the
/// current registration, so rotated credentials apply on the next call.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn resolve(&self, endpoint_id: &EndpointId) -> DataStoreResult<Option<ConnectionParams>>;
}
