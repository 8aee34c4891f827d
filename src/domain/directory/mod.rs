pub mod ldap;

use crate::domain::models::ConnectionParams;
use crate::error::DataStoreResult;
use async_trait::async_trait;

/// Attribute selector asking the server to return no attributes (RFC 4511).
pub const NO_ATTRIBUTES: &str = "1.1";

/// One message yielded by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchItem {
    /// A matching entry, identified by its full DN.
    Entry { dn: String },
    /// A continuation reference; carries no entry.
    Referral,
    /// An intermediate response; carries no entry.
    Intermediate,
}

impl SearchItem {
    pub fn entry(dn: impl Into<String>) -> Self {
        SearchItem::Entry { dn: dn.into() }
    }
}

/// Opens authenticated directory sessions.
#[async_trait]
pub trait DirectoryTransport: Send + Sync {
    /// Connect and simple-bind. A single attempt; no retry.
    async fn open(&self, params: &ConnectionParams) -> DataStoreResult<Box<dyn DirectorySession>>;
}

/// One authenticated connection.
///
/// Callers must `close` every session they open, on every path.
#[async_trait]
pub trait DirectorySession: Send {
    /// Start a subtree search under `base_dn` that returns no attributes.
    async fn search<'a>(
        &'a mut self,
        base_dn: &str,
        filter: &str,
    ) -> DataStoreResult<Box<dyn EntryStream + 'a>>;

    async fn close(self: Box<Self>) -> DataStoreResult<()>;
}

/// Lazy, forward-only sequence of search results.
#[async_trait]
pub trait EntryStream: Send {
    /// `Ok(None)` once the search has completed successfully.
    async fn next(&mut self) -> DataStoreResult<Option<SearchItem>>;
}
