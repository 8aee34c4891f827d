//! Directory transport backed by the `ldap3` async client.

use crate::domain::directory::{DirectorySession, DirectoryTransport, EntryStream, SearchItem, NO_ATTRIBUTES};
use crate::domain::models::ConnectionParams;
use crate::error::{DataStoreError, DataStoreResult};
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, ResultEntry, Scope, SearchEntry, SearchStream};
use std::time::Duration;
use tracing::{debug, warn};

/// LDAP result code for invalidCredentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Opens one simple-bound `ldap3` connection per session.
#[derive(Debug, Clone, Default)]
pub struct LdapTransport {
    connect_timeout: Option<Duration>,
}

impl LdapTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the TCP/TLS connect phase. Without it the client default applies.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl DirectoryTransport for LdapTransport {
    async fn open(&self, params: &ConnectionParams) -> DataStoreResult<Box<dyn DirectorySession>> {
        let mut settings = LdapConnSettings::new();
        if let Some(timeout) = self.connect_timeout {
            settings = settings.set_conn_timeout(timeout);
        }

        debug!("Connecting to LDAP server {}", params.server_url);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &params.server_url)
            .await
            .map_err(|e| DataStoreError::connection(&params.server_url, e))?;

        // Drive the connection until unbind
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection driver error: {}", e);
            }
        });

        debug!("Binding to {} as {}", params.server_url, params.principal);

        let bind = ldap
            .simple_bind(&params.principal, params.credentials.expose())
            .await
            .map_err(|e| DataStoreError::connection(&params.server_url, e));

        let failure = match bind {
            Ok(result) if result.rc == 0 => None,
            Ok(result) if result.rc == RC_INVALID_CREDENTIALS => Some(DataStoreError::InvalidCredentials {
                principal: params.principal.clone(),
            }),
            Ok(result) => Some(DataStoreError::connection(
                &params.server_url,
                format!("bind returned rc={} {}", result.rc, result.text),
            )),
            Err(e) => Some(e),
        };

        if let Some(err) = failure {
            // The socket is up even though the bind failed
            if let Err(e) = ldap.unbind().await {
                debug!("Unbind after failed bind to {}: {}", params.server_url, e);
            }
            return Err(err);
        }

        Ok(Box::new(LdapSession {
            ldap,
            server_url: params.server_url.clone(),
        }))
    }
}

struct LdapSession {
    ldap: Ldap,
    server_url: String,
}

#[async_trait]
impl DirectorySession for LdapSession {
    async fn search<'a>(
        &'a mut self,
        base_dn: &str,
        filter: &str,
    ) -> DataStoreResult<Box<dyn EntryStream + 'a>> {
        debug!(
            "Subtree search on {} base={:?} filter={:?}",
            self.server_url, base_dn, filter
        );

        let stream = self
            .ldap
            .streaming_search(base_dn, Scope::Subtree, filter, vec![NO_ATTRIBUTES])
            .await
            .map_err(DataStoreError::search)?;

        Ok(Box::new(LdapEntryStream { stream, done: false }))
    }

    async fn close(self: Box<Self>) -> DataStoreResult<()> {
        let LdapSession { mut ldap, server_url } = *self;
        debug!("Closing LDAP session to {}", server_url);
        ldap.unbind()
            .await
            .map_err(|e| DataStoreError::Close { message: e.to_string() })
    }
}

struct LdapEntryStream {
    stream: SearchStream<'static, &'static str, Vec<&'static str>>,
    done: bool,
}

impl LdapEntryStream {
    fn to_item(entry: ResultEntry) -> SearchItem {
        if entry.is_ref() {
            SearchItem::Referral
        } else if entry.is_intermediate() {
            SearchItem::Intermediate
        } else {
            SearchItem::Entry {
                dn: SearchEntry::construct(entry).dn,
            }
        }
    }
}

/// The search's own result code tells whether it completed.
fn completion(result: LdapResult) -> DataStoreResult<()> {
    result.success().map(|_| ()).map_err(DataStoreError::search)
}

#[async_trait]
impl EntryStream for LdapEntryStream {
    async fn next(&mut self) -> DataStoreResult<Option<SearchItem>> {
        if self.done {
            return Ok(None);
        }

        match self.stream.next().await.map_err(DataStoreError::search)? {
            Some(entry) => Ok(Some(Self::to_item(entry))),
            None => {
                self.done = true;
                completion(self.stream.finish().await)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use ldap3::asn1::{StructureTag, TagClass, PL};

    fn tag(class: TagClass, id: u64, payload: PL) -> StructureTag {
        StructureTag { class, id, payload }
    }

    fn search_result(rc: u32, text: &str) -> LdapResult {
        LdapResult {
            rc,
            matched: String::new(),
            text: text.to_string(),
            refs: vec![],
            ctrls: vec![],
        }
    }

    #[test]
    fn test_entry_message_yields_dn() {
        let entry = tag(
            TagClass::Application,
            4,
            PL::C(vec![
                tag(TagClass::Universal, 4, PL::P(b"cn=grp1,dc=example,dc=com".to_vec())),
                tag(TagClass::Universal, 16, PL::C(vec![])),
            ]),
        );
        assert_eq!(
            LdapEntryStream::to_item(ResultEntry::new(entry)),
            SearchItem::entry("cn=grp1,dc=example,dc=com")
        );
    }

    #[test]
    fn test_referral_and_intermediate_messages_are_not_entries() {
        let referral = tag(
            TagClass::Application,
            19,
            PL::C(vec![tag(TagClass::Universal, 4, PL::P(b"ldap://other.example.com/".to_vec()))]),
        );
        assert_eq!(LdapEntryStream::to_item(ResultEntry::new(referral)), SearchItem::Referral);

        let intermediate = tag(TagClass::Application, 25, PL::C(vec![]));
        assert_eq!(
            LdapEntryStream::to_item(ResultEntry::new(intermediate)),
            SearchItem::Intermediate
        );
    }

    #[test]
    fn test_completion_accepts_success() {
        assert!(completion(search_result(0, "")).is_ok());
    }

    #[test]
    fn test_completion_rejects_non_success_codes() {
        let err = completion(search_result(32, "no such object")).unwrap_err();
        assert!(matches!(err, DataStoreError::Search { .. }));
        assert_eq!(err.kind(), FailureKind::Search);

        let err = completion(search_result(87, "bad filter")).unwrap_err();
        assert!(matches!(err, DataStoreError::Search { .. }));
    }

    #[tokio::test]
    async fn test_open_rejects_unparseable_url() {
        let transport = LdapTransport::new();
        let params = ConnectionParams::new("cn=admin", "secret", "not a url");
        let err = transport.open(&params).await.err().unwrap();
        assert_eq!(err.kind(), FailureKind::Connection);
    }

    #[tokio::test]
    async fn test_open_fails_on_refused_connection() {
        let transport = LdapTransport::new().with_connect_timeout(Some(Duration::from_secs(2)));
        let params = ConnectionParams::new("cn=admin", "secret", "ldap://127.0.0.1:1");
        let err = transport.open(&params).await.err().unwrap();
        assert!(matches!(err, DataStoreError::Connection { ref server_url, .. } if server_url == "ldap://127.0.0.1:1"));
    }
}
