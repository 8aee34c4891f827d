//! Scripted resolver and directory doubles shared by the unit tests.

use crate::domain::directory::{DirectorySession, DirectoryTransport, EntryStream, SearchItem};
use crate::domain::models::{ConnectionParams, EndpointId};
use crate::domain::resolver::EndpointResolver;
use crate::error::{DataStoreError, DataStoreResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn ldap1_params() -> ConnectionParams {
    ConnectionParams::new("cn=admin,dc=example,dc=com", "secret", "ldap://dir.example.com:389")
}

/// Resolver that always fails, as an unreachable endpoint service would.
pub struct UnavailableResolver;

#[async_trait]
impl EndpointResolver for UnavailableResolver {
    async fn resolve(&self, _endpoint_id: &EndpointId) -> DataStoreResult<Option<ConnectionParams>> {
        Err(DataStoreError::Resolution {
            message: "endpoint service unavailable".to_string(),
        })
    }
}

/// Resolver that panics.
pub struct PanickingResolver;

#[async_trait]
impl EndpointResolver for PanickingResolver {
    async fn resolve(&self, _endpoint_id: &EndpointId) -> DataStoreResult<Option<ConnectionParams>> {
        panic!("resolver blew up")
    }
}

/// An entry stream that replays fixed items, optionally failing at the end.
pub struct ScriptedStream {
    items: VecDeque<SearchItem>,
    failure: Option<String>,
    panics: bool,
}

impl ScriptedStream {
    pub fn new(items: Vec<SearchItem>) -> Self {
        Self {
            items: items.into(),
            failure: None,
            panics: false,
        }
    }

    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }
}

#[async_trait]
impl EntryStream for ScriptedStream {
    async fn next(&mut self) -> DataStoreResult<Option<SearchItem>> {
        if let Some(item) = self.items.pop_front() {
            return Ok(Some(item));
        }
        if self.panics {
            panic!("entry stream blew up");
        }
        match self.failure.take() {
            Some(message) => Err(DataStoreError::search(message)),
            None => Ok(None),
        }
    }
}

/// What a scripted session does when searched.
#[derive(Debug, Clone)]
pub enum SearchScript {
    Entries(Vec<SearchItem>),
    FailMidStream(Vec<SearchItem>, String),
    PanicMidStream(Vec<SearchItem>),
    Reject(String),
}

/// Counts of sessions opened and closed through a [`ScriptedTransport`].
#[derive(Debug, Default)]
pub struct SessionCounters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub searches: Mutex<Vec<(String, String)>>,
    pub bind_urls: Mutex<Vec<String>>,
}

impl SessionCounters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> Vec<(String, String)> {
        self.searches.lock().unwrap().clone()
    }
}

/// Transport whose sessions follow a [`SearchScript`].
pub struct ScriptedTransport {
    pub counters: Arc<SessionCounters>,
    script: SearchScript,
    refuse_open: bool,
    fail_close: bool,
}

impl ScriptedTransport {
    pub fn new(script: SearchScript) -> Self {
        Self {
            counters: Arc::new(SessionCounters::default()),
            script,
            refuse_open: false,
            fail_close: false,
        }
    }

    pub fn returning(dns: &[&str]) -> Self {
        Self::new(SearchScript::Entries(dns.iter().map(|dn| SearchItem::entry(*dn)).collect()))
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_open = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

#[async_trait]
impl DirectoryTransport for ScriptedTransport {
    async fn open(&self, params: &ConnectionParams) -> DataStoreResult<Box<dyn DirectorySession>> {
        self.counters.bind_urls.lock().unwrap().push(params.server_url.clone());
        if self.refuse_open {
            return Err(DataStoreError::connection(&params.server_url, "connection refused"));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            counters: Arc::clone(&self.counters),
            script: self.script.clone(),
            fail_close: self.fail_close,
        }))
    }
}

struct ScriptedSession {
    counters: Arc<SessionCounters>,
    script: SearchScript,
    fail_close: bool,
}

#[async_trait]
impl DirectorySession for ScriptedSession {
    async fn search<'a>(
        &'a mut self,
        base_dn: &str,
        filter: &str,
    ) -> DataStoreResult<Box<dyn EntryStream + 'a>> {
        self.counters
            .searches
            .lock()
            .unwrap()
            .push((base_dn.to_string(), filter.to_string()));

        match &self.script {
            SearchScript::Entries(items) => Ok(Box::new(ScriptedStream::new(items.clone()))),
            SearchScript::FailMidStream(items, message) => {
                Ok(Box::new(ScriptedStream::new(items.clone()).failing_with(message)))
            }
            SearchScript::PanicMidStream(items) => {
                Ok(Box::new(ScriptedStream::new(items.clone()).panicking()))
            }
            SearchScript::Reject(message) => Err(DataStoreError::search(message)),
        }
    }

    async fn close(self: Box<Self>) -> DataStoreResult<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(DataStoreError::Close {
                message: "connection reset".to_string(),
            });
        }
        Ok(())
    }
}
