//! In-memory remote store.
//!
//! Keeps the document in process memory and records every call. Clones share
//! the same state, so a caller can hand one clone to a coordinator and keep
//! another to inspect what was written.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::RemoteError;
use super::lock;
use super::remote::{RemoteDocument, RemoteStore};

#[derive(Default)]
struct MemoryState {
    document: Option<RemoteDocument>,
    writes: Vec<RemoteDocument>,
    calls: usize,
    fail_probe: bool,
    fail_fetch: bool,
    fail_replace: bool,
    latency: Duration,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, document: RemoteDocument) -> Self {
        lock(&self.state).document = Some(document);
        self
    }

    /// Makes every probe fail, as if the credentials were rejected.
    pub fn failing_probe(self) -> Self {
        lock(&self.state).fail_probe = true;
        self
    }

    pub fn failing_fetch(self) -> Self {
        lock(&self.state).fail_fetch = true;
        self
    }

    pub fn set_fail_replace(&self, fail: bool) {
        lock(&self.state).fail_replace = fail;
    }

    /// Delays every call by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        lock(&self.state).latency = latency;
        self
    }

    /// The currently stored document.
    pub fn document(&self) -> Option<RemoteDocument> {
        lock(&self.state).document.clone()
    }

    /// Every successful write, oldest first.
    pub fn writes(&self) -> Vec<RemoteDocument> {
        lock(&self.state).writes.clone()
    }

    /// Number of calls of any kind, failed or not.
    pub fn call_count(&self) -> usize {
        lock(&self.state).calls
    }

    async fn enter(&self) -> MemoryCall {
        let latency = {
            let mut state = lock(&self.state);
            state.calls += 1;
            state.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let state = lock(&self.state);
        MemoryCall {
            fail_probe: state.fail_probe,
            fail_fetch: state.fail_fetch,
            fail_replace: state.fail_replace,
        }
    }
}

struct MemoryCall {
    fail_probe: bool,
    fail_fetch: bool,
    fail_replace: bool,
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn probe(&self) -> Result<(), RemoteError> {
        if self.enter().await.fail_probe {
            return Err(RemoteError::Status(401));
        }
        Ok(())
    }

    async fn fetch(&self) -> Result<Option<RemoteDocument>, RemoteError> {
        if self.enter().await.fail_fetch {
            return Err(RemoteError::Http("connection reset".to_string()));
        }
        Ok(self.document())
    }

    async fn replace(&self, document: &RemoteDocument) -> Result<(), RemoteError> {
        if self.enter().await.fail_replace {
            return Err(RemoteError::Status(503));
        }
        let mut state = lock(&self.state);
        state.document = Some(document.clone());
        state.writes.push(document.clone());
        Ok(())
    }
}
