//! Reconciles local state with the remote document.
//!
//! Local persistence is always authoritative for the running session. The
//! coordinator only ever adds a pull at startup and debounced pushes after
//! local writes, and it absorbs every remote failure.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::debounce::{Debouncer, DEFAULT_WINDOW};
use super::error::RemoteError;
use super::lock;
use super::remote::{RemoteDocument, RemoteStore};

/// Connection state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No remote credentials; remote features are off.
    Unconfigured,
    /// The startup probe succeeded.
    Connected,
    /// The startup probe failed; remote use is off for the rest of the session.
    Degraded,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Unconfigured => write!(f, "unconfigured"),
            SyncStatus::Connected => write!(f, "connected"),
            SyncStatus::Degraded => write!(f, "degraded"),
        }
    }
}

/// A non-fatal remote failure, kept for the UI to show.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    ProbeFailed(RemoteError),
    PullFailed(RemoteError),
    PushFailed(RemoteError),
}

impl fmt::Display for SyncNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncNotice::ProbeFailed(e) => {
                write!(f, "Remote sync unavailable, working offline: {}", e)
            }
            SyncNotice::PullFailed(e) => {
                write!(f, "Could not load remote data, using local data: {}", e)
            }
            SyncNotice::PushFailed(e) => {
                write!(f, "Could not save to remote, changes kept locally: {}", e)
            }
        }
    }
}

type Notices = Arc<Mutex<Vec<SyncNotice>>>;

fn report(notices: &Notices, notice: SyncNotice) {
    tracing::warn!("{}", notice);
    lock(notices).push(notice);
}

pub struct SyncCoordinator<S: RemoteStore> {
    store: Option<Arc<S>>,
    status: SyncStatus,
    debouncer: Debouncer,
    /// The newest state handed to `push`, taken by the write when it fires.
    latest: Arc<Mutex<Option<RemoteDocument>>>,
    notices: Notices,
}

impl<S: RemoteStore> SyncCoordinator<S> {
    /// Creates an unprobed coordinator. `None` means no credentials were configured.
    pub fn new(store: Option<S>, window: Duration) -> Self {
        Self {
            store: store.map(Arc::new),
            status: SyncStatus::Unconfigured,
            debouncer: Debouncer::new(window),
            latest: Arc::new(Mutex::new(None)),
            notices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unconfigured() -> Self {
        Self::new(None, DEFAULT_WINDOW)
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.status == SyncStatus::Connected
    }

    /// Probes the remote store once.
    ///
    /// Success moves to `Connected`. Failure moves to `Degraded`, which is
    /// never retried. Later calls return the settled status without probing.
    pub async fn connect(&mut self) -> SyncStatus {
        if self.status != SyncStatus::Unconfigured {
            return self.status;
        }
        let Some(store) = &self.store else {
            tracing::debug!("Remote sync not configured");
            return self.status;
        };
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            self.debouncer.bind(runtime);
        }

        self.status = match store.probe().await {
            Ok(()) => {
                tracing::info!("Remote sync connected");
                SyncStatus::Connected
            }
            Err(e) => {
                report(&self.notices, SyncNotice::ProbeFailed(e));
                SyncStatus::Degraded
            }
        };
        self.status
    }

    /// Reads the remote document.
    ///
    /// Returns `None` without touching the network unless connected. A failed
    /// read is reported and also yields `None`, so the caller falls back to
    /// local state. It does not change the status.
    pub async fn pull(&self) -> Option<RemoteDocument> {
        let store = self.connected_store()?;
        match store.fetch().await {
            Ok(Some(document)) => {
                tracing::info!("Pulled remote document");
                Some(document)
            }
            Ok(None) => {
                tracing::info!("Remote document is empty");
                None
            }
            Err(e) => {
                report(&self.notices, SyncNotice::PullFailed(e));
                None
            }
        }
    }

    /// Schedules a debounced write of `document`.
    ///
    /// Calls within the window replace each other; only the newest document is
    /// written, once the window passes quietly. A no-op unless connected.
    pub fn push(&self, document: RemoteDocument) {
        let Some(store) = self.connected_store() else {
            return;
        };
        *lock(&self.latest) = Some(document);

        let store = Arc::clone(store);
        let latest = Arc::clone(&self.latest);
        let notices = Arc::clone(&self.notices);
        let scheduled = self.debouncer.schedule(async move {
            let document = lock(&latest).take();
            let Some(document) = document else {
                return;
            };
            match store.replace(&document).await {
                Ok(()) => tracing::debug!("Pushed remote document"),
                Err(e) => report(&notices, SyncNotice::PushFailed(e)),
            }
        });
        if scheduled {
            tracing::debug!("Scheduled remote push in {:?}", self.debouncer.window());
        } else {
            report(&self.notices, SyncNotice::PushFailed(RemoteError::NoRuntime));
        }
    }

    /// Writes `document` immediately, superseding any scheduled push.
    pub async fn push_now(&self, document: RemoteDocument) -> Result<(), RemoteError> {
        let store = self.connected_store().ok_or(RemoteError::NotConnected)?;
        self.debouncer.cancel();
        lock(&self.latest).take();
        store.replace(&document).await
    }

    /// True while a push is waiting for its window.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Elapsed fraction of the pending push's window, for progress display.
    pub fn progress(&self) -> Option<f64> {
        self.debouncer.progress()
    }

    /// Waits until any scheduled push has been written (or has failed).
    pub async fn settle(&self) {
        self.debouncer.settle().await;
    }

    /// Takes the notices recorded since the last call.
    pub fn drain_notices(&self) -> Vec<SyncNotice> {
        std::mem::take(&mut *lock(&self.notices))
    }

    fn connected_store(&self) -> Option<&Arc<S>> {
        if self.status == SyncStatus::Connected {
            self.store.as_ref()
        } else {
            None
        }
    }
}
