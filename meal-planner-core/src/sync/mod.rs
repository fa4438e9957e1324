//! Remote sync for the planner state.
//!
//! ## Protocol
//!
//! 1. At startup the coordinator probes the remote store once, if configured.
//!    Failure leaves it `Degraded` for the session.
//! 2. The startup sequence pulls the remote document; when one comes back it
//!    replaces local state and is written through to local storage.
//! 3. Every local mutation is saved locally first, then handed to `push`,
//!    which debounces writes so a burst of edits becomes one remote write.
//! 4. Remote failures are logged and recorded as notices; they never block
//!    local work.

mod coordinator;
mod debounce;
mod error;
mod gist;
mod memory;
mod remote;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use coordinator::{SyncCoordinator, SyncNotice, SyncStatus};
pub use debounce::{Debouncer, DEFAULT_WINDOW};
pub use error::RemoteError;
pub use gist::{GistStore, DEFAULT_API_URL, DEFAULT_FILE_NAME};
pub use memory::MemoryStore;
pub use remote::{RemoteDocument, RemoteStore};

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
