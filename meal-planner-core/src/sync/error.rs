//! Remote sync error types.

use thiserror::Error;

/// Errors that can occur talking to the remote store.
///
/// None of these are fatal: the coordinator logs them, records a notice and
/// carries on with local state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// Remote sync is unconfigured or the startup probe failed
    #[error("Remote sync is not connected")]
    NotConnected,

    /// A push was requested with no async runtime to run it on
    #[error("No async runtime available to run the remote write")]
    NoRuntime,

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the remote store
    #[error("Remote store returned status {0}")]
    Status(u16),

    /// Stored document is not a valid `{mealPlan, mealLibrary}` object
    #[error("Failed to parse remote document: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RemoteError::Status(status.as_u16()),
            None => RemoteError::Http(e.to_string()),
        }
    }
}
