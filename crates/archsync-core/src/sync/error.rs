//! Sync error handling
//!
//! Provides typed errors for remote workspace operations with descriptive
//! messages and recovery suggestions.

use thiserror::Error;

use crate::error::WorkspaceError;

/// Errors that can occur while talking to the remote workspace store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Missing, invalid or rejected credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport failure (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The remote workspace changed since it was fetched
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected response from the remote store
    #[error("Remote store returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    /// A workspace could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The workspace id cannot be addressed on the remote store
    #[error("Invalid workspace id: '{0}'")]
    InvalidWorkspaceId(String),
}

impl SyncError {
    /// Check if retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Network(_) | SyncError::Conflict(_) => true,
            SyncError::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            SyncError::Authentication(_) => Some(
                "Check api_key and api_secret with `archsync config show`, or set ARCHSYNC_API_KEY and ARCHSYNC_API_SECRET.",
            ),
            SyncError::Network(_) => {
                Some("Check api_url and your network connection, then try again.")
            }
            SyncError::Conflict(_) => Some(
                "Someone else updated the workspace. Push again to merge with the latest remote revision.",
            ),
            SyncError::Remote { status, .. } if *status >= 500 => {
                Some("The remote store had an internal error. Try again later.")
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<WorkspaceError> for SyncError {
    fn from(err: WorkspaceError) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
