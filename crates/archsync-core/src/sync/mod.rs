//! Remote workspace sync
//!
//! Uploads workspaces to a remote store and carries hand-tuned layout from
//! the remote copy over to the freshly generated local one.
//!
//! ## Upload cycle
//!
//! 1. Fetch the remote copy (absent means an empty baseline)
//! 2. Merge remote layout into the local workspace, if enabled
//! 3. Stamp revision, date and agent, then put with the base revision so
//!    the store can reject concurrent writes
//!
//! ## Usage
//!
//! ```ignore
//! let mut client = SyncClient::new(Arc::new(HttpRemoteStore::new(url, timeout)?));
//! client.configure(api_key, api_secret);
//! let receipt = client.upload("1234", &workspace).await?;
//! ```

mod auth;
mod client;
mod error;
mod http;
pub mod memory;
mod merge;
mod remote;

pub use auth::{Credentials, SignedHeaders};
pub use client::{SyncClient, SyncEvent, SyncStatus, UploadReceipt, DEFAULT_AGENT};
pub use error::{SyncError, SyncResult};
pub use http::{HttpRemoteStore, BASE_REVISION_HEADER};
pub use memory::MemoryRemoteStore;
pub use merge::{merge, merge_with_report, MergeReport};
pub use remote::RemoteStore;
