//! Sync client implementation
//!
//! Uploads a workspace to a remote store: fetch the current remote copy,
//! optionally merge its layout into the local workspace, stamp a new revision
//! and put the result back in a single request.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::auth::Credentials;
use super::error::SyncError;
use super::http::HttpRemoteStore;
use super::merge::{merge_with_report, MergeReport};
use super::remote::RemoteStore;
use crate::config::Config;
use crate::workspace::Workspace;

/// Agent recorded as `last_modified_agent` unless overridden
pub const DEFAULT_AGENT: &str = concat!("archsync/", env!("CARGO_PKG_VERSION"));

/// Where the client is in the upload cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    /// No credentials yet
    Unauthenticated,
    /// Credentials stored, nothing fetched
    Configured,
    /// Remote copy fetched (or known to be absent)
    Fetched,
    /// Remote layout merged into the local workspace
    Merged,
    /// Workspace accepted by the remote store
    Uploaded,
    /// The last operation failed
    Failed,
}

/// Events emitted by the sync client
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Status changed
    StatusChanged(SyncStatus),
    /// Remote copy fetched; `None` if the workspace did not exist yet
    Fetched { revision: Option<u64> },
    /// Layout merged from the remote copy
    Merged(MergeReport),
    /// Upload accepted
    Uploaded(UploadReceipt),
    /// Error occurred
    Error(String),
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub workspace_id: String,
    /// Revision now stored remotely
    pub revision: u64,
    /// Revision the upload replaced (`None` if the workspace was created)
    pub base_revision: Option<u64>,
    /// Merge summary, if a remote copy was merged
    pub merge: Option<MergeReport>,
}

/// Client for a remote workspace store
pub struct SyncClient {
    store: Arc<dyn RemoteStore>,
    credentials: Option<Credentials>,
    merge_from_remote: bool,
    agent: String,
    /// Current status
    status: watch::Sender<SyncStatus>,
    /// Status receiver for external monitoring
    status_rx: watch::Receiver<SyncStatus>,
    /// Event channel
    event_tx: mpsc::UnboundedSender<SyncEvent>,
    /// Event receiver
    event_rx: Option<mpsc::UnboundedReceiver<SyncEvent>>,
}

impl SyncClient {
    /// Create a client for a store, without credentials
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        let (status_tx, status_rx) = watch::channel(SyncStatus::Unauthenticated);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            store,
            credentials: None,
            merge_from_remote: true,
            agent: DEFAULT_AGENT.to_string(),
            status: status_tx,
            status_rx,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Create an HTTP client from configuration
    ///
    /// Credentials are applied if both key and secret are configured.
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        let store = HttpRemoteStore::from_config(config)?;
        let mut client = Self::new(Arc::new(store));
        client.set_merge_from_remote(config.merge_from_remote);
        if let Some(credentials) = config.credentials() {
            client.set_credentials(credentials);
        }
        Ok(client)
    }

    /// Store API credentials; no I/O happens until the next fetch or upload
    pub fn configure(&mut self, api_key: impl Into<String>, api_secret: impl Into<String>) {
        self.set_credentials(Credentials::new(api_key, api_secret));
    }

    fn set_credentials(&mut self, credentials: Credentials) {
        debug!("Credentials configured");
        self.credentials = Some(credentials);
        self.set_status(SyncStatus::Configured);
    }

    /// Whether remote layout is merged before upload (default: true)
    pub fn set_merge_from_remote(&mut self, merge: bool) {
        self.merge_from_remote = merge;
    }

    pub fn merge_from_remote(&self) -> bool {
        self.merge_from_remote
    }

    /// Override the agent recorded in uploaded workspaces
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    /// Get the current status
    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Take the event receiver (can only be called once)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.event_rx.take()
    }

    /// Fetch the remote copy of a workspace, `None` if it does not exist
    pub async fn fetch(&self, workspace_id: &str) -> Result<Option<Workspace>, SyncError> {
        let result = self.fetch_inner(workspace_id).await;
        self.finish(result)
    }

    /// Upload a workspace
    ///
    /// The local workspace is not modified; the uploaded copy carries the
    /// merged layout and the new revision.
    pub async fn upload(
        &self,
        workspace_id: &str,
        workspace: &Workspace,
    ) -> Result<UploadReceipt, SyncError> {
        info!(
            workspace_id,
            store = self.store.name(),
            merge = self.merge_from_remote,
            "Uploading workspace"
        );
        let result = self.upload_inner(workspace_id, workspace).await;
        match &result {
            Ok(receipt) => info!(
                workspace_id,
                revision = receipt.revision,
                "Upload complete"
            ),
            Err(e) => warn!(workspace_id, "Upload failed: {}", e),
        }
        self.finish(result)
    }

    async fn fetch_inner(&self, workspace_id: &str) -> Result<Option<Workspace>, SyncError> {
        let credentials = self.credentials()?;
        let document = self.store.get(workspace_id, credentials).await?;

        // The remote copy is only a source of layout, so it is not validated
        let remote = match document {
            Some(json) => Some(Workspace::from_json_unchecked(&json)?),
            None => None,
        };

        let revision = remote.as_ref().map(|w| w.revision);
        debug!(workspace_id, ?revision, "Fetched remote workspace");
        self.set_status(SyncStatus::Fetched);
        self.emit(SyncEvent::Fetched { revision });
        Ok(remote)
    }

    async fn upload_inner(
        &self,
        workspace_id: &str,
        local: &Workspace,
    ) -> Result<UploadReceipt, SyncError> {
        let credentials = self.credentials()?;
        let remote = self.fetch_inner(workspace_id).await?;
        let base_revision = remote.as_ref().map(|w| w.revision);

        let (mut outgoing, merge) = match &remote {
            Some(remote) if self.merge_from_remote => {
                let (merged, report) = merge_with_report(remote, local);
                self.set_status(SyncStatus::Merged);
                self.emit(SyncEvent::Merged(report.clone()));
                (merged, Some(report))
            }
            _ => (local.clone(), None),
        };

        let revision = match base_revision {
            None => 1,
            Some(base) => base.checked_add(1).ok_or_else(|| {
                SyncError::Conflict(format!(
                    "workspace {} is at revision {} and cannot be revised further",
                    workspace_id, base
                ))
            })?,
        };
        outgoing.revision = revision;
        outgoing.id = workspace_id.parse().ok();
        outgoing.last_modified_date = Some(Utc::now());
        outgoing.last_modified_agent = Some(self.agent.clone());

        let json = outgoing.to_json()?;
        self.store
            .put(workspace_id, credentials, &json, base_revision)
            .await?;

        let receipt = UploadReceipt {
            workspace_id: workspace_id.to_string(),
            revision,
            base_revision,
            merge,
        };
        self.set_status(SyncStatus::Uploaded);
        self.emit(SyncEvent::Uploaded(receipt.clone()));
        Ok(receipt)
    }

    fn credentials(&self) -> Result<&Credentials, SyncError> {
        match &self.credentials {
            Some(credentials) if credentials.is_complete() => Ok(credentials),
            Some(_) => Err(SyncError::Authentication(
                "API key and secret must not be empty".to_string(),
            )),
            None => Err(SyncError::Authentication(
                "No API credentials configured".to_string(),
            )),
        }
    }

    fn finish<T>(&self, result: Result<T, SyncError>) -> Result<T, SyncError> {
        if let Err(e) = &result {
            self.set_status(SyncStatus::Failed);
            self.emit(SyncEvent::Error(e.to_string()));
        }
        result
    }

    fn set_status(&self, status: SyncStatus) {
        let _ = self.status.send(status);
        self.emit(SyncEvent::StatusChanged(status));
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::memory::{FailOn, MemoryRemoteStore, StoreOperation};

    fn workspace() -> Workspace {
        let mut ws = Workspace::new("Shop", "");
        let user = ws.model.add_person("User", "").unwrap();
        let shop = ws.model.add_software_system("Shop", "").unwrap();
        ws.model.uses(user, shop, "Buys from").unwrap();
        ws.views
            .create_system_context_view(&ws.model, shop, "context", "")
            .unwrap()
            .add_all_elements(&ws.model);
        ws
    }

    fn client(store: &MemoryRemoteStore) -> SyncClient {
        let mut client = SyncClient::new(Arc::new(store.clone()));
        client.configure("key", "secret");
        client
    }

    #[test]
    fn test_new_client_is_unauthenticated() {
        let client = SyncClient::new(Arc::new(MemoryRemoteStore::new()));
        assert_eq!(client.status(), SyncStatus::Unauthenticated);
        assert!(client.merge_from_remote());

        let rx = client.subscribe_status();
        assert_eq!(*rx.borrow(), SyncStatus::Unauthenticated);
    }

    #[test]
    fn test_configure_moves_to_configured() {
        let store = MemoryRemoteStore::new();
        let client = client(&store);
        assert_eq!(client.status(), SyncStatus::Configured);
        // No I/O on configure
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_credentials_fails() {
        let store = MemoryRemoteStore::new();
        let client = SyncClient::new(Arc::new(store.clone()));

        let err = client.upload("1", &workspace()).await.unwrap_err();
        assert!(matches!(err, SyncError::Authentication(_)));
        assert_eq!(client.status(), SyncStatus::Failed);
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn test_first_upload_creates_revision_one() {
        let store = MemoryRemoteStore::new();
        let client = client(&store).with_agent("test-agent");

        let receipt = client.upload("42", &workspace()).await.unwrap();
        assert_eq!(receipt.revision, 1);
        assert_eq!(receipt.base_revision, None);
        assert!(receipt.merge.is_none());
        assert_eq!(client.status(), SyncStatus::Uploaded);

        let stored = store.workspace("42").unwrap();
        assert_eq!(stored.revision, 1);
        assert_eq!(stored.id, Some(42));
        assert_eq!(stored.last_modified_agent.as_deref(), Some("test-agent"));
        assert!(stored.last_modified_date.is_some());
        assert_eq!(
            store.operations(),
            vec![
                StoreOperation::Get {
                    workspace_id: "42".to_string()
                },
                StoreOperation::Put {
                    workspace_id: "42".to_string(),
                    base_revision: None
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_second_upload_merges_remote_layout() {
        let store = MemoryRemoteStore::new();
        let client = client(&store);
        client.upload("1", &workspace()).await.unwrap();

        // Someone positions the user in the remote editor
        let mut remote = store.workspace("1").unwrap();
        let user = remote.model.find_element(None, "User").unwrap().id;
        remote
            .views
            .static_view_mut("context")
            .unwrap()
            .set_position(user, 30, 40);
        let store = store.with_workspace("1", &remote).unwrap();

        let receipt = client.upload("1", &workspace()).await.unwrap();
        assert_eq!(receipt.base_revision, Some(1));
        assert_eq!(receipt.revision, 2);
        assert_eq!(receipt.merge.unwrap().elements_positioned, 1);

        let stored = store.workspace("1").unwrap();
        let view = stored.views.static_view("context").unwrap();
        let placed = view.elements().iter().find(|v| v.id == user).unwrap();
        assert_eq!((placed.x, placed.y), (Some(30), Some(40)));
    }

    #[tokio::test]
    async fn test_merge_disabled_discards_remote_layout() {
        let mut remote = workspace();
        remote.revision = 5;
        let user = remote.model.find_element(None, "User").unwrap().id;
        remote
            .views
            .static_view_mut("context")
            .unwrap()
            .set_position(user, 30, 40);
        let store = MemoryRemoteStore::new().with_workspace("1", &remote).unwrap();

        let mut client = client(&store);
        client.set_merge_from_remote(false);
        let receipt = client.upload("1", &workspace()).await.unwrap();
        assert_eq!(receipt.revision, 6);
        assert!(receipt.merge.is_none());

        let stored = store.workspace("1").unwrap();
        let view = stored.views.static_view("context").unwrap();
        assert!(view.elements().iter().all(|v| !v.has_layout()));
    }

    #[tokio::test]
    async fn test_conflict_leaves_remote_untouched() {
        let mut remote = workspace();
        remote.revision = 3;
        let store = MemoryRemoteStore::new().with_workspace("1", &remote).unwrap();
        store.fail_on(FailOn::ConcurrentWriteAfterGet);
        let before = store.document("1");

        let client = client(&store);
        let err = client.upload("1", &workspace()).await.unwrap_err();
        assert!(matches!(err, SyncError::Conflict(_)));
        assert_eq!(client.status(), SyncStatus::Failed);

        // Only the concurrent writer's bump is visible
        assert_eq!(store.revision("1"), Some(4));
        assert_ne!(store.document("1"), before);
        let stored = store.workspace("1").unwrap();
        assert!(stored.last_modified_agent.is_none());
    }

    #[tokio::test]
    async fn test_exhausted_revision_is_conflict() {
        let mut remote = workspace();
        remote.revision = u64::MAX;
        let store = MemoryRemoteStore::new().with_workspace("1", &remote).unwrap();
        let before = store.document("1");

        let client = client(&store);
        let err = client.upload("1", &workspace()).await.unwrap_err();
        assert!(matches!(err, SyncError::Conflict(_)));
        assert_eq!(client.status(), SyncStatus::Failed);

        // Nothing was written
        assert_eq!(store.document("1"), before);
        assert_eq!(store.revision("1"), Some(u64::MAX));
        assert_eq!(
            store.operations(),
            vec![StoreOperation::Get {
                workspace_id: "1".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_network_failure_skips_put() {
        let store = MemoryRemoteStore::new();
        store.fail_on(FailOn::Get(SyncError::Network("connection refused".into())));
        let client = client(&store);

        let err = client.upload("1", &workspace()).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
        assert_eq!(store.operations().len(), 1);
        assert!(store.document("1").is_none());
    }

    #[tokio::test]
    async fn test_fetch_returns_remote_workspace() {
        let store = MemoryRemoteStore::new()
            .with_workspace("9", &workspace())
            .unwrap();
        let client = client(&store);

        let fetched = client.fetch("9").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Shop");
        assert_eq!(client.status(), SyncStatus::Fetched);

        assert!(client.fetch("10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_rejects_malformed_document() {
        let store = MemoryRemoteStore::new();
        let client = client(&store);
        let creds = Credentials::new("key", "secret");
        store.put("1", &creds, r#"{"revision":1}"#, None).await.unwrap();

        let err = client.fetch("1").await.unwrap_err();
        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_events_report_progress() {
        let store = MemoryRemoteStore::new()
            .with_workspace("1", &workspace())
            .unwrap();
        let mut client = client(&store);
        let mut events = client.take_events().unwrap();
        assert!(client.take_events().is_none());

        client.upload("1", &workspace()).await.unwrap();

        let mut statuses = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let SyncEvent::StatusChanged(status) = event {
                statuses.push(status);
            }
        }
        assert_eq!(
            statuses,
            vec![
                SyncStatus::Configured,
                SyncStatus::Fetched,
                SyncStatus::Merged,
                SyncStatus::Uploaded
            ]
        );
    }
}
