//! In-memory remote store
//!
//! Deterministic [`RemoteStore`] for tests and dry runs. Documents live in a
//! map shared across clones, every call is recorded, and individual
//! operations can be made to fail.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::auth::Credentials;
use super::error::SyncError;
use super::remote::{document_revision, RemoteStore};
use crate::workspace::Workspace;

/// Which operation should fail
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every get with the given error
    Get(SyncError),
    /// Fail every put with the given error
    Put(SyncError),
    /// Let the next get succeed, then bump the stored revision as if another
    /// client had written in between
    ConcurrentWriteAfterGet,
}

/// Recorded call for test verification
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOperation {
    Get {
        workspace_id: String,
    },
    Put {
        workspace_id: String,
        base_revision: Option<u64>,
    },
}

#[derive(Debug, Default)]
struct MemoryInner {
    documents: HashMap<String, String>,
    fail_on: Option<FailOn>,
    required: Option<Credentials>,
    operations: Vec<StoreOperation>,
}

/// Remote store backed by a map
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemoteStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing workspace
    pub fn with_workspace(
        self,
        workspace_id: impl Into<String>,
        workspace: &Workspace,
    ) -> Result<Self, SyncError> {
        let json = workspace.to_json()?;
        self.lock().documents.insert(workspace_id.into(), json);
        Ok(self)
    }

    /// Only accept requests signed with these credentials
    pub fn require_credentials(self, credentials: Credentials) -> Self {
        self.lock().required = Some(credentials);
        self
    }

    /// Configure a failure
    pub fn fail_on(&self, fail_on: FailOn) {
        self.lock().fail_on = Some(fail_on);
    }

    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    /// All calls made so far
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock().operations.clone()
    }

    /// Stored document for a workspace
    pub fn document(&self, workspace_id: &str) -> Option<String> {
        self.lock().documents.get(workspace_id).cloned()
    }

    /// Stored workspace, parsed
    pub fn workspace(&self, workspace_id: &str) -> Option<Workspace> {
        self.document(workspace_id)
            .and_then(|json| serde_json::from_str(&json).ok())
    }

    /// Revision of the stored workspace
    pub fn revision(&self, workspace_id: &str) -> Option<u64> {
        self.document(workspace_id)
            .and_then(|json| document_revision(&json).ok())
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MemoryInner {
    fn check_credentials(&self, credentials: &Credentials) -> Result<(), SyncError> {
        match &self.required {
            Some(required) if required != credentials => Err(SyncError::Authentication(
                "API key or secret rejected".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn bump_revision(json: &str) -> Result<String, SyncError> {
    let mut value: serde_json::Value = serde_json::from_str(json)?;
    let next = document_revision(json)? + 1;
    value["revision"] = serde_json::Value::from(next);
    Ok(value.to_string())
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(
        &self,
        workspace_id: &str,
        credentials: &Credentials,
    ) -> Result<Option<String>, SyncError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOperation::Get {
            workspace_id: workspace_id.to_string(),
        });

        if let Some(FailOn::Get(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        inner.check_credentials(credentials)?;

        let document = inner.documents.get(workspace_id).cloned();

        if matches!(inner.fail_on, Some(FailOn::ConcurrentWriteAfterGet)) {
            inner.fail_on = None;
            if let Some(json) = &document {
                let bumped = bump_revision(json)?;
                inner.documents.insert(workspace_id.to_string(), bumped);
            }
        }

        Ok(document)
    }

    async fn put(
        &self,
        workspace_id: &str,
        credentials: &Credentials,
        json: &str,
        base_revision: Option<u64>,
    ) -> Result<(), SyncError> {
        let mut inner = self.lock();
        inner.operations.push(StoreOperation::Put {
            workspace_id: workspace_id.to_string(),
            base_revision,
        });

        if let Some(FailOn::Put(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        inner.check_credentials(credentials)?;

        let current = match inner.documents.get(workspace_id) {
            Some(existing) => Some(document_revision(existing)?),
            None => None,
        };
        if current != base_revision {
            return Err(SyncError::Conflict(format!(
                "workspace {} is at revision {}, upload was based on {}",
                workspace_id,
                current.map_or("none".to_string(), |r| r.to_string()),
                base_revision.map_or("none".to_string(), |r| r.to_string()),
            )));
        }

        // Reject documents that would break later gets
        serde_json::from_str::<serde_json::Value>(json)?;
        inner
            .documents
            .insert(workspace_id.to_string(), json.to_string());
        Ok(())
    }
}
