//! Remote store abstraction
//!
//! A remote store keeps one JSON document per workspace id. Implementations
//! only move documents; parsing and merging happen in the sync client.

use async_trait::async_trait;

use super::auth::Credentials;
use super::error::SyncError;

/// Storage backend holding workspace documents
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Fetch the current document, `None` if the workspace has never been uploaded
    async fn get(
        &self,
        workspace_id: &str,
        credentials: &Credentials,
    ) -> Result<Option<String>, SyncError>;

    /// Replace the document
    ///
    /// `base_revision` is the revision the new document was derived from;
    /// `None` means the workspace must not exist yet. The store rejects the
    /// write with [`SyncError::Conflict`] if its current revision differs.
    async fn put(
        &self,
        workspace_id: &str,
        credentials: &Credentials,
        json: &str,
        base_revision: Option<u64>,
    ) -> Result<(), SyncError>;
}

/// Revision recorded in a stored workspace document (0 if absent)
pub(crate) fn document_revision(json: &str) -> Result<u64, SyncError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(value
        .get("revision")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_revision() {
        assert_eq!(document_revision(r#"{"revision":7}"#).unwrap(), 7);
        assert_eq!(document_revision(r#"{"name":"x"}"#).unwrap(), 0);
        assert!(document_revision("not json").is_err());
    }
}
