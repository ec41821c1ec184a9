//! Workspace document
//!
//! A workspace bundles the model, its views and the style registry together
//! with the bookkeeping the remote store needs (id, revision, who last
//! modified it). It is the unit that gets serialized and uploaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;
use crate::model::{non_empty, Model};
use crate::style::Styles;
use crate::view::ViewSet;

/// A complete architecture description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Remote workspace id, stamped on upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Revision of the remote copy this document was based on (0 = never uploaded)
    #[serde(default)]
    pub revision: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_agent: Option<String>,

    #[serde(default)]
    pub model: Model,

    #[serde(default)]
    pub views: ViewSet,

    #[serde(default, skip_serializing_if = "Styles::is_empty")]
    pub styles: Styles,
}

impl Workspace {
    /// Create an empty workspace
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: non_empty(description.into()),
            revision: 0,
            last_modified_date: None,
            last_modified_agent: None,
            model: Model::new(),
            views: ViewSet::new(),
            styles: Styles::default(),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String, WorkspaceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String, WorkspaceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a workspace and check that its model and views are consistent
    pub fn from_json(json: &str) -> Result<Self, WorkspaceError> {
        let workspace = Self::from_json_unchecked(json)?;
        workspace.validate()?;
        Ok(workspace)
    }

    /// Parse a workspace without checking its invariants
    pub(crate) fn from_json_unchecked(json: &str) -> Result<Self, WorkspaceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the model and every view against it
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        self.model.validate()?;
        self.views.validate(&self.model)?;
        Ok(())
    }
}
