//! View catalog
//!
//! Views are projections of the model. Static views (context, container,
//! component) include elements by abstraction tier; dynamic views list an
//! explicit sequence of interactions. Every view is identified by a unique
//! key and scoped to one element.

mod dynamic;
mod static_view;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use dynamic::{DynamicView, InteractionStep};
pub use static_view::{StaticView, StaticViewKind};

use crate::error::{ModelError, ModelResult};
use crate::model::{non_empty, ElementId, Model, RelationshipId};

/// A view borrowed from the catalog
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    Static(&'a StaticView),
    Dynamic(&'a DynamicView),
}

impl View<'_> {
    pub fn key(&self) -> &str {
        match self {
            View::Static(v) => &v.key,
            View::Dynamic(v) => &v.key,
        }
    }

    pub fn scope(&self) -> ElementId {
        match self {
            View::Static(v) => v.scope,
            View::Dynamic(v) => v.scope,
        }
    }

    pub fn display_title(&self) -> String {
        match self {
            View::Static(v) => v.display_title(),
            View::Dynamic(v) => v.display_title(),
        }
    }
}

/// Placement of an element in a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementView {
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

impl ElementView {
    pub fn new(id: ElementId) -> Self {
        Self { id, x: None, y: None }
    }

    /// Whether the element has been positioned
    pub fn has_layout(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

/// A bend point on a relationship line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

/// Placement of a relationship in a view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipView {
    pub id: RelationshipId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Vertex>,
    /// Label position along the line, as a percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,
}

impl RelationshipView {
    pub fn new(id: RelationshipId) -> Self {
        Self {
            id,
            vertices: Vec::new(),
            position: None,
        }
    }

    pub fn has_layout(&self) -> bool {
        !self.vertices.is_empty() || self.position.is_some()
    }
}

/// All views of a workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSet {
    #[serde(default)]
    static_views: Vec<StaticView>,
    #[serde(default)]
    dynamic_views: Vec<DynamicView>,
}

impl ViewSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a system context view scoped to a software system
    pub fn create_system_context_view(
        &mut self,
        model: &Model,
        system: ElementId,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> ModelResult<&mut StaticView> {
        self.create_static_view(
            model,
            StaticViewKind::SystemContext,
            system,
            key.into(),
            description.into(),
        )
    }

    /// Create a container view scoped to a software system
    pub fn create_container_view(
        &mut self,
        model: &Model,
        system: ElementId,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> ModelResult<&mut StaticView> {
        self.create_static_view(
            model,
            StaticViewKind::Container,
            system,
            key.into(),
            description.into(),
        )
    }

    /// Create a component view scoped to a container
    pub fn create_component_view(
        &mut self,
        model: &Model,
        container: ElementId,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> ModelResult<&mut StaticView> {
        self.create_static_view(
            model,
            StaticViewKind::Component,
            container,
            key.into(),
            description.into(),
        )
    }

    /// Create a dynamic view scoped to a software system or container
    pub fn create_dynamic_view(
        &mut self,
        model: &Model,
        scope: ElementId,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> ModelResult<&mut DynamicView> {
        let key = self.check_key(key.into())?;
        DynamicView::check_scope(model, &key, scope)?;

        debug!(key = %key, scope = %scope, "Creating dynamic view");
        self.dynamic_views
            .push(DynamicView::new(scope, key, non_empty(description.into())));
        let index = self.dynamic_views.len() - 1;
        Ok(&mut self.dynamic_views[index])
    }

    fn create_static_view(
        &mut self,
        model: &Model,
        kind: StaticViewKind,
        scope: ElementId,
        key: String,
        description: String,
    ) -> ModelResult<&mut StaticView> {
        let key = self.check_key(key)?;
        let element = model.require(scope)?;
        let expected = kind.scope_kind();
        if element.kind != expected {
            return Err(ModelError::InvalidScope {
                key,
                scope,
                expected,
                found: element.kind,
            });
        }

        debug!(key = %key, kind = %kind, scope = %scope, "Creating static view");
        self.static_views
            .push(StaticView::new(kind, scope, key, non_empty(description)));
        let index = self.static_views.len() - 1;
        Ok(&mut self.static_views[index])
    }

    fn check_key(&self, key: String) -> ModelResult<String> {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(ModelError::EmptyViewKey);
        }
        if self.contains_key(&key) {
            return Err(ModelError::DuplicateViewKey(key));
        }
        Ok(key)
    }

    /// Whether any view uses this key
    pub fn contains_key(&self, key: &str) -> bool {
        self.static_views.iter().any(|v| v.key == key)
            || self.dynamic_views.iter().any(|v| v.key == key)
    }

    /// Look up a view of either type by key
    pub fn view(&self, key: &str) -> Option<View<'_>> {
        self.static_view(key)
            .map(View::Static)
            .or_else(|| self.dynamic_view(key).map(View::Dynamic))
    }

    pub fn static_view(&self, key: &str) -> Option<&StaticView> {
        self.static_views.iter().find(|v| v.key == key)
    }

    pub fn static_view_mut(&mut self, key: &str) -> Option<&mut StaticView> {
        self.static_views.iter_mut().find(|v| v.key == key)
    }

    pub fn dynamic_view(&self, key: &str) -> Option<&DynamicView> {
        self.dynamic_views.iter().find(|v| v.key == key)
    }

    pub fn dynamic_view_mut(&mut self, key: &str) -> Option<&mut DynamicView> {
        self.dynamic_views.iter_mut().find(|v| v.key == key)
    }

    /// Static views in creation order
    pub fn static_views(&self) -> &[StaticView] {
        &self.static_views
    }

    /// Dynamic views in creation order
    pub fn dynamic_views(&self) -> &[DynamicView] {
        &self.dynamic_views
    }

    pub(crate) fn static_views_mut(&mut self) -> impl Iterator<Item = &mut StaticView> + '_ {
        self.static_views.iter_mut()
    }

    pub(crate) fn dynamic_views_mut(&mut self) -> impl Iterator<Item = &mut DynamicView> + '_ {
        self.dynamic_views.iter_mut()
    }

    /// Total number of views
    pub fn len(&self) -> usize {
        self.static_views.len() + self.dynamic_views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every view against the model it projects
    pub fn validate(&self, model: &Model) -> ModelResult<()> {
        let mut keys = HashSet::new();
        let all_keys = self
            .static_views
            .iter()
            .map(|v| v.key.as_str())
            .chain(self.dynamic_views.iter().map(|v| v.key.as_str()));
        for key in all_keys {
            if key.trim().is_empty() {
                return Err(ModelError::EmptyViewKey);
            }
            if !keys.insert(key) {
                return Err(ModelError::DuplicateViewKey(key.to_string()));
            }
        }

        for view in &self.static_views {
            view.validate(model)?;
        }
        for view in &self.dynamic_views {
            view.validate(model)?;
        }
        Ok(())
    }
}
