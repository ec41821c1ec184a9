//! System context, container and component views

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ElementView, RelationshipView};
use crate::error::{ModelError, ModelResult};
use crate::model::{ElementId, ElementKind, Model};

/// Abstraction tier of a static view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticViewKind {
    SystemContext,
    Container,
    Component,
}

impl StaticViewKind {
    /// The kind of element a view of this tier is scoped to
    pub fn scope_kind(self) -> ElementKind {
        match self {
            StaticViewKind::SystemContext | StaticViewKind::Container => {
                ElementKind::SoftwareSystem
            }
            StaticViewKind::Component => ElementKind::Container,
        }
    }
}

impl std::fmt::Display for StaticViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            StaticViewKind::SystemContext => "System Context",
            StaticViewKind::Container => "Container",
            StaticViewKind::Component => "Component",
        };
        write!(f, "{}", label)
    }
}

/// A structural projection of the model at one abstraction tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticView {
    pub kind: StaticViewKind,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scope: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<String>,
    #[serde(default)]
    pub(crate) elements: Vec<ElementView>,
    #[serde(default)]
    pub(crate) relationships: Vec<RelationshipView>,
}

impl StaticView {
    pub(crate) fn new(
        kind: StaticViewKind,
        scope: ElementId,
        key: String,
        description: Option<String>,
    ) -> Self {
        Self {
            kind,
            key,
            title: None,
            description,
            scope,
            paper_size: None,
            elements: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Included elements, ordered by id
    pub fn elements(&self) -> &[ElementView] {
        &self.elements
    }

    /// Included relationships, ordered by id
    pub fn relationships(&self) -> &[RelationshipView] {
        &self.relationships
    }

    /// Ids of the included elements
    pub fn element_ids(&self) -> BTreeSet<ElementId> {
        self.elements.iter().map(|e| e.id).collect()
    }

    /// Check whether an element is included
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Title to display: the explicit title, or one derived from the key
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("[{}] {}", self.kind, self.key),
        }
    }

    /// Include the scope's members and everything one hop away from them
    ///
    /// - system context: the scope system plus people and software systems
    ///   directly related to it
    /// - container: all containers of the scope system plus people, other
    ///   systems and other systems' containers related to them
    /// - component: all components of the scope container plus people,
    ///   systems, other containers and other components related to them
    ///
    /// Then every relationship with both endpoints included is added. The
    /// result only depends on the model, not on earlier calls.
    pub fn add_all_elements(&mut self, model: &Model) {
        let mut included: BTreeSet<ElementId> = self.element_ids();
        let members: Vec<ElementId> = match self.kind {
            StaticViewKind::SystemContext => {
                included.insert(self.scope);
                Vec::new()
            }
            StaticViewKind::Container | StaticViewKind::Component => {
                model.children(self.scope).map(|e| e.id).collect()
            }
        };
        included.extend(members.iter().copied());

        // Expansion starts at the scope itself as well as its members, so
        // relationships drawn to the boundary element still pull in their
        // other end.
        let mut seeds = vec![self.scope];
        seeds.extend(members);

        for seed in seeds {
            for rel in model.relationships_involving(seed) {
                let Some(other) = rel.other_end(seed) else {
                    continue;
                };
                if self.permits(model, other) {
                    included.insert(other);
                }
            }
        }

        self.set_elements(model, included);
        debug!(
            key = %self.key,
            elements = self.elements.len(),
            relationships = self.relationships.len(),
            "Added all elements to view"
        );
    }

    /// Include a single element
    pub fn add_element(&mut self, model: &Model, id: ElementId) -> ModelResult<()> {
        let element = model.require(id)?;
        if !self.permits(model, id) {
            return Err(ModelError::ElementNotPermitted {
                key: self.key.clone(),
                element: id,
                kind: element.kind,
            });
        }
        let mut included = self.element_ids();
        included.insert(id);
        self.set_elements(model, included);
        Ok(())
    }

    /// Remove an element and every relationship touching it
    pub fn remove_element(&mut self, model: &Model, id: ElementId) {
        let mut included = self.element_ids();
        if included.remove(&id) {
            self.set_elements(model, included);
        }
    }

    /// Whether an element belongs to the abstraction tier of this view
    fn permits(&self, model: &Model, id: ElementId) -> bool {
        let Some(element) = model.element(id) else {
            return false;
        };
        match self.kind {
            StaticViewKind::SystemContext => matches!(
                element.kind,
                ElementKind::Person | ElementKind::SoftwareSystem
            ),
            StaticViewKind::Container => match element.kind {
                ElementKind::Person => true,
                ElementKind::SoftwareSystem => id != self.scope,
                ElementKind::Container => true,
                ElementKind::Component => false,
            },
            StaticViewKind::Component => match element.kind {
                ElementKind::Person => true,
                ElementKind::SoftwareSystem => Some(id) != model.parent_system(self.scope),
                ElementKind::Container => id != self.scope,
                ElementKind::Component => true,
            },
        }
    }

    /// Replace the element set, keeping layout of elements that stay and
    /// recomputing the relationship set
    fn set_elements(&mut self, model: &Model, included: BTreeSet<ElementId>) {
        let previous = std::mem::take(&mut self.elements);
        self.elements = included
            .into_iter()
            .map(|id| {
                previous
                    .iter()
                    .find(|e| e.id == id)
                    .cloned()
                    .unwrap_or_else(|| ElementView::new(id))
            })
            .collect();

        let previous = std::mem::take(&mut self.relationships);
        self.relationships = model
            .relationships()
            .iter()
            .filter(|r| self.contains(r.source) && self.contains(r.destination))
            .map(|r| {
                previous
                    .iter()
                    .find(|v| v.id == r.id)
                    .cloned()
                    .unwrap_or_else(|| RelationshipView::new(r.id))
            })
            .collect();
    }

    /// Set the position of an included element; returns false if it is not included
    pub fn set_position(&mut self, id: ElementId, x: i32, y: i32) -> bool {
        match self.elements.iter_mut().find(|e| e.id == id) {
            Some(view) => {
                view.x = Some(x);
                view.y = Some(y);
                true
            }
            None => false,
        }
    }

    pub(crate) fn element_views_mut(&mut self) -> &mut [ElementView] {
        &mut self.elements
    }

    pub(crate) fn relationship_views_mut(&mut self) -> &mut [RelationshipView] {
        &mut self.relationships
    }

    pub(crate) fn validate(&self, model: &Model) -> ModelResult<()> {
        let scope = model.require(self.scope)?;
        if scope.kind != self.kind.scope_kind() {
            return Err(ModelError::InvalidScope {
                key: self.key.clone(),
                scope: self.scope,
                expected: self.kind.scope_kind(),
                found: scope.kind,
            });
        }
        for view in &self.elements {
            model.require(view.id)?;
        }
        for view in &self.relationships {
            if model.relationship(view.id).is_none() {
                return Err(ModelError::UnknownRelationship(view.id));
            }
        }
        Ok(())
    }
}
