//! Dynamic (sequence) views
//!
//! A dynamic view is one traced scenario: an explicit, ordered list of
//! interactions. Nothing is included automatically and the same pair of
//! elements may interact more than once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{ElementView, Vertex};
use crate::error::{ModelError, ModelResult};
use crate::model::{non_empty, ElementId, ElementKind, Model, RelationshipId};

/// One numbered interaction in a dynamic view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionStep {
    /// Position in the sequence, starting at 1
    pub order: u32,
    pub source: ElementId,
    pub destination: ElementId,
    /// Model relationship backing this step, if one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Vertex>,
}

/// An ordered sequence of interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicView {
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
    pub(crate) steps: Vec<InteractionStep>,
}

impl DynamicView {
    pub(crate) fn new(scope: ElementId, key: String, description: Option<String>) -> Self {
        Self {
            key,
            title: None,
            description,
            scope,
            paper_size: None,
            elements: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Append an interaction from `source` to `destination`
    ///
    /// The step borrows its description from the first model relationship
    /// between the pair, if there is one.
    pub fn add(
        &mut self,
        model: &Model,
        source: ElementId,
        destination: ElementId,
    ) -> ModelResult<&InteractionStep> {
        self.push_step(model, source, destination, None)
    }

    /// Append an interaction with its own description
    ///
    /// A model relationship with a matching description is preferred as
    /// the backing relationship.
    pub fn add_with_description(
        &mut self,
        model: &Model,
        source: ElementId,
        destination: ElementId,
        description: impl Into<String>,
    ) -> ModelResult<&InteractionStep> {
        self.push_step(model, source, destination, non_empty(description.into()))
    }

    fn push_step(
        &mut self,
        model: &Model,
        source: ElementId,
        destination: ElementId,
        description: Option<String>,
    ) -> ModelResult<&InteractionStep> {
        model.require(source)?;
        model.require(destination)?;

        let candidates: Vec<_> = model.relationships_between(source, destination).collect();
        let relationship = description
            .as_deref()
            .and_then(|d| {
                candidates
                    .iter()
                    .find(|r| r.description.as_deref() == Some(d))
            })
            .or_else(|| candidates.first())
            .copied();

        let description =
            description.or_else(|| relationship.and_then(|r| r.description.clone()));
        let order = self.steps.len() as u32 + 1;

        self.steps.push(InteractionStep {
            order,
            source,
            destination,
            relationship: relationship.map(|r| r.id),
            description,
            vertices: Vec::new(),
        });

        let mut included: BTreeSet<ElementId> = self.elements.iter().map(|e| e.id).collect();
        for id in [source, destination] {
            if included.insert(id) {
                self.elements.push(ElementView::new(id));
            }
        }
        self.elements.sort_by_key(|e| e.id);

        let index = self.steps.len() - 1;
        Ok(&self.steps[index])
    }

    /// Steps in declaration order
    pub fn steps(&self) -> &[InteractionStep] {
        &self.steps
    }

    /// Elements taking part in the scenario, ordered by id
    pub fn elements(&self) -> &[ElementView] {
        &self.elements
    }

    /// Title to display: the explicit title, or one derived from the key
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("[Dynamic] {}", self.key),
        }
    }

    /// Set the position of a participating element; returns false if it does not take part
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

    pub(crate) fn steps_mut(&mut self) -> &mut [InteractionStep] {
        &mut self.steps
    }

    /// Dynamic views are scoped to a software system or a container
    pub(crate) fn check_scope(model: &Model, key: &str, scope: ElementId) -> ModelResult<()> {
        let element = model.require(scope)?;
        if !matches!(
            element.kind,
            ElementKind::SoftwareSystem | ElementKind::Container
        ) {
            return Err(ModelError::InvalidScope {
                key: key.to_string(),
                scope,
                expected: ElementKind::SoftwareSystem,
                found: element.kind,
            });
        }
        Ok(())
    }

    pub(crate) fn validate(&self, model: &Model) -> ModelResult<()> {
        Self::check_scope(model, &self.key, self.scope)?;
        for (index, step) in self.steps.iter().enumerate() {
            if step.order as usize != index + 1 {
                return Err(ModelError::Inconsistent(format!(
                    "step {} of view '{}' is numbered {}",
                    index + 1,
                    self.key,
                    step.order
                )));
            }
            model.require(step.source)?;
            model.require(step.destination)?;
            if let Some(id) = step.relationship {
                if model.relationship(id).is_none() {
                    return Err(ModelError::UnknownRelationship(id));
                }
            }
        }
        for view in &self.elements {
            model.require(view.id)?;
        }
        Ok(())
    }
}
