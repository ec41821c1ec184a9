//! Relationships between elements

use serde::{Deserialize, Serialize};

use super::element::ElementId;
use super::tags;

/// Identifier of a relationship within a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(u32);

impl RelationshipId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the source interacts with the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionStyle {
    #[default]
    Synchronous,
    Asynchronous,
}

impl InteractionStyle {
    /// Default tag applied to relationships with this style
    pub fn tag(self) -> &'static str {
        match self {
            InteractionStyle::Synchronous => tags::SYNCHRONOUS,
            InteractionStyle::Asynchronous => tags::ASYNCHRONOUS,
        }
    }
}

/// A directed edge between two elements
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: RelationshipId,
    pub source: ElementId,
    pub destination: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default)]
    pub interaction_style: InteractionStyle,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Relationship {
    pub(crate) fn new(id: RelationshipId, source: ElementId, destination: ElementId, spec: RelationshipSpec) -> Self {
        Self {
            id,
            source,
            destination,
            description: spec.description,
            technology: spec.technology,
            interaction_style: spec.interaction_style,
            tags: vec![
                tags::RELATIONSHIP.to_string(),
                spec.interaction_style.tag().to_string(),
            ],
        }
    }

    /// Check whether the relationship carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag, returning false if it was already present
    pub(crate) fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Check whether the relationship touches an element at either end
    pub fn involves(&self, id: ElementId) -> bool {
        self.source == id || self.destination == id
    }

    /// The element at the other end, if this relationship touches `id`
    pub fn other_end(&self, id: ElementId) -> Option<ElementId> {
        if self.source == id {
            Some(self.destination)
        } else if self.destination == id {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Optional attributes for a new relationship
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipSpec {
    pub description: Option<String>,
    pub technology: Option<String>,
    pub interaction_style: InteractionStyle,
}

impl RelationshipSpec {
    /// Start with a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: non_empty(description.into()),
            ..Self::default()
        }
    }

    /// Set the technology
    pub fn technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = non_empty(technology.into());
        self
    }

    /// Set the interaction style
    pub fn interaction_style(mut self, style: InteractionStyle) -> Self {
        self.interaction_style = style;
        self
    }

    /// Shorthand for an asynchronous interaction
    pub fn asynchronous(self) -> Self {
        self.interaction_style(InteractionStyle::Asynchronous)
    }
}

pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
