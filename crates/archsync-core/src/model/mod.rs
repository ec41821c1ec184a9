//! Element & relationship registry
//!
//! The model owns every element and relationship of a workspace in flat
//! arenas. Ids are arena positions and parent/child links are ids, so the
//! containment tree never needs shared ownership.
//!
//! Every add operation validates first and mutates last: a failing call
//! leaves the model untouched.
//!
//! ```text
//! let mut model = Model::new();
//! let user = model.add_person("User", "A user")?;
//! let shop = model.add_software_system("Shop", "Sells things")?;
//! model.uses(user, shop, "Buys from")?;
//! ```

mod element;
mod relationship;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use element::{Element, ElementId, ElementKind, Location};
pub(crate) use relationship::non_empty;
pub use relationship::{InteractionStyle, Relationship, RelationshipId, RelationshipSpec};

use crate::error::{ModelError, ModelResult};

/// Tags applied automatically by the model
pub mod tags {
    pub const ELEMENT: &str = "Element";
    pub const PERSON: &str = "Person";
    pub const SOFTWARE_SYSTEM: &str = "Software System";
    pub const CONTAINER: &str = "Container";
    pub const COMPONENT: &str = "Component";
    pub const RELATIONSHIP: &str = "Relationship";
    pub const SYNCHRONOUS: &str = "Synchronous";
    pub const ASYNCHRONOUS: &str = "Asynchronous";
}

/// Something that can carry tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTarget {
    Element(ElementId),
    Relationship(RelationshipId),
}

impl From<ElementId> for TagTarget {
    fn from(id: ElementId) -> Self {
        TagTarget::Element(id)
    }
}

impl From<RelationshipId> for TagTarget {
    fn from(id: RelationshipId) -> Self {
        TagTarget::Relationship(id)
    }
}

/// The architecture graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Elements ====================

    /// Add a top-level person
    pub fn add_person(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ModelResult<ElementId> {
        self.insert_element(ElementKind::Person, None, name.into(), description.into(), None)
    }

    /// Add a top-level software system
    pub fn add_software_system(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ModelResult<ElementId> {
        self.insert_element(
            ElementKind::SoftwareSystem,
            None,
            name.into(),
            description.into(),
            None,
        )
    }

    /// Add a container owned by a software system
    pub fn add_container(
        &mut self,
        system: ElementId,
        name: impl Into<String>,
        description: impl Into<String>,
        technology: impl Into<String>,
    ) -> ModelResult<ElementId> {
        self.require_parent(system, ElementKind::SoftwareSystem)?;
        self.insert_element(
            ElementKind::Container,
            Some(system),
            name.into(),
            description.into(),
            Some(technology.into()),
        )
    }

    /// Add a component owned by a container
    pub fn add_component(
        &mut self,
        container: ElementId,
        name: impl Into<String>,
        description: impl Into<String>,
        technology: impl Into<String>,
    ) -> ModelResult<ElementId> {
        self.require_parent(container, ElementKind::Container)?;
        self.insert_element(
            ElementKind::Component,
            Some(container),
            name.into(),
            description.into(),
            Some(technology.into()),
        )
    }

    fn require_parent(&self, parent: ElementId, expected: ElementKind) -> ModelResult<()> {
        let element = self.require(parent)?;
        if element.kind != expected {
            return Err(ModelError::InvalidParent {
                parent,
                expected,
                found: element.kind,
            });
        }
        Ok(())
    }

    fn insert_element(
        &mut self,
        kind: ElementKind,
        parent: Option<ElementId>,
        name: String,
        description: String,
        technology: Option<String>,
    ) -> ModelResult<ElementId> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ModelError::EmptyName(kind));
        }
        if self.find_element(parent, &name).is_some() {
            return Err(ModelError::DuplicateName {
                name,
                scope: self.scope_label(parent),
            });
        }

        let id = ElementId::from_index(self.elements.len());
        let mut element = Element::new(id, kind, parent, name);
        element.description = non_empty(description);
        element.technology = technology.and_then(non_empty);

        debug!(id = %id, kind = %kind, name = %element.name, "Added element");
        self.elements.push(element);
        Ok(id)
    }

    fn scope_label(&self, parent: Option<ElementId>) -> String {
        match parent.and_then(|id| self.element(id)) {
            Some(p) => format!("{} '{}'", p.kind, p.name),
            None => "the model".to_string(),
        }
    }

    /// Replace the description of an element
    pub fn set_description(
        &mut self,
        id: ElementId,
        description: impl Into<String>,
    ) -> ModelResult<()> {
        self.element_mut(id)?.description = non_empty(description.into());
        Ok(())
    }

    /// Replace the technology of an element
    pub fn set_technology(&mut self, id: ElementId, technology: impl Into<String>) -> ModelResult<()> {
        self.element_mut(id)?.technology = non_empty(technology.into());
        Ok(())
    }

    /// Set the documentation URL of an element
    pub fn set_url(&mut self, id: ElementId, url: impl Into<String>) -> ModelResult<()> {
        self.element_mut(id)?.url = non_empty(url.into());
        Ok(())
    }

    /// Mark an element as internal or external to the organisation
    pub fn set_location(&mut self, id: ElementId, location: Location) -> ModelResult<()> {
        self.element_mut(id)?.location = Some(location);
        Ok(())
    }

    fn element_mut(&mut self, id: ElementId) -> ModelResult<&mut Element> {
        match self.elements.get_mut(id.index()) {
            Some(element) if element.id == id => Ok(element),
            _ => Err(ModelError::UnknownElement(id)),
        }
    }

    // ==================== Relationships ====================

    /// Add a synchronous relationship with a description
    pub fn add_relationship(
        &mut self,
        source: ElementId,
        destination: ElementId,
        description: impl Into<String>,
    ) -> ModelResult<RelationshipId> {
        self.add_relationship_with(source, destination, RelationshipSpec::new(description))
    }

    /// Shorthand for [`Model::add_relationship`]: `source` uses `destination`
    pub fn uses(
        &mut self,
        source: ElementId,
        destination: ElementId,
        description: impl Into<String>,
    ) -> ModelResult<RelationshipId> {
        self.add_relationship(source, destination, description)
    }

    /// Add a relationship with technology and interaction style
    ///
    /// Both endpoints must already be registered. Parallel relationships
    /// between the same pair are kept as independent edges.
    pub fn add_relationship_with(
        &mut self,
        source: ElementId,
        destination: ElementId,
        spec: RelationshipSpec,
    ) -> ModelResult<RelationshipId> {
        self.require(source)?;
        self.require(destination)?;

        let id = RelationshipId::from_index(self.relationships.len());
        debug!(
            id = %id,
            source = %source,
            destination = %destination,
            style = ?spec.interaction_style,
            "Added relationship"
        );
        self.relationships
            .push(Relationship::new(id, source, destination, spec));
        Ok(id)
    }

    fn relationship_mut(&mut self, id: RelationshipId) -> ModelResult<&mut Relationship> {
        match self.relationships.get_mut(id.index()) {
            Some(rel) if rel.id == id => Ok(rel),
            _ => Err(ModelError::UnknownRelationship(id)),
        }
    }

    // ==================== Tags ====================

    /// Add tags to an element or relationship
    ///
    /// Tags already present and blank tags are skipped.
    pub fn add_tags<I, T>(&mut self, target: impl Into<TagTarget>, tags: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let tags = tags
            .into_iter()
            .map(Into::<String>::into)
            .filter(|tag| !tag.trim().is_empty());

        match target.into() {
            TagTarget::Element(id) => {
                let element = self.element_mut(id)?;
                for tag in tags {
                    element.add_tag(tag);
                }
            }
            TagTarget::Relationship(id) => {
                let rel = self.relationship_mut(id)?;
                for tag in tags {
                    rel.add_tag(tag);
                }
            }
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// Get an element by id
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index()).filter(|e| e.id == id)
    }

    /// Get an element by id, failing if it is not registered
    pub fn require(&self, id: ElementId) -> ModelResult<&Element> {
        self.element(id).ok_or(ModelError::UnknownElement(id))
    }

    /// Get a relationship by id
    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.get(id.index()).filter(|r| r.id == id)
    }

    /// All elements, in creation order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// All relationships, in creation order
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// All people
    pub fn people(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements
            .iter()
            .filter(|e| e.kind == ElementKind::Person)
    }

    /// All software systems
    pub fn software_systems(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements
            .iter()
            .filter(|e| e.kind == ElementKind::SoftwareSystem)
    }

    /// Elements directly contained by `parent`
    pub fn children(&self, parent: ElementId) -> impl Iterator<Item = &Element> + '_ {
        self.elements
            .iter()
            .filter(move |e| e.parent == Some(parent))
    }

    /// Relationships with `id` at either end
    pub fn relationships_involving(&self, id: ElementId) -> impl Iterator<Item = &Relationship> + '_ {
        self.relationships.iter().filter(move |r| r.involves(id))
    }

    /// Relationships from `source` to `destination`
    pub fn relationships_between(
        &self,
        source: ElementId,
        destination: ElementId,
    ) -> impl Iterator<Item = &Relationship> + '_ {
        self.relationships
            .iter()
            .filter(move |r| r.source == source && r.destination == destination)
    }

    /// Find an element by name among the children of `parent` (`None` = top level)
    pub fn find_element(&self, parent: Option<ElementId>, name: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| e.parent == parent && e.name == name)
    }

    /// The software system an element belongs to (a system belongs to itself)
    pub fn parent_system(&self, id: ElementId) -> Option<ElementId> {
        let mut current = self.element(id)?;
        for _ in 0..3 {
            match current.kind {
                ElementKind::SoftwareSystem => return Some(current.id),
                ElementKind::Person => return None,
                _ => current = self.element(current.parent?)?,
            }
        }
        None
    }

    /// Id-independent name of an element, e.g. `Container://Shop.API`
    ///
    /// Returns `None` for unknown ids or a broken parent chain.
    pub fn canonical_name(&self, id: ElementId) -> Option<String> {
        let element = self.element(id)?;
        let mut path = vec![element.name.as_str()];
        let mut current = element.parent;
        while let Some(parent_id) = current {
            if path.len() > 3 {
                return None;
            }
            let parent = self.element(parent_id)?;
            path.push(parent.name.as_str());
            current = parent.parent;
        }
        path.reverse();
        Some(element.kind.canonical_name(&path))
    }

    /// Find an element by its canonical name
    pub fn find_element_by_canonical_name(&self, canonical_name: &str) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| self.canonical_name(e.id).as_deref() == Some(canonical_name))
    }

    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    // ==================== Validation ====================

    /// Check every invariant on a model that was not built through the add operations
    pub fn validate(&self) -> ModelResult<()> {
        let mut siblings = HashSet::new();

        for (index, element) in self.elements.iter().enumerate() {
            if element.id.index() != index {
                return Err(ModelError::Inconsistent(format!(
                    "element at position {} has id {}",
                    index, element.id
                )));
            }
            if element.name.trim().is_empty() {
                return Err(ModelError::EmptyName(element.kind));
            }

            match (element.kind.parent_kind(), element.parent) {
                (None, None) => {}
                (Some(expected), Some(parent)) => self.require_parent(parent, expected)?,
                (None, Some(parent)) => {
                    return Err(ModelError::Inconsistent(format!(
                        "{} {} cannot be contained by element {}",
                        element.kind, element.id, parent
                    )))
                }
                (Some(expected), None) => {
                    return Err(ModelError::Inconsistent(format!(
                        "{} {} must be contained by a {}",
                        element.kind, element.id, expected
                    )))
                }
            }

            if !siblings.insert((element.parent, element.name.as_str())) {
                return Err(ModelError::DuplicateName {
                    name: element.name.clone(),
                    scope: self.scope_label(element.parent),
                });
            }
        }

        for (index, rel) in self.relationships.iter().enumerate() {
            if rel.id.index() != index {
                return Err(ModelError::Inconsistent(format!(
                    "relationship at position {} has id {}",
                    index, rel.id
                )));
            }
            self.require(rel.source)?;
            self.require(rel.destination)?;
        }

        Ok(())
    }
}
