//! Model elements
//!
//! People, software systems, containers and components share one `Element`
//! type. The `kind` discriminant decides where an element may live in the
//! containment tree; parent links are plain ids into the model's arena.

use serde::{Deserialize, Serialize};

use super::tags;

/// Identifier of an element within a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u32);

impl ElementId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Person,
    SoftwareSystem,
    Container,
    Component,
}

impl ElementKind {
    /// Default tag applied to every element of this kind
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Person => tags::PERSON,
            ElementKind::SoftwareSystem => tags::SOFTWARE_SYSTEM,
            ElementKind::Container => tags::CONTAINER,
            ElementKind::Component => tags::COMPONENT,
        }
    }

    /// The kind an element of this kind must be contained by (`None` = top level)
    pub fn parent_kind(self) -> Option<ElementKind> {
        match self {
            ElementKind::Person | ElementKind::SoftwareSystem => None,
            ElementKind::Container => Some(ElementKind::SoftwareSystem),
            ElementKind::Component => Some(ElementKind::Container),
        }
    }

    fn scheme(self) -> &'static str {
        match self {
            ElementKind::Person => "Person",
            ElementKind::SoftwareSystem => "SoftwareSystem",
            ElementKind::Container => "Container",
            ElementKind::Component => "Component",
        }
    }

    /// Build a canonical name from the names on the path from the root
    ///
    /// Path segments are joined with `.`; a `.` or backslash inside a name
    /// is preceded by a backslash, so distinct paths never share a name.
    pub(crate) fn canonical_name(self, path: &[&str]) -> String {
        let escaped: Vec<String> = path.iter().map(|name| escape_segment(name)).collect();
        format!("{}://{}", self.scheme(), escaped.join("."))
    }
}

fn escape_segment(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if c == '.' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Whether a person or software system is inside the modelled organisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Internal,
    External,
}

/// A node in the architecture graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier, assigned by the model
    pub id: ElementId,
    /// What this element is
    pub kind: ElementKind,
    /// Name, unique among siblings
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Owning element for containers and components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ElementId>,
    /// Tags in insertion order, without duplicates
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Element {
    pub(crate) fn new(
        id: ElementId,
        kind: ElementKind,
        parent: Option<ElementId>,
        name: String,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            description: None,
            technology: None,
            url: None,
            location: None,
            parent,
            tags: vec![tags::ELEMENT.to_string(), kind.tag().to_string()],
        }
    }

    /// Check whether the element carries a tag
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
}
