//! Model and workspace errors
//!
//! Construction errors are raised by the call that caused them; the model or
//! view catalog is left exactly as it was before the call.

use thiserror::Error;

use crate::model::{ElementId, ElementKind, RelationshipId};

/// Errors raised while building the model or its views
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A sibling element already uses this name
    #[error("An element named '{name}' already exists in {scope}")]
    DuplicateName { name: String, scope: String },

    /// Reference to an element that is not registered in this model
    #[error("Element {0} does not exist in this model")]
    UnknownElement(ElementId),

    /// Reference to a relationship that is not registered in this model
    #[error("Relationship {0} does not exist in this model")]
    UnknownRelationship(RelationshipId),

    /// Element names must contain something other than whitespace
    #[error("A {0} must have a non-empty name")]
    EmptyName(ElementKind),

    /// Containment must follow system -> container -> component
    #[error("Element {parent} is a {found}, but a {expected} is required as parent")]
    InvalidParent {
        parent: ElementId,
        expected: ElementKind,
        found: ElementKind,
    },

    /// View scoped to the wrong kind of element
    #[error("View '{key}' must be scoped to a {expected}, but element {scope} is a {found}")]
    InvalidScope {
        key: String,
        scope: ElementId,
        expected: ElementKind,
        found: ElementKind,
    },

    /// View keys identify views and must be unique
    #[error("A view with the key '{0}' already exists")]
    DuplicateViewKey(String),

    /// View keys must contain something other than whitespace
    #[error("A view key must not be empty")]
    EmptyViewKey,

    /// Element is outside the abstraction tier of the view
    #[error("A {kind} (element {element}) cannot be added to view '{key}'")]
    ElementNotPermitted {
        key: String,
        element: ElementId,
        kind: ElementKind,
    },

    /// Loaded data violates a model invariant
    #[error("Inconsistent model: {0}")]
    Inconsistent(String),
}

/// Errors loading a serialized workspace
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// The document is not valid workspace JSON
    #[error("Invalid workspace document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but its model is inconsistent
    #[error("Invalid workspace model: {0}")]
    Model(#[from] ModelError),
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
