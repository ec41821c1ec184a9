//! Tag-based styles
//!
//! Styles are keyed by tag and are purely advisory: an element or
//! relationship with tags that have no style simply renders with the
//! defaults. Resolution walks the tags of an element in insertion order and
//! overlays each matching style property by property, so a later tag wins
//! over an earlier one only for the properties it actually sets.

use serde::{Deserialize, Serialize};

use crate::model::{Element, Relationship};

/// Default element text colour
pub const DEFAULT_ELEMENT_COLOR: &str = "#000000";
/// Default element background
pub const DEFAULT_ELEMENT_BACKGROUND: &str = "#dddddd";
/// Default element font size
pub const DEFAULT_FONT_SIZE: u32 = 24;
/// Default relationship colour
pub const DEFAULT_RELATIONSHIP_COLOR: &str = "#707070";
/// Default relationship line thickness
pub const DEFAULT_THICKNESS: u32 = 2;

/// Element shapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Box,
    RoundedBox,
    Circle,
    Ellipse,
    Hexagon,
    Cylinder,
    Pipe,
    Person,
    Robot,
    Folder,
    WebBrowser,
    MobileDevicePortrait,
    MobileDeviceLandscape,
    Component,
}

/// Element border styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Border {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// How relationship lines are routed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Routing {
    #[default]
    Direct,
    Orthogonal,
    Curved,
}

/// Style properties for elements; unset properties do not override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
}

impl ElementStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    pub fn stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn font_size(mut self, font_size: u32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Opacity in percent, clamped to 100
    pub fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = Some(opacity.min(100));
        self
    }

    fn overlay(&mut self, other: &ElementStyle) {
        overlay(&mut self.color, &other.color);
        overlay(&mut self.background, &other.background);
        overlay(&mut self.stroke, &other.stroke);
        overlay(&mut self.shape, &other.shape);
        overlay(&mut self.border, &other.border);
        overlay(&mut self.font_size, &other.font_size);
        overlay(&mut self.opacity, &other.opacity);
    }
}

/// Style properties for relationships; unset properties do not override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<Routing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<u32>,
}

impl RelationshipStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dashed(mut self, dashed: bool) -> Self {
        self.dashed = Some(dashed);
        self
    }

    pub fn routing(mut self, routing: Routing) -> Self {
        self.routing = Some(routing);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn thickness(mut self, thickness: u32) -> Self {
        self.thickness = Some(thickness);
        self
    }

    fn overlay(&mut self, other: &RelationshipStyle) {
        overlay(&mut self.dashed, &other.dashed);
        overlay(&mut self.routing, &other.routing);
        overlay(&mut self.color, &other.color);
        overlay(&mut self.thickness, &other.thickness);
    }
}

fn overlay<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

/// Fully resolved element style, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedElementStyle {
    pub color: String,
    pub background: String,
    pub stroke: Option<String>,
    pub shape: Shape,
    pub border: Border,
    pub font_size: u32,
    pub opacity: u8,
}

/// Fully resolved relationship style, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRelationshipStyle {
    pub dashed: bool,
    pub routing: Routing,
    pub color: String,
    pub thickness: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TaggedElementStyle {
    tag: String,
    #[serde(flatten)]
    style: ElementStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TaggedRelationshipStyle {
    tag: String,
    #[serde(flatten)]
    style: RelationshipStyle,
}

/// Tag to style registry, owned by the workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Styles {
    #[serde(default)]
    elements: Vec<TaggedElementStyle>,
    #[serde(default)]
    relationships: Vec<TaggedRelationshipStyle>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element style for a tag
    ///
    /// Registering the same tag again merges the new properties into the
    /// existing entry.
    pub fn set_element_style(&mut self, tag: impl Into<String>, style: ElementStyle) {
        let tag = tag.into();
        match self.elements.iter_mut().find(|s| s.tag == tag) {
            Some(existing) => existing.style.overlay(&style),
            None => self.elements.push(TaggedElementStyle { tag, style }),
        }
    }

    /// Register a relationship style for a tag
    pub fn set_relationship_style(&mut self, tag: impl Into<String>, style: RelationshipStyle) {
        let tag = tag.into();
        match self.relationships.iter_mut().find(|s| s.tag == tag) {
            Some(existing) => existing.style.overlay(&style),
            None => self
                .relationships
                .push(TaggedRelationshipStyle { tag, style }),
        }
    }

    /// The element style registered for a tag
    pub fn element_style(&self, tag: &str) -> Option<&ElementStyle> {
        self.elements
            .iter()
            .find(|s| s.tag == tag)
            .map(|s| &s.style)
    }

    /// The relationship style registered for a tag
    pub fn relationship_style(&self, tag: &str) -> Option<&RelationshipStyle> {
        self.relationships
            .iter()
            .find(|s| s.tag == tag)
            .map(|s| &s.style)
    }

    /// Merge the styles of a list of tags, later tags overriding earlier ones
    pub fn merged_element_style<S: AsRef<str>>(&self, tags: &[S]) -> ElementStyle {
        let mut merged = ElementStyle::default();
        for style in tags.iter().filter_map(|t| self.element_style(t.as_ref())) {
            merged.overlay(style);
        }
        merged
    }

    /// Merge the relationship styles of a list of tags
    pub fn merged_relationship_style<S: AsRef<str>>(&self, tags: &[S]) -> RelationshipStyle {
        let mut merged = RelationshipStyle::default();
        for style in tags.iter().filter_map(|t| self.relationship_style(t.as_ref())) {
            merged.overlay(style);
        }
        merged
    }

    /// Resolve the effective style of an element
    pub fn resolve_element(&self, element: &Element) -> ResolvedElementStyle {
        let merged = self.merged_element_style(&element.tags);
        ResolvedElementStyle {
            color: merged
                .color
                .unwrap_or_else(|| DEFAULT_ELEMENT_COLOR.to_string()),
            background: merged
                .background
                .unwrap_or_else(|| DEFAULT_ELEMENT_BACKGROUND.to_string()),
            stroke: merged.stroke,
            shape: merged.shape.unwrap_or_default(),
            border: merged.border.unwrap_or_default(),
            font_size: merged.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            opacity: merged.opacity.unwrap_or(100),
        }
    }

    /// Resolve the effective style of a relationship
    ///
    /// Each relationship is resolved on its own tags, so parallel
    /// relationships between the same pair can render differently.
    pub fn resolve_relationship(&self, relationship: &Relationship) -> ResolvedRelationshipStyle {
        let merged = self.merged_relationship_style(&relationship.tags);
        ResolvedRelationshipStyle {
            dashed: merged.dashed.unwrap_or(true),
            routing: merged.routing.unwrap_or_default(),
            color: merged
                .color
                .unwrap_or_else(|| DEFAULT_RELATIONSHIP_COLOR.to_string()),
            thickness: merged.thickness.unwrap_or(DEFAULT_THICKNESS),
        }
    }

    /// Tags with an element style, in registration order
    pub fn element_tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.iter().map(|s| s.tag.as_str())
    }

    /// Tags with a relationship style, in registration order
    pub fn relationship_tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.relationships.iter().map(|s| s.tag.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{tags, Model, RelationshipSpec};

    #[test]
    fn test_later_tag_wins() {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        model.add_tags(user, ["A", "B"]).unwrap();

        let mut styles = Styles::new();
        styles.set_element_style("A", ElementStyle::new().color("#111"));
        styles.set_element_style("B", ElementStyle::new().color("#222"));

        let resolved = styles.resolve_element(model.element(user).unwrap());
        assert_eq!(resolved.color, "#222");
    }

    #[test]
    fn test_tag_order_not_registration_order() {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        model.add_tags(user, ["A", "B"]).unwrap();

        let mut styles = Styles::new();
        styles.set_element_style("B", ElementStyle::new().color("#222"));
        styles.set_element_style("A", ElementStyle::new().color("#111"));

        let resolved = styles.resolve_element(model.element(user).unwrap());
        assert_eq!(resolved.color, "#222");
    }

    #[test]
    fn test_per_property_override() {
        let mut model = Model::new();
        let system = model.add_software_system("Shop", "").unwrap();
        let db = model.add_container(system, "Database", "", "SQL").unwrap();
        model.add_tags(db, ["Database"]).unwrap();

        let mut styles = Styles::new();
        styles.set_element_style(tags::ELEMENT, ElementStyle::new().color("#000000"));
        styles.set_element_style(tags::CONTAINER, ElementStyle::new().background("#facc2e"));
        styles.set_element_style(
            "Database",
            ElementStyle::new().background("#f5da81").shape(Shape::Cylinder),
        );

        let resolved = styles.resolve_element(model.element(db).unwrap());
        assert_eq!(resolved.color, "#000000");
        assert_eq!(resolved.background, "#f5da81");
        assert_eq!(resolved.shape, Shape::Cylinder);
        assert_eq!(resolved.border, Border::Solid);
    }

    #[test]
    fn test_unstyled_tags_fall_back_to_defaults() {
        let mut model = Model::new();
        let user = model.add_person("User", "").unwrap();
        model.add_tags(user, ["Unstyled"]).unwrap();

        let resolved = Styles::new().resolve_element(model.element(user).unwrap());
        assert_eq!(resolved.color, DEFAULT_ELEMENT_COLOR);
        assert_eq!(resolved.background, DEFAULT_ELEMENT_BACKGROUND);
        assert_eq!(resolved.shape, Shape::Box);
        assert_eq!(resolved.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_same_tag_registered_twice_merges() {
        let mut styles = Styles::new();
        styles.set_element_style("Person", ElementStyle::new().background("#ffbf00"));
        styles.set_element_style("Person", ElementStyle::new().shape(Shape::Person));

        let style = styles.element_style("Person").unwrap();
        assert_eq!(style.background.as_deref(), Some("#ffbf00"));
        assert_eq!(style.shape, Some(Shape::Person));
        assert_eq!(styles.element_tags().count(), 1);
    }

    #[test]
    fn test_relationship_styles_per_relationship() {
        let mut model = Model::new();
        let a = model.add_software_system("A", "").unwrap();
        let b = model.add_software_system("B", "").unwrap();
        let sync = model.uses(a, b, "Calls").unwrap();
        let async_rel = model
            .add_relationship_with(a, b, RelationshipSpec::new("Publishes").asynchronous())
            .unwrap();

        let mut styles = Styles::new();
        styles.set_relationship_style(
            tags::RELATIONSHIP,
            RelationshipStyle::new().routing(Routing::Orthogonal),
        );
        styles.set_relationship_style(tags::ASYNCHRONOUS, RelationshipStyle::new().dashed(true));
        styles.set_relationship_style(tags::SYNCHRONOUS, RelationshipStyle::new().dashed(false));

        let s = styles.resolve_relationship(model.relationship(sync).unwrap());
        let a = styles.resolve_relationship(model.relationship(async_rel).unwrap());
        assert!(!s.dashed);
        assert!(a.dashed);
        assert_eq!(s.routing, Routing::Orthogonal);
        assert_eq!(a.routing, Routing::Orthogonal);
        assert_eq!(s.thickness, DEFAULT_THICKNESS);
    }

    #[test]
    fn test_opacity_clamped() {
        assert_eq!(ElementStyle::new().opacity(150).opacity, Some(100));
    }

    #[test]
    fn test_styles_serialization() {
        let mut styles = Styles::new();
        styles.set_element_style("Database", ElementStyle::new().shape(Shape::Cylinder));
        styles.set_relationship_style("Relationship", RelationshipStyle::new().routing(Routing::Curved));

        let json = serde_json::to_string(&styles).unwrap();
        assert!(json.contains("\"tag\":\"Database\""));
        assert!(json.contains("\"shape\":\"Cylinder\""));

        let parsed: Styles = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, styles);
    }
}
