//! Layout merge
//!
//! Layout is usually tuned by hand in the remote editor, while structure is
//! generated locally. Before uploading, layout from the remote copy is carried
//! over onto the local workspace:
//!
//! - local structure (elements, relationships, views, styles) always wins
//! - views are matched by key
//! - elements are matched by canonical name, relationships by the canonical
//!   names of both endpoints plus their description
//! - remote layout only fills gaps; local coordinates are never overwritten
//! - remote-only views, and layout for elements no longer in a view, are dropped

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{ElementId, Model, RelationshipId};
use crate::view::{DynamicView, ElementView, RelationshipView, StaticView};
use crate::workspace::Workspace;

/// What a merge carried over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Local views that had a remote counterpart
    pub views_matched: usize,
    /// Element positions copied from the remote
    pub elements_positioned: usize,
    /// Relationship routes copied from the remote
    pub relationships_routed: usize,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.elements_positioned == 0 && self.relationships_routed == 0
    }
}

/// Merge remote layout into a copy of the local workspace
pub fn merge(remote: &Workspace, local: &Workspace) -> Workspace {
    merge_with_report(remote, local).0
}

/// Like [`merge`], also reporting what was carried over
pub fn merge_with_report(remote: &Workspace, local: &Workspace) -> (Workspace, MergeReport) {
    let mut merged = local.clone();
    let mut report = MergeReport::default();
    let ids = IdMap::build(&remote.model, &local.model);

    for view in merged.views.static_views_mut() {
        if let Some(remote_view) = remote.views.static_view(&view.key) {
            report.views_matched += 1;
            merge_static_view(&ids, remote_view, view, &mut report);
        }
    }

    for view in merged.views.dynamic_views_mut() {
        if let Some(remote_view) = remote.views.dynamic_view(&view.key) {
            report.views_matched += 1;
            merge_dynamic_view(&ids, remote_view, view, &mut report);
        }
    }

    tracing::debug!(
        views = report.views_matched,
        elements = report.elements_positioned,
        relationships = report.relationships_routed,
        "Merged remote layout"
    );
    (merged, report)
}

/// Translation from remote ids to local ids
struct IdMap {
    elements: HashMap<ElementId, ElementId>,
    relationships: HashMap<RelationshipId, RelationshipId>,
}

impl IdMap {
    fn build(remote: &Model, local: &Model) -> Self {
        let local_elements: HashMap<String, ElementId> = local
            .elements()
            .iter()
            .filter_map(|e| local.canonical_name(e.id).map(|name| (name, e.id)))
            .collect();

        let elements: HashMap<ElementId, ElementId> = remote
            .elements()
            .iter()
            .filter_map(|e| {
                let name = remote.canonical_name(e.id)?;
                local_elements.get(&name).map(|&local_id| (e.id, local_id))
            })
            .collect();

        // Parallel relationships with the same description map to the first one
        let mut local_relationships: HashMap<(ElementId, ElementId, Option<&str>), RelationshipId> =
            HashMap::new();
        for r in local.relationships() {
            local_relationships
                .entry((r.source, r.destination, r.description.as_deref()))
                .or_insert(r.id);
        }

        let relationships = remote
            .relationships()
            .iter()
            .filter_map(|r| {
                let source = *elements.get(&r.source)?;
                let destination = *elements.get(&r.destination)?;
                local_relationships
                    .get(&(source, destination, r.description.as_deref()))
                    .map(|&local_id| (r.id, local_id))
            })
            .collect();

        Self {
            elements,
            relationships,
        }
    }

    fn element(&self, remote: ElementId) -> Option<ElementId> {
        self.elements.get(&remote).copied()
    }

    fn relationship(&self, remote: RelationshipId) -> Option<RelationshipId> {
        self.relationships.get(&remote).copied()
    }
}

fn merge_element_views(
    ids: &IdMap,
    remote: &[ElementView],
    local: &mut [ElementView],
    report: &mut MergeReport,
) {
    let positions: HashMap<ElementId, &ElementView> = remote
        .iter()
        .filter(|v| v.has_layout())
        .filter_map(|v| ids.element(v.id).map(|local_id| (local_id, v)))
        .collect();

    for view in local.iter_mut().filter(|v| !v.has_layout()) {
        if let Some(source) = positions.get(&view.id) {
            view.x = source.x;
            view.y = source.y;
            report.elements_positioned += 1;
        }
    }
}

fn merge_relationship_views(
    ids: &IdMap,
    remote: &[RelationshipView],
    local: &mut [RelationshipView],
    report: &mut MergeReport,
) {
    let routes: HashMap<RelationshipId, &RelationshipView> = remote
        .iter()
        .filter(|v| v.has_layout())
        .filter_map(|v| ids.relationship(v.id).map(|local_id| (local_id, v)))
        .collect();

    for view in local.iter_mut() {
        let Some(source) = routes.get(&view.id) else {
            continue;
        };
        let mut copied = false;
        if view.vertices.is_empty() && !source.vertices.is_empty() {
            view.vertices = source.vertices.clone();
            copied = true;
        }
        if view.position.is_none() && source.position.is_some() {
            view.position = source.position;
            copied = true;
        }
        if copied {
            report.relationships_routed += 1;
        }
    }
}

fn merge_static_view(
    ids: &IdMap,
    remote: &StaticView,
    local: &mut StaticView,
    report: &mut MergeReport,
) {
    if local.paper_size.is_none() {
        local.paper_size = remote.paper_size.clone();
    }
    merge_element_views(ids, remote.elements(), local.element_views_mut(), report);
    merge_relationship_views(
        ids,
        remote.relationships(),
        local.relationship_views_mut(),
        report,
    );
}

fn merge_dynamic_view(
    ids: &IdMap,
    remote: &DynamicView,
    local: &mut DynamicView,
    report: &mut MergeReport,
) {
    if local.paper_size.is_none() {
        local.paper_size = remote.paper_size.clone();
    }
    merge_element_views(ids, remote.elements(), local.element_views_mut(), report);

    // Steps are matched by position in the sequence and their endpoints
    for (step, source) in local.steps_mut().iter_mut().zip(remote.steps()) {
        let same_endpoints = ids.element(source.source) == Some(step.source)
            && ids.element(source.destination) == Some(step.destination);
        if same_endpoints && step.vertices.is_empty() && !source.vertices.is_empty() {
            step.vertices = source.vertices.clone();
            report.relationships_routed += 1;
        }
    }
}
