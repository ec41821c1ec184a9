//! Integration tests building a complete workspace for a modular monolith
//! and pushing it through the in-memory remote store.

use std::sync::Arc;

use archsync_core::model::tags;
use archsync_core::{
    ElementId, ElementStyle, InteractionStyle, Location, MemoryRemoteStore, RelationshipSpec,
    RelationshipStyle, Routing, Shape, StaticViewKind, SyncClient, SyncStatus, Workspace,
};

const MONOLITH_TAG: &str = "Modular Monolith";
const DATASTORE_TAG: &str = "Database";

struct Ids {
    system: ElementId,
    user: ElementId,
    client: ElementId,
    ui: ElementId,
    api: ElementId,
    database: ElementId,
    event_store: ElementId,
    web: ElementId,
    blog_command: ElementId,
    blog_query: ElementId,
}

fn build() -> (Workspace, Ids) {
    let mut ws = Workspace::new(
        "My Company - Monolithic",
        "An example of a modular monolithic architecture.",
    );
    let model = &mut ws.model;

    let system = model
        .add_software_system(
            "My Company Information System",
            "Manages blog posts, projects, customers and other data",
        )
        .unwrap();
    model.set_location(system, Location::Internal).unwrap();
    let user = model.add_person("User", "A user").unwrap();
    let client = model
        .add_software_system("Client System", "A partner system that consumes the REST API")
        .unwrap();
    model.uses(user, system, "Uses").unwrap();
    model.uses(client, system, "Uses").unwrap();

    let ui = model
        .add_container(
            system,
            "UI Application",
            "Lets users manage their profile, blogs and projects",
            "JavaScript, HTML, Angular",
        )
        .unwrap();
    model.uses(user, ui, "Uses").unwrap();

    let api = model
        .add_container(
            system,
            "Web Application (REST API)",
            "A REST API to manage profiles, blogs and projects",
            "HTTP, Java, Spring Boot",
        )
        .unwrap();
    model.add_tags(api, [MONOLITH_TAG]).unwrap();
    model.uses(ui, api, "Consume").unwrap();
    model.uses(client, api, "Uses").unwrap();

    let database = model
        .add_container(system, "Database", "Stores materialized views", "Relational database")
        .unwrap();
    model.add_tags(database, [DATASTORE_TAG]).unwrap();
    model
        .add_relationship_with(api, database, RelationshipSpec::new("Read data projections").technology("SQL"))
        .unwrap();
    model
        .add_relationship_with(
            api,
            database,
            RelationshipSpec::new("Subscribes to events and write data projections").technology("SQL"),
        )
        .unwrap();

    let event_store = model
        .add_container(system, "Event Store", "Stores all events", "Relational database")
        .unwrap();
    model.add_tags(event_store, [DATASTORE_TAG]).unwrap();
    model
        .add_relationship_with(api, event_store, RelationshipSpec::new("Triggers/Persists events").technology("SQL"))
        .unwrap();
    model
        .add_relationship_with(
            api,
            event_store,
            RelationshipSpec::new("Subscribes to events").technology("SQL").asynchronous(),
        )
        .unwrap();

    let web = model
        .add_component(api, "Web Component", "Exposes a REST API", "HTTP, Java")
        .unwrap();
    model.uses(client, web, "Uses").unwrap();
    model.uses(ui, web, "Uses").unwrap();

    let mut blog_command = None;
    let mut blog_query = None;
    for domain in ["Project", "BlogPost", "Team"] {
        let command = model
            .add_component(
                api,
                format!("{} Command Side Component", domain),
                "Processes commands and persists and propagates events",
                "Java, Spring, Axon",
            )
            .unwrap();
        model.uses(web, command, "Send commands").unwrap();
        model.uses(command, event_store, "Triggers/Persists events").unwrap();

        let query = model
            .add_component(
                api,
                format!("{} Query Side Component", domain),
                "Builds and maintains a materialized view",
                "Java, Spring, Axon",
            )
            .unwrap();
        model.uses(web, query, "Read materialized view").unwrap();
        model
            .add_relationship_with(
                query,
                event_store,
                RelationshipSpec::new("Subscribes to events")
                    .technology("SQL")
                    .interaction_style(InteractionStyle::Asynchronous),
            )
            .unwrap();
        model
            .add_relationship_with(
                query,
                database,
                RelationshipSpec::new("Write materialized views").technology("SQL"),
            )
            .unwrap();

        if domain == "BlogPost" {
            blog_command = Some(command);
            blog_query = Some(query);
        }
    }

    let ids = Ids {
        system,
        user,
        client,
        ui,
        api,
        database,
        event_store,
        web,
        blog_command: blog_command.unwrap(),
        blog_query: blog_query.unwrap(),
    };

    let views = &mut ws.views;
    let model = &ws.model;
    views
        .create_system_context_view(model, system, "Context", "The System Context diagram")
        .unwrap()
        .add_all_elements(model);
    views
        .create_container_view(model, system, "Containers", "The Containers diagram")
        .unwrap()
        .add_all_elements(model);
    views
        .create_component_view(model, api, "Components", "The Components diagram")
        .unwrap()
        .add_all_elements(model);

    let blog = views
        .create_dynamic_view(model, api, "Create Blog/Publish post", "Creating a blog post")
        .unwrap();
    blog.add(model, ui, web).unwrap();
    blog.add(model, web, ids.blog_command).unwrap();
    blog.add(model, ids.blog_command, event_store).unwrap();
    blog.add(model, ids.blog_query, event_store).unwrap();
    blog.add(model, ids.blog_query, database).unwrap();

    let project_command = model
        .find_element(Some(api), "Project Command Side Component")
        .unwrap()
        .id;
    let project_query = model
        .find_element(Some(api), "Project Query Side Component")
        .unwrap()
        .id;
    let project = views
        .create_dynamic_view(model, api, "Create Project", "Creating a project")
        .unwrap();
    project.add(model, ui, web).unwrap();
    project.add(model, web, project_command).unwrap();
    project.add(model, project_command, event_store).unwrap();
    project.add(model, project_query, event_store).unwrap();
    project.add(model, project_query, database).unwrap();

    let styles = &mut ws.styles;
    styles.set_element_style(tags::ELEMENT, ElementStyle::new().color("#000000"));
    styles.set_element_style(
        tags::PERSON,
        ElementStyle::new().background("#ffbf00").shape(Shape::Person),
    );
    styles.set_element_style(tags::CONTAINER, ElementStyle::new().background("#facc2E"));
    styles.set_element_style(MONOLITH_TAG, ElementStyle::new().shape(Shape::Hexagon));
    styles.set_element_style(
        DATASTORE_TAG,
        ElementStyle::new().background("#f5da81").shape(Shape::Cylinder),
    );
    styles.set_relationship_style(
        tags::RELATIONSHIP,
        RelationshipStyle::new().routing(Routing::Orthogonal),
    );
    styles.set_relationship_style(tags::ASYNCHRONOUS, RelationshipStyle::new().dashed(true));
    styles.set_relationship_style(tags::SYNCHRONOUS, RelationshipStyle::new().dashed(false));

    (ws, ids)
}

#[test]
fn test_model_shape() {
    let (ws, ids) = build();
    let model = ws.model();

    assert_eq!(model.people().count(), 1);
    assert_eq!(model.software_systems().count(), 2);
    assert_eq!(model.children(ids.system).count(), 4);
    assert_eq!(model.children(ids.api).count(), 7);
    assert_eq!(
        model.canonical_name(ids.web).as_deref(),
        Some("Component://My Company Information System.Web Application (REST API).Web Component")
    );
    assert!(ws.validate().is_ok());
}

#[test]
fn test_context_view() {
    let (ws, ids) = build();
    let view = ws.views().static_view("Context").unwrap();

    assert_eq!(view.kind, StaticViewKind::SystemContext);
    let expected: Vec<ElementId> = {
        let mut v = vec![ids.system, ids.user, ids.client];
        v.sort();
        v
    };
    assert_eq!(view.element_ids().into_iter().collect::<Vec<_>>(), expected);
    assert_eq!(view.relationships().len(), 2);
}

#[test]
fn test_container_view() {
    let (ws, ids) = build();
    let view = ws.views().static_view("Containers").unwrap();

    for id in [ids.user, ids.client, ids.ui, ids.api, ids.database, ids.event_store] {
        assert!(view.contains(id));
    }
    assert!(!view.contains(ids.system));
    assert!(!view.contains(ids.web));
    assert_eq!(view.elements().len(), 6);
    // user->UI, UI->API, client->API, API->DB x2, API->event store x2
    assert_eq!(view.relationships().len(), 7);
}

#[test]
fn test_component_view() {
    let (ws, ids) = build();
    let view = ws.views().static_view("Components").unwrap();

    assert_eq!(view.elements().len(), 11);
    assert!(!view.contains(ids.api));
    assert!(!view.contains(ids.system));
    assert!(!view.contains(ids.user));
    assert!(view.contains(ids.client));
    assert!(view.contains(ids.ui));
    assert!(view.contains(ids.database));
    assert_eq!(view.relationships().len(), 17);
}

#[test]
fn test_dynamic_views() {
    let (ws, ids) = build();
    let blog = ws.views().dynamic_view("Create Blog/Publish post").unwrap();

    let steps: Vec<_> = blog
        .steps()
        .iter()
        .map(|s| (s.order, s.source, s.destination))
        .collect();
    assert_eq!(
        steps,
        vec![
            (1, ids.ui, ids.web),
            (2, ids.web, ids.blog_command),
            (3, ids.blog_command, ids.event_store),
            (4, ids.blog_query, ids.event_store),
            (5, ids.blog_query, ids.database),
        ]
    );
    assert_eq!(blog.elements().len(), 6);
    assert!(blog.steps().iter().all(|s| s.relationship.is_some()));
    assert_eq!(blog.steps()[1].description.as_deref(), Some("Send commands"));

    let project = ws.views().dynamic_view("Create Project").unwrap();
    assert_eq!(project.steps().len(), 5);
    assert_eq!(ws.views().len(), 5);
}

#[test]
fn test_styles_resolve() {
    let (ws, ids) = build();
    let model = ws.model();
    let styles = ws.styles();

    let person = styles.resolve_element(model.require(ids.user).unwrap());
    assert_eq!(person.background, "#ffbf00");
    assert_eq!(person.shape, Shape::Person);
    assert_eq!(person.color, "#000000");

    let api = styles.resolve_element(model.require(ids.api).unwrap());
    assert_eq!(api.background, "#facc2E");
    assert_eq!(api.shape, Shape::Hexagon);

    let database = styles.resolve_element(model.require(ids.database).unwrap());
    assert_eq!(database.background, "#f5da81");
    assert_eq!(database.shape, Shape::Cylinder);

    // API -> event store carries one synchronous and one asynchronous edge
    let edges: Vec<_> = model.relationships_between(ids.api, ids.event_store).collect();
    assert_eq!(edges.len(), 2);
    for edge in edges {
        let style = styles.resolve_relationship(edge);
        assert_eq!(style.routing, Routing::Orthogonal);
        assert_eq!(
            style.dashed,
            edge.interaction_style == InteractionStyle::Asynchronous
        );
    }
}

#[test]
fn test_workspace_json_roundtrip() {
    let (ws, _) = build();
    let json = ws.to_json_pretty().unwrap();
    let parsed = Workspace::from_json(&json).unwrap();
    assert_eq!(parsed, ws);
}

#[test]
fn test_context_view_excludes_containers() {
    let mut ws = Workspace::new("Scenario", "");
    let u = ws.model.add_person("U", "").unwrap();
    let s = ws.model.add_software_system("S", "").unwrap();
    let c1 = ws.model.add_container(s, "C1", "", "").unwrap();
    let rel = ws.model.uses(u, s, "Uses").unwrap();

    let view = ws
        .views
        .create_system_context_view(&ws.model, s, "context", "")
        .unwrap();
    view.add_all_elements(&ws.model);

    assert!(view.contains(u));
    assert!(view.contains(s));
    assert!(!view.contains(c1));
    assert_eq!(view.relationships().len(), 1);
    assert_eq!(view.relationships()[0].id, rel);
}

#[tokio::test]
async fn test_upload_preserves_remote_layout_and_local_structure() {
    let store = MemoryRemoteStore::new();
    let mut client = SyncClient::new(Arc::new(store.clone()));
    client.configure("key", "secret");

    let (first, ids) = build();
    let receipt = client.upload("36994", &first).await.unwrap();
    assert_eq!(receipt.revision, 1);

    // Layout applied in the remote editor
    let mut remote = store.workspace("36994").unwrap();
    remote
        .views
        .static_view_mut("Context")
        .unwrap()
        .set_position(ids.user, 10, 20);
    let store = store.with_workspace("36994", &remote).unwrap();

    // Next local build changes a description but has no layout
    let (mut second, _) = build();
    second
        .model
        .set_description(ids.user, "A registered user")
        .unwrap();

    let receipt = client.upload("36994", &second).await.unwrap();
    assert_eq!(receipt.revision, 2);
    assert_eq!(client.status(), SyncStatus::Uploaded);

    let stored = store.workspace("36994").unwrap();
    assert_eq!(
        stored.model.require(ids.user).unwrap().description.as_deref(),
        Some("A registered user")
    );
    let placed = stored
        .views
        .static_view("Context")
        .unwrap()
        .elements()
        .iter()
        .find(|v| v.id == ids.user)
        .unwrap();
    assert_eq!((placed.x, placed.y), (Some(10), Some(20)));
}
