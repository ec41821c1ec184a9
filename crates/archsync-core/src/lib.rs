//! archsync Core Library
//!
//! This crate provides the core functionality for archsync, a tool for
//! describing software architecture as code (C4 model) and publishing it to
//! a remote workspace store.
//!
//! # Architecture
//!
//! - **Model**: people, software systems, containers and components in a
//!   flat arena, plus the relationships between them
//! - **Views**: context, container, component and dynamic projections
//! - **Styles**: tag-based visual styling
//! - **Sync**: signed upload to a remote store, merging remote layout first
//!
//! # Quick Start
//!
//! ```text
//! let mut workspace = Workspace::new("Shop", "An online shop");
//! let user = workspace.model.add_person("User", "A customer")?;
//! let shop = workspace.model.add_software_system("Shop", "Sells things")?;
//! workspace.model.uses(user, shop, "Buys from")?;
//!
//! workspace
//!     .views
//!     .create_system_context_view(&workspace.model, shop, "context", "")?
//!     .add_all_elements(&workspace.model);
//!
//! let mut client = SyncClient::from_config(&Config::load()?)?;
//! client.upload("1234", &workspace).await?;
//! ```
//!
//! # Modules
//!
//! - `model`: elements and relationships
//! - `view`: the view catalog
//! - `style`: the tag/style registry
//! - `workspace`: the document tying them together
//! - `sync`: remote store client and layout merge
//! - `config`: application configuration

pub mod config;
pub mod error;
pub mod model;
pub mod style;
pub mod sync;
pub mod view;
pub mod workspace;

pub use config::Config;
pub use error::{ModelError, ModelResult, WorkspaceError};
pub use model::{
    Element, ElementId, ElementKind, InteractionStyle, Location, Model, Relationship,
    RelationshipId, RelationshipSpec, TagTarget,
};
pub use style::{
    Border, ElementStyle, RelationshipStyle, ResolvedElementStyle, ResolvedRelationshipStyle,
    Routing, Shape, Styles,
};
pub use sync::{
    merge, Credentials, HttpRemoteStore, MemoryRemoteStore, MergeReport, RemoteStore,
    SyncClient, SyncError, SyncEvent, SyncStatus, UploadReceipt,
};
pub use view::{
    DynamicView, ElementView, InteractionStep, RelationshipView, StaticView, StaticViewKind,
    Vertex, View, ViewSet,
};
pub use workspace::Workspace;
