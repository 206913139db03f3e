//! Entity-graph reconciliation for entigraph.
//!
//! Three algorithms over the same entity model, all driven through
//! [`EntityGraph`]:
//!
//! - **Reconcile**: merge a nested JSON value map (e.g. a request body) into
//!   the persisted graph: resolve identities, rebuild relations, detect
//!   changes and enforce optimistic concurrency where something changed.
//! - **Attach**: walk an in-memory graph and fill in owning-side
//!   back-references so a single persist call can cascade over it.
//! - **Duplicate**: copy an entity (optionally its one-to-many children)
//!   into new entities without identity or version.
//!
//! Each top-level call owns a [`GraphWalker`] visited set, which is what
//! makes all three terminate on cyclic graphs. The persistence boundary is
//! always passed in explicitly as a [`PersistenceContext`].
//!
//! # Example
//!
//! ```
//! use entigraph_model::{EntitySchema, ModelRegistry, Property};
//! use entigraph_reconcile::EntityGraph;
//! use entigraph_storage::MemoryStore;
//! use serde_json::json;
//!
//! let registry = ModelRegistry::new()
//!     .with_schema(EntitySchema::new("Contact").with(Property::scalar("name")));
//! let graph = EntityGraph::new(registry);
//! let store = MemoryStore::new();
//!
//! let values = json!({"name": "Ada"});
//! let contact = graph
//!     .reconcile_and_save(&store, "Contact", values.as_object())
//!     .unwrap()
//!     .unwrap();
//! assert!(contact.id().is_some());
//! ```
//!
//! [`PersistenceContext`]: entigraph_storage::PersistenceContext

mod attacher;
mod config;
mod duplicator;
mod error;
mod graph;
mod guard;
mod reconciler;
pub mod walker;

pub use config::GraphConfig;
pub use error::{GraphError, GraphResult};
pub use graph::EntityGraph;
pub use guard::VersionGuard;
pub use reconciler::ValueMap;
pub use walker::{GraphWalker, Visit};
