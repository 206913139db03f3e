//! Entity model for entigraph.
//!
//! Defines the capability set that every graph algorithm is written against:
//! - [`EntityRef`]: shared handle to one mutable entity instance
//! - [`Value`]: a property's runtime value (scalar, reference, collection)
//! - [`CollectionRef`]: shared handle to a tracked to-many collection
//! - [`Property`]: one attribute of an entity type and its relation metadata
//! - [`EntityDescriptor`]: enumerates, reads and writes an entity type's properties
//! - [`EntitySchema`]: a descriptor declared as data
//! - [`ModelRegistry`]: type name to descriptor lookup
//!
//! Nothing in this crate talks to storage; see `entigraph-storage`.

mod collection;
mod descriptor;
mod entity;
mod registry;
mod schema;
mod value;

pub use collection::{CollectionKind, CollectionRef};
pub use descriptor::{Assignment, EntityDescriptor};
pub use entity::{EntityRef, NodeKey};
pub use registry::ModelRegistry;
pub use schema::{EntitySchema, Property, PropertyKind, ID_PROPERTY, VERSION_PROPERTY};
pub use value::Value;
