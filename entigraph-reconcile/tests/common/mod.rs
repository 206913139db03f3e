#![allow(dead_code)]

use entigraph_model::{
    CollectionKind, CollectionRef, EntityRef, EntitySchema, ModelRegistry, Property, Value,
};
use entigraph_reconcile::{EntityGraph, ValueMap};
use entigraph_storage::{MemoryStore, PersistenceContext, StorageResult};
use entigraph_types::{EntityId, Version};
use std::cell::Cell;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber once; `RUST_LOG=entigraph_reconcile=debug` shows the walk.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .with_schema(EntitySchema::new("Company").with(Property::scalar("name")))
        .with_schema(EntitySchema::new("Tag").with(Property::scalar("label").unique()))
        .with_schema(
            EntitySchema::new("Customer")
                .with(Property::scalar("name"))
                .with(Property::scalar("code").unique())
                .with(Property::to_one("company", "Company"))
                .with(Property::list("orders", "Order").mapped_by("customer"))
                .with(Property::list("history", "Order").mapped_by("customer").readonly())
                .with(Property::set("tags", "Tag"))
                .with(Property::scalar("display").computed().readonly())
                .with(Property::scalar("summary").computed()),
        )
        .with_schema(
            EntitySchema::new("Order")
                .with(Property::scalar("reference").unique())
                .with(Property::to_one("customer", "Customer"))
                .with(Property::list("lines", "Line").mapped_by("order")),
        )
        .with_schema(
            EntitySchema::new("Line")
                .with(Property::scalar("label"))
                .with(Property::scalar("qty"))
                .with(Property::to_one("order", "Order")),
        )
        .with_schema(
            EntitySchema::new("Node")
                .with(Property::scalar("name"))
                .with(Property::to_one("parent", "Node"))
                .with(Property::list("children", "Node").mapped_by("parent")),
        )
}

pub fn graph() -> EntityGraph {
    init_tracing();
    EntityGraph::new(registry())
}

pub fn entity(type_name: &str, fields: Vec<(&str, Value)>) -> EntityRef {
    let e = EntityRef::new(type_name);
    for (name, value) in fields {
        e.set(name, value);
    }
    e
}

pub fn text(s: &str) -> Value {
    Value::scalar(s)
}

pub fn list(items: Vec<EntityRef>) -> Value {
    Value::Collection(CollectionRef::from_items(CollectionKind::List, items))
}

pub fn set(items: Vec<EntityRef>) -> Value {
    Value::Collection(CollectionRef::from_items(CollectionKind::Set, items))
}

pub fn id_of(e: &EntityRef) -> i64 {
    e.id().map(|id| id.get()).unwrap_or_default()
}

pub fn map(value: serde_json::Value) -> ValueMap {
    match value {
        serde_json::Value::Object(m) => m,
        other => panic!("not a value map: {other}"),
    }
}

/// A persisted customer with one company, one tag and an order with two lines.
pub struct Shop {
    pub company: EntityRef,
    pub tag: EntityRef,
    pub customer: EntityRef,
    pub order: EntityRef,
    pub lines: Vec<EntityRef>,
}

pub fn seed_shop(store: &MemoryStore) -> Shop {
    let company = entity("Company", vec![("name", text("Acme"))]);
    let tag = entity("Tag", vec![("label", text("vip"))]);
    let customer = entity(
        "Customer",
        vec![
            ("name", text("Ada")),
            ("code", text("C-1")),
            ("company", Value::Ref(company.clone())),
            ("tags", set(vec![tag.clone()])),
        ],
    );
    let first = entity("Line", vec![("label", text("pen")), ("qty", Value::scalar(2))]);
    let second = entity("Line", vec![("label", text("ink")), ("qty", Value::scalar(5))]);
    let order = entity(
        "Order",
        vec![
            ("reference", text("SO-1")),
            ("customer", Value::Ref(customer.clone())),
            ("lines", list(vec![first.clone(), second.clone()])),
        ],
    );
    first.set("order", Value::Ref(order.clone()));
    second.set("order", Value::Ref(order.clone()));
    customer.set("orders", list(vec![order.clone()]));

    store.insert(&customer).expect("seed shop");
    Shop {
        company,
        tag,
        customer,
        order,
        lines: vec![first, second],
    }
}

/// Wraps a [`MemoryStore`] and counts version lookups.
pub struct CountingContext {
    pub store: MemoryStore,
    version_lookups: Cell<usize>,
}

impl CountingContext {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            version_lookups: Cell::new(0),
        }
    }

    pub fn version_lookups(&self) -> usize {
        self.version_lookups.get()
    }
}

impl PersistenceContext for CountingContext {
    fn find(&self, type_name: &str, id: EntityId) -> StorageResult<Option<EntityRef>> {
        self.store.find(type_name, id)
    }

    fn current_version(&self, type_name: &str, id: EntityId) -> StorageResult<Option<Version>> {
        self.version_lookups.set(self.version_lookups.get() + 1);
        self.store.current_version(type_name, id)
    }

    fn contains(&self, entity: &EntityRef) -> bool {
        self.store.contains(entity)
    }

    fn register_new(&self, entity: &EntityRef) -> StorageResult<()> {
        self.store.register_new(entity)
    }

    fn remove(&self, entity: &EntityRef) -> StorageResult<()> {
        self.store.remove(entity)
    }

    fn merge_existing(&self, entity: &EntityRef) -> StorageResult<EntityRef> {
        self.store.merge_existing(entity)
    }

    fn flush(&self) -> StorageResult<()> {
        self.store.flush()
    }

    fn initialize(&self, entity: &EntityRef) -> StorageResult<()> {
        self.store.initialize(entity)
    }
}
