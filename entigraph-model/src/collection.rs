use crate::EntityRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Container semantics of a to-many property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Unordered, no duplicate members.
    Set,
    /// Ordered, duplicates allowed.
    List,
}

/// A shared handle to a tracked to-many collection.
///
/// The persistence layer watches the container itself, so callers that need
/// to change a live collection mutate it through the handle (see
/// [`replace_all`](Self::replace_all)) rather than assigning a new one.
///
/// A collection may be created unloaded. Its members are then only
/// materialized on first access, like a lazily fetched association; code
/// that must not trigger that fetch checks [`is_loaded`](Self::is_loaded).
#[derive(Clone)]
pub struct CollectionRef(Arc<CollectionNode>);

struct CollectionNode {
    kind: CollectionKind,
    state: RwLock<CollectionState>,
}

struct CollectionState {
    items: Vec<EntityRef>,
    loaded: bool,
}

impl CollectionRef {
    pub fn new(kind: CollectionKind) -> Self {
        Self::from_items(kind, Vec::new())
    }

    pub fn set() -> Self {
        Self::new(CollectionKind::Set)
    }

    pub fn list() -> Self {
        Self::new(CollectionKind::List)
    }

    /// Builds a loaded collection. Set semantics drop duplicate members.
    pub fn from_items(kind: CollectionKind, items: impl IntoIterator<Item = EntityRef>) -> Self {
        let collection = Self::with_state(kind, Vec::new(), true);
        collection.extend(items);
        collection
    }

    /// Builds an unloaded collection whose members are fetched on first access.
    pub fn lazy(kind: CollectionKind, items: Vec<EntityRef>) -> Self {
        Self::with_state(kind, items, false)
    }

    fn with_state(kind: CollectionKind, items: Vec<EntityRef>, loaded: bool) -> Self {
        Self(Arc::new(CollectionNode {
            kind,
            state: RwLock::new(CollectionState { items, loaded }),
        }))
    }

    fn read(&self) -> RwLockReadGuard<'_, CollectionState> {
        self.0.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access; loads the collection first.
    fn write(&self) -> RwLockWriteGuard<'_, CollectionState> {
        let mut state = self.0.state.write().unwrap_or_else(PoisonError::into_inner);
        state.loaded = true;
        state
    }

    pub fn kind(&self) -> CollectionKind {
        self.0.kind
    }

    pub fn is_set(&self) -> bool {
        self.0.kind == CollectionKind::Set
    }

    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    /// Forces the fetch of an unloaded collection.
    pub fn load(&self) {
        drop(self.write());
    }

    /// Snapshot of the members, in order. Forces a load.
    pub fn items(&self) -> Vec<EntityRef> {
        self.write().items.clone()
    }

    /// Number of members. Forces a load.
    pub fn len(&self) -> usize {
        self.write().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Membership by entity equality. Forces a load.
    pub fn contains(&self, item: &EntityRef) -> bool {
        self.write().items.iter().any(|e| e.same_entity(item))
    }

    /// Appends a member. For sets, returns `false` when it was already present.
    pub fn add(&self, item: EntityRef) -> bool {
        let kind = self.0.kind;
        let mut state = self.write();
        push_member(kind, &mut state.items, item)
    }

    pub fn extend(&self, items: impl IntoIterator<Item = EntityRef>) {
        let kind = self.0.kind;
        let mut state = self.write();
        for item in items {
            push_member(kind, &mut state.items, item);
        }
    }

    /// Clears the container and refills it, keeping this container's identity.
    pub fn replace_all(&self, items: impl IntoIterator<Item = EntityRef>) {
        let kind = self.0.kind;
        let mut state = self.write();
        state.items.clear();
        for item in items {
            push_member(kind, &mut state.items, item);
        }
    }

    /// `true` when `candidate` would change this collection's contents:
    /// the sizes differ or `candidate` holds a member missing here.
    pub fn differs_from(&self, candidate: &CollectionRef) -> bool {
        let current = self.items();
        let next = candidate.items();
        current.len() != next.len()
            || next
                .iter()
                .any(|item| !current.iter().any(|e| e.same_entity(item)))
    }

    /// `true` if both handles point at the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn push_member(kind: CollectionKind, items: &mut Vec<EntityRef>, item: EntityRef) -> bool {
    if kind == CollectionKind::Set && items.iter().any(|e| e.same_entity(&item)) {
        return false;
    }
    items.push(item);
    true
}

impl fmt::Debug for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        let mut out = f.debug_struct("CollectionRef");
        out.field("kind", &self.0.kind).field("loaded", &state.loaded);
        if state.loaded {
            out.field("len", &state.items.len());
        }
        out.finish()
    }
}
