use crate::Value;
use entigraph_types::{EntityId, Version};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared handle to one entity instance.
///
/// Cloning the handle does not clone the entity: every clone observes the
/// same identity, version and fields. Graph algorithms rely on this to tell
/// "the same instance reached twice" apart from "two equal instances".
///
/// Accessors take and release the internal lock per call and never hand out
/// guards, so walking a cyclic graph cannot deadlock on an entity already
/// being processed further up the stack.
#[derive(Clone)]
pub struct EntityRef(Arc<EntityNode>);

struct EntityNode {
    type_name: Arc<str>,
    /// Write-once: the persistence layer assigns it and it never changes.
    id: OnceLock<EntityId>,
    state: RwLock<EntityState>,
}

#[derive(Default)]
struct EntityState {
    version: Option<Version>,
    fields: HashMap<String, Value>,
    loaded: bool,
    dirty: bool,
}

/// Address of an entity instance, usable as a visited-set key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

impl EntityRef {
    /// Creates a transient entity: no identity, no version, no fields.
    pub fn new(type_name: impl Into<Arc<str>>) -> Self {
        Self::with_state(
            type_name.into(),
            None,
            EntityState {
                loaded: true,
                ..EntityState::default()
            },
        )
    }

    /// Creates an uninitialized proxy for a persisted entity.
    ///
    /// Only type and identity are known until the persistence layer loads it.
    pub fn proxy(type_name: impl Into<Arc<str>>, id: EntityId) -> Self {
        Self::with_state(type_name.into(), Some(id), EntityState::default())
    }

    fn with_state(type_name: Arc<str>, id: Option<EntityId>, state: EntityState) -> Self {
        let cell = OnceLock::new();
        if let Some(id) = id {
            let _ = cell.set(id);
        }
        Self(Arc::new(EntityNode {
            type_name,
            id: cell,
            state: RwLock::new(state),
        }))
    }

    fn read(&self) -> RwLockReadGuard<'_, EntityState> {
        self.0.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntityState> {
        self.0.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn type_name(&self) -> &str {
        &self.0.type_name
    }

    pub fn id(&self) -> Option<EntityId> {
        self.0.id.get().copied()
    }

    /// Assigns the identity. Returns `false` if one was already assigned,
    /// in which case the existing identity is kept.
    pub fn assign_id(&self, id: EntityId) -> bool {
        self.0.id.set(id).is_ok()
    }

    pub fn version(&self) -> Option<Version> {
        self.read().version
    }

    pub fn set_version(&self, version: Option<Version>) {
        self.write().version = version;
    }

    /// `false` for a proxy whose state has not been fetched yet.
    pub fn is_loaded(&self) -> bool {
        self.read().loaded
    }

    /// Fills a proxy with its persisted state and marks it loaded.
    pub fn load(&self, version: Option<Version>, fields: HashMap<String, Value>) {
        let mut state = self.write();
        state.version = version;
        state.fields = fields;
        state.loaded = true;
        state.dirty = false;
    }

    /// Reads a field. Unset fields read as [`Value::Null`].
    pub fn get(&self, name: &str) -> Value {
        self.read().fields.get(name).cloned().unwrap_or_default()
    }

    /// Writes a field and returns the previous value.
    ///
    /// The entity is flagged dirty when the new value differs from the old one.
    pub fn set(&self, name: &str, value: Value) -> Value {
        let mut state = self.write();
        let previous = state
            .fields
            .insert(name.to_string(), value.clone())
            .unwrap_or_default();
        if !previous.same_as(&value) {
            state.dirty = true;
        }
        previous
    }

    /// Copies out every field currently set.
    pub fn fields(&self) -> HashMap<String, Value> {
        self.read().fields.clone()
    }

    /// `true` once a field changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.read().dirty
    }

    pub fn clear_dirty(&self) {
        self.write().dirty = false;
    }

    /// Marks the entity changed without touching a field (e.g. after an
    /// in-place collection rewrite).
    pub fn mark_dirty(&self) {
        self.write().dirty = true;
    }

    pub fn node_key(&self) -> NodeKey {
        NodeKey(Arc::as_ptr(&self.0) as usize)
    }

    /// `true` if both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Entity equality: the same instance, or the same type with equal
    /// identities. Transient entities are only equal to themselves.
    pub fn same_entity(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.id(), other.id()) {
            (Some(a), Some(b)) => a == b && self.type_name() == other.type_name(),
            _ => false,
        }
    }
}

impl fmt::Debug for EntityRef {
    // Relations are left out: printing them would recurse forever on cycles.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("type", &self.type_name())
            .field("id", &self.id())
            .field("version", &self.version())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
