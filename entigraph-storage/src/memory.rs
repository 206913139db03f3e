//! In-memory persistence context.

use crate::{PersistenceContext, StorageError, StorageResult};
use entigraph_model::{EntityRef, Value};
use entigraph_types::{EntityId, Version};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

type Key = (String, EntityId);

fn key_of(type_name: &str, id: EntityId) -> Key {
    (type_name.to_string(), id)
}

fn not_found(type_name: &str, id: EntityId) -> StorageError {
    StorageError::NotFound(format!("{type_name}#{id}"))
}

struct StoreState {
    /// Identity map: one live instance per persisted entity.
    managed: HashMap<Key, EntityRef>,
    /// Committed version of every persisted entity.
    versions: HashMap<Key, Version>,
    /// Registered but not yet flushed.
    inserts: Vec<EntityRef>,
    /// Removed from the identity map, deleted on the next flush.
    deletes: Vec<(Key, EntityRef)>,
    next_id: i64,
}

/// A [`PersistenceContext`] that keeps every entity in process memory.
///
/// Behaves like a session over a versioned table per entity type:
/// - `register_new` assigns identities and cascades to reachable transient entities
/// - `flush` commits inserts at [`Version::INITIAL`] and bumps the version of
///   every dirty managed entity, failing if another writer got there first
/// - `find` always returns the single managed instance for a key
/// - `remove` takes an entity out of the identity map at once; the delete
///   is written (and version-checked) on the next `flush`
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                managed: HashMap::new(),
                versions: HashMap::new(),
                inserts: Vec::new(),
                deletes: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers and flushes in one step, returning the assigned identity.
    pub fn insert(&self, entity: &EntityRef) -> StorageResult<EntityId> {
        self.register_new(entity)?;
        self.flush()?;
        entity.id().ok_or_else(|| {
            let type_name = entity.type_name();
            StorageError::InvalidData(format!("{type_name} was not assigned an identity"))
        })
    }

    /// Returns an uninitialized proxy for a persisted entity.
    pub fn proxy(&self, type_name: &str, id: EntityId) -> StorageResult<EntityRef> {
        if !self.lock().versions.contains_key(&key_of(type_name, id)) {
            return Err(not_found(type_name, id));
        }
        Ok(EntityRef::proxy(type_name, id))
    }

    /// Number of committed entities.
    pub fn len(&self) -> usize {
        self.lock().versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records a write committed by another session: the persisted version
    /// moves on while this context's instance keeps the old one.
    pub fn touch(&self, type_name: &str, id: EntityId) -> StorageResult<Version> {
        let mut state = self.lock();
        let version = state
            .versions
            .get_mut(&key_of(type_name, id))
            .ok_or_else(|| not_found(type_name, id))?;
        *version = version.next();
        Ok(*version)
    }

    /// Records a delete committed by another session.
    pub fn purge(&self, type_name: &str, id: EntityId) -> bool {
        let mut state = self.lock();
        let key = key_of(type_name, id);
        state.managed.remove(&key);
        state.versions.remove(&key).is_some()
    }
}

fn is_managed_in(state: &StoreState, entity: &EntityRef) -> bool {
    entity.id().is_some_and(|id| {
        state
            .managed
            .get(&key_of(entity.type_name(), id))
            .is_some_and(|m| m.ptr_eq(entity))
    })
}

/// Assigns identities to every transient entity reachable from `root`.
///
/// Managed entities are traversed but left as they are; detached or proxy
/// references are not traversed.
fn cascade_register(state: &mut StoreState, root: &EntityRef) {
    let mut seen = HashSet::new();
    let mut pending = vec![root.clone()];

    while let Some(next) = pending.pop() {
        if !seen.insert(next.node_key()) {
            continue;
        }
        match next.id() {
            Some(_) => {
                if !is_managed_in(state, &next) {
                    continue;
                }
            }
            None => {
                let id = EntityId::new(state.next_id);
                state.next_id += 1;
                next.assign_id(id);
                state.managed.insert(key_of(next.type_name(), id), next.clone());
                state.inserts.push(next.clone());
                debug!("Registered {}#{}", next.type_name(), id);
            }
        }
        if !next.is_loaded() {
            continue;
        }
        for value in next.fields().into_values() {
            match value {
                Value::Ref(target) => pending.push(target),
                Value::Collection(items) if items.is_loaded() => pending.extend(items.items()),
                _ => {}
            }
        }
    }
}

impl PersistenceContext for MemoryStore {
    fn find(&self, type_name: &str, id: EntityId) -> StorageResult<Option<EntityRef>> {
        Ok(self.lock().managed.get(&key_of(type_name, id)).cloned())
    }

    fn current_version(&self, type_name: &str, id: EntityId) -> StorageResult<Option<Version>> {
        Ok(self.lock().versions.get(&key_of(type_name, id)).copied())
    }

    fn contains(&self, entity: &EntityRef) -> bool {
        is_managed_in(&self.lock(), entity)
    }

    fn register_new(&self, entity: &EntityRef) -> StorageResult<()> {
        let mut state = self.lock();
        if let Some(id) = entity.id()
            && !is_managed_in(&state, entity)
        {
            return Err(StorageError::InvalidData(format!(
                "detached entity passed to register_new: {}#{}",
                entity.type_name(),
                id
            )));
        }
        cascade_register(&mut state, entity);
        Ok(())
    }

    fn merge_existing(&self, entity: &EntityRef) -> StorageResult<EntityRef> {
        let Some(id) = entity.id() else {
            self.register_new(entity)?;
            return Ok(entity.clone());
        };

        let mut state = self.lock();
        let managed = state
            .managed
            .get(&key_of(entity.type_name(), id))
            .cloned()
            .ok_or_else(|| not_found(entity.type_name(), id))?;

        if !managed.ptr_eq(entity) && entity.is_loaded() {
            for (name, value) in entity.fields() {
                managed.set(&name, value);
            }
        }
        cascade_register(&mut state, &managed);
        Ok(managed)
    }

    fn flush(&self) -> StorageResult<()> {
        let mut state = self.lock();

        let dirty: Vec<(Key, EntityRef)> = state
            .managed
            .iter()
            .filter(|(_, e)| e.is_dirty() && e.version().is_some())
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect();
        for (key, entity) in dirty.iter().chain(&state.deletes) {
            let committed = state.versions.get(key).copied();
            if committed != entity.version() {
                warn!(
                    "Stale write to {}#{}: instance at {:?}, store at {:?}",
                    key.0,
                    key.1,
                    entity.version(),
                    committed
                );
                return Err(StorageError::Stale(format!("{}#{}", key.0, key.1)));
            }
        }

        for entity in std::mem::take(&mut state.inserts) {
            if let Some(id) = entity.id() {
                state.versions.insert(key_of(entity.type_name(), id), Version::INITIAL);
                entity.set_version(Some(Version::INITIAL));
                entity.clear_dirty();
            }
        }
        for (key, entity) in dirty {
            let next = entity.version().map_or(Version::INITIAL, |v| v.next());
            entity.set_version(Some(next));
            entity.clear_dirty();
            debug!("Flushed {}#{} at version {}", key.0, key.1, next);
            state.versions.insert(key, next);
        }
        for (key, _) in std::mem::take(&mut state.deletes) {
            debug!("Deleted {}#{}", key.0, key.1);
            state.versions.remove(&key);
        }
        Ok(())
    }

    fn remove(&self, entity: &EntityRef) -> StorageResult<()> {
        let mut state = self.lock();
        if !is_managed_in(&state, entity) {
            return Err(StorageError::InvalidData(format!(
                "remove of unmanaged entity {}#{:?}",
                entity.type_name(),
                entity.id()
            )));
        }
        let Some(id) = entity.id() else {
            return Ok(());
        };
        let key = key_of(entity.type_name(), id);
        state.managed.remove(&key);
        if let Some(pos) = state.inserts.iter().position(|e| e.ptr_eq(entity)) {
            // Never written: dropping the pending insert is enough.
            state.inserts.remove(pos);
        } else {
            state.deletes.push((key, entity.clone()));
        }
        Ok(())
    }

    fn initialize(&self, entity: &EntityRef) -> StorageResult<()> {
        if entity.is_loaded() {
            return Ok(());
        }
        let id = entity.id().ok_or_else(|| {
            StorageError::InvalidData(format!("{} proxy without identity", entity.type_name()))
        })?;
        let source = self
            .lock()
            .managed
            .get(&key_of(entity.type_name(), id))
            .cloned()
            .ok_or_else(|| not_found(entity.type_name(), id))?;
        entity.load(source.version(), source.fields());
        Ok(())
    }
}
