use crate::StorageResult;
use entigraph_model::EntityRef;
use entigraph_types::{EntityId, Version};

/// The persistence boundary graph operations call into.
///
/// Implementations own identity mapping, lazy loading and flushing. Every
/// call is synchronous and may block; none is retried by callers in this
/// workspace. Operations run inside whatever transaction the caller opened.
pub trait PersistenceContext {
    /// Looks up the managed instance for `(type_name, id)`.
    fn find(&self, type_name: &str, id: EntityId) -> StorageResult<Option<EntityRef>>;

    /// Returns the persisted version, or `None` when the entity no longer exists.
    fn current_version(&self, type_name: &str, id: EntityId) -> StorageResult<Option<Version>>;

    /// `true` if `entity` is the managed instance this context tracks.
    fn contains(&self, entity: &EntityRef) -> bool;

    /// Schedules a transient entity (and the transient entities reachable
    /// from it) for insertion.
    fn register_new(&self, entity: &EntityRef) -> StorageResult<()>;

    /// Copies a detached entity's state onto its managed instance and
    /// returns that instance.
    fn merge_existing(&self, entity: &EntityRef) -> StorageResult<EntityRef>;

    /// Schedules a managed entity for deletion.
    fn remove(&self, entity: &EntityRef) -> StorageResult<()>;

    /// Writes pending inserts, updates and deletes immediately.
    fn flush(&self) -> StorageResult<()>;

    /// Loads an uninitialized entity proxy in place. No-op when already loaded.
    fn initialize(&self, entity: &EntityRef) -> StorageResult<()>;
}
