//! Optimistic concurrency check.

use crate::{GraphError, GraphResult};
use entigraph_storage::PersistenceContext;
use entigraph_types::{EntityId, Version};
use tracing::warn;

/// Confirms a client-supplied version against the persisted one.
pub struct VersionGuard;

impl VersionGuard {
    /// Fails with [`GraphError::StaleEntity`] when `expected` no longer
    /// matches the persisted version or the entity is gone.
    ///
    /// A missing identity (new entity) or a missing version (caller opted
    /// out of the check) passes without touching storage.
    pub fn check(
        ctx: &dyn PersistenceContext,
        type_name: &str,
        id: Option<EntityId>,
        expected: Option<Version>,
    ) -> GraphResult<()> {
        let (Some(id), Some(expected)) = (id, expected) else {
            return Ok(());
        };

        let current = ctx.current_version(type_name, id)?;
        if current != Some(expected) {
            warn!(
                "Version conflict on {}#{}: expected {}, persisted {:?}",
                type_name, id, expected, current
            );
            return Err(GraphError::StaleEntity {
                type_name: type_name.to_string(),
                id,
            });
        }
        Ok(())
    }
}
