//! Entry point tying the registry, configuration and persistence boundary
//! together.

use crate::attacher::Attacher;
use crate::duplicator::Duplicator;
use crate::guard::VersionGuard;
use crate::reconciler::{Reconciler, ValueMap};
use crate::{GraphConfig, GraphError, GraphResult};
use entigraph_model::{EntityDescriptor, EntityRef, ModelRegistry};
use entigraph_storage::PersistenceContext;
use entigraph_types::{EntityId, Version};
use std::sync::Arc;
use tracing::debug;

pub(crate) fn lookup(
    registry: &ModelRegistry,
    type_name: &str,
) -> GraphResult<Arc<dyn EntityDescriptor>> {
    registry
        .get(type_name)
        .ok_or_else(|| GraphError::UnknownEntityType(type_name.to_string()))
}

/// Graph operations over the registered entity types.
///
/// Holds no per-call state: each operation gets its own visited set, so one
/// `EntityGraph` can serve concurrent calls on disjoint graphs. The
/// persistence context is passed to every call that needs it; none of them
/// opens or commits a transaction.
pub struct EntityGraph {
    registry: ModelRegistry,
    config: GraphConfig,
}

impl EntityGraph {
    /// Creates a graph with the default configuration.
    pub fn new(registry: ModelRegistry) -> Self {
        Self::with_config(registry, GraphConfig::default())
    }

    pub fn with_config(registry: ModelRegistry, config: GraphConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Merges `values` into an entity of `type_name`.
    ///
    /// With an identity in the map the managed entity is fetched and
    /// updated; without one a new entity is instantiated. The version check
    /// runs only for entities whose state actually changed. Returns `None`
    /// for an absent map.
    pub fn reconcile(
        &self,
        ctx: &dyn PersistenceContext,
        type_name: &str,
        values: Option<&ValueMap>,
    ) -> GraphResult<Option<EntityRef>> {
        let Some(values) = values else {
            return Ok(None);
        };
        Reconciler::new(&self.registry, &self.config, ctx)
            .reconcile(type_name, values)
            .map(Some)
    }

    /// Binds every reachable one-to-many element's back-reference and
    /// returns the same root, ready for one cascading persist.
    pub fn attach(&self, entity: &EntityRef) -> GraphResult<EntityRef> {
        Attacher::new(&self.registry).attach(entity)
    }

    /// Creates an unmanaged, identity-free copy of `entity`.
    ///
    /// `deep` also duplicates ordered one-to-many elements; otherwise those
    /// collections come back empty.
    pub fn duplicate(
        &self,
        ctx: &dyn PersistenceContext,
        entity: &EntityRef,
        deep: bool,
    ) -> GraphResult<Option<EntityRef>> {
        Duplicator::new(&self.registry, &self.config, ctx).duplicate(entity, deep)
    }

    /// See [`VersionGuard::check`].
    pub fn check_version(
        &self,
        ctx: &dyn PersistenceContext,
        type_name: &str,
        id: Option<EntityId>,
        version: Option<Version>,
    ) -> GraphResult<()> {
        VersionGuard::check(ctx, type_name, id, version)
    }

    /// Version-checks, registers and flushes `entity`.
    pub fn persist(
        &self,
        ctx: &dyn PersistenceContext,
        entity: &EntityRef,
    ) -> GraphResult<EntityRef> {
        VersionGuard::check(ctx, entity.type_name(), entity.id(), entity.version())?;
        ctx.register_new(entity)?;
        ctx.flush()?;
        debug!("Persisted {}#{:?}", entity.type_name(), entity.id());
        Ok(entity.clone())
    }

    /// Version-checks `entity`, merges it into its managed instance and
    /// flushes. Returns the managed instance.
    pub fn merge(
        &self,
        ctx: &dyn PersistenceContext,
        entity: &EntityRef,
    ) -> GraphResult<EntityRef> {
        VersionGuard::check(ctx, entity.type_name(), entity.id(), entity.version())?;
        let managed = ctx.merge_existing(entity)?;
        ctx.flush()?;
        debug!("Merged {}#{:?}", managed.type_name(), managed.id());
        Ok(managed)
    }

    /// [`merge`](Self::merge) for entities with an identity, otherwise
    /// [`persist`](Self::persist).
    pub fn save(&self, ctx: &dyn PersistenceContext, entity: &EntityRef) -> GraphResult<EntityRef> {
        if entity.id().is_some() {
            self.merge(ctx, entity)
        } else {
            self.persist(ctx, entity)
        }
    }

    /// Deletes the persisted entity `entity` stands for and flushes.
    ///
    /// A managed instance is removed as-is. A detached one is version-checked
    /// first, then its managed instance is looked up and removed. Entities
    /// that were never persisted are ignored.
    pub fn remove(&self, ctx: &dyn PersistenceContext, entity: &EntityRef) -> GraphResult<()> {
        let managed = if ctx.contains(entity) {
            entity.clone()
        } else {
            let Some(id) = entity.id() else {
                debug!("Ignoring remove of transient {}", entity.type_name());
                return Ok(());
            };
            VersionGuard::check(ctx, entity.type_name(), Some(id), entity.version())?;
            ctx.find(entity.type_name(), id)?
                .ok_or_else(|| GraphError::EntityNotFound {
                    type_name: entity.type_name().to_string(),
                    id,
                })?
        };
        ctx.remove(&managed)?;
        ctx.flush()?;
        debug!("Removed {}#{:?}", managed.type_name(), managed.id());
        Ok(())
    }

    /// [`attach`](Self::attach) followed by [`persist`](Self::persist).
    pub fn manage(
        &self,
        ctx: &dyn PersistenceContext,
        entity: &EntityRef,
    ) -> GraphResult<EntityRef> {
        let root = self.attach(entity)?;
        self.persist(ctx, &root)
    }

    /// [`reconcile`](Self::reconcile) followed by [`save`](Self::save).
    pub fn reconcile_and_save(
        &self,
        ctx: &dyn PersistenceContext,
        type_name: &str,
        values: Option<&ValueMap>,
    ) -> GraphResult<Option<EntityRef>> {
        match self.reconcile(ctx, type_name, values)? {
            Some(entity) => self.save(ctx, &entity).map(Some),
            None => Ok(None),
        }
    }
}
