//! Reconcile: merge a loosely-typed value map into an entity graph.
//!
//! A value map names properties and their desired values. Nested maps
//! describe sub-entities (existing ones when they carry an identity, new ones
//! otherwise) and bare numbers reference existing entities by identity.
//! The result is the managed (or newly instantiated) entity with every
//! supplied property applied, ready for the caller to persist.

use crate::graph::lookup;
use crate::guard::VersionGuard;
use crate::walker::{GraphWalker, Instance};
use crate::{GraphConfig, GraphError, GraphResult};
use entigraph_model::{CollectionRef, EntityDescriptor, EntityRef, ModelRegistry, Property, Value};
use entigraph_storage::PersistenceContext;
use entigraph_types::{EntityId, Version};
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

/// A value map: property name to desired value.
pub type ValueMap = Map<String, Json>;

/// State of one top-level reconcile call.
pub(crate) struct Reconciler<'a> {
    registry: &'a ModelRegistry,
    config: &'a GraphConfig,
    ctx: &'a dyn PersistenceContext,
    walker: GraphWalker<Instance>,
}

impl<'a> Reconciler<'a> {
    pub(crate) fn new(
        registry: &'a ModelRegistry,
        config: &'a GraphConfig,
        ctx: &'a dyn PersistenceContext,
    ) -> Self {
        Self {
            registry,
            config,
            ctx,
            walker: GraphWalker::new(),
        }
    }

    /// Reconciles `values` into an entity of `type_name`.
    pub(crate) fn reconcile(
        &mut self,
        type_name: &str,
        values: &ValueMap,
    ) -> GraphResult<EntityRef> {
        let descriptor = lookup(self.registry, type_name)?;

        let id = match values.get(&self.config.id_key) {
            Some(token) => EntityId::from_token(token).map_err(|_| GraphError::InvalidIdentity {
                type_name: type_name.to_string(),
                value: token.to_string(),
            })?,
            None => None,
        };
        let entity = match id {
            Some(id) => self.find(type_name, id)?,
            None => descriptor.instantiate(),
        };
        let version = match values.get(&self.config.version_key) {
            Some(token) => Version::from_token(token).map_err(|_| GraphError::InvalidVersion {
                type_name: type_name.to_string(),
                value: token.to_string(),
            })?,
            None => None,
        };

        // A repeated occurrence without a version is returned untouched, even
        // if this occurrence carries other values.
        let key = Instance(entity.clone());
        if self.walker.is_visited(&key) && version.is_none() {
            trace!("Already reconciled {}#{:?}, skipping", type_name, id);
            return Ok(entity);
        }
        self.walker.mark(key);

        let mut changed = false;
        for (name, value) in values {
            if *name == self.config.id_key || *name == self.config.version_key {
                continue;
            }
            let Some(property) = descriptor.property(name) else {
                debug!("Skipping unknown property {}.{}", type_name, name);
                continue;
            };
            if property.is_managed_slot() || property.readonly || property.is_virtual {
                debug!("Skipping non-settable property {}.{}", type_name, name);
                continue;
            }

            let property_changed = if property.is_collection() {
                self.reconcile_collection(&*descriptor, &entity, property, value)?
            } else {
                let next = self.resolve(property, value)?;
                descriptor.set(&entity, name, next).changed
            };
            changed |= property_changed;
        }

        if changed {
            VersionGuard::check(self.ctx, type_name, id, version)?;
        }
        debug!("Reconciled {}#{:?} (changed={})", type_name, id, changed);
        Ok(entity)
    }

    /// Builds a fresh container from the input, then rewrites the entity's
    /// live collection in place only if the contents differ.
    fn reconcile_collection(
        &mut self,
        descriptor: &dyn EntityDescriptor,
        entity: &EntityRef,
        property: &Property,
        value: &Json,
    ) -> GraphResult<bool> {
        let target = target_of(property)?;
        let items = CollectionRef::new(property.collection_kind());

        if let Json::Array(elements) = value {
            for element in elements {
                match element {
                    Json::Object(nested) => {
                        let item = match property.mapped_by.as_deref() {
                            Some(inverse) if nested.contains_key(inverse) => {
                                let mut stripped = nested.clone();
                                stripped.remove(inverse);
                                self.reconcile(target, &stripped)?
                            }
                            _ => self.reconcile(target, nested)?,
                        };
                        self.registry.bind_inverse(property, &item, entity);
                        items.add(item);
                    }
                    Json::Number(_) => {
                        let id = parse_reference(target, element)?;
                        items.add(self.find(target, id)?);
                    }
                    other => {
                        debug!("Ignoring {} in {}.{}", other, entity.type_name(), property.name);
                    }
                }
            }
        }

        match descriptor.get(entity, &property.name) {
            Value::Collection(current) => {
                if !current.differs_from(&items) {
                    return Ok(false);
                }
                current.replace_all(items.items());
                entity.mark_dirty();
                Ok(true)
            }
            _ => Ok(descriptor.set(entity, &property.name, Value::Collection(items)).changed),
        }
    }

    /// Turns a non-collection input value into a property value.
    fn resolve(&mut self, property: &Property, value: &Json) -> GraphResult<Value> {
        if !property.is_reference() {
            return Ok(Value::scalar(value.clone()));
        }
        let target = target_of(property)?;
        match value {
            Json::Null => Ok(Value::Null),
            Json::Object(nested) => Ok(Value::Ref(self.reconcile(target, nested)?)),
            token => {
                let id = parse_reference(target, token)?;
                Ok(Value::Ref(self.find(target, id)?))
            }
        }
    }

    fn find(&self, type_name: &str, id: EntityId) -> GraphResult<EntityRef> {
        self.ctx
            .find(type_name, id)?
            .ok_or_else(|| GraphError::EntityNotFound {
                type_name: type_name.to_string(),
                id,
            })
    }
}

fn target_of(property: &Property) -> GraphResult<&str> {
    property
        .target
        .as_deref()
        .ok_or_else(|| GraphError::UnknownEntityType(format!("<target of {}>", property.name)))
}

/// Parses a bare reference; unlike a map's own identity, it cannot be absent.
fn parse_reference(type_name: &str, token: &Json) -> GraphResult<EntityId> {
    match EntityId::from_token(token) {
        Ok(Some(id)) => Ok(id),
        _ => Err(GraphError::InvalidIdentity {
            type_name: type_name.to_string(),
            value: token.to_string(),
        }),
    }
}
