//! Duplicate: copy an entity graph into new, identity-free entities.

use crate::graph::lookup;
use crate::walker::{GraphWalker, Identity, Visit};
use crate::{GraphConfig, GraphResult};
use entigraph_model::{CollectionKind, CollectionRef, EntityRef, ModelRegistry, Value};
use entigraph_storage::PersistenceContext;
use serde_json::Value as Json;
use tracing::debug;

/// State of one top-level duplicate call.
///
/// Copies every persisted, non-computed property. Set collections are copied
/// shallowly (members shared), ordered collections are dropped or, when deep,
/// rebuilt from recursive duplicates. To-one references are shared, not
/// copied. Unique text gets a suffix naming the source identity.
pub(crate) struct Duplicator<'a> {
    registry: &'a ModelRegistry,
    config: &'a GraphConfig,
    ctx: &'a dyn PersistenceContext,
}

impl<'a> Duplicator<'a> {
    pub(crate) fn new(
        registry: &'a ModelRegistry,
        config: &'a GraphConfig,
        ctx: &'a dyn PersistenceContext,
    ) -> Self {
        Self { registry, config, ctx }
    }

    pub(crate) fn duplicate(
        &self,
        source: &EntityRef,
        deep: bool,
    ) -> GraphResult<Option<EntityRef>> {
        let mut walker = GraphWalker::new();
        self.duplicate_node(source, deep, &mut walker)
    }

    /// `None` when `source` was already copied in this call (shared or
    /// cyclic reference).
    fn duplicate_node(
        &self,
        source: &EntityRef,
        deep: bool,
        walker: &mut GraphWalker<Identity>,
    ) -> GraphResult<Option<EntityRef>> {
        if !source.is_loaded() {
            self.ctx.initialize(source)?;
        }
        match walker.walk(Identity::of(source), |walker| self.copy(source, deep, walker))? {
            Visit::Visited(copy) => Ok(Some(copy)),
            Visit::AlreadyVisited => {
                debug!("Not duplicating {}#{:?} twice", source.type_name(), source.id());
                Ok(None)
            }
        }
    }

    fn copy(
        &self,
        source: &EntityRef,
        deep: bool,
        walker: &mut GraphWalker<Identity>,
    ) -> GraphResult<EntityRef> {
        let descriptor = lookup(self.registry, source.type_name())?;
        let copy = descriptor.instantiate();

        for property in descriptor.properties() {
            if property.is_virtual || property.primary || property.version {
                continue;
            }
            let value = match descriptor.get(source, &property.name) {
                Value::Collection(items) if items.is_set() => {
                    Value::Collection(CollectionRef::from_items(CollectionKind::Set, items.items()))
                }
                Value::Collection(items) => {
                    let copies = CollectionRef::list();
                    if deep {
                        for item in items.items() {
                            let Some(child) = self.duplicate_node(&item, true, walker)? else {
                                continue;
                            };
                            if self.config.bind_duplicated_children {
                                self.registry.bind_inverse(property, &child, &copy);
                            }
                            copies.add(child);
                        }
                    }
                    Value::Collection(copies)
                }
                Value::Scalar(Json::String(text)) if property.unique => {
                    Value::scalar(self.config.copy_label(&text, source.id()))
                }
                other => other,
            };
            descriptor.set(&copy, &property.name, value);
        }

        debug!("Duplicated {}#{:?} (deep={})", source.type_name(), source.id(), deep);
        Ok(copy)
    }
}
