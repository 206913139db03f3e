//! Attach: prepare an in-memory object graph for a single persist call.

use crate::graph::lookup;
use crate::walker::{GraphWalker, Instance};
use crate::GraphResult;
use entigraph_model::{EntityRef, ModelRegistry, Value};
use tracing::{debug, trace};

/// Walks every relation reachable from a root and fills in the owning-side
/// back-references of one-to-many elements.
///
/// Uninitialized entity proxies and unloaded collections are skipped without
/// being touched, so attaching never triggers a fetch.
pub(crate) struct Attacher<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> Attacher<'a> {
    pub(crate) fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    pub(crate) fn attach(&self, root: &EntityRef) -> GraphResult<EntityRef> {
        let mut walker = GraphWalker::new();
        self.attach_node(root, &mut walker)?;
        debug!("Attached {} entities reachable from {}", walker.len(), root.type_name());
        Ok(root.clone())
    }

    fn attach_node(
        &self,
        entity: &EntityRef,
        walker: &mut GraphWalker<Instance>,
    ) -> GraphResult<()> {
        walker
            .walk(Instance(entity.clone()), |walker| self.visit(entity, walker))
            .map(|_| ())
    }

    fn visit(&self, entity: &EntityRef, walker: &mut GraphWalker<Instance>) -> GraphResult<()> {
        if !entity.is_loaded() {
            trace!("Skipping uninitialized {}#{:?}", entity.type_name(), entity.id());
            return Ok(());
        }

        let descriptor = lookup(self.registry, entity.type_name())?;
        for property in descriptor.properties() {
            if !property.is_relation() || property.readonly {
                continue;
            }
            match descriptor.get(entity, &property.name) {
                Value::Ref(target) if property.is_reference() => self.attach_node(&target, walker)?,
                Value::Collection(items) if property.is_collection() => {
                    if !items.is_loaded() {
                        trace!("Skipping unloaded {}.{}", entity.type_name(), property.name);
                        continue;
                    }
                    for item in items.items() {
                        // No-op for uninitialized proxies.
                        self.registry.bind_inverse(property, &item, entity);
                        self.attach_node(&item, walker)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
