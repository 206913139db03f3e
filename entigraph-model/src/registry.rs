use crate::{CollectionRef, EntityDescriptor, EntityRef, EntitySchema, Property, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps entity type names to their descriptors.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    descriptors: HashMap<String, Arc<dyn EntityDescriptor>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor, replacing any earlier one for the same type.
    pub fn register<D: EntityDescriptor + 'static>(&mut self, descriptor: D) -> &mut Self {
        self.descriptors
            .insert(descriptor.type_name().to_string(), Arc::new(descriptor));
        self
    }

    /// Builder-style [`register`](Self::register) for schemas.
    pub fn with_schema(mut self, schema: EntitySchema) -> Self {
        self.register(schema);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn EntityDescriptor>> {
        self.descriptors.get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.descriptors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Points the owning side of a bidirectional to-many relation back at `owner`.
    ///
    /// `property` is the inverse (non-owning) collection on `owner`'s type. If
    /// it is mapped by a to-one on the target, that reference is set to
    /// `owner`; if mapped by a collection, `owner` is added to it unless present. Unloaded
    /// inverse collections are left alone. Does nothing when the relation is
    /// not mapped, the target type is unknown or `item` is an uninitialized
    /// proxy (loading it would discard the write).
    pub fn bind_inverse(&self, property: &Property, item: &EntityRef, owner: &EntityRef) {
        if !item.is_loaded() {
            return;
        }
        let Some(mapped_by) = property.mapped_by.as_deref() else {
            return;
        };
        let Some(target) = self.get(item.type_name()) else {
            return;
        };
        let Some(inverse) = target.property(mapped_by) else {
            return;
        };

        if inverse.is_reference() {
            target.set(item, mapped_by, Value::Ref(owner.clone()));
        } else if inverse.is_collection() {
            match target.get(item, mapped_by) {
                Value::Collection(existing) if existing.is_loaded() => {
                    if !existing.contains(owner) {
                        existing.add(owner.clone());
                    }
                }
                Value::Collection(_) => {}
                _ => {
                    let fresh =
                        CollectionRef::from_items(inverse.collection_kind(), [owner.clone()]);
                    target.set(item, mapped_by, Value::Collection(fresh));
                }
            }
        }
    }
}
