use crate::{EntityRef, Property, Value};

/// Outcome of [`EntityDescriptor::set`].
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The value the property held before the write.
    pub previous: Value,
    /// Whether the write actually changed the property.
    pub changed: bool,
}

/// Capability view of one entity type.
///
/// Graph algorithms are written against this trait only, never against
/// concrete entity types. [`EntitySchema`](crate::EntitySchema) implements it
/// from declared data; hand-written implementations can override the
/// accessors (e.g. to compute virtual properties).
pub trait EntityDescriptor: Send + Sync {
    /// The entity type this descriptor covers.
    fn type_name(&self) -> &str;

    /// All properties, in declaration order.
    fn properties(&self) -> &[Property];

    fn property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|p| p.name == name)
    }

    /// Creates a new, transient, default-constructed instance.
    fn instantiate(&self) -> EntityRef {
        EntityRef::new(self.type_name())
    }

    /// Reads a property. Identity and version read from the entity's managed
    /// slots; everything else from its fields.
    fn get(&self, entity: &EntityRef, name: &str) -> Value {
        match self.property(name) {
            Some(p) if p.primary => entity
                .id()
                .map(|id| Value::scalar(id.get()))
                .unwrap_or_default(),
            Some(p) if p.version => entity
                .version()
                .map(|v| Value::scalar(v.get()))
                .unwrap_or_default(),
            _ => entity.get(name),
        }
    }

    /// Writes a property and reports whether its value changed.
    ///
    /// Identity and version belong to the persistence layer: writes to them
    /// are ignored and reported as unchanged.
    fn set(&self, entity: &EntityRef, name: &str, value: Value) -> Assignment {
        if self.property(name).is_some_and(Property::is_managed_slot) {
            return Assignment {
                previous: self.get(entity, name),
                changed: false,
            };
        }
        let previous = entity.set(name, value.clone());
        let changed = !previous.same_as(&value);
        Assignment { previous, changed }
    }
}
