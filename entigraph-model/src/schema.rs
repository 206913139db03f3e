use crate::{CollectionKind, EntityDescriptor};
use serde::{Deserialize, Serialize};

/// Name of the identity property every schema carries.
pub const ID_PROPERTY: &str = "id";
/// Name of the version property every schema carries.
pub const VERSION_PROPERTY: &str = "version";

/// Describes an entity type's properties, in declaration order.
///
/// This is the schema-generated [`EntityDescriptor`]: entity types that do
/// not need custom accessors are declared as data and registered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    pub properties: Vec<Property>,
}

impl EntitySchema {
    /// Creates a schema with the `id` and `version` properties already declared.
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.into(),
            properties: vec![Property::id(), Property::version()],
        }
    }

    /// Adds a property, replacing any earlier one with the same name.
    pub fn with(mut self, property: Property) -> Self {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }
}

impl EntityDescriptor for EntitySchema {
    fn type_name(&self) -> &str {
        &self.entity_type
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// Shape of a property's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Plain value: text, number, flag, date, JSON.
    Scalar,
    /// Reference to a single entity.
    ToOne,
    /// Collection of entities.
    ToMany,
}

/// One named attribute of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    /// Entity type on the other end of a relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Set semantics for a to-many collection; `false` means an ordered list.
    #[serde(default)]
    pub collection_set: bool,
    /// Name of the reverse property on `target` that owns this relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub version: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub readonly: bool,
    /// Computed on read, never persisted.
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
}

impl Property {
    fn plain(name: &str, kind: PropertyKind, target: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.map(Into::into),
            collection_set: false,
            mapped_by: None,
            primary: false,
            version: false,
            unique: false,
            readonly: false,
            is_virtual: false,
        }
    }

    /// The primary-key property.
    pub fn id() -> Self {
        Self {
            primary: true,
            ..Self::plain(ID_PROPERTY, PropertyKind::Scalar, None)
        }
    }

    /// The optimistic-concurrency version property.
    pub fn version() -> Self {
        Self {
            version: true,
            ..Self::plain(VERSION_PROPERTY, PropertyKind::Scalar, None)
        }
    }

    /// Shorthand for a scalar property.
    pub fn scalar(name: &str) -> Self {
        Self::plain(name, PropertyKind::Scalar, None)
    }

    /// Shorthand for a many-to-one / one-to-one reference.
    pub fn to_one(name: &str, target: &str) -> Self {
        Self::plain(name, PropertyKind::ToOne, Some(target))
    }

    /// Shorthand for an ordered to-many collection.
    pub fn list(name: &str, target: &str) -> Self {
        Self::plain(name, PropertyKind::ToMany, Some(target))
    }

    /// Shorthand for an unordered, duplicate-free to-many collection.
    pub fn set(name: &str, target: &str) -> Self {
        Self {
            collection_set: true,
            ..Self::plain(name, PropertyKind::ToMany, Some(target))
        }
    }

    /// Declares that `target.<inverse>` owns this relation.
    pub fn mapped_by(mut self, inverse: &str) -> Self {
        self.mapped_by = Some(inverse.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn is_reference(&self) -> bool {
        self.kind == PropertyKind::ToOne
    }

    pub fn is_collection(&self) -> bool {
        self.kind == PropertyKind::ToMany
    }

    /// `true` for both to-one and to-many properties.
    pub fn is_relation(&self) -> bool {
        self.target.is_some() && self.kind != PropertyKind::Scalar
    }

    /// Container kind for a to-many property.
    pub fn collection_kind(&self) -> CollectionKind {
        if self.collection_set {
            CollectionKind::Set
        } else {
            CollectionKind::List
        }
    }

    /// Whether the property is backed by the identity/version slots that the
    /// persistence layer manages.
    pub fn is_managed_slot(&self) -> bool {
        self.primary || self.version
    }
}
