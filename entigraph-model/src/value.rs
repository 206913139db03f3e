use crate::{CollectionRef, EntityRef};

/// The runtime value of one entity property.
///
/// Scalars keep their JSON representation; relations hold shared handles so
/// that two properties pointing at the same entity (or the same tracked
/// collection) really point at the same thing.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Scalar(serde_json::Value),
    Ref(EntityRef),
    Collection(CollectionRef),
}

impl Value {
    /// Wraps a JSON scalar. JSON `null` becomes [`Value::Null`].
    pub fn scalar(value: impl Into<serde_json::Value>) -> Self {
        match value.into() {
            serde_json::Value::Null => Self::Null,
            other => Self::Scalar(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the text of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(|v| v.as_str())
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Ref(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionRef> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Change-detection equality.
    ///
    /// Scalars compare by value, entity references by entity identity and
    /// collections by container identity (a different container is a change
    /// even when the members match).
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => a.same_entity(b),
            (Self::Collection(a), Self::Collection(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<EntityRef> for Value {
    fn from(entity: EntityRef) -> Self {
        Self::Ref(entity)
    }
}

impl From<CollectionRef> for Value {
    fn from(collection: CollectionRef) -> Self {
        Self::Collection(collection)
    }
}

impl From<Option<EntityRef>> for Value {
    fn from(entity: Option<EntityRef>) -> Self {
        entity.map(Self::Ref).unwrap_or_default()
    }
}
