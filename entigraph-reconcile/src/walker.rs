//! Visited-set traversal shared by reconcile, attach and duplicate.
//!
//! A walker lives for exactly one top-level call. It is what makes the
//! algorithms terminate on cyclic graphs, so every recursive step goes
//! through it.

use entigraph_model::EntityRef;
use entigraph_types::EntityId;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Result of [`GraphWalker::walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit<T> {
    /// The node was new and the visitor ran.
    Visited(T),
    /// The node had been seen earlier in this call; nothing ran.
    AlreadyVisited,
}

impl<T> Visit<T> {
    /// The visitor's output, or `None` for an already-visited node.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Visited(value) => Some(value),
            Self::AlreadyVisited => None,
        }
    }
}

/// Per-call visited set keyed by `K`.
#[derive(Debug)]
pub struct GraphWalker<K> {
    visited: HashSet<K>,
}

impl<K: Eq + Hash> Default for GraphWalker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> GraphWalker<K> {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
        }
    }

    pub fn is_visited(&self, key: &K) -> bool {
        self.visited.contains(key)
    }

    /// Records `key`. Returns `false` if it was already recorded.
    pub fn mark(&mut self, key: K) -> bool {
        self.visited.insert(key)
    }

    /// Runs `visit` unless `key` was seen before in this walk.
    ///
    /// The key is recorded before the visitor runs, so a visitor that
    /// recurses back into the same node gets [`Visit::AlreadyVisited`].
    pub fn walk<T, E>(
        &mut self,
        key: K,
        visit: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<Visit<T>, E> {
        if !self.mark(key) {
            return Ok(Visit::AlreadyVisited);
        }
        visit(self).map(Visit::Visited)
    }

    /// Number of distinct nodes seen so far.
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Visited key comparing entities by instance.
///
/// Holds the handle so the instance stays alive (and its address unique)
/// for as long as the walk does.
#[derive(Debug, Clone)]
pub struct Instance(pub EntityRef);

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.node_key().hash(state);
    }
}

/// Visited key comparing entities by persistent identity.
///
/// Entities without an identity fall back to instance comparison, so two
/// distinct unsaved entities of the same type never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Persisted { type_name: String, id: EntityId },
    Transient(Instance),
}

impl Identity {
    pub fn of(entity: &EntityRef) -> Self {
        match entity.id() {
            Some(id) => Self::Persisted {
                type_name: entity.type_name().to_string(),
                id,
            },
            None => Self::Transient(Instance(entity.clone())),
        }
    }
}
