//! Persistence boundary for entigraph.
//!
//! Graph operations never reach for an ambient session: they receive a
//! [`PersistenceContext`] explicitly and call only the handful of operations
//! it exposes (find, version lookup, register, merge, flush, initialize).
//!
//! [`MemoryStore`] is a complete in-process implementation with an identity
//! map, dirty tracking and version bumping on flush. It backs the test suites
//! and suits embedders that keep their graph in memory.

mod context;
mod error;
mod memory;

pub use context::PersistenceContext;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
