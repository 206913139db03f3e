//! Core type definitions for entigraph.
//!
//! This crate defines the small, model-agnostic tokens shared by every layer:
//! - [`EntityId`]: the primary key the persistence layer assigns
//! - [`Version`]: the optimistic-concurrency revision of a persisted entity
//!
//! Entity shapes, relations and the persistence boundary live in
//! `entigraph-model` and `entigraph-storage`.

mod ids;

pub use ids::{EntityId, Version};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing identity tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),
}
