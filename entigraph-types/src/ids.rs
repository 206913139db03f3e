//! Identity and version tokens for persisted entities.
//!
//! Both are assigned by the persistence layer: an identity on first write,
//! a new version on every committed write. Callers hand them back to us as
//! loosely-typed JSON, so each type can parse itself out of a
//! [`serde_json::Value`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Primary key of a persisted entity.
///
/// Unset (`None` at the use site) until the entity is first written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Wraps a raw key.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw key.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Parses an entity ID from a decimal string.
    pub fn parse(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::InvalidIdentity(s.to_string()))
    }

    /// Extracts an identity from a value-map token.
    ///
    /// `null` means "no identity". Integers and decimal strings are accepted;
    /// anything else is rejected.
    pub fn from_token(token: &Value) -> Result<Option<Self>> {
        match token {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .map(|raw| Some(Self(raw)))
                .ok_or_else(|| Error::InvalidIdentity(n.to_string())),
            Value::String(s) => Self::parse(s).map(Some),
            other => Err(Error::InvalidIdentity(other.to_string())),
        }
    }
}

impl From<i64> for EntityId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Optimistic-concurrency token: the revision of the last committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// The version a freshly inserted entity receives.
    pub const INITIAL: Self = Self(0);

    /// Wraps a raw revision number.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw revision number.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Returns the revision that follows this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Extracts a version from a value-map token. `null` means "not supplied".
    pub fn from_token(token: &Value) -> Result<Option<Self>> {
        match token {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .map(|raw| Some(Self(raw)))
                .ok_or_else(|| Error::InvalidVersion(n.to_string())),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|raw| Some(Self(raw)))
                .map_err(|_| Error::InvalidVersion(s.clone())),
            other => Err(Error::InvalidVersion(other.to_string())),
        }
    }
}

impl From<i64> for Version {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
