//! Lookup key for user events.
//!
//! `UserEventKey` serializes as its two fields; the `"<id>:<kind>"` form
//! produced by [`UserEventKey::marshal`] is only meant for map and cache
//! keys inside agents.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::EventError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserEventKey {
    pub kind: String,
    pub id:   i64,
}

impl UserEventKey {
    pub fn new(kind: impl Into<String>, id: i64) -> Self {
        Self { kind: kind.into(), id }
    }

    /// `"<id>:<kind>"`
    pub fn marshal(&self) -> String {
        format!("{}:{}", self.id, self.kind)
    }

    /// Inverse of [`marshal`](Self::marshal). A kind containing `:` cannot
    /// round-trip and is rejected like any other malformed key.
    pub fn unmarshal(s: &str) -> Result<Self, EventError> {
        let parts: Vec<&str> = s.split(':').collect();
        let [id, kind] = parts.as_slice() else {
            return Err(EventError::MalformedKey(s.to_owned()));
        };
        let id = id
            .parse::<i64>()
            .map_err(|_| EventError::MalformedKey(s.to_owned()))?;
        Ok(Self::new(*kind, id))
    }
}

impl fmt::Display for UserEventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.marshal())
    }
}

impl FromStr for UserEventKey {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::unmarshal(s)
    }
}
