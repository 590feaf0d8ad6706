//! Typed identifiers for the entities the assembler reads.
//!
//! Learners and dialogues are addressed by opaque strings, contexts and their
//! parents by the integer keys of the backing schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a learner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearnerId(String);

impl LearnerId {
    /// Create a learner ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LearnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for LearnerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for LearnerId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for LearnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a dialogue (conversation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueId(String);

impl DialogueId {
    /// Create a dialogue ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DialogueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DialogueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for DialogueId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DialogueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a context (a learning module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub i64);

impl From<i64> for ContextId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a parent context (a class).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentId(pub i64);

impl From<i64> for ParentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
