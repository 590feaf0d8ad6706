//! Records read from the learning store.
//!
//! These mirror the rows owned by the surrounding tutoring backend. The core
//! only reads them; nothing here is ever written back.

use crate::ids::{ContextId, LearnerId, ParentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A learner known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerRecord {
    pub id: LearnerId,
    #[serde(default)]
    pub name: Option<String>,
    /// Stored onboarding preferences, if the learner filled them in.
    #[serde(default)]
    pub preferences: Option<LearningPreferences>,
}

/// Onboarding answers describing how a learner likes to learn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPreferences {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub pace: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
}

/// One dialogue's footprint in a learner's recent activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub context_id: ContextId,
    pub last_activity: Option<DateTime<Utc>>,
    pub turn_count: usize,
}

/// Teaching configuration text attached to a context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeachingFields {
    /// System instructions for the tutor in this context.
    pub system_prompt: String,
    /// Strategy notes for this context.
    pub module_prompt: String,
    pub system_corpus: String,
    pub module_corpus: String,
    pub dynamic_corpus: String,
}

impl TeachingFields {
    /// Whether any field carries text.
    pub fn is_configured(&self) -> bool {
        [
            &self.system_prompt,
            &self.module_prompt,
            &self.system_corpus,
            &self.module_corpus,
            &self.dynamic_corpus,
        ]
        .iter()
        .any(|field| !field.trim().is_empty())
    }
}

/// A context (learning module).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub id: ContextId,
    #[serde(default)]
    pub parent_id: Option<ParentId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub teaching: TeachingFields,
}

/// A parent context (class) whose configuration its contexts inherit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRecord {
    pub id: ParentId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub teaching_philosophy: String,
    #[serde(default)]
    pub learning_objectives: String,
}

/// One entry of a parent's shared knowledge corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub title: String,
    pub content: String,
    /// Free-form type tag such as "knowledge", "reference" or "misconception".
    pub category: String,
    /// Lower values come first.
    pub priority: i64,
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user", alias = "learner", alias = "student")]
    Learner,
    #[serde(rename = "assistant", alias = "tutor")]
    Tutor,
}

impl Role {
    /// Map a stored role label to a role. Anything that is not a learner
    /// label is attributed to the tutor.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "user" | "learner" | "student" => Role::Learner,
            _ => Role::Tutor,
        }
    }

    /// Check if this is a learner turn.
    pub fn is_learner(&self) -> bool {
        matches!(self, Role::Learner)
    }
}

/// One message in a dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    #[serde(rename = "content")]
    pub text: String,
}

impl Turn {
    /// A learner turn.
    pub fn learner(text: impl Into<String>) -> Self {
        Self {
            role: Role::Learner,
            text: text.into(),
        }
    }

    /// A tutor turn.
    pub fn tutor(text: impl Into<String>) -> Self {
        Self {
            role: Role::Tutor,
            text: text.into(),
        }
    }
}

/// Stored shape of a turn; tolerant of missing fields and unknown roles.
#[derive(Deserialize)]
struct StoredTurn {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

/// Parse a stored JSON array of `{role, content}` objects.
pub fn parse_turns(raw: &str) -> Result<Vec<Turn>, serde_json::Error> {
    let stored: Vec<StoredTurn> = serde_json::from_str(raw)?;
    Ok(stored
        .into_iter()
        .map(|t| Turn {
            role: Role::from_label(&t.role),
            text: t.content,
        })
        .collect())
}

/// Decode a stored turn log, treating absent or malformed data as zero turns.
pub fn decode_turns(raw: Option<&str>) -> Vec<Turn> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    match parse_turns(raw) {
        Ok(turns) => turns,
        Err(e) => {
            warn!(error = %e, "malformed turn log, treating as empty");
            Vec::new()
        }
    }
}

/// Encode turns in the stored JSON shape.
pub fn encode_turns(turns: &[Turn]) -> String {
    serde_json::to_string(turns).unwrap_or_else(|_| "[]".to_string())
}

/// A condensed record of what a learner took away from one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub context_id: ContextId,
    #[serde(default)]
    pub what_learned: Option<String>,
    #[serde(default)]
    pub how_learned: Option<String>,
    /// Comma-separated concept list.
    #[serde(default)]
    pub key_concepts: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Uploaded reference material, stored as flat text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub filename: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}
