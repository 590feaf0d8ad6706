//! In-memory learning store with JSON snapshot persistence.
//!
//! Holds the same rows the relational backend owns, so fixtures and exported
//! datasets can be replayed through the assembler without a database.

use super::LearningStore;
use crate::error::StoreError;
use crate::ids::{ContextId, DialogueId, LearnerId, ParentId};
use crate::model::{
    decode_turns, encode_turns, ActivityRecord, ContextRecord, CorpusEntry, LearnerRecord,
    MaterialRecord, OutcomeRecord, ParentRecord, Turn,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Current snapshot file version.
const SNAPSHOT_VERSION: u32 = 1;

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// A corpus entry together with the parent it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusRow {
    pub parent_id: ParentId,
    #[serde(flatten)]
    pub entry: CorpusEntry,
}

/// A stored dialogue. Turns are kept in their stored JSON form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueRow {
    pub id: DialogueId,
    pub learner_id: LearnerId,
    pub context_id: ContextId,
    #[serde(default)]
    pub messages_json: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An outcome record together with the learner it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub learner_id: LearnerId,
    #[serde(flatten)]
    pub record: OutcomeRecord,
}

/// What a piece of reference material is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialOwner {
    Context(ContextId),
    Parent(ParentId),
}

/// A reference material together with its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRow {
    pub owner: MaterialOwner,
    #[serde(flatten)]
    pub record: MaterialRecord,
}

/// Every row held by a [`MemoryStore`], in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Snapshot format version.
    pub version: u32,
    #[serde(default)]
    pub learners: Vec<LearnerRecord>,
    #[serde(default)]
    pub contexts: Vec<ContextRecord>,
    #[serde(default)]
    pub parents: Vec<ParentRecord>,
    #[serde(default)]
    pub corpus: Vec<CorpusRow>,
    #[serde(default)]
    pub dialogues: Vec<DialogueRow>,
    #[serde(default)]
    pub outcomes: Vec<OutcomeRow>,
    #[serde(default)]
    pub materials: Vec<MaterialRow>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            learners: Vec::new(),
            contexts: Vec::new(),
            parents: Vec::new(),
            corpus: Vec::new(),
            dialogues: Vec::new(),
            outcomes: Vec::new(),
            materials: Vec::new(),
        }
    }
}

/// A [`LearningStore`] backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: StoreSnapshot,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, checking its version.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        Ok(Self { rows: snapshot })
    }

    /// Borrow every row.
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.rows
    }

    /// Save all rows to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let content = serde_json::to_string_pretty(&self.rows)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load a store from a JSON snapshot file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).await?;
        let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
        Self::from_snapshot(snapshot)
    }

    // =========================================================================
    // Row Management
    // =========================================================================

    /// Add a learner.
    pub fn add_learner(&mut self, learner: LearnerRecord) -> &mut Self {
        self.rows.learners.push(learner);
        self
    }

    /// Add a context.
    pub fn add_context(&mut self, context: ContextRecord) -> &mut Self {
        self.rows.contexts.push(context);
        self
    }

    /// Remove a context, returning it if it existed.
    ///
    /// Rows that reference the context are left in place.
    pub fn remove_context(&mut self, id: ContextId) -> Option<ContextRecord> {
        let index = self.rows.contexts.iter().position(|c| c.id == id)?;
        Some(self.rows.contexts.remove(index))
    }

    /// Add a parent context.
    pub fn add_parent(&mut self, parent: ParentRecord) -> &mut Self {
        self.rows.parents.push(parent);
        self
    }

    /// Add an entry to a parent's shared corpus.
    pub fn add_corpus_entry(&mut self, parent_id: ParentId, entry: CorpusEntry) -> &mut Self {
        self.rows.corpus.push(CorpusRow { parent_id, entry });
        self
    }

    /// Add a dialogue with the given turns.
    pub fn add_dialogue(
        &mut self,
        id: impl Into<DialogueId>,
        learner_id: impl Into<LearnerId>,
        context_id: ContextId,
        turns: &[Turn],
        updated_at: Option<DateTime<Utc>>,
    ) -> &mut Self {
        self.add_raw_dialogue(id, learner_id, context_id, encode_turns(turns), updated_at)
    }

    /// Add a dialogue whose turn log is stored verbatim, malformed or not.
    pub fn add_raw_dialogue(
        &mut self,
        id: impl Into<DialogueId>,
        learner_id: impl Into<LearnerId>,
        context_id: ContextId,
        messages_json: impl Into<String>,
        updated_at: Option<DateTime<Utc>>,
    ) -> &mut Self {
        self.rows.dialogues.push(DialogueRow {
            id: id.into(),
            learner_id: learner_id.into(),
            context_id,
            messages_json: Some(messages_json.into()),
            updated_at,
        });
        self
    }

    /// Append a turn to an existing dialogue. Returns `false` if the dialogue is unknown.
    pub fn append_turn(&mut self, dialogue: &DialogueId, turn: Turn) -> bool {
        let Some(row) = self.rows.dialogues.iter_mut().find(|d| &d.id == dialogue) else {
            return false;
        };
        let mut turns = decode_turns(row.messages_json.as_deref());
        turns.push(turn);
        row.messages_json = Some(encode_turns(&turns));
        true
    }

    /// Add an outcome record for a learner.
    pub fn add_outcome(
        &mut self,
        learner_id: impl Into<LearnerId>,
        record: OutcomeRecord,
    ) -> &mut Self {
        self.rows.outcomes.push(OutcomeRow {
            learner_id: learner_id.into(),
            record,
        });
        self
    }

    /// Attach reference material to a context.
    pub fn add_context_material(&mut self, context: ContextId, record: MaterialRecord) -> &mut Self {
        self.rows.materials.push(MaterialRow {
            owner: MaterialOwner::Context(context),
            record,
        });
        self
    }

    /// Attach reference material to a parent context.
    pub fn add_parent_material(&mut self, parent: ParentId, record: MaterialRecord) -> &mut Self {
        self.rows.materials.push(MaterialRow {
            owner: MaterialOwner::Parent(parent),
            record,
        });
        self
    }

    fn materials_of(&self, owner: MaterialOwner) -> Vec<MaterialRecord> {
        self.rows
            .materials
            .iter()
            .filter(|m| m.owner == owner)
            .map(|m| m.record.clone())
            .collect()
    }
}

#[async_trait]
impl LearningStore for MemoryStore {
    async fn learner(&self, id: &LearnerId) -> Result<Option<LearnerRecord>, StoreError> {
        Ok(self.rows.learners.iter().find(|l| &l.id == id).cloned())
    }

    async fn recent_activity(
        &self,
        learner: &LearnerId,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StoreError> {
        let mut dialogues: Vec<_> = self
            .rows
            .dialogues
            .iter()
            .filter(|d| &d.learner_id == learner)
            .collect();
        // Option orders None first, so descending puts undated rows last.
        dialogues.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(dialogues
            .into_iter()
            .take(limit)
            .map(|d| ActivityRecord {
                context_id: d.context_id,
                last_activity: d.updated_at,
                turn_count: decode_turns(d.messages_json.as_deref()).len(),
            })
            .collect())
    }

    async fn context(&self, id: ContextId) -> Result<Option<ContextRecord>, StoreError> {
        Ok(self.rows.contexts.iter().find(|c| c.id == id).cloned())
    }

    async fn parent(&self, id: ParentId) -> Result<Option<ParentRecord>, StoreError> {
        Ok(self.rows.parents.iter().find(|p| p.id == id).cloned())
    }

    async fn corpus(&self, parent: ParentId) -> Result<Vec<CorpusEntry>, StoreError> {
        let mut entries: Vec<_> = self
            .rows
            .corpus
            .iter()
            .filter(|row| row.parent_id == parent)
            .map(|row| row.entry.clone())
            .collect();
        entries.sort_by_key(|e| e.priority);
        Ok(entries)
    }

    async fn dialogue_turns(
        &self,
        learner: &LearnerId,
        context: ContextId,
        dialogue: &DialogueId,
    ) -> Result<Option<Vec<Turn>>, StoreError> {
        Ok(self
            .rows
            .dialogues
            .iter()
            .find(|d| &d.id == dialogue && &d.learner_id == learner && d.context_id == context)
            .map(|d| decode_turns(d.messages_json.as_deref())))
    }

    async fn outcomes_excluding(
        &self,
        learner: &LearnerId,
        exclude: ContextId,
    ) -> Result<Vec<OutcomeRecord>, StoreError> {
        let mut outcomes: Vec<_> = self
            .rows
            .outcomes
            .iter()
            .filter(|o| &o.learner_id == learner && o.record.context_id != exclude)
            .map(|o| o.record.clone())
            .collect();
        outcomes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(outcomes)
    }

    async fn context_materials(
        &self,
        context: ContextId,
    ) -> Result<Vec<MaterialRecord>, StoreError> {
        Ok(self.materials_of(MaterialOwner::Context(context)))
    }

    async fn parent_materials(&self, parent: ParentId) -> Result<Vec<MaterialRecord>, StoreError> {
        Ok(self.materials_of(MaterialOwner::Parent(parent)))
    }
}
