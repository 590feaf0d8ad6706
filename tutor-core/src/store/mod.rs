//! Read access to the tutoring backend's data.
//!
//! The assembler depends only on [`LearningStore`]. Implementations must be
//! safe for concurrent reads; the assembler issues independent reads for
//! each layer at the same time.

mod memory;

pub use memory::{MemoryStore, SnapshotError, StoreSnapshot};

use crate::error::StoreError;
use crate::ids::{ContextId, DialogueId, LearnerId, ParentId};
use crate::model::{
    ActivityRecord, ContextRecord, CorpusEntry, LearnerRecord, MaterialRecord, OutcomeRecord,
    ParentRecord, Turn,
};
use async_trait::async_trait;

/// Read-only view of learners, contexts, dialogues, outcomes and materials.
#[async_trait]
pub trait LearningStore: Send + Sync {
    /// Look up a learner.
    async fn learner(&self, id: &LearnerId) -> Result<Option<LearnerRecord>, StoreError>;

    /// The learner's dialogues across all contexts, most recently active first.
    async fn recent_activity(
        &self,
        learner: &LearnerId,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, StoreError>;

    /// Look up a context.
    async fn context(&self, id: ContextId) -> Result<Option<ContextRecord>, StoreError>;

    /// Look up a parent context.
    async fn parent(&self, id: ParentId) -> Result<Option<ParentRecord>, StoreError>;

    /// The parent's shared corpus, ascending by priority.
    async fn corpus(&self, parent: ParentId) -> Result<Vec<CorpusEntry>, StoreError>;

    /// Turns of a dialogue owned by `(learner, context)`.
    ///
    /// Returns `None` when no such dialogue exists. Malformed stored turn
    /// logs are reported as an empty turn list.
    async fn dialogue_turns(
        &self,
        learner: &LearnerId,
        context: ContextId,
        dialogue: &DialogueId,
    ) -> Result<Option<Vec<Turn>>, StoreError>;

    /// Outcome records for the learner in every context except `exclude`,
    /// most recent first.
    async fn outcomes_excluding(
        &self,
        learner: &LearnerId,
        exclude: ContextId,
    ) -> Result<Vec<OutcomeRecord>, StoreError>;

    /// Reference materials attached directly to a context.
    async fn context_materials(&self, context: ContextId)
        -> Result<Vec<MaterialRecord>, StoreError>;

    /// Reference materials attached to a parent context.
    async fn parent_materials(&self, parent: ParentId) -> Result<Vec<MaterialRecord>, StoreError>;
}
