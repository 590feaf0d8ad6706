//! Teaching configuration layer.
//!
//! A context keeps its own teaching fields and inherits its parent's
//! philosophy, objectives and shared corpus alongside them. Parent and child
//! text are surfaced separately and never merged.

use crate::heuristics::strategy_label;
use crate::ids::{ContextId, ParentId};
use crate::model::{ContextRecord, CorpusEntry, TeachingFields};
use crate::store::LearningStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Inherited parent-context settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentContext {
    pub id: ParentId,
    pub title: String,
    pub description: String,
    pub teaching_philosophy: String,
    pub learning_objectives: String,
}

/// Identity of the context being taught.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextInfo {
    pub id: ContextId,
    pub title: String,
    pub description: String,
}

/// Output of the configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub context: ContextInfo,
    /// The context's own teaching fields.
    pub teaching: TeachingFields,
    /// `None` when the context has no parent (or it no longer exists).
    pub parent: Option<ParentContext>,
    /// The parent's shared corpus, ascending by priority.
    pub corpus: Vec<CorpusEntry>,
    /// Strategy label derived from the context's strategy notes.
    pub strategy: String,
}

/// Resolves a context's effective teaching configuration.
#[derive(Debug, Default)]
pub struct ConfigurationResolver;

impl ConfigurationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the bundle for a context already looked up by the caller.
    pub async fn resolve<S>(&self, store: &S, context: &ContextRecord) -> ConfigBundle
    where
        S: LearningStore + ?Sized,
    {
        let (parent, corpus) = match context.parent_id {
            Some(parent_id) => self.resolve_parent(store, parent_id).await,
            None => (None, Vec::new()),
        };

        debug!(
            context = %context.id,
            has_parent = parent.is_some(),
            corpus = corpus.len(),
            "teaching layer ready"
        );

        ConfigBundle {
            context: ContextInfo {
                id: context.id,
                title: context.title.clone(),
                description: context.description.clone().unwrap_or_default(),
            },
            teaching: context.teaching.clone(),
            parent,
            corpus,
            strategy: strategy_label(&context.teaching.module_prompt),
        }
    }

    async fn resolve_parent<S>(
        &self,
        store: &S,
        parent_id: ParentId,
    ) -> (Option<ParentContext>, Vec<CorpusEntry>)
    where
        S: LearningStore + ?Sized,
    {
        let parent = match store.parent(parent_id).await {
            Ok(Some(parent)) => parent,
            Ok(None) => {
                warn!(parent = %parent_id, "context references a missing parent");
                return (None, Vec::new());
            }
            Err(e) => {
                warn!(parent = %parent_id, error = %e, "failed to read parent context");
                return (None, Vec::new());
            }
        };

        let corpus = match store.corpus(parent_id).await {
            Ok(entries) => order_corpus(entries),
            Err(e) => {
                warn!(parent = %parent_id, error = %e, "failed to read shared corpus");
                Vec::new()
            }
        };

        let parent = ParentContext {
            id: parent.id,
            title: parent.title,
            description: parent.description.unwrap_or_default(),
            teaching_philosophy: parent.teaching_philosophy,
            learning_objectives: parent.learning_objectives,
        };
        (Some(parent), corpus)
    }
}

/// Stable ascending sort by priority; equal priorities keep retrieval order.
pub fn order_corpus(mut entries: Vec<CorpusEntry>) -> Vec<CorpusEntry> {
    entries.sort_by_key(|e| e.priority);
    entries
}
