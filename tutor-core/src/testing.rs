//! Testing utilities for context assembly.
//!
//! This module provides tools for integration testing:
//! - Record and turn builders for compact fixtures
//! - `TestHarness` for scripted assembly scenarios over a `MemoryStore`
//! - Assertion helpers for verifying composed prompts

use crate::assembler::{AssembledContext, AssemblyRequest, ContextAssembler};
use crate::compose::marker_positions;
use crate::config::AssemblerConfig;
use crate::ids::{ContextId, DialogueId, LearnerId, ParentId};
use crate::model::{
    ContextRecord, CorpusEntry, LearnerRecord, LearningPreferences, MaterialRecord, OutcomeRecord,
    ParentRecord, TeachingFields, Turn,
};
use crate::store::MemoryStore;
use chrono::{DateTime, TimeZone, Utc};

// ============================================================================
// Fixture builders
// ============================================================================

/// `count` turns alternating learner, tutor, learner, ...
///
/// The text is neutral: it holds no question marks or heuristic keywords.
pub fn alternating_turns(count: usize) -> Vec<Turn> {
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                Turn::learner(format!("Learner turn {i}"))
            } else {
                Turn::tutor(format!("Tutor turn {i}"))
            }
        })
        .collect()
}

/// A fixed timestamp `minutes` after a reference point, for ordering fixtures.
pub fn at_minute(minutes: i64) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .map(|t| t + chrono::Duration::minutes(minutes))
}

/// A learner with no stored preferences.
pub fn learner(id: impl Into<LearnerId>) -> LearnerRecord {
    LearnerRecord {
        id: id.into(),
        name: None,
        preferences: None,
    }
}

/// A learner with the full preference triple.
pub fn learner_with_preferences(
    id: impl Into<LearnerId>,
    style: &str,
    pace: &str,
    background: &str,
) -> LearnerRecord {
    LearnerRecord {
        id: id.into(),
        name: None,
        preferences: Some(LearningPreferences {
            style: Some(style.to_string()),
            pace: Some(pace.to_string()),
            background: Some(background.to_string()),
        }),
    }
}

/// A context with no parent and no teaching configuration.
pub fn context(id: i64, title: &str) -> ContextRecord {
    ContextRecord {
        id: ContextId(id),
        parent_id: None,
        title: title.to_string(),
        description: None,
        teaching: TeachingFields::default(),
    }
}

/// A context under `parent`.
pub fn child_context(id: i64, parent: i64, title: &str) -> ContextRecord {
    ContextRecord {
        parent_id: Some(ParentId(parent)),
        ..context(id, title)
    }
}

/// A parent context with a philosophy and objectives.
pub fn parent(id: i64, title: &str) -> ParentRecord {
    ParentRecord {
        id: ParentId(id),
        title: title.to_string(),
        description: None,
        teaching_philosophy: format!("{title} philosophy"),
        learning_objectives: format!("{title} objectives"),
    }
}

/// A knowledge corpus entry.
pub fn corpus_entry(title: &str, priority: i64) -> CorpusEntry {
    CorpusEntry {
        title: title.to_string(),
        content: format!("Notes on {title}"),
        category: "knowledge".to_string(),
        priority,
    }
}

/// An outcome record for `context`, created `minute` minutes after the reference point.
pub fn outcome(context: i64, what_learned: &str, key_concepts: &str, minute: i64) -> OutcomeRecord {
    OutcomeRecord {
        context_id: ContextId(context),
        what_learned: Some(what_learned.to_string()),
        how_learned: None,
        key_concepts: Some(key_concepts.to_string()),
        created_at: at_minute(minute),
    }
}

/// A text material.
pub fn material(filename: &str, content: impl Into<String>) -> MaterialRecord {
    MaterialRecord {
        filename: filename.to_string(),
        content: content.into(),
        uploaded_at: None,
    }
}

// ============================================================================
// Test harness
// ============================================================================

/// Test harness for scripted assembly scenarios.
pub struct TestHarness {
    assembler: ContextAssembler<MemoryStore>,
    last_result: Option<AssembledContext>,
}

impl TestHarness {
    /// Create a harness with an empty store and default configuration.
    pub fn new() -> Self {
        Self::with_config(AssemblerConfig::default())
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            assembler: ContextAssembler::new(MemoryStore::new(), config),
            last_result: None,
        }
    }

    /// Direct access to the backing store, for fixtures not covered below.
    pub fn store_mut(&mut self) -> &mut MemoryStore {
        self.assembler.store_mut()
    }

    /// Add a learner.
    pub fn learner(&mut self, record: LearnerRecord) -> &mut Self {
        self.store_mut().add_learner(record);
        self
    }

    /// Add a context.
    pub fn context(&mut self, record: ContextRecord) -> &mut Self {
        self.store_mut().add_context(record);
        self
    }

    /// Add a parent context with its corpus.
    pub fn parent(&mut self, record: ParentRecord, corpus: Vec<CorpusEntry>) -> &mut Self {
        let id = record.id;
        let store = self.store_mut();
        store.add_parent(record);
        for entry in corpus {
            store.add_corpus_entry(id, entry);
        }
        self
    }

    /// Add a dialogue.
    pub fn dialogue(
        &mut self,
        id: impl Into<DialogueId>,
        learner: impl Into<LearnerId>,
        context: i64,
        turns: &[Turn],
    ) -> &mut Self {
        self.store_mut()
            .add_dialogue(id, learner, ContextId(context), turns, None);
        self
    }

    /// Add an outcome record.
    pub fn outcome(&mut self, learner: impl Into<LearnerId>, record: OutcomeRecord) -> &mut Self {
        self.store_mut().add_outcome(learner, record);
        self
    }

    /// Assemble and remember the result.
    pub async fn assemble(&mut self, request: AssemblyRequest) -> &AssembledContext {
        let result = self.assembler.assemble(&request).await;
        self.last_result.insert(result)
    }

    /// The most recent assembly result.
    pub fn last_result(&self) -> Option<&AssembledContext> {
        self.last_result.as_ref()
    }

    /// The most recent prompt text, or an empty string.
    pub fn last_text(&self) -> &str {
        self.last_result.as_ref().map_or("", |r| r.text.as_str())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert that every fixed section marker appears, in order.
pub fn assert_markers_in_order(result: &AssembledContext, tutor_name: &str) {
    assert!(
        marker_positions(&result.text, tutor_name).is_some(),
        "section markers missing or out of order in:\n{}",
        result.text
    );
}

/// Assert that each needle appears in `text` after the previous one.
pub fn assert_contains_in_order(text: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match text[from..].find(needle) {
            Some(at) => from += at + needle.len(),
            None => panic!("expected {needle:?} after byte {from} in:\n{text}"),
        }
    }
}

/// Assert that the result came from the fallback path.
pub fn assert_fallback(result: &AssembledContext) {
    assert!(result.fallback, "expected fallback, got:\n{}", result.text);
    assert!(result.layers.is_none());
}

/// Assert that the result was fully assembled.
pub fn assert_not_fallback(result: &AssembledContext) {
    assert!(!result.fallback, "unexpected fallback:\n{}", result.text);
    assert!(result.layers.is_some());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    #[test]
    fn test_alternating_turns() {
        let turns = alternating_turns(3);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::Learner);
        assert_eq!(turns[1].role, Role::Tutor);
        assert_eq!(turns[2].role, Role::Learner);
        assert!(turns.iter().all(|t| !t.text.contains('?')));
    }

    #[test]
    fn test_at_minute_orders() {
        assert!(at_minute(5) > at_minute(1));
    }

    #[tokio::test]
    async fn test_harness_assembles() {
        let mut harness = TestHarness::new();
        harness.learner(learner("u")).context(context(1, "Intro"));

        let result = harness.assemble(AssemblyRequest::new("u", ContextId(1))).await;
        assert_not_fallback(result);
        assert_markers_in_order(result, "Harv");
        assert!(harness.last_text().contains("MODULE CONTEXT: Intro"));
    }

    #[tokio::test]
    async fn test_harness_fallback() {
        let mut harness = TestHarness::new();
        let result = harness.assemble(AssemblyRequest::new("u", ContextId(1))).await;
        assert_fallback(result);
    }
}
