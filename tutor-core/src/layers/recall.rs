//! Cross-context recall: what the learner took away from other contexts.

use crate::config::AssemblerConfig;
use crate::ids::{ContextId, LearnerId};
use crate::model::OutcomeRecord;
use crate::store::LearningStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

const DEFAULT_WHAT_LEARNED: &str = "General understanding developed";
const DEFAULT_HOW_LEARNED: &str = "Through Socratic dialogue";

/// One prior context's learning outcome, with its title resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub context_id: ContextId,
    pub context_title: String,
    pub what_learned: String,
    pub how_learned: String,
    /// Raw comma-separated concept list.
    pub key_concepts: String,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Output of the recall layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallBundle {
    /// Most recent insight per prior context, newest first.
    pub insights: Vec<Insight>,
    /// Unique key concepts across all prior contexts, in encounter order.
    pub concepts: Vec<String>,
}

/// Retrieves learning outcomes from the learner's other contexts.
pub struct CrossContextRecall<'a> {
    config: &'a AssemblerConfig,
}

impl<'a> CrossContextRecall<'a> {
    pub fn new(config: &'a AssemblerConfig) -> Self {
        Self { config }
    }

    /// Recall outcomes from every context except `current`.
    pub async fn recall<S>(
        &self,
        store: &S,
        learner: &LearnerId,
        current: ContextId,
    ) -> RecallBundle
    where
        S: LearningStore + ?Sized,
    {
        let outcomes = match store.outcomes_excluding(learner, current).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(learner = %learner, error = %e, "failed to read outcome records");
                return RecallBundle::default();
            }
        };

        let mut seen = HashSet::new();
        let mut insights = Vec::new();

        for outcome in outcomes {
            if outcome.context_id == current || !seen.insert(outcome.context_id) {
                continue;
            }

            match store.context(outcome.context_id).await {
                Ok(Some(context)) => insights.push(to_insight(outcome, context.title)),
                Ok(None) => {
                    debug!(context = %outcome.context_id, "skipping outcome for deleted context");
                }
                Err(e) => {
                    warn!(context = %outcome.context_id, error = %e, "failed to resolve context title");
                }
            }
        }

        let concepts = collect_concepts(&insights, self.config.concept_limit);
        insights.truncate(self.config.recall_limit);

        debug!(
            learner = %learner,
            insights = insights.len(),
            concepts = concepts.len(),
            "recall layer ready"
        );

        RecallBundle { insights, concepts }
    }
}

fn to_insight(outcome: OutcomeRecord, context_title: String) -> Insight {
    let or_default = |value: Option<String>, default: &str| {
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    Insight {
        context_id: outcome.context_id,
        context_title,
        what_learned: or_default(outcome.what_learned, DEFAULT_WHAT_LEARNED),
        how_learned: or_default(outcome.how_learned, DEFAULT_HOW_LEARNED),
        key_concepts: outcome.key_concepts.unwrap_or_default(),
        last_activity: outcome.created_at,
    }
}

/// Split, trim and deduplicate concepts in encounter order, keeping `limit`.
pub fn collect_concepts(insights: &[Insight], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    insights
        .iter()
        .flat_map(|insight| insight.key_concepts.split(','))
        .map(str::trim)
        .filter(|concept| !concept.is_empty())
        .filter(|concept| seen.insert(concept.to_string()))
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContextRecord;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn outcome(context: i64, day: u32, concepts: &str) -> OutcomeRecord {
        OutcomeRecord {
            context_id: ContextId(context),
            what_learned: Some(format!("lesson {context}.{day}")),
            how_learned: None,
            key_concepts: Some(concepts.to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).single(),
        }
    }

    fn add_context(store: &mut MemoryStore, id: i64) {
        store.add_context(ContextRecord {
            id: ContextId(id),
            parent_id: None,
            title: format!("Module {id}"),
            description: None,
            teaching: Default::default(),
        });
    }

    #[tokio::test]
    async fn test_dedupes_by_context_keeping_most_recent() {
        let mut store = MemoryStore::new();
        for id in 1..=3 {
            add_context(&mut store, id);
        }
        store
            .add_outcome("u", outcome(1, 1, "supply"))
            .add_outcome("u", outcome(1, 9, "demand"))
            .add_outcome("u", outcome(2, 5, "elasticity"))
            .add_outcome("u", outcome(3, 7, "current"));

        let config = AssemblerConfig::default();
        let bundle = CrossContextRecall::new(&config)
            .recall(&store, &"u".into(), ContextId(3))
            .await;

        let ids: Vec<_> = bundle.insights.iter().map(|i| i.context_id).collect();
        assert_eq!(ids, [ContextId(1), ContextId(2)]);
        assert_eq!(bundle.insights[0].what_learned, "lesson 1.9");
        assert_eq!(bundle.insights[0].how_learned, DEFAULT_HOW_LEARNED);
        assert_eq!(bundle.concepts, ["demand", "elasticity"]);
    }

    #[tokio::test]
    async fn test_skips_deleted_contexts() {
        let mut store = MemoryStore::new();
        add_context(&mut store, 1);
        store
            .add_outcome("u", outcome(1, 1, "kept"))
            .add_outcome("u", outcome(42, 2, "gone"));

        let config = AssemblerConfig::default();
        let bundle = CrossContextRecall::new(&config)
            .recall(&store, &"u".into(), ContextId(7))
            .await;

        assert_eq!(bundle.insights.len(), 1);
        assert_eq!(bundle.insights[0].context_title, "Module 1");
        assert_eq!(bundle.concepts, ["kept"]);
    }

    #[tokio::test]
    async fn test_caps_insights_at_three() {
        let mut store = MemoryStore::new();
        for id in 1..=5 {
            add_context(&mut store, id);
            store.add_outcome("u", outcome(id, id as u32, ""));
        }

        let config = AssemblerConfig::default();
        let bundle = CrossContextRecall::new(&config)
            .recall(&store, &"u".into(), ContextId(99))
            .await;

        let ids: Vec<_> = bundle.insights.iter().map(|i| i.context_id.0).collect();
        assert_eq!(ids, [5, 4, 3]);
        assert!(bundle.concepts.is_empty());
    }

    #[test]
    fn test_collect_concepts_trims_dedupes_and_caps() {
        let insight = |concepts: &str| Insight {
            context_id: ContextId(1),
            context_title: String::new(),
            what_learned: String::new(),
            how_learned: String::new(),
            key_concepts: concepts.to_string(),
            last_activity: None,
        };
        let insights = [
            insight(" a , b,, a"),
            insight("c,d"),
            insight("e, f, g"),
        ];

        assert_eq!(
            collect_concepts(&insights, 5),
            ["a", "b", "c", "d", "e"]
        );
    }
}
