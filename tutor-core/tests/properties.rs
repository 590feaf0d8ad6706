//! Property tests for the invariants of context assembly.

use futures::executor::block_on;
use proptest::prelude::*;
use tutor_core::compose::marker_positions;
use tutor_core::layers::ConversationWindower;
use tutor_core::model::Turn;
use tutor_core::testing::{
    alternating_turns, assert_contains_in_order, child_context, context, corpus_entry, learner,
    material, outcome, parent, TestHarness,
};
use tutor_core::{AssemblerConfig, AssemblyRequest, ContextId, ContextMetrics, ParentId};

fn arb_turn() -> impl Strategy<Value = Turn> {
    (any::<bool>(), "[a-zA-Z ?!']{0,40}").prop_map(|(is_learner, text)| {
        if is_learner {
            Turn::learner(text)
        } else {
            Turn::tutor(text)
        }
    })
}

proptest! {
    #[test]
    fn test_window_split_point(count in 0usize..60) {
        let config = AssemblerConfig::default();
        let turns = alternating_turns(count);
        let window = ConversationWindower::new(&config).window(turns.clone());

        let split = count.saturating_sub(10);
        prop_assert_eq!(&window.recent_turns[..], &turns[split..]);
        prop_assert_eq!(window.total_turns, count);
        prop_assert_eq!(window.older_summary.is_some(), count > 20);
        if let Some(summary) = &window.older_summary {
            let expected = format!("Earlier conversation ({split} messages):");
            prop_assert!(summary.starts_with(&expected));
        }
    }

    #[test]
    fn test_window_never_panics_on_arbitrary_turns(turns in prop::collection::vec(arb_turn(), 0..40)) {
        let config = AssemblerConfig::default();
        let window = ConversationWindower::new(&config).window(turns.clone());
        prop_assert!(window.recent_turns.len() <= 10);
        prop_assert_eq!(window.older_turns() + window.recent_turns.len(), turns.len());
    }

    #[test]
    fn test_score_is_clamped_char_ratio(text in "\\PC{0,7000}") {
        let metrics = ContextMetrics::measure(&text, 50);
        let chars = text.chars().count();
        prop_assert_eq!(metrics.total_chars, chars);
        prop_assert_eq!(metrics.optimization_score as usize, (chars / 50).min(100));
        prop_assert!(metrics.optimization_score <= 100);
    }

    #[test]
    fn test_corpus_renders_in_priority_order(priorities in prop::collection::vec(0i64..5, 1..12)) {
        let mut harness = TestHarness::new();
        let corpus = priorities
            .iter()
            .enumerate()
            .map(|(i, p)| corpus_entry(&format!("E{i}"), *p))
            .collect();
        harness
            .learner(learner("u"))
            .parent(parent(1, "Class"), corpus)
            .context(child_context(2, 1, "Module"));

        let text = block_on(harness.assemble(AssemblyRequest::new("u", ContextId(2))))
            .text
            .clone();

        let mut expected: Vec<usize> = (0..priorities.len()).collect();
        expected.sort_by_key(|&i| priorities[i]);
        let needles: Vec<String> = expected.iter().map(|i| format!("] E{i}: ")).collect();
        let needles: Vec<&str> = needles.iter().map(String::as_str).collect();
        assert_contains_in_order(&text, &needles);
    }

    #[test]
    fn test_recall_never_returns_current_context(
        records in prop::collection::vec((0i64..6, 0i64..100), 0..20),
        current in 0i64..6,
    ) {
        let mut harness = TestHarness::new();
        harness.learner(learner("u"));
        for id in 0..6 {
            harness.context(context(id, &format!("Module {id}")));
        }
        for (ctx, minute) in &records {
            harness.outcome("u", outcome(*ctx, "lesson", "a, b", *minute));
        }

        let result = block_on(harness.assemble(AssemblyRequest::new("u", ContextId(current))));
        let recall = &result.layers.as_ref().unwrap().recall;

        prop_assert!(recall.insights.iter().all(|i| i.context_id != ContextId(current)));
        prop_assert!(recall.insights.len() <= 3);
        prop_assert!(recall.concepts.len() <= 5);
        let mut ids: Vec<_> = recall.insights.iter().map(|i| i.context_id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), recall.insights.len());
    }

    #[test]
    fn test_markers_always_in_order(
        with_parent in any::<bool>(),
        with_corpus in any::<bool>(),
        turn_count in 0usize..30,
        with_material in any::<bool>(),
        with_prior in any::<bool>(),
        message in "[a-zA-Z ?]{0,20}",
    ) {
        let mut harness = TestHarness::new();
        harness.learner(learner("u"));
        if with_parent {
            let corpus = if with_corpus { vec![corpus_entry("Fact", 1)] } else { Vec::new() };
            harness.parent(parent(1, "Class"), corpus);
        }
        harness
            .context(child_context(2, 1, "Module"))
            .context(context(3, "Other"))
            .dialogue("d", "u", 2, &alternating_turns(turn_count));
        if with_material {
            harness
                .store_mut()
                .add_parent_material(ParentId(1), material("a.txt", "shared"))
                .add_context_material(ContextId(2), material("b.txt", "own"));
        }
        if with_prior {
            harness.outcome("u", outcome(3, "lesson", "x", 1));
        }

        let request = AssemblyRequest::new("u", ContextId(2))
            .with_dialogue("d")
            .with_message(message);
        let result = block_on(harness.assemble(request));

        prop_assert!(!result.fallback);
        prop_assert!(marker_positions(&result.text, "Harv").is_some());
        prop_assert_eq!(result.metrics.total_chars, result.text.chars().count());
    }
}
