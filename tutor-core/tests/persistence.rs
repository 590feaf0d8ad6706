//! Snapshot and configuration files driving a full assembly.

use tempfile::TempDir;
use tutor_core::model::Turn;
use tutor_core::testing::{
    alternating_turns, child_context, context, corpus_entry, learner_with_preferences, material,
    outcome, parent,
};
use tutor_core::{
    AssemblerConfig, AssemblyRequest, ContextAssembler, ContextId, MemoryStore, ParentId,
    SnapshotError,
};

fn classroom() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .add_learner(learner_with_preferences("u", "visual", "steady", "intermediate"))
        .add_parent(parent(1, "Economics 101"))
        .add_corpus_entry(ParentId(1), corpus_entry("Scarcity", 1))
        .add_context(child_context(2, 1, "Supply and Demand"))
        .add_context(context(3, "Opportunity Cost"))
        .add_dialogue("conv", "u", ContextId(2), &alternating_turns(24), None)
        .add_outcome("u", outcome(3, "Every choice has a cost", "trade-off", 1))
        .add_context_material(ContextId(2), material("notes.md", "Curves shift"));
    store
}

#[tokio::test]
async fn test_snapshot_reload_assembles_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("classroom.json");

    let store = classroom();
    store.save_json(&path).await.unwrap();
    let reloaded = MemoryStore::load_json(&path).await.unwrap();

    let request = AssemblyRequest::new("u", ContextId(2))
        .with_dialogue("conv")
        .with_message("Why do curves shift?");

    let before = ContextAssembler::new(store, AssemblerConfig::default())
        .assemble(&request)
        .await;
    let after = ContextAssembler::new(reloaded, AssemblerConfig::default())
        .assemble(&request)
        .await;

    assert_eq!(before.text, after.text);
    assert_eq!(before.metrics, after.metrics);
    assert!(after.text.contains("Earlier conversation (14 messages):"));
}

#[tokio::test]
async fn test_snapshot_with_wrong_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.json");
    tokio::fs::write(&path, r#"{"version": 2, "learners": []}"#)
        .await
        .unwrap();

    assert!(matches!(
        MemoryStore::load_json(&path).await,
        Err(SnapshotError::VersionMismatch {
            expected: 1,
            found: 2
        })
    ));
}

#[tokio::test]
async fn test_config_file_changes_window_and_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("assembler.json");
    tokio::fs::write(
        &path,
        r#"{"recent_window": 4, "summarize_after": 6, "tutor_name": "Sage", "learner_label": "Learner"}"#,
    )
    .await
    .unwrap();

    let config = AssemblerConfig::load_json(&path).await.unwrap();
    let mut store = classroom();
    store.append_turn(&"conv".into(), Turn::tutor("What shifts a curve?"));

    let result = ContextAssembler::new(store, config)
        .assemble(&AssemblyRequest::new("u", ContextId(2)).with_dialogue("conv"))
        .await;

    assert!(result.text.starts_with("=== SAGE DYNAMIC MEMORY CONTEXT ==="));
    assert!(result.text.contains("Earlier conversation (21 messages):"));
    assert!(result.text.contains("Sage: What shifts a curve?"));
    assert!(result.text.contains("Learner: Learner turn 22"));
    assert_eq!(result.layers.unwrap().dialogue.recent_turns.len(), 4);
}
