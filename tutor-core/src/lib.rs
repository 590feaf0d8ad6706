//! Layered context assembly for a Socratic tutoring assistant.
//!
//! This crate provides:
//! - A read-only `LearningStore` interface over learners, contexts and dialogues
//! - Five independent memory layers (profile, teaching configuration,
//!   conversation window, cross-context recall, reference materials)
//! - Deterministic prompt composition with size metrics
//! - An in-memory store with JSON snapshot persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use tutor_core::{AssemblerConfig, AssemblyRequest, ContextAssembler, ContextId, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::load_json("fixtures.json").await?;
//!     let assembler = ContextAssembler::new(store, AssemblerConfig::default());
//!
//!     let request = AssemblyRequest::new("student-1", ContextId(7))
//!         .with_message("Why do prices rise?")
//!         .with_dialogue("conv-42");
//!
//!     let context = assembler.assemble(&request).await;
//!     println!("{}", context.text);
//!     Ok(())
//! }
//! ```

pub mod assembler;
pub mod compose;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod ids;
pub mod layers;
pub mod model;
pub mod store;
pub mod testing;
pub mod text;

// Primary public API
pub use assembler::{AssembledContext, AssemblyRequest, ContextAssembler};
pub use compose::{ComposedPrompt, ContextMetrics, PromptComposer, SectionMarker};
pub use config::AssemblerConfig;
pub use error::{ConfigError, StoreError};
pub use ids::{ContextId, DialogueId, LearnerId, ParentId};
pub use layers::{DataAvailability, Layers};
pub use store::{LearningStore, MemoryStore, SnapshotError, StoreSnapshot};
pub use testing::TestHarness;
