//! Conversation layer: a bounded window over the active dialogue.
//!
//! The last `recent_window` turns are kept verbatim. Everything before them
//! is summarized, but only once the dialogue is longer than
//! `summarize_after` turns. Between the two thresholds the older turns are
//! neither shown nor summarized, which keeps the split point from thrashing.

use super::summary::summarize_older_turns;
use crate::config::AssemblerConfig;
use crate::heuristics::{classify_engagement, understanding_indicators, Engagement};
use crate::ids::{ContextId, DialogueId, LearnerId};
use crate::model::Turn;
use crate::store::LearningStore;
use crate::text::truncate_chars;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Dialogue context reported before the first turn.
pub const NEW_DIALOGUE_CONTEXT: &str = "Ready to begin Socratic exploration.";

/// Lifecycle of a dialogue as seen by the assembler.
///
/// A dialogue becomes active with its first turn; it is never closed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueState {
    #[serde(rename = "new_conversation")]
    New,
    #[serde(rename = "active_conversation")]
    Active,
}

impl DialogueState {
    /// Label rendered into the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            DialogueState::New => "new_conversation",
            DialogueState::Active => "active_conversation",
        }
    }
}

/// Engagement read off the learner's latest turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    pub engagement: Engagement,
    pub understanding_indicators: Vec<String>,
}

/// Output of the conversation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueWindow {
    pub state: DialogueState,
    /// Turns in the whole dialogue.
    pub total_turns: usize,
    /// The verbatim tail of the dialogue.
    pub recent_turns: Vec<Turn>,
    /// Extractive summary of the turns before the tail, for long dialogues.
    pub older_summary: Option<String>,
    /// Short human-readable excerpt of the last few turns.
    pub dialogue_context: String,
    /// `None` for a new dialogue.
    pub analysis: Option<ConversationAnalysis>,
}

impl DialogueWindow {
    /// The window of a dialogue that has not started.
    pub fn new_dialogue() -> Self {
        Self {
            state: DialogueState::New,
            total_turns: 0,
            recent_turns: Vec::new(),
            older_summary: None,
            dialogue_context: NEW_DIALOGUE_CONTEXT.to_string(),
            analysis: None,
        }
    }

    /// Number of turns before the verbatim tail.
    pub fn older_turns(&self) -> usize {
        self.total_turns - self.recent_turns.len()
    }
}

/// Builds the bounded view of a dialogue.
pub struct ConversationWindower<'a> {
    config: &'a AssemblerConfig,
}

impl<'a> ConversationWindower<'a> {
    pub fn new(config: &'a AssemblerConfig) -> Self {
        Self { config }
    }

    /// Fetch the dialogue and window it.
    ///
    /// A missing id, unknown dialogue, empty or unreadable turn log, or a
    /// store error all yield a new-dialogue window.
    pub async fn read<S>(
        &self,
        store: &S,
        learner: &LearnerId,
        context: ContextId,
        dialogue: Option<&DialogueId>,
    ) -> DialogueWindow
    where
        S: LearningStore + ?Sized,
    {
        let Some(dialogue) = dialogue else {
            return DialogueWindow::new_dialogue();
        };

        let turns = match store.dialogue_turns(learner, context, dialogue).await {
            Ok(Some(turns)) => turns,
            Ok(None) => {
                debug!(dialogue = %dialogue, "dialogue not found for learner and context");
                Vec::new()
            }
            Err(e) => {
                warn!(dialogue = %dialogue, error = %e, "failed to read dialogue");
                Vec::new()
            }
        };

        let window = self.window(turns);
        debug!(
            dialogue = %dialogue,
            total = window.total_turns,
            summarized = window.older_summary.is_some(),
            "conversation layer ready"
        );
        window
    }

    /// Window an ordered turn list.
    pub fn window(&self, mut turns: Vec<Turn>) -> DialogueWindow {
        if turns.is_empty() {
            return DialogueWindow::new_dialogue();
        }

        let total_turns = turns.len();
        let split = total_turns.saturating_sub(self.config.recent_window);

        let older_summary = (total_turns > self.config.summarize_after).then(|| {
            summarize_older_turns(&turns[..split], self.config)
                .render(self.config.max_explorations)
        });
        let dialogue_context = self.excerpt(&turns);
        let analysis = self.analyze(&turns);

        let recent_turns = turns.split_off(split);

        DialogueWindow {
            state: DialogueState::Active,
            total_turns,
            recent_turns,
            older_summary,
            dialogue_context,
            analysis: Some(analysis),
        }
    }

    /// `Role: first chars` for each of the last few turns, joined by ` | `.
    fn excerpt(&self, turns: &[Turn]) -> String {
        let start = turns.len().saturating_sub(self.config.excerpt_turns);
        turns[start..]
            .iter()
            .map(|turn| {
                let label = if turn.role.is_learner() {
                    &self.config.learner_label
                } else {
                    &self.config.tutor_name
                };
                format!(
                    "{label}: {}",
                    truncate_chars(&turn.text, self.config.excerpt_chars)
                )
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn analyze(&self, turns: &[Turn]) -> ConversationAnalysis {
        let learner_turns: Vec<&str> = turns
            .iter()
            .filter(|t| t.role.is_learner())
            .map(|t| t.text.as_str())
            .collect();

        if learner_turns.is_empty() {
            return ConversationAnalysis {
                engagement: Engagement::Starting,
                understanding_indicators: Vec::new(),
            };
        }

        let start = learner_turns
            .len()
            .saturating_sub(self.config.engagement_window);
        let recent_text = learner_turns[start..].join(" ");

        ConversationAnalysis {
            engagement: classify_engagement(&recent_text),
            understanding_indicators: understanding_indicators(&recent_text),
        }
    }
}
