//! Extractive summary of turns that fell out of the verbatim window.
//!
//! Keyword and punctuation matching only; no model calls.

use crate::config::AssemblerConfig;
use crate::heuristics::{is_breakthrough, is_key_exploration, is_question};
use crate::model::{Role, Turn};
use crate::text::truncate_chars;
use serde::{Deserialize, Serialize};

/// What the extractive pass found in the older turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OlderTurnSummary {
    /// Number of turns summarized.
    pub older_turns: usize,
    /// Learner turns that read like a breakthrough.
    pub breakthroughs: usize,
    /// Learner questions, truncated, in dialogue order.
    pub questions: Vec<String>,
    /// Tutor guiding questions, truncated, in dialogue order.
    pub explorations: Vec<String>,
}

impl OlderTurnSummary {
    /// The first learner question, if any.
    pub fn early_question(&self) -> Option<&str> {
        self.questions.first().map(String::as_str)
    }

    /// Render as the indented block placed in the prompt, listing at most
    /// `max_explorations` guiding questions.
    pub fn render(&self, max_explorations: usize) -> String {
        let mut lines = vec![format!(
            "Earlier conversation ({} messages):",
            self.older_turns
        )];

        if self.breakthroughs > 0 {
            lines.push(format!("  Breakthrough moments: {}", self.breakthroughs));
        }

        if let Some(first) = self.early_question() {
            lines.push(format!(
                "  Student explored {} questions",
                self.questions.len()
            ));
            lines.push(format!("  Early question: \"{first}\""));
        }

        if !self.explorations.is_empty() {
            lines.push("  Key explorations:".to_string());
            for exploration in self.explorations.iter().take(max_explorations) {
                lines.push(format!("    - Explored: {exploration}..."));
            }
        }

        lines.join("\n")
    }
}

/// Scan older turns for questions, breakthroughs and guiding questions.
pub fn summarize_older_turns(turns: &[Turn], config: &AssemblerConfig) -> OlderTurnSummary {
    let mut summary = OlderTurnSummary {
        older_turns: turns.len(),
        ..Default::default()
    };

    for turn in turns {
        match turn.role {
            Role::Learner => {
                if is_question(&turn.text) {
                    summary
                        .questions
                        .push(truncate_chars(&turn.text, config.question_chars).to_string());
                }
                if is_breakthrough(&turn.text) {
                    summary.breakthroughs += 1;
                }
            }
            Role::Tutor => {
                if is_key_exploration(&turn.text) {
                    summary
                        .explorations
                        .push(truncate_chars(&turn.text, config.exploration_chars).to_string());
                }
            }
        }
    }

    summary
}
