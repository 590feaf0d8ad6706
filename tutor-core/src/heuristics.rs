//! Keyword heuristics over learner and tutor text.
//!
//! Each classifier is a pure `text -> label` function so it can be replaced
//! by a better one without touching assembly order. Matching is
//! case-insensitive substring search; "oh" also matches inside "John".

use crate::text::contains_any;
use serde::{Deserialize, Serialize};

/// Learner phrases that signal a moment of understanding.
pub const BREAKTHROUGH_KEYWORDS: &[&str] = &["understand", "i see", "makes sense", "oh", "aha"];

/// Interrogatives that mark a tutor question as a guided exploration.
pub const EXPLORATION_KEYWORDS: &[&str] = &["why", "how", "what", "when"];

const HIGH_ENGAGEMENT_KEYWORDS: &[&str] = &["interesting", "tell me more"];
const SUPPORT_KEYWORDS: &[&str] = &["confused", "don't understand"];
const CONFUSION_KEYWORDS: &[&str] = &["confused", "unclear", "don't understand"];

/// Base of every strategy label.
pub const BASE_STRATEGY: &str = "Use strategic questions to guide discovery";

/// Whether a learner turn asks a question.
pub fn is_question(text: &str) -> bool {
    text.contains('?')
}

/// Whether a learner turn reads like a breakthrough.
pub fn is_breakthrough(text: &str) -> bool {
    contains_any(&text.to_lowercase(), BREAKTHROUGH_KEYWORDS)
}

/// Whether a tutor turn is a guiding question worth remembering.
pub fn is_key_exploration(text: &str) -> bool {
    is_question(text) && contains_any(&text.to_lowercase(), EXPLORATION_KEYWORDS)
}

/// Coarse engagement level over a learner's most recent turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    /// The learner has not said anything yet.
    Starting,
    HighlyEngaged,
    NeedsSupport,
    BuildingUnderstanding,
}

impl Engagement {
    /// Stable label for this level.
    pub fn label(&self) -> &'static str {
        match self {
            Engagement::Starting => "starting",
            Engagement::HighlyEngaged => "highly_engaged",
            Engagement::NeedsSupport => "needs_support",
            Engagement::BuildingUnderstanding => "building_understanding",
        }
    }
}

/// Classify engagement from the concatenated text of recent learner turns.
///
/// High engagement wins over a request for support when both appear.
pub fn classify_engagement(recent_learner_text: &str) -> Engagement {
    let lower = recent_learner_text.to_lowercase();
    if contains_any(&lower, HIGH_ENGAGEMENT_KEYWORDS) {
        Engagement::HighlyEngaged
    } else if contains_any(&lower, SUPPORT_KEYWORDS) {
        Engagement::NeedsSupport
    } else {
        Engagement::BuildingUnderstanding
    }
}

/// Signals of understanding in recent learner text.
pub fn understanding_indicators(recent_learner_text: &str) -> Vec<String> {
    if recent_learner_text.to_lowercase().contains("understand") {
        vec!["making connections".to_string()]
    } else {
        Vec::new()
    }
}

/// How the tutor should answer the current message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStrategy {
    ExploreReasoning,
    BreakDownProcess,
    ClarifyQuestion,
    SimplifyWithExamples,
    LearnerExamples,
    DeepenExploration,
}

impl ResponseStrategy {
    /// The instruction rendered into the prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            ResponseStrategy::ExploreReasoning => {
                "Explore underlying reasoning with follow-up questions"
            }
            ResponseStrategy::BreakDownProcess => "Break down process step-by-step through inquiry",
            ResponseStrategy::ClarifyQuestion => "Respond to question with clarifying questions",
            ResponseStrategy::SimplifyWithExamples => "Use simpler questions and concrete examples",
            ResponseStrategy::LearnerExamples => "Ask student to generate their own examples first",
            ResponseStrategy::DeepenExploration => "Use Socratic questioning to deepen exploration",
        }
    }
}

/// Pick a response strategy for the learner's current message.
pub fn response_strategy(message: &str) -> ResponseStrategy {
    let lower = message.to_lowercase();

    if is_question(message) {
        if lower.contains("why") {
            ResponseStrategy::ExploreReasoning
        } else if lower.contains("how") {
            ResponseStrategy::BreakDownProcess
        } else {
            ResponseStrategy::ClarifyQuestion
        }
    } else if contains_any(&lower, CONFUSION_KEYWORDS) {
        ResponseStrategy::SimplifyWithExamples
    } else if lower.contains("example") {
        ResponseStrategy::LearnerExamples
    } else {
        ResponseStrategy::DeepenExploration
    }
}

/// Derive the teaching-strategy label from a context's strategy notes.
pub fn strategy_label(strategy_notes: &str) -> String {
    let lower = strategy_notes.to_lowercase();
    let mut parts = vec![BASE_STRATEGY];

    if lower.contains("example") {
        parts.push("encourage concrete examples");
    }
    if lower.contains("theory") {
        parts.push("build theoretical understanding step-by-step");
    }

    parts.join(" | ")
}
