//! Prompt composition.
//!
//! Serializes the five gathered layers into one labeled text block. Sections
//! always appear in the same order; optional sections are omitted rather than
//! rendered empty, but the six [`SectionMarker`]s are always present.

use crate::config::AssemblerConfig;
use crate::heuristics::response_strategy;
use crate::ids::{ContextId, LearnerId};
use crate::layers::{Layers, MaterialPreview};
use crate::text::char_len;
use serde::{Deserialize, Serialize};

/// The fixed section markers of a composed prompt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMarker {
    Header,
    StudentProfile,
    ModuleContext,
    ConversationState,
    SocraticApproach,
    Closing,
}

impl SectionMarker {
    /// Every marker, in the order it appears.
    pub const ALL: [SectionMarker; 6] = [
        SectionMarker::Header,
        SectionMarker::StudentProfile,
        SectionMarker::ModuleContext,
        SectionMarker::ConversationState,
        SectionMarker::SocraticApproach,
        SectionMarker::Closing,
    ];

    /// The text that starts this section, given the tutor name.
    pub fn text(&self, tutor_name: &str) -> String {
        match self {
            SectionMarker::Header => header(tutor_name),
            SectionMarker::StudentProfile => "STUDENT PROFILE:".to_string(),
            SectionMarker::ModuleContext => "MODULE CONTEXT:".to_string(),
            SectionMarker::ConversationState => "CONVERSATION STATE:".to_string(),
            SectionMarker::SocraticApproach => "SOCRATIC APPROACH:".to_string(),
            SectionMarker::Closing => CLOSING_LINE.to_string(),
        }
    }
}

const CLOSING_LINE: &str =
    "Remember: Use Socratic questioning to guide discovery. Never give direct answers.";

fn header(tutor_name: &str) -> String {
    format!("=== {} DYNAMIC MEMORY CONTEXT ===", tutor_name.to_uppercase())
}

/// Size metrics for a composed prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMetrics {
    /// Characters in the prompt text.
    pub total_chars: usize,
    /// `min(100, total_chars / score_divisor)`.
    pub optimization_score: u32,
}

impl ContextMetrics {
    /// Measure `text`.
    pub fn measure(text: &str, score_divisor: usize) -> Self {
        let total_chars = char_len(text);
        let score = (total_chars / score_divisor.max(1)).min(100);
        Self {
            total_chars,
            optimization_score: score as u32,
        }
    }
}

/// A composed prompt with its metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPrompt {
    pub text: String,
    pub metrics: ContextMetrics,
}

/// Renders gathered layers into prompt text.
pub struct PromptComposer<'a> {
    config: &'a AssemblerConfig,
}

impl<'a> PromptComposer<'a> {
    pub fn new(config: &'a AssemblerConfig) -> Self {
        Self { config }
    }

    /// Compose the full prompt. An empty `current_message` is treated as absent.
    pub fn compose(&self, layers: &Layers, current_message: &str) -> ComposedPrompt {
        let mut lines = vec![header(&self.config.tutor_name)];

        // Profile
        let profile = &layers.profile.learning_profile;
        lines.push(format!(
            "STUDENT PROFILE: {} learner, {} pace, {} background",
            profile.style, profile.pace, profile.background
        ));
        if !layers.profile.recent_activity.is_empty() {
            lines.push(format!(
                "PRIOR EXPERIENCE: {} previous module interactions",
                layers.profile.recent_activity.len()
            ));
        }

        // Inherited parent configuration
        let teaching = &layers.teaching;
        if let Some(parent) = teaching.parent.as_ref().filter(|p| !p.title.is_empty()) {
            lines.push(format!("\nCLASS: {}", parent.title));
            if !parent.teaching_philosophy.is_empty() {
                lines.push(format!(
                    "CLASS TEACHING PHILOSOPHY: {}",
                    parent.teaching_philosophy
                ));
            }
            if !parent.learning_objectives.is_empty() {
                lines.push(format!(
                    "CLASS LEARNING OBJECTIVES: {}",
                    parent.learning_objectives
                ));
            }
        }

        if !teaching.corpus.is_empty() {
            lines.push("\nCLASS-WIDE KNOWLEDGE (applies to all modules):".to_string());
            for entry in &teaching.corpus {
                lines.push(format!(
                    "  [{}] {}: {}",
                    entry.category.to_uppercase(),
                    entry.title,
                    entry.content
                ));
            }
        }

        // The context itself
        let context = &teaching.context;
        if context.description.is_empty() {
            lines.push(format!("\nMODULE CONTEXT: {}", context.title));
        } else {
            lines.push(format!(
                "\nMODULE CONTEXT: {} - {}",
                context.title, context.description
            ));
        }
        if !teaching.teaching.system_prompt.is_empty() {
            lines.push(format!(
                "MODULE TEACHING APPROACH: {}",
                teaching.teaching.system_prompt
            ));
        }
        if !teaching.teaching.module_prompt.is_empty() {
            lines.push(format!("MODULE STRATEGY: {}", teaching.teaching.module_prompt));
        }

        push_materials(
            &mut lines,
            "CLASS MATERIALS (applies to all modules):",
            &layers.materials.parent,
        );
        push_materials(&mut lines, "MODULE-SPECIFIC MATERIALS:", &layers.materials.context);

        // Dialogue
        let dialogue = &layers.dialogue;
        lines.push(format!("\nCONVERSATION STATE: {}", dialogue.state.label()));
        lines.push(format!("DIALOGUE CONTEXT: {}", dialogue.dialogue_context));
        if let Some(summary) = &dialogue.older_summary {
            lines.push(format!("\n{summary}"));
        }

        // Prior contexts
        let recall = &layers.recall;
        if !recall.insights.is_empty() {
            lines.push("\nPRIOR LEARNING FROM OTHER MODULES:".to_string());
            for insight in recall.insights.iter().take(self.config.insights_shown) {
                lines.push(format!("  From '{}':", insight.context_title));
                lines.push(format!("    What learned: {}", insight.what_learned));
                if !insight.key_concepts.is_empty() {
                    lines.push(format!("    Key concepts: {}", insight.key_concepts));
                }
            }
        }
        if !recall.concepts.is_empty() {
            lines.push(format!(
                "\nMASTERED CONCEPTS (across all modules): {}",
                recall.concepts.join(", ")
            ));
        }

        lines.push(format!("\nSOCRATIC APPROACH: {}", teaching.strategy));

        if !current_message.is_empty() {
            lines.push(format!("\nSTUDENT MESSAGE: {current_message}"));
            lines.push(format!(
                "RESPONSE STRATEGY: {}",
                response_strategy(current_message).instruction()
            ));
        }

        lines.push(format!("\n{CLOSING_LINE}"));

        self.finish(lines.join("\n"))
    }

    /// The minimal prompt used when the learner or context is unknown.
    ///
    /// Metrics are zeroed so callers can tell nothing was measured.
    pub fn fallback(&self, learner: &LearnerId, context: ContextId) -> ComposedPrompt {
        let text = format!(
            "=== {} FALLBACK CONTEXT ===\nUser: {learner}, Module: {context}\nUse Socratic questioning to guide learning.",
            self.config.tutor_name.to_uppercase()
        );
        ComposedPrompt {
            text,
            metrics: ContextMetrics::default(),
        }
    }

    fn finish(&self, text: String) -> ComposedPrompt {
        let metrics = ContextMetrics::measure(&text, self.config.score_divisor);
        ComposedPrompt { text, metrics }
    }
}

fn push_materials(lines: &mut Vec<String>, heading: &str, materials: &[MaterialPreview]) {
    if materials.is_empty() {
        return;
    }
    lines.push(format!("\n{heading}"));
    for material in materials {
        lines.push(format!("  [{}]", material.filename));
        lines.push(format!("    {}", material.preview));
    }
}

/// Byte offsets of each marker in `text`, searched in order.
///
/// Returns `None` if any marker is missing or out of order.
pub fn marker_positions(text: &str, tutor_name: &str) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(SectionMarker::ALL.len());
    let mut from = 0;
    for marker in SectionMarker::ALL {
        let needle = marker.text(tutor_name);
        let found = from + text[from..].find(&needle)?;
        positions.push(found);
        from = found + needle.len();
    }
    Some(positions)
}
