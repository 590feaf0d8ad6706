//! Assembler configuration.
//!
//! All window sizes, caps and labels live here and are handed to the
//! [`ContextAssembler`](crate::assembler::ContextAssembler) once at startup.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Tunables for context assembly.
///
/// Missing fields in a config file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Turns kept verbatim at the tail of a dialogue.
    pub recent_window: usize,

    /// Older turns are summarized only once a dialogue exceeds this many turns.
    pub summarize_after: usize,

    /// Recent activity records reported on the learner profile.
    pub activity_limit: usize,

    /// Distinct prior contexts kept by cross-context recall.
    pub recall_limit: usize,

    /// Prior-context insights rendered into the prompt.
    pub insights_shown: usize,

    /// Unique key concepts kept across prior contexts.
    pub concept_limit: usize,

    /// Characters of each reference material kept in its preview.
    pub preview_chars: usize,

    /// Turns shown in the trailing dialogue excerpt.
    pub excerpt_turns: usize,

    /// Characters per turn in the trailing excerpt.
    pub excerpt_chars: usize,

    /// Characters kept from a learner question in the older-turn summary.
    pub question_chars: usize,

    /// Characters kept from a tutor exploration in the older-turn summary.
    pub exploration_chars: usize,

    /// Key explorations listed in the older-turn summary.
    pub max_explorations: usize,

    /// Trailing learner turns inspected for engagement.
    pub engagement_window: usize,

    /// Characters per optimization-score point.
    pub score_divisor: usize,

    /// Name of the tutor, used in headers and dialogue excerpts.
    pub tutor_name: String,

    /// Label used for learner turns in dialogue excerpts.
    pub learner_label: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            recent_window: 10,
            summarize_after: 20,
            activity_limit: 5,
            recall_limit: 3,
            insights_shown: 2,
            concept_limit: 5,
            preview_chars: 2000,
            excerpt_turns: 3,
            excerpt_chars: 50,
            question_chars: 100,
            exploration_chars: 80,
            max_explorations: 3,
            engagement_window: 3,
            score_divisor: 50,
            tutor_name: "Harv".to_string(),
            learner_label: "Student".to_string(),
        }
    }
}

impl AssemblerConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verbatim window size.
    pub fn with_recent_window(mut self, turns: usize) -> Self {
        self.recent_window = turns;
        self
    }

    /// Set the summarization threshold.
    pub fn with_summarize_after(mut self, turns: usize) -> Self {
        self.summarize_after = turns;
        self
    }

    /// Set the reference material preview length.
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Set the tutor name.
    pub fn with_tutor_name(mut self, name: impl Into<String>) -> Self {
        self.tutor_name = name.into();
        self
    }

    /// Set the learner label used in excerpts.
    pub fn with_learner_label(mut self, label: impl Into<String>) -> Self {
        self.learner_label = label.into();
        self
    }

    /// Check the invariants the windower and composer rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_window == 0 {
            return Err(ConfigError::Invalid {
                field: "recent_window",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.summarize_after < self.recent_window {
            return Err(ConfigError::Invalid {
                field: "summarize_after",
                reason: format!(
                    "{} is smaller than recent_window ({})",
                    self.summarize_after, self.recent_window
                ),
            });
        }
        if self.score_divisor == 0 {
            return Err(ConfigError::Invalid {
                field: "score_divisor",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.preview_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "preview_chars",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Load and validate a config from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config as pretty JSON.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AssemblerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recent_window, 10);
        assert_eq!(config.summarize_after, 20);
        assert_eq!(config.preview_chars, 2000);
    }

    #[test]
    fn test_builder() {
        let config = AssemblerConfig::new()
            .with_recent_window(4)
            .with_summarize_after(8)
            .with_tutor_name("Ada");

        assert_eq!(config.recent_window, 4);
        assert_eq!(config.summarize_after, 8);
        assert_eq!(config.tutor_name, "Ada");
    }

    #[test]
    fn test_validate_rejects_threshold_below_window() {
        let config = AssemblerConfig::new()
            .with_recent_window(10)
            .with_summarize_after(5);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "summarize_after",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(AssemblerConfig::new().with_recent_window(0).validate().is_err());
        assert!(AssemblerConfig::new().with_preview_chars(0).validate().is_err());

        let config = AssemblerConfig {
            score_divisor: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AssemblerConfig =
            serde_json::from_str(r#"{"recent_window": 6, "tutor_name": "Sage"}"#).unwrap();
        assert_eq!(config.recent_window, 6);
        assert_eq!(config.tutor_name, "Sage");
        assert_eq!(config.summarize_after, 20);
    }

    #[tokio::test]
    async fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assembler.json");

        let config = AssemblerConfig::new().with_preview_chars(500);
        config.save_json(&path).await.unwrap();

        let loaded = AssemblerConfig::load_json(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_json_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, r#"{"recent_window": 0}"#)
            .await
            .unwrap();

        assert!(matches!(
            AssemblerConfig::load_json(&path).await,
            Err(ConfigError::Invalid { .. })
        ));
    }
}
