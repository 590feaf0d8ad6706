//! Learner profile layer.

use crate::config::AssemblerConfig;
use crate::model::{ActivityRecord, LearnerRecord};
use crate::store::LearningStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_STYLE: &str = "adaptive";
const DEFAULT_PACE: &str = "moderate";
const DEFAULT_BACKGROUND: &str = "beginner";

/// The learning-style triple, with neutral defaults for anything unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningProfile {
    pub style: String,
    pub pace: String,
    pub background: String,
}

impl Default for LearningProfile {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            pace: DEFAULT_PACE.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

/// Output of the profile layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub learning_profile: LearningProfile,
    /// Most recently active dialogues across all contexts.
    pub recent_activity: Vec<ActivityRecord>,
    /// Whether the learner has stored preferences at all.
    pub has_preferences: bool,
}

/// Reads a learner's preferences and recent activity.
pub struct ProfileReader<'a> {
    config: &'a AssemblerConfig,
}

impl<'a> ProfileReader<'a> {
    pub fn new(config: &'a AssemblerConfig) -> Self {
        Self { config }
    }

    /// Build the profile layer for a learner already looked up by the caller.
    ///
    /// Never fails: a store error on the activity query yields an empty list.
    pub async fn read<S>(&self, store: &S, learner: &LearnerRecord) -> Profile
    where
        S: LearningStore + ?Sized,
    {
        let learning_profile = resolve_preferences(learner);

        let recent_activity = match store
            .recent_activity(&learner.id, self.config.activity_limit)
            .await
        {
            Ok(mut activity) => {
                activity.truncate(self.config.activity_limit);
                activity
            }
            Err(e) => {
                warn!(learner = %learner.id, error = %e, "failed to read recent activity");
                Vec::new()
            }
        };

        debug!(
            learner = %learner.id,
            activity = recent_activity.len(),
            "profile layer ready"
        );

        Profile {
            learning_profile,
            recent_activity,
            has_preferences: learner.preferences.is_some(),
        }
    }
}

/// Fill the learning-style triple from stored preferences, field by field.
pub fn resolve_preferences(learner: &LearnerRecord) -> LearningProfile {
    let defaults = LearningProfile::default();
    let Some(prefs) = &learner.preferences else {
        return defaults;
    };

    let pick = |value: &Option<String>, fallback: String| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or(fallback)
    };

    LearningProfile {
        style: pick(&prefs.style, defaults.style),
        pace: pick(&prefs.pace, defaults.pace),
        background: pick(&prefs.background, defaults.background),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ContextId;
    use crate::model::{LearningPreferences, Turn};
    use crate::store::MemoryStore;

    fn learner(preferences: Option<LearningPreferences>) -> LearnerRecord {
        LearnerRecord {
            id: "u1".into(),
            name: None,
            preferences,
        }
    }

    #[test]
    fn test_defaults_without_preferences() {
        let profile = resolve_preferences(&learner(None));
        assert_eq!(profile.style, "adaptive");
        assert_eq!(profile.pace, "moderate");
        assert_eq!(profile.background, "beginner");
    }

    #[test]
    fn test_partial_preferences_fill_gaps() {
        let profile = resolve_preferences(&learner(Some(LearningPreferences {
            style: Some("visual".to_string()),
            pace: Some("  ".to_string()),
            background: None,
        })));
        assert_eq!(profile.style, "visual");
        assert_eq!(profile.pace, "moderate");
        assert_eq!(profile.background, "beginner");
    }

    #[tokio::test]
    async fn test_read_caps_activity() {
        let mut store = MemoryStore::new();
        for i in 0..8 {
            store.add_dialogue(
                format!("d{i}"),
                "u1",
                ContextId(i),
                &[Turn::learner("hi")],
                None,
            );
        }

        let config = AssemblerConfig::default();
        let profile = ProfileReader::new(&config)
            .read(&store, &learner(None))
            .await;

        assert_eq!(profile.recent_activity.len(), 5);
        assert!(!profile.has_preferences);
    }

    #[tokio::test]
    async fn test_new_learner_has_empty_activity() {
        let store = MemoryStore::new();
        let config = AssemblerConfig::default();
        let profile = ProfileReader::new(&config)
            .read(&store, &learner(None))
            .await;

        assert_eq!(profile.learning_profile, LearningProfile::default());
        assert!(profile.recent_activity.is_empty());
    }
}
