//! The five memory layers gathered for every assembly.

pub mod dialogue;
pub mod materials;
pub mod profile;
pub mod recall;
pub mod summary;
pub mod teaching;

pub use dialogue::{ConversationAnalysis, ConversationWindower, DialogueState, DialogueWindow};
pub use materials::{MaterialBundle, MaterialInjector, MaterialPreview};
pub use profile::{LearningProfile, Profile, ProfileReader};
pub use recall::{CrossContextRecall, Insight, RecallBundle};
pub use summary::{summarize_older_turns, OlderTurnSummary};
pub use teaching::{ConfigBundle, ConfigurationResolver, ContextInfo, ParentContext};

use serde::{Deserialize, Serialize};

/// Everything the layer readers produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layers {
    pub profile: Profile,
    pub teaching: ConfigBundle,
    pub dialogue: DialogueWindow,
    pub recall: RecallBundle,
    pub materials: MaterialBundle,
}

impl Layers {
    /// Which layers carried real data.
    pub fn availability(&self) -> DataAvailability {
        DataAvailability {
            profile: self.profile.has_preferences,
            teaching_config: self.teaching.teaching.is_configured(),
            dialogue: self.dialogue.state == DialogueState::Active,
            cross_context: !self.recall.insights.is_empty(),
            materials: !self.materials.is_empty(),
        }
    }
}

/// Per-layer flags reported alongside an assembled context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAvailability {
    pub profile: bool,
    pub teaching_config: bool,
    pub dialogue: bool,
    pub cross_context: bool,
    pub materials: bool,
}
