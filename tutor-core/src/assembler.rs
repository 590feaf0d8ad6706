//! The assembly entry point.
//!
//! [`ContextAssembler::assemble`] looks up the learner and context, gathers
//! the five layers concurrently, and composes them once all five are in.
//! It never fails: an unknown learner or context yields the fallback prompt.

use crate::compose::{ContextMetrics, PromptComposer};
use crate::config::AssemblerConfig;
use crate::error::ConfigError;
use crate::ids::{ContextId, DialogueId, LearnerId};
use crate::layers::{
    ConfigurationResolver, ConversationWindower, CrossContextRecall, DataAvailability, Layers,
    MaterialInjector, ProfileReader,
};
use crate::model::{ContextRecord, LearnerRecord};
use crate::store::LearningStore;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// One call's inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyRequest {
    pub learner_id: LearnerId,
    pub context_id: ContextId,
    /// The learner's message being answered; empty if none.
    #[serde(default)]
    pub current_message: String,
    #[serde(default)]
    pub dialogue_id: Option<DialogueId>,
}

impl AssemblyRequest {
    /// A request with no message and no dialogue.
    pub fn new(learner_id: impl Into<LearnerId>, context_id: impl Into<ContextId>) -> Self {
        Self {
            learner_id: learner_id.into(),
            context_id: context_id.into(),
            current_message: String::new(),
            dialogue_id: None,
        }
    }

    /// Set the message being answered.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.current_message = message.into();
        self
    }

    /// Set the dialogue to window.
    pub fn with_dialogue(mut self, dialogue_id: impl Into<DialogueId>) -> Self {
        self.dialogue_id = Some(dialogue_id.into());
        self
    }
}

/// The result of an assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledContext {
    /// The composed prompt text.
    pub text: String,
    pub metrics: ContextMetrics,
    /// Raw layer outputs, for introspection. `None` on the fallback path.
    pub layers: Option<Layers>,
    /// Echo of the requested dialogue id.
    pub dialogue_id: Option<DialogueId>,
    pub data_availability: DataAvailability,
    /// Whether the learner or context was missing and the fallback was used.
    pub fallback: bool,
}

/// Assembles tutoring context from a [`LearningStore`].
pub struct ContextAssembler<S> {
    store: S,
    config: AssemblerConfig,
}

impl<S: LearningStore> ContextAssembler<S> {
    /// Create an assembler over `store`.
    ///
    /// `config` is used as given. A config built with the `with_*` setters
    /// should go through [`ContextAssembler::try_new`] instead.
    pub fn new(store: S, config: AssemblerConfig) -> Self {
        Self { store, config }
    }

    /// Create an assembler after checking `config`.
    pub fn try_new(store: S, config: AssemblerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(store, config))
    }

    /// Borrow the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Assemble the context for one dialogue turn.
    #[instrument(
        skip(self, request),
        fields(learner = %request.learner_id, context = %request.context_id)
    )]
    pub async fn assemble(&self, request: &AssemblyRequest) -> AssembledContext {
        let Some((learner, context)) = self.lookup(request).await else {
            return self.fallback(request);
        };

        let profile_reader = ProfileReader::new(&self.config);
        let resolver = ConfigurationResolver::new();
        let windower = ConversationWindower::new(&self.config);
        let recaller = CrossContextRecall::new(&self.config);
        let injector = MaterialInjector::new(&self.config);

        let (profile, teaching, dialogue, recall, materials) = futures::join!(
            profile_reader.read(&self.store, &learner),
            resolver.resolve(&self.store, &context),
            windower.read(
                &self.store,
                &request.learner_id,
                request.context_id,
                request.dialogue_id.as_ref(),
            ),
            recaller.recall(&self.store, &request.learner_id, request.context_id),
            injector.inject(&self.store, &context),
        );

        let layers = Layers {
            profile,
            teaching,
            dialogue,
            recall,
            materials,
        };
        let prompt = PromptComposer::new(&self.config).compose(&layers, &request.current_message);

        info!(
            total_chars = prompt.metrics.total_chars,
            score = prompt.metrics.optimization_score,
            "assembled context"
        );

        AssembledContext {
            text: prompt.text,
            metrics: prompt.metrics,
            data_availability: layers.availability(),
            layers: Some(layers),
            dialogue_id: request.dialogue_id.clone(),
            fallback: false,
        }
    }

    /// Look up the learner and context, or `None` if either is unavailable.
    async fn lookup(&self, request: &AssemblyRequest) -> Option<(LearnerRecord, ContextRecord)> {
        let (learner, context) = futures::join!(
            self.store.learner(&request.learner_id),
            self.store.context(request.context_id),
        );

        let learner = match learner {
            Ok(Some(learner)) => Some(learner),
            Ok(None) => {
                warn!("learner not found");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to read learner");
                None
            }
        };
        let context = match context {
            Ok(Some(context)) => Some(context),
            Ok(None) => {
                warn!("context not found");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to read context");
                None
            }
        };

        learner.zip(context)
    }

    fn fallback(&self, request: &AssemblyRequest) -> AssembledContext {
        let prompt =
            PromptComposer::new(&self.config).fallback(&request.learner_id, request.context_id);
        info!("assembled fallback context");

        AssembledContext {
            text: prompt.text,
            metrics: prompt.metrics,
            layers: None,
            dialogue_id: request.dialogue_id.clone(),
            data_availability: DataAvailability::default(),
            fallback: true,
        }
    }
}
