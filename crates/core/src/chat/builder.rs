use std::sync::Arc;

use persona_model::ModelProvider;

use super::ChatLoop;
use crate::model_client::ModelClient;
use crate::tool::Registry;

/// The default number of model calls a single turn may make.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// [`ChatLoop`] builder.
pub struct ChatLoopBuilder {
    model_client: ModelClient,
    registry: Option<Arc<Registry>>,
    system_prompt: String,
    max_iterations: Option<u32>,
}

impl ChatLoopBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            registry: None,
            system_prompt: String::new(),
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
        }
    }

    /// Sets the system prompt for every turn.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the tools available to the model.
    #[inline]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Limits how many model calls one turn may make. `None` removes the
    /// limit, a model that never stops requesting tools will then loop
    /// forever.
    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: Option<u32>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builds the loop.
    #[inline]
    pub fn build(self) -> ChatLoop {
        ChatLoop {
            model_client: self.model_client,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(Registry::empty())),
            system_prompt: self.system_prompt.into(),
            max_iterations: self.max_iterations,
        }
    }
}
