use std::sync::Arc;
use std::time::Duration;

use persona_core::{ChatError, ChatLoop, ChatLoopBuilder, TurnOutcome};
use persona_model::{Message, ModelProvider};

use crate::notify::{LogNotifier, Notifier};
use crate::profile::Profile;
use crate::prompt::system_prompt;
use crate::tools::{self, DEFAULT_NOTIFY_TIMEOUT};

/// A persona builder.
///
/// See [`Persona`].
pub struct PersonaBuilder {
    chat_builder: ChatLoopBuilder,
    name: String,
    profile: Profile,
    notifier: Arc<dyn Notifier>,
    notify_timeout: Duration,
}

impl PersonaBuilder {
    /// Creates a builder for the persona of `name`, talking through a
    /// specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
        name: impl Into<String>,
    ) -> Self {
        Self {
            chat_builder: ChatLoopBuilder::with_model_provider(provider),
            name: name.into(),
            profile: Profile::default(),
            notifier: Arc::new(LogNotifier),
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    /// Sets the background material the persona answers from.
    #[inline]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets where the recording tools send their notifications. Defaults to
    /// [`LogNotifier`].
    #[inline]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets how long a tool waits for its notification.
    #[inline]
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Limits how many model calls one turn may make. See
    /// [`ChatLoopBuilder::with_max_iterations`].
    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: Option<u32>) -> Self {
        self.chat_builder = self.chat_builder.with_max_iterations(max_iterations);
        self
    }

    /// Builds the persona.
    pub fn build(self) -> Persona {
        let prompt = system_prompt(&self.name, &self.profile);
        let registry = tools::registry(self.notifier, self.notify_timeout);
        let chat_loop = self
            .chat_builder
            .with_system_prompt(prompt)
            .with_registry(Arc::new(registry))
            .build();
        Persona {
            name: self.name,
            chat_loop,
        }
    }
}

/// Someone's stand-in, answering questions about their career.
///
/// The persona holds no conversation state: the caller keeps the history
/// and passes it with every message. It is cheap to clone and can serve
/// several conversations at once.
#[derive(Clone)]
pub struct Persona {
    name: String,
    chat_loop: ChatLoop,
}

impl Persona {
    /// Returns the name of the person represented.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the system prompt sent with every turn.
    #[inline]
    pub fn system_prompt(&self) -> &str {
        self.chat_loop.system_prompt()
    }

    /// Answers `message`, given the previous messages of the conversation.
    #[inline]
    pub async fn chat(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<String, ChatError> {
        self.chat_loop.chat(message, history).await
    }

    /// Like [`Persona::chat`], but returns the details of the turn.
    #[inline]
    pub async fn run_turn(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<TurnOutcome, ChatError> {
        self.chat_loop.run_turn(message, history).await
    }
}
