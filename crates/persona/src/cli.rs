use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use persona::notify::{LogNotifier, Notifier, PushoverNotifier};
use persona::profile::{DEFAULT_PROFILE_DIR, ProfileStore};
use persona_core::DEFAULT_MAX_ITERATIONS;
use persona_openai_model::{OpenAIConfig, OpenAIConfigBuilder};

#[derive(Parser, Debug)]
#[command(
    name = "persona",
    about = "Chat with an assistant that answers as you",
    version,
    long_about = None,
)]
pub struct Cli {
    /// Name of the person the assistant represents
    #[arg(long, env = "PERSONA_NAME")]
    pub name: String,

    /// API key of the chat-completion service
    #[arg(long, env = "MODEL_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Model to use, e.g. "openai/gpt-oss-20b"
    #[arg(long, env = "MODEL_NAME")]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "MODEL_BASE_URL")]
    pub base_url: Option<String>,

    /// Pushover application token
    #[arg(long, env = "NOTIFICATION_TOKEN", hide_env_values = true)]
    pub notification_token: Option<String>,

    /// Pushover user key
    #[arg(long, env = "NOTIFICATION_USER", hide_env_values = true)]
    pub notification_user: Option<String>,

    /// Directory holding summary.txt, linkedin.pdf and resume.pdf
    #[arg(long, env = "PROFILE_DIR", default_value = DEFAULT_PROFILE_DIR)]
    pub profile_dir: PathBuf,

    /// Summary text, takes precedence over summary.txt
    #[arg(long, env = "SUMMARY_TEXT", hide_env_values = true)]
    pub summary_text: Option<String>,

    /// LinkedIn profile text, takes precedence over linkedin.pdf
    #[arg(long, env = "PROFILE_TEXT", hide_env_values = true)]
    pub profile_text: Option<String>,

    /// Resume text, takes precedence over resume.pdf
    #[arg(long, env = "RESUME_TEXT", hide_env_values = true)]
    pub resume_text: Option<String>,

    /// Model calls allowed per message, 0 for no limit
    #[arg(
        long,
        env = "MAX_TOOL_ITERATIONS",
        default_value_t = DEFAULT_MAX_ITERATIONS
    )]
    pub max_iterations: u32,
}

impl Cli {
    pub fn model_config(&self) -> OpenAIConfig {
        let mut builder = OpenAIConfigBuilder::with_api_key(&self.api_key);
        if let Some(model) = &self.model {
            builder = builder.with_model(model);
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }

    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::with_defaults(
            &self.profile_dir,
            self.summary_text.clone(),
            self.profile_text.clone(),
            self.resume_text.clone(),
        )
    }

    pub fn max_iterations(&self) -> Option<u32> {
        (self.max_iterations > 0).then_some(self.max_iterations)
    }

    /// Pushover when both credentials are set, the log otherwise.
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        let token = self.notification_token.as_deref().unwrap_or_default();
        let user = self.notification_user.as_deref().unwrap_or_default();
        if token.is_empty() || user.is_empty() {
            warn!("notification credentials missing, logging instead");
            return Arc::new(LogNotifier);
        }
        Arc::new(PushoverNotifier::new(token, user))
    }
}
