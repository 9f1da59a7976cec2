use std::sync::Arc;
use std::time::Duration;

use persona_core::tool::{Tool, ToolResult};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{DEFAULT_NOTIFY_TIMEOUT, parameter_schema, recorded};
use crate::notify::{Notifier, deliver};

fn default_name() -> String {
    "Name not provided".to_owned()
}

fn default_notes() -> String {
    "not provided".to_owned()
}

/// Contact details left by a user.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordUserDetailsParameters {
    #[schemars(description = "The email address of this user")]
    email: String,
    #[schemars(description = "The user's name, if they provided it")]
    #[serde(default = "default_name")]
    name: String,
    #[schemars(
        description = "Any additional information about the conversation that's worth recording to give context"
    )]
    #[serde(default = "default_notes")]
    notes: String,
}

/// Records that a user wants to be in touch.
pub struct RecordUserDetailsTool {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    parameter_schema: Value,
}

impl RecordUserDetailsTool {
    /// Creates the tool, notifying through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            timeout: DEFAULT_NOTIFY_TIMEOUT,
            parameter_schema: parameter_schema::<RecordUserDetailsParameters>(),
        }
    }

    /// Sets how long to wait for the notification.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Tool for RecordUserDetailsTool {
    type Input = RecordUserDetailsParameters;

    fn name(&self) -> &str {
        "record_user_details"
    }

    fn description(&self) -> &str {
        "Use this tool to record that a user is interested in being in touch and provided an email address"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: RecordUserDetailsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.timeout;
        async move {
            let message = format!(
                "Recording {} with email {} and notes {}",
                input.name, input.email, input.notes
            );
            deliver(notifier.as_ref(), &message, timeout).await;
            Ok(recorded())
        }
    }
}
