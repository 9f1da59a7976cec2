use std::sync::Arc;
use std::time::Duration;

use persona_core::tool::{Tool, ToolResult};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{DEFAULT_NOTIFY_TIMEOUT, parameter_schema, recorded};
use crate::notify::{Notifier, deliver};

/// A question the persona couldn't answer.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordUnknownQuestionParameters {
    #[schemars(description = "The question that couldn't be answered")]
    question: String,
}

/// Records a question the persona had no answer to.
pub struct RecordUnknownQuestionTool {
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    parameter_schema: Value,
}

impl RecordUnknownQuestionTool {
    /// Creates the tool, notifying through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let parameter_schema =
            parameter_schema::<RecordUnknownQuestionParameters>();
        Self {
            notifier,
            timeout: DEFAULT_NOTIFY_TIMEOUT,
            parameter_schema,
        }
    }

    /// Sets how long to wait for the notification.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Tool for RecordUnknownQuestionTool {
    type Input = RecordUnknownQuestionParameters;

    fn name(&self) -> &str {
        "record_unknown_question"
    }

    fn description(&self) -> &str {
        "Always use this tool to record any question that couldn't be answered as you didn't know the answer"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: RecordUnknownQuestionParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.timeout;
        async move {
            let message = format!("Recording {}", input.question);
            deliver(notifier.as_ref(), &message, timeout).await;
            Ok(recorded())
        }
    }
}
