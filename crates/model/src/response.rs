use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::Message;

/// A complete response from the model provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelResponse {
    /// Why the model stopped generating.
    pub finish_reason: ModelFinishReason,
    /// The assistant message, which may carry text, tool calls or both.
    pub message: Message,
}

/// The reason why a model response has finished.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelFinishReason {
    /// The model needs to call tools.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
    /// The output was truncated by the token limit.
    Length,
    /// The output was filtered by the provider.
    ContentFilter,
    /// A reason this crate doesn't know about.
    Other(String),
}

impl ModelFinishReason {
    /// Returns the wire name of this finish reason.
    pub fn as_str(&self) -> &str {
        match self {
            ModelFinishReason::ToolCalls => "tool_calls",
            ModelFinishReason::Stop => "stop",
            ModelFinishReason::Length => "length",
            ModelFinishReason::ContentFilter => "content_filter",
            ModelFinishReason::Other(reason) => reason,
        }
    }

    /// Returns `true` if the model is asking for tool execution.
    #[inline]
    pub fn wants_tools(&self) -> bool {
        matches!(self, ModelFinishReason::ToolCalls)
    }
}

impl From<&str> for ModelFinishReason {
    fn from(value: &str) -> Self {
        match value {
            "tool_calls" => ModelFinishReason::ToolCalls,
            "stop" => ModelFinishReason::Stop,
            "length" => ModelFinishReason::Length,
            "content_filter" => ModelFinishReason::ContentFilter,
            other => ModelFinishReason::Other(other.to_owned()),
        }
    }
}

impl From<String> for ModelFinishReason {
    #[inline]
    fn from(value: String) -> Self {
        value.as_str().into()
    }
}

impl From<ModelFinishReason> for String {
    #[inline]
    fn from(value: ModelFinishReason) -> Self {
        value.as_str().to_owned()
    }
}

impl Display for ModelFinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
