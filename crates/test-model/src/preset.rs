use persona_model::{Message, ModelFinishReason, ModelResponse, ToolCall};
use serde::{Deserialize, Serialize};

/// The preset response for one model call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Text content of the assistant message.
    pub content: Option<String>,
    /// Tool calls of the assistant message.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Overrides the finish reason. When unset, it's `tool_calls` if there
    /// are any tool calls, `stop` otherwise.
    pub finish_reason: Option<ModelFinishReason>,
    /// If set, the request fails with this message instead.
    pub failure: Option<String>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` that answers with plain text.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: vec![],
            finish_reason: None,
            failure: None,
        }
    }

    /// Creates a `PresetResponse` that requests the given tool calls.
    #[inline]
    pub fn with_tool_calls(tool_calls: impl Into<Vec<ToolCall>>) -> Self {
        Self {
            content: None,
            tool_calls: tool_calls.into(),
            finish_reason: None,
            failure: None,
        }
    }

    /// Creates a `PresetResponse` that makes the request fail.
    #[inline]
    pub fn failure<S: Into<String>>(message: S) -> Self {
        Self {
            content: None,
            tool_calls: vec![],
            finish_reason: None,
            failure: Some(message.into()),
        }
    }

    /// Sets the finish reason explicitly.
    #[inline]
    pub fn with_finish_reason(mut self, reason: ModelFinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    pub(crate) fn to_response(&self) -> ModelResponse {
        let finish_reason =
            self.finish_reason.clone().unwrap_or_else(|| {
                if self.tool_calls.is_empty() {
                    ModelFinishReason::Stop
                } else {
                    ModelFinishReason::ToolCalls
                }
            });
        let message = if self.tool_calls.is_empty() {
            Message {
                content: self.content.clone(),
                ..Message::assistant("")
            }
        } else {
            Message::assistant_tool_calls(
                self.content.clone(),
                self.tool_calls.clone(),
            )
        };
        ModelResponse {
            finish_reason,
            message,
        }
    }
}
