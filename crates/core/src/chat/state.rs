use persona_model::{Message, ModelResponse, ToolCall};

use super::TurnOutcome;
use crate::conversation::Conversation;

/// Where the turn goes after a model response.
pub(super) enum Stage {
    /// The model wants tools to run; their results must be sent back.
    AwaitingModel {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    /// The model produced its final answer.
    ModelResponded(String),
}

impl Stage {
    /// Only the `tool_calls` finish reason triggers tool execution, every
    /// other reason ends the turn with whatever content the model produced.
    pub fn from_response(response: ModelResponse) -> Self {
        let ModelResponse {
            finish_reason,
            message,
        } = response;
        if !finish_reason.wants_tools() {
            trace!("model finished with {finish_reason}");
            return Stage::ModelResponded(message.content.unwrap_or_default());
        }
        Stage::AwaitingModel {
            content: message.content,
            tool_calls: message.tool_calls.unwrap_or_default(),
        }
    }
}

pub(super) struct TurnState {
    pub conversation: Conversation,
    pub model_calls: u32,
    pub tool_calls: usize,
}

impl TurnState {
    #[inline]
    pub fn new(system_prompt: &str, history: &[Message], input: &str) -> Self {
        Self {
            conversation: Conversation::for_turn(system_prompt, history, input),
            model_calls: 0,
            tool_calls: 0,
        }
    }

    /// Records a tool round: the assistant message requesting the calls,
    /// then one result per call.
    pub fn on_tool_results(
        &mut self,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
        results: Vec<(String, String)>,
    ) {
        self.tool_calls += results.len();
        self.conversation.push_tool_round(content, tool_calls, results);
    }

    #[inline]
    pub fn finish(self, reply: String) -> TurnOutcome {
        TurnOutcome {
            reply,
            model_calls: self.model_calls,
            tool_calls: self.tool_calls,
            messages: self.conversation.messages().to_vec(),
        }
    }
}
