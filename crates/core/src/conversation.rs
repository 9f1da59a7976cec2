//! The message sequence of a single turn.

use persona_model::{Message, ModelRequest, ModelTool, ToolCall};

/// The messages sent to the model during one turn.
///
/// A conversation starts as the system prompt, followed by the history the
/// caller owns, followed by the new user message. Tool rounds are appended
/// to it while the turn is in progress. The caller's history is copied, so
/// nothing the turn does leaks back into it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Starts the conversation of a new turn.
    pub fn for_turn(
        system_prompt: &str,
        history: &[Message],
        user_input: &str,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(system_prompt));
        messages.extend(history.iter().cloned());
        messages.push(Message::user(user_input));
        Self { messages }
    }

    /// Returns all messages of the conversation.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Appends the assistant message that requested tool calls, followed
    /// by one tool message per call, in the same order.
    ///
    /// `results` pairs each call id with the serialized result.
    pub fn push_tool_round(
        &mut self,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
        results: Vec<(String, String)>,
    ) {
        debug_assert!(
            results
                .iter()
                .zip(&tool_calls)
                .all(|((id, _), call)| *id == call.id),
            "tool results must follow the order of the calls"
        );
        self.messages
            .push(Message::assistant_tool_calls(content, tool_calls));
        self.messages.extend(
            results
                .into_iter()
                .map(|(id, content)| Message::tool_result(id, content)),
        );
    }

    /// Builds a request with every message sanitized.
    pub fn request(&self, tools: &[ModelTool]) -> ModelRequest {
        ModelRequest {
            messages: self.messages.iter().map(Message::sanitized).collect(),
            tools: tools.to_vec(),
        }
    }
}
