mod builder;
mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use persona_model::{Message, ModelTool, ToolCall};
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::error::ChatError;
use crate::model_client::ModelClient;
use crate::tool::Registry;
pub use builder::{ChatLoopBuilder, DEFAULT_MAX_ITERATIONS};
use state::{Stage, TurnState};

/// The tool-calling conversation loop.
///
/// One call to [`ChatLoop::chat`] handles one user turn: the model is called
/// with the system prompt, the caller's history and the new message; every
/// tool call the model requests is executed in order and fed back, until the
/// model produces a final answer.
///
/// The loop keeps no per-turn state, so a single instance can serve
/// concurrent turns.
#[derive(Clone)]
pub struct ChatLoop {
    model_client: ModelClient,
    registry: Arc<Registry>,
    system_prompt: Arc<str>,
    max_iterations: Option<u32>,
}

/// What happened during a completed turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The final answer of the model.
    pub reply: String,
    /// How many times the model was called.
    pub model_calls: u32,
    /// How many tool calls were executed.
    pub tool_calls: usize,
    /// The full message sequence of the turn, including the system prompt
    /// and the tool rounds, but not the final answer.
    pub messages: Vec<Message>,
}

impl ChatLoop {
    /// Returns the system prompt sent at the start of every turn.
    #[inline]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Returns the tools advertised to the model.
    #[inline]
    pub fn tools(&self) -> Vec<ModelTool> {
        self.registry.describe()
    }

    /// Answers `message`, given the previous messages of the conversation.
    ///
    /// `history` is never modified. It is up to the caller to record the
    /// message and the reply once the turn succeeded.
    pub async fn chat(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<String, ChatError> {
        self.run_turn(message, history)
            .await
            .map(|outcome| outcome.reply)
    }

    /// Like [`ChatLoop::chat`], but returns the details of the turn.
    pub async fn run_turn(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<TurnOutcome, ChatError> {
        let span = debug_span!("chat turn", history = history.len());
        self.drive(TurnState::new(&self.system_prompt, history, message))
            .instrument(span)
            .await
    }

    async fn drive(&self, mut state: TurnState) -> Result<TurnOutcome, ChatError> {
        let tools = self.registry.describe();
        loop {
            match self.max_iterations {
                Some(limit) if state.model_calls >= limit => {
                    warn!("model still requests tools after {limit} calls");
                    return Err(ChatError::IterationLimit { limit });
                }
                _ => {}
            }

            let request = state.conversation.request(&tools);
            state.model_calls += 1;
            debug!(call = state.model_calls, "awaiting model");
            let response = self.model_client.send_request(request).await?;

            match Stage::from_response(response) {
                Stage::ModelResponded(reply) => {
                    debug!(
                        model_calls = state.model_calls,
                        tool_calls = state.tool_calls,
                        "turn finished"
                    );
                    return Ok(state.finish(reply));
                }
                Stage::AwaitingModel { content, tool_calls } => {
                    let results = self.run_tools(&tool_calls).await?;
                    state.on_tool_results(content, tool_calls, results);
                }
            }
        }
    }

    /// Runs the requested tools one after another, returning the serialized
    /// result of each call paired with its id.
    async fn run_tools(
        &self,
        tool_calls: &[ToolCall],
    ) -> Result<Vec<(String, String)>, ChatError> {
        let mut results = Vec::with_capacity(tool_calls.len());
        for call in tool_calls {
            info!("tool called: {}", call.name);
            let arguments = decode_arguments(call)?;
            let result = self
                .registry
                .invoke(&call.name, arguments)
                .await
                .map_err(|source| ChatError::Tool {
                    name: call.name.clone(),
                    source,
                })?;
            results.push((call.id.clone(), result.to_string()));
        }
        Ok(results)
    }
}

/// Decodes the JSON-encoded arguments of a tool call. Some models send an
/// empty string for calls without arguments, which reads as `{}`.
fn decode_arguments(call: &ToolCall) -> Result<Value, ChatError> {
    if call.arguments.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(&call.arguments).map_err(|source| {
        ChatError::ToolArguments {
            id: call.id.clone(),
            name: call.name.clone(),
            source,
        }
    })
}
