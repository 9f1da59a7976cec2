use persona_model::{
    ErrorKind, Message, ModelFinishReason, ModelRequest, ModelResponse,
    ModelTool,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, OpenAIConfig};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        // Providers reject unknown message fields, never let them through.
        messages: req.messages.iter().map(Message::sanitized).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        stream: false,
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

pub fn parse_response(
    mut completion: ChatCompletion,
) -> Result<ModelResponse, Error> {
    let Some(idx) = completion.choices.iter().position(|c| c.index == 0)
    else {
        return Err(Error::new(
            format!("completion {} has no choices", completion.id),
            ErrorKind::InvalidResponse,
        ));
    };
    let choice = completion.choices.swap_remove(idx);

    let finish_reason = match choice.finish_reason.as_deref() {
        Some(reason) => ModelFinishReason::from(reason),
        None => ModelFinishReason::Stop,
    };
    if finish_reason == ModelFinishReason::ContentFilter {
        return Err(Error::new(
            format!("completion {} was filtered", completion.id),
            ErrorKind::Moderated,
        ));
    }

    Ok(ModelResponse {
        finish_reason,
        message: choice.message,
    })
}
