use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The system instructions.
    System,
    /// The person chatting with the agent.
    User,
    /// The model.
    Assistant,
    /// A tool call result.
    Tool,
}

/// A message in the conversation, in the shape of the chat-completion
/// APIs.
///
/// History replayed from a user interface may carry fields the model API
/// doesn't accept. They are kept in [`Message::extra`] so that nothing is
/// lost while the history round-trips through the host, and are removed by
/// [`Message::sanitized`] before the message reaches a provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub role: Role,
    /// Text content. Assistant messages that only request tools may have
    /// no content.
    pub content: Option<String>,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// The tool call a tool-role message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Any other fields that came along with the message.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    #[inline]
    fn new(role: Role, content: Option<String>) -> Self {
        Self {
            role,
            content,
            tool_calls: None,
            tool_call_id: None,
            extra: Map::new(),
        }
    }

    /// Creates a system message.
    #[inline]
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(Role::System, Some(content.into()))
    }

    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, Some(content.into()))
    }

    /// Creates a plain-text assistant message.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, Some(content.into()))
    }

    /// Creates an assistant message that requests tool calls. An empty list
    /// leaves `tool_calls` unset.
    pub fn assistant_tool_calls(
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self {
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Creates a tool-role message carrying the result of the call `id`.
    pub fn tool_result<ID: Into<String>, S: Into<String>>(
        id: ID,
        content: S,
    ) -> Self {
        Self {
            tool_call_id: Some(id.into()),
            ..Self::new(Role::Tool, Some(content.into()))
        }
    }

    /// Returns the tool calls of this message, or an empty slice.
    #[inline]
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    /// Reduces the message to the fields a chat-completion API accepts:
    /// role, content, tool calls when present, and the tool call id on
    /// tool-role messages.
    ///
    /// Sanitizing is idempotent.
    pub fn sanitized(&self) -> Self {
        Self {
            role: self.role,
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
            tool_call_id: if self.role == Role::Tool {
                self.tool_call_id.clone()
            } else {
                None
            },
            extra: Map::new(),
        }
    }
}

/// Sanitizes every message of a sequence.
///
/// See [`Message::sanitized`].
#[inline]
pub fn sanitize(messages: &[Message]) -> Vec<Message> {
    messages.iter().map(Message::sanitized).collect()
}

/// Describes a tool call request from the model.
///
/// On the wire this is `{"id", "type": "function", "function": {"name",
/// "arguments"}}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WireToolCall", into = "WireToolCall")]
pub struct ToolCall {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The JSON-encoded argument object, exactly as the model produced it.
    pub arguments: String,
}

impl ToolCall {
    /// Creates a tool call.
    pub fn new<ID, N, A>(id: ID, name: N, arguments: A) -> Self
    where
        ID: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunction,
}

#[derive(Clone, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn function_type() -> String {
    "function".to_owned()
}

impl From<WireToolCall> for ToolCall {
    fn from(value: WireToolCall) -> Self {
        Self {
            id: value.id,
            name: value.function.name,
            arguments: value.function.arguments,
        }
    }
}

impl From<ToolCall> for WireToolCall {
    fn from(value: ToolCall) -> Self {
        Self {
            id: value.id,
            kind: function_type(),
            function: WireFunction {
                name: value.name,
                arguments: value.arguments,
            },
        }
    }
}
