use persona_model::{ErrorKind as ModelErrorKind, ModelProviderError};
use thiserror::Error;

use crate::tool;

/// The reasons a turn can fail without producing an answer.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The model request failed (network, authentication, rate limit...).
    #[error("model request failed: {0}")]
    Model(Box<dyn ModelProviderError>),
    /// The model produced tool call arguments that are not valid JSON.
    #[error("arguments of tool call `{id}` ({name}) are not valid JSON")]
    ToolArguments {
        /// The tool call id.
        id: String,
        /// The tool name.
        name: String,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// A tool refused its input or failed to execute.
    #[error("tool `{name}` failed")]
    Tool {
        /// The tool name.
        name: String,
        /// The tool error.
        #[source]
        source: tool::Error,
    },
    /// The model kept requesting tools past the iteration limit.
    #[error("no final answer after {limit} model calls")]
    IterationLimit {
        /// The configured limit that was reached.
        limit: u32,
    },
}

impl ChatError {
    /// Returns the model error kind if the failure came from the model.
    pub fn model_error_kind(&self) -> Option<ModelErrorKind> {
        match self {
            ChatError::Model(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<Box<dyn ModelProviderError>> for ChatError {
    #[inline]
    fn from(value: Box<dyn ModelProviderError>) -> Self {
        ChatError::Model(value)
    }
}
