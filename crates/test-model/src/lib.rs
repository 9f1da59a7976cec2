//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard};

use persona_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    steps: VecDeque<PresetResponse>,
    fallback: Option<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request in order. If the script runs out
/// and no fallback is set, an error will be returned.
///
/// Every request is recorded, clones of the provider share the same script
/// and records.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
}

impl TestModelProvider {
    #[inline]
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("script lock is poisoned")
    }

    /// Appends a response to the script.
    #[inline]
    pub fn add_response(&self, preset: PresetResponse) {
        self.script().steps.push_back(preset);
    }

    /// Sets the response used once the script runs out.
    #[inline]
    pub fn set_fallback(&self, preset: PresetResponse) {
        self.script().fallback = Some(preset);
    }

    /// Returns all requests received so far.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.script().requests.clone()
    }

    /// Returns the number of requests received so far.
    #[inline]
    pub fn request_count(&self) -> usize {
        self.script().requests.len()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelResponse, Self::Error>> + Send + 'static
    {
        let mut script = self.script();
        script.requests.push(req.clone());

        let step = script.steps.pop_front().or_else(|| script.fallback.clone());
        let result = match step {
            None => Err(Error {
                message: "no enough steps".to_owned(),
                kind: ErrorKind::Other,
            }),
            Some(PresetResponse {
                failure: Some(message),
                ..
            }) => Err(Error {
                message,
                kind: ErrorKind::Other,
            }),
            Some(preset) => Ok(preset.to_response()),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use persona_model::{Message, ModelFinishReason, ToolCall};

    use super::*;

    fn request(text: &str) -> ModelRequest {
        ModelRequest {
            messages: vec![Message::user(text)],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_tool_calls([
            ToolCall::new("call_1", "record_unknown_question", "{}"),
        ]));
        provider.add_response(PresetResponse::text("Hello, world!"));

        let resp = provider.send_request(&request("Hi")).await.unwrap();
        assert_eq!(resp.finish_reason, ModelFinishReason::ToolCalls);
        assert_eq!(resp.message.tool_calls()[0].id, "call_1");

        let resp = provider.send_request(&request("Again")).await.unwrap();
        assert_eq!(resp.message.content.as_deref(), Some("Hello, world!"));

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], request("Again"));
    }

    #[tokio::test]
    async fn test_script_exhausted() {
        let provider = TestModelProvider::default();
        let err = provider.send_request(&request("Hi")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_and_fallback() {
        let provider = TestModelProvider::default();
        provider.add_response(PresetResponse::failure("rate limited"));
        provider.set_fallback(PresetResponse::text("fallback"));

        let err = provider.send_request(&request("Hi")).await.unwrap_err();
        assert_eq!(err.message(), "rate limited");

        for _ in 0..3 {
            let resp = provider.send_request(&request("Hi")).await.unwrap();
            assert_eq!(resp.message.content.as_deref(), Some("fallback"));
        }
    }
}
