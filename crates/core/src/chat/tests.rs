use std::future::ready;
use std::sync::{Arc, Mutex};

use persona_model::{ErrorKind, Message, Role, ToolCall};
use persona_test_model::{PresetResponse, TestModelProvider};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::tool::{ErrorKind as ToolErrorKind, Registry, Tool, ToolResult};
use crate::{ChatError, ChatLoop, ChatLoopBuilder};

static SCHEMA: &Value = &Value::Null;

#[derive(Deserialize)]
struct EmailInput {
    email: String,
}

/// Records every email it is called with.
#[derive(Clone, Default)]
struct RecordEmail {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Tool for RecordEmail {
    type Input = EmailInput;

    fn name(&self) -> &str {
        "record_user_details"
    }

    fn description(&self) -> &str {
        "Records an email"
    }

    fn parameter_schema(&self) -> &Value {
        SCHEMA
    }

    fn execute(
        &self,
        input: EmailInput,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        self.seen.lock().unwrap().push(input.email);
        ready(Ok(json!({ "recorded": "ok" })))
    }
}

fn build_loop(provider: &TestModelProvider, tool: RecordEmail) -> ChatLoop {
    let registry = Registry::builder().with_tool(tool).build();
    ChatLoopBuilder::with_model_provider(provider.clone())
        .with_system_prompt("You are acting as Ada.")
        .with_registry(Arc::new(registry))
        .build()
}

#[tokio::test]
async fn test_final_answer_in_one_call() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::text("Please reach me via the form"));
    let tool = RecordEmail::default();
    let chat_loop = build_loop(&provider, tool.clone());

    let reply = chat_loop.chat("What's your email?", &[]).await.unwrap();

    assert_eq!(reply, "Please reach me via the form");
    assert_eq!(provider.request_count(), 1);
    assert!(tool.seen.lock().unwrap().is_empty());

    let request = &provider.requests()[0];
    assert_eq!(request.messages[0], Message::system("You are acting as Ada."));
    assert_eq!(request.messages[1], Message::user("What's your email?"));
    assert_eq!(request.tools.len(), 1);
    assert_eq!(request.tools[0].name, "record_user_details");
}

#[tokio::test]
async fn test_any_other_finish_reason_is_final() {
    let provider = TestModelProvider::default();
    provider.add_response(
        PresetResponse::with_tool_calls([ToolCall::new(
            "call_1",
            "record_user_details",
            r#"{"email":"a@b.com"}"#,
        )])
        .with_finish_reason("length".into()),
    );
    let tool = RecordEmail::default();
    let chat_loop = build_loop(&provider, tool.clone());

    let reply = chat_loop.chat("Hi", &[]).await.unwrap();

    assert_eq!(reply, "");
    assert_eq!(provider.request_count(), 1);
    assert!(tool.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_tool_round_trip() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_tool_calls([ToolCall::new(
        "call_1",
        "record_user_details",
        r#"{"email":"a@b.com"}"#,
    )]));
    provider.add_response(PresetResponse::text("Thanks, I'll be in touch!"));
    let tool = RecordEmail::default();
    let chat_loop = build_loop(&provider, tool.clone());

    let outcome = chat_loop
        .run_turn("My email is a@b.com", &[])
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Thanks, I'll be in touch!");
    assert_eq!(outcome.model_calls, 2);
    assert_eq!(outcome.tool_calls, 1);
    assert_eq!(*tool.seen.lock().unwrap(), ["a@b.com"]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let second = &requests[1].messages;
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].role, Role::Assistant);
    assert_eq!(second[2].tool_calls()[0].id, "call_1");
    assert_eq!(
        second[3],
        Message::tool_result("call_1", r#"{"recorded":"ok"}"#)
    );
}

#[tokio::test]
async fn test_multiple_tool_calls_keep_order() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_tool_calls([
        ToolCall::new("c1", "record_user_details", r#"{"email":"1@x.io"}"#),
        ToolCall::new("c2", "no_such_tool", r#"{"question":"?"}"#),
        ToolCall::new("c3", "record_user_details", r#"{"email":"3@x.io"}"#),
    ]));
    provider.add_response(PresetResponse::text("Done"));
    let tool = RecordEmail::default();
    let chat_loop = build_loop(&provider, tool.clone());

    let outcome = chat_loop.run_turn("Hi", &[]).await.unwrap();

    assert_eq!(outcome.reply, "Done");
    assert_eq!(provider.request_count(), 2);
    assert_eq!(*tool.seen.lock().unwrap(), ["1@x.io", "3@x.io"]);

    let second = &provider.requests()[1].messages;
    let tool_messages = second
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect::<Vec<_>>();
    assert_eq!(tool_messages.len(), 3);
    let ids = tool_messages
        .iter()
        .map(|m| m.tool_call_id.as_deref().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ids, ["c1", "c2", "c3"]);
    // The unknown tool answers with an empty object.
    assert_eq!(tool_messages[1].content.as_deref(), Some("{}"));
}

#[tokio::test]
async fn test_history_is_sanitized_and_untouched() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_tool_calls([ToolCall::new(
        "call_1",
        "record_user_details",
        r#"{"email":"a@b.com"}"#,
    )]));
    provider.add_response(PresetResponse::text("Noted"));
    let chat_loop = build_loop(&provider, RecordEmail::default());

    let mut replayed = Message::assistant("Hello! Ask me anything.");
    replayed.extra.insert("metadata".to_owned(), json!({}));
    let history = vec![Message::user("Hi"), replayed];
    let snapshot = history.clone();

    chat_loop.chat("Here's my email", &history).await.unwrap();

    assert_eq!(history, snapshot);
    for request in provider.requests() {
        assert!(request.messages.iter().all(|m| m.extra.is_empty()));
        assert_eq!(request.messages[1], Message::user("Hi"));
        assert_eq!(
            request.messages[2],
            Message::assistant("Hello! Ask me anything.")
        );
    }
}

#[tokio::test]
async fn test_iteration_limit() {
    let provider = TestModelProvider::default();
    provider.set_fallback(PresetResponse::with_tool_calls([ToolCall::new(
        "loop",
        "record_user_details",
        r#"{"email":"a@b.com"}"#,
    )]));
    let registry = Registry::builder().with_tool(RecordEmail::default()).build();
    let chat_loop = ChatLoopBuilder::with_model_provider(provider.clone())
        .with_registry(Arc::new(registry))
        .with_max_iterations(Some(3))
        .build();

    let err = chat_loop.chat("Hi", &[]).await.unwrap_err();

    assert!(matches!(err, ChatError::IterationLimit { limit: 3 }));
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_model_error_propagates() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::failure("invalid api key"));
    let chat_loop = build_loop(&provider, RecordEmail::default());

    let err = chat_loop.chat("Hi", &[]).await.unwrap_err();

    assert_eq!(err.model_error_kind(), Some(ErrorKind::Other));
    assert!(err.to_string().contains("invalid api key"));
}

#[tokio::test]
async fn test_malformed_arguments_fail_the_turn() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_tool_calls([ToolCall::new(
        "call_1",
        "record_user_details",
        r#"{"email": "a@b.com""#,
    )]));
    let tool = RecordEmail::default();
    let chat_loop = build_loop(&provider, tool.clone());

    let err = chat_loop.chat("Hi", &[]).await.unwrap_err();

    assert!(matches!(
        err,
        ChatError::ToolArguments { ref id, .. } if id == "call_1"
    ));
    assert_eq!(provider.request_count(), 1);
    assert!(tool.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_arguments_of_wrong_shape_fail_the_turn() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_tool_calls([ToolCall::new(
        "call_1",
        "record_user_details",
        r#"{"name":"Ada"}"#,
    )]));
    let chat_loop = build_loop(&provider, RecordEmail::default());

    let err = chat_loop.chat("Hi", &[]).await.unwrap_err();

    let ChatError::Tool { name, source } = err else {
        panic!("expected a tool error");
    };
    assert_eq!(name, "record_user_details");
    assert_eq!(source.kind(), ToolErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_empty_arguments_read_as_empty_object() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_tool_calls([ToolCall::new(
        "call_1",
        "no_such_tool",
        "",
    )]));
    provider.add_response(PresetResponse::text("ok"));
    let chat_loop = build_loop(&provider, RecordEmail::default());

    assert_eq!(chat_loop.chat("Hi", &[]).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_tool_calls_finish_without_calls_asks_again() {
    let provider = TestModelProvider::default();
    provider.add_response(
        PresetResponse::text("Let me think.")
            .with_finish_reason("tool_calls".into()),
    );
    provider.add_response(PresetResponse::text("Here you go"));
    let chat_loop = build_loop(&provider, RecordEmail::default());

    let outcome = chat_loop.run_turn("Hi", &[]).await.unwrap();

    assert_eq!(outcome.reply, "Here you go");
    assert_eq!(outcome.model_calls, 2);
    assert_eq!(outcome.tool_calls, 0);
    let second = &provider.requests()[1].messages;
    assert_eq!(second.len(), 3);
    assert_eq!(second[2], Message::assistant("Let me think."));
}
