//! The tools the persona can call while chatting.

mod record_unknown_question;
mod record_user_details;

use std::sync::Arc;
use std::time::Duration;

use persona_core::tool::Registry;
use schemars::{JsonSchema, schema_for};
use serde_json::{Value, json};

use crate::notify::Notifier;
pub use record_unknown_question::{
    RecordUnknownQuestionParameters, RecordUnknownQuestionTool,
};
pub use record_user_details::{
    RecordUserDetailsParameters, RecordUserDetailsTool,
};

/// How long a tool waits for its notification before moving on.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the registry with both recording tools, notifying through
/// `notifier`.
pub fn registry(
    notifier: Arc<dyn Notifier>,
    notify_timeout: Duration,
) -> Registry {
    Registry::builder()
        .with_tool(
            RecordUserDetailsTool::new(Arc::clone(&notifier))
                .with_timeout(notify_timeout),
        )
        .with_tool(
            RecordUnknownQuestionTool::new(notifier).with_timeout(notify_timeout),
        )
        .build()
}

/// The schema of `T`, without the meta-schema reference the chat APIs don't
/// need.
fn parameter_schema<T: JsonSchema>() -> Value {
    let mut schema = schema_for!(T).to_value();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
    }
    schema
}

/// What both tools answer once the notification went out (or failed).
fn recorded() -> Value {
    json!({ "recorded": "ok" })
}
