//! Core logic including the tool-calling conversation loop and the tool
//! registry.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod chat;
pub mod conversation;
mod error;
mod model_client;
pub mod tool;

pub use chat::{ChatLoop, ChatLoopBuilder, DEFAULT_MAX_ITERATIONS, TurnOutcome};
pub use error::ChatError;
