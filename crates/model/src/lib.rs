//! Provider-agnostic types for talking to chat models.
//!
//! This crate establishes the protocol the conversation loop uses to
//! interact with chat-completion models, so that the loop can switch
//! between providers without modifying the core codebase.
//!
//! Types in this crate don't define any network behavior, instead they
//! are the constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod message;
mod provider;
mod request;
mod response;

pub use error::*;
pub use message::*;
pub use provider::*;
pub use request::*;
pub use response::*;
