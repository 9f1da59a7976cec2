//! A chat assistant that answers as a specific person.
//!
//! The persona is grounded in a summary, a LinkedIn profile and a resume,
//! and can record the contact details of interested users and the
//! questions it couldn't answer. The crate includes a CLI for chatting in
//! the terminal, and can also be used as a library by web front ends.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod notify;
mod persona;
pub mod profile;
pub mod prompt;
pub mod tools;

pub use persona::{Persona, PersonaBuilder};

/// Re-exports of [`persona_core`] crate.
pub mod core {
    pub use persona_core::*;
}

/// Re-exports of [`persona_model`] crate.
pub mod model {
    pub use persona_model::*;
}
