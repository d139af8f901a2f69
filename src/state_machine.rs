//! Dialog state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `(session, event) -> (new session, effects)`.

mod effect;
mod event;
mod state;
mod transition;
mod view;

#[cfg(test)]
mod proptests;

#[allow(unused_imports)] // Public API re-exports
pub use effect::{Choice, Effect, Prompt, RenderMode, RenderOptions};
pub use event::Event;
pub use state::{InteractionId, Language, Session, Stage, Topic, UserId};
#[allow(unused_imports)] // Public API re-exports
pub use transition::{transition, ProtocolMisuse, TransitionResult};
