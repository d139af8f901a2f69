//! Pure state transition function

use super::effect::Effect;
use super::event::Event;
use super::state::{Session, Stage};
use super::view;
use crate::generation::build_request;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
    /// Set when the event did not fit the session's stage and was ignored
    pub misuse: Option<ProtocolMisuse>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
            misuse: None,
        }
    }

    /// Keep `state` unchanged and record why the event was dropped
    pub fn ignored(state: &Session, event: &'static str) -> Self {
        Self {
            new_state: state.clone(),
            effects: vec![],
            misuse: Some(ProtocolMisuse {
                stage: state.stage,
                event,
            }),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// An event arrived for a stage that does not expect it.
///
/// Never surfaced to the user; the interaction is re-rendered instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{event} is not expected in stage {}", .stage.as_str())]
pub struct ProtocolMisuse {
    pub stage: Stage,
    pub event: &'static str,
}

/// Pure transition function
///
/// Given the same session and event it always yields the same new session
/// and effects. No I/O happens here.
pub fn transition(session: &Session, event: Event) -> TransitionResult {
    let name = event.name();
    match (session.stage, event) {
        // A pending generation owns the session until its outcome arrives
        (Stage::AwaitingGeneration, Event::Start) => {
            TransitionResult::ignored(session, name).with_effect(Effect::send(view::still_thinking()))
        }

        (_, Event::Start) => {
            TransitionResult::new(session.reset()).with_effect(Effect::send(view::language_menu()))
        }

        (
            Stage::AwaitingLanguage,
            Event::SelectLanguage {
                interaction,
                language,
            },
        ) => TransitionResult::new(Session {
            language: Some(language),
            topic: None,
            stage: Stage::AwaitingTopic,
            ..session.clone()
        })
        .with_effect(Effect::edit(interaction, view::topic_menu())),

        (Stage::AwaitingTopic, Event::SelectTopic { interaction, topic }) => {
            let Some(language) = session.language else {
                return TransitionResult::ignored(session, name)
                    .with_effect(Effect::edit(interaction, view::current(session)));
            };
            TransitionResult::new(Session {
                topic: Some(topic),
                stage: Stage::AwaitingGeneration,
                ..session.clone()
            })
            .with_effect(Effect::edit(interaction, view::thinking()))
            .with_effect(Effect::Generate {
                interaction,
                request: build_request(language, topic),
            })
        }

        // Round complete: show the outcome, then start over
        (
            Stage::AwaitingGeneration,
            Event::GenerationFinished {
                interaction,
                outcome,
            },
        ) => TransitionResult::new(session.reset())
            .with_effect(Effect::edit(interaction, view::outcome(&outcome)))
            .with_effect(Effect::send(view::next_round_menu())),

        (_, Event::GenerationFinished { .. }) => TransitionResult::ignored(session, name),

        // Stale, duplicate or unknown button presses
        (
            _,
            Event::SelectLanguage { interaction, .. }
            | Event::SelectTopic { interaction, .. }
            | Event::UnknownSelection { interaction, .. },
        ) => TransitionResult::ignored(session, name)
            .with_effect(Effect::edit(interaction, view::current(session))),
    }
}
