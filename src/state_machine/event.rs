//! Events that can occur in a session

use super::state::{InteractionId, Language, Topic};
use crate::generation::GenerationOutcome;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The `/start` command
    Start,

    // Button presses
    SelectLanguage {
        interaction: InteractionId,
        language: Language,
    },
    SelectTopic {
        interaction: InteractionId,
        topic: Topic,
    },
    /// A button payload this bot never rendered
    UnknownSelection {
        interaction: InteractionId,
        payload: String,
    },

    /// The backend call for this session returned (or timed out)
    GenerationFinished {
        interaction: InteractionId,
        outcome: GenerationOutcome,
    },
}

impl Event {
    /// Decode a button payload into the matching selection event
    pub fn from_selection(interaction: InteractionId, payload: &str) -> Self {
        if let Some(language) = Language::from_payload(payload) {
            Event::SelectLanguage {
                interaction,
                language,
            }
        } else if let Some(topic) = Topic::from_payload(payload) {
            Event::SelectTopic { interaction, topic }
        } else {
            Event::UnknownSelection {
                interaction,
                payload: payload.to_string(),
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::SelectLanguage { .. } => "select_language",
            Event::SelectTopic { .. } => "select_topic",
            Event::UnknownSelection { .. } => "unknown_selection",
            Event::GenerationFinished { .. } => "generation_finished",
        }
    }
}
