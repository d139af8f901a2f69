//! Effects produced by state transitions

use super::state::InteractionId;
use crate::generation::GenerationRequest;

/// How the transport should interpret prompt text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Plain,
    /// HTML markup; any untrusted text inside must already be escaped
    Rich,
}

/// A selectable button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub payload: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Rendering options passed alongside prompt text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub choices: Vec<Choice>,
    pub mode: RenderMode,
}

/// Text plus options, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub options: RenderOptions,
}

impl Prompt {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: RenderOptions::default(),
        }
    }

    pub fn rich(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: RenderOptions {
                choices: vec![],
                mode: RenderMode::Rich,
            },
        }
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.options.choices.extend(choices);
        self
    }
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a new prompt message to the user
    SendPrompt { prompt: Prompt },

    /// Replace the content of an existing interaction
    EditPrompt {
        interaction: InteractionId,
        prompt: Prompt,
    },

    /// Call the generation backend; the outcome comes back as
    /// `Event::GenerationFinished` for the same interaction
    Generate {
        interaction: InteractionId,
        request: GenerationRequest,
    },
}

impl Effect {
    pub fn send(prompt: Prompt) -> Self {
        Effect::SendPrompt { prompt }
    }

    pub fn edit(interaction: InteractionId, prompt: Prompt) -> Self {
        Effect::EditPrompt {
            interaction,
            prompt,
        }
    }

    #[cfg(test)]
    pub fn is_render(&self) -> bool {
        matches!(self, Effect::SendPrompt { .. } | Effect::EditPrompt { .. })
    }
}
