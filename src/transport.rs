//! Chat transport abstraction
//!
//! The bot only needs to send and edit prompts, acknowledge button presses,
//! and receive inbound events. Delivery guarantees belong to the transport.

mod telegram;

pub use telegram::TelegramTransport;

use crate::state_machine::{InteractionId, RenderOptions, UserId};
use async_trait::async_trait;
use thiserror::Error;

/// Events relayed from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The `/start` command
    Start { user_id: UserId },
    /// A button press on a rendered prompt
    Selection {
        user_id: UserId,
        interaction: InteractionId,
        /// Platform handle used to acknowledge the press
        callback_id: String,
        payload: String,
    },
}

impl InboundEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            InboundEvent::Start { user_id } | InboundEvent::Selection { user_id, .. } => *user_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport request failed: {0}")]
    Http(String),
    #[error("Transport API error: {0}")]
    Api(String),
    #[error("Failed to decode transport response: {0}")]
    Decode(String),
}

/// Outbound side of the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a new prompt; returns the id used to edit it later
    async fn send_prompt(
        &self,
        user_id: UserId,
        text: &str,
        options: &RenderOptions,
    ) -> Result<InteractionId, TransportError>;

    /// Replace text and buttons of an existing prompt
    async fn edit_prompt(
        &self,
        interaction: InteractionId,
        text: &str,
        options: &RenderOptions,
    ) -> Result<(), TransportError>;

    /// Acknowledge a button press so the client stops waiting
    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError>;
}

/// Inbound side of the chat platform
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Wait for the next batch of events (may be empty)
    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError>;
}
