//! Bot runtime
//!
//! Feeds inbound events through the state machine and executes the effects
//! it returns. Each inbound event is its own task; the per-user session
//! lock is held only while a transition is applied, never across the
//! backend call.

#[cfg(test)]
pub mod testing;

use crate::generation::GenerationDispatcher;
use crate::session::SessionStore;
use crate::state_machine::{transition, Effect, Event, UserId};
use crate::transport::{EventSource, InboundEvent, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause after a failed poll before trying again
const POLL_BACKOFF: Duration = Duration::from_secs(3);

pub struct Bot<T: Transport + 'static> {
    sessions: Arc<SessionStore>,
    dispatcher: Arc<GenerationDispatcher>,
    transport: Arc<T>,
}

impl<T: Transport + 'static> Clone for Bot<T> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            dispatcher: self.dispatcher.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl<T: Transport + 'static> Bot<T> {
    pub fn new(
        sessions: Arc<SessionStore>,
        dispatcher: Arc<GenerationDispatcher>,
        transport: Arc<T>,
    ) -> Self {
        Self {
            sessions,
            dispatcher,
            transport,
        }
    }

    /// Poll `source` until `cancel` fires, handling every event on its own task
    pub async fn run<E: EventSource>(&self, source: &E, cancel: &CancellationToken) {
        tracing::info!("Bot is polling for updates");

        loop {
            let batch = tokio::select! {
                () = cancel.cancelled() => break,
                batch = source.next_events() => batch,
            };

            match batch {
                Ok(events) => {
                    for event in events {
                        let bot = self.clone();
                        tokio::spawn(async move { bot.handle(event).await });
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Polling failed, backing off");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(POLL_BACKOFF) => {}
                    }
                }
            }
        }

        tracing::info!("Bot stopped polling");
    }

    /// Handle one inbound event to completion, including any generation it
    /// triggers
    pub async fn handle(&self, inbound: InboundEvent) {
        let user_id = inbound.user_id();
        let event = match inbound {
            InboundEvent::Start { .. } => Event::Start,
            InboundEvent::Selection {
                interaction,
                callback_id,
                payload,
                ..
            } => {
                if let Err(e) = self.transport.acknowledge(&callback_id).await {
                    tracing::warn!(user = %user_id, error = %e, "Failed to acknowledge selection");
                }
                Event::from_selection(interaction, &payload)
            }
        };
        self.process_event(user_id, event).await;
    }

    async fn process_event(&self, user_id: UserId, event: Event) {
        // Effects may produce follow-up events (generation outcomes)
        let mut pending = vec![event];

        while let Some(event) = pending.pop() {
            let event_name = event.name();
            let (effects, misuse) = self
                .sessions
                .update(user_id, |session| {
                    let result = transition(session, event);
                    *session = result.new_state;
                    tracing::debug!(user = %user_id, stage = session.stage.as_str(), "Session updated");
                    (result.effects, result.misuse)
                })
                .await;

            if let Some(misuse) = misuse {
                tracing::debug!(user = %user_id, event = event_name, reason = %misuse, "Ignored event");
            }

            for effect in effects {
                if let Some(next) = self.execute_effect(user_id, effect).await {
                    pending.push(next);
                }
            }
        }
    }

    async fn execute_effect(&self, user_id: UserId, effect: Effect) -> Option<Event> {
        match effect {
            Effect::SendPrompt { prompt } => {
                if let Err(e) = self
                    .transport
                    .send_prompt(user_id, &prompt.text, &prompt.options)
                    .await
                {
                    tracing::warn!(user = %user_id, error = %e, "Failed to send prompt");
                }
                None
            }
            Effect::EditPrompt {
                interaction,
                prompt,
            } => {
                if let Err(e) = self
                    .transport
                    .edit_prompt(interaction, &prompt.text, &prompt.options)
                    .await
                {
                    tracing::warn!(user = %user_id, error = %e, "Failed to edit prompt");
                }
                None
            }
            Effect::Generate {
                interaction,
                request,
            } => {
                let outcome = self.dispatcher.dispatch(&request).await;
                Some(Event::GenerationFinished {
                    interaction,
                    outcome,
                })
            }
        }
    }
}
