//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use crate::llm::{GenerationBackend, LlmError, LlmResponse, ModelInfo};
use crate::state_machine::{InteractionId, RenderOptions, UserId};
use crate::transport::{EventSource, InboundEvent, Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock generation backend
// ============================================================================

/// Backend that returns queued responses and records every call
pub struct MockBackend {
    models: Vec<ModelInfo>,
    listing_error: Mutex<Option<LlmError>>,
    listing_hangs: AtomicBool,
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    generations: Mutex<Vec<(String, String)>>,
    list_calls: AtomicUsize,
}

impl MockBackend {
    /// Catalogue of text-generation models with the given names
    pub fn with_models(names: &[&str]) -> Self {
        Self {
            models: names.iter().map(|n| ModelInfo::generative(*n)).collect(),
            listing_error: Mutex::new(None),
            listing_hangs: AtomicBool::new(false),
            responses: Mutex::new(VecDeque::new()),
            generations: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn queue_text(&self, text: &str) {
        self.queue_response(LlmResponse::text(text));
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Make every catalogue listing fail with `error`
    pub fn fail_listing(&self, error: LlmError) {
        *self.listing_error.lock().unwrap() = Some(error);
    }

    /// Make every catalogue listing stall for an hour
    pub fn hang_listing(&self) {
        self.listing_hangs.store(true, Ordering::SeqCst);
    }

    /// `(model, prompt)` for every generate call
    pub fn recorded_generations(&self) -> Vec<(String, String)> {
        self.generations.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<LlmResponse, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.listing_hangs.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if let Some(error) = self.listing_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.models.clone())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError> {
        self.generations
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        self.next_response()
    }

    fn provider(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Delayed mock backend (for timeout and in-flight testing)
// ============================================================================

/// Backend that sleeps before answering each generate call
pub struct DelayedMockBackend {
    inner: MockBackend,
    delay: Duration,
    /// Notified when a generate call starts
    pub request_started: Arc<Notify>,
}

impl DelayedMockBackend {
    pub fn new(models: &[&str], delay: Duration) -> Self {
        Self {
            inner: MockBackend::with_models(models),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_text(&self, text: &str) {
        self.inner.queue_text(text);
    }

    pub fn recorded_generations(&self) -> Vec<(String, String)> {
        self.inner.recorded_generations()
    }
}

#[async_trait]
impl GenerationBackend for DelayedMockBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        self.inner.list_models().await
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError> {
        self.inner
            .generations
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        // notify_one keeps a permit for a waiter that has not subscribed yet
        self.request_started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.next_response()
    }

    fn provider(&self) -> &str {
        "mock-delayed"
    }
}

// ============================================================================
// Mock transport
// ============================================================================

/// A prompt as the transport received it
#[derive(Debug, Clone)]
pub struct Rendered {
    pub interaction: InteractionId,
    pub text: String,
    pub options: RenderOptions,
}

/// Transport that records sends, edits and acknowledgements, and replays
/// queued inbound batches
pub struct MockTransport {
    next_message_id: AtomicI64,
    sent: Mutex<Vec<Rendered>>,
    edits: Mutex<Vec<Rendered>>,
    acks: Mutex<Vec<String>>,
    inbound: Mutex<VecDeque<Vec<InboundEvent>>>,
    failing: AtomicBool,
    sent_changed: Notify,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(100),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            acks: Mutex::new(Vec::new()),
            inbound: Mutex::new(VecDeque::new()),
            failing: AtomicBool::new(false),
            sent_changed: Notify::new(),
        }
    }

    /// Every outbound call fails from now on (nothing is recorded)
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn queue_inbound(&self, batch: Vec<InboundEvent>) {
        self.inbound.lock().unwrap().push_back(batch);
    }

    pub fn sent(&self) -> Vec<Rendered> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Option<InteractionId> {
        self.sent.lock().unwrap().last().map(|r| r.interaction)
    }

    /// Edits applied to one prompt, oldest first
    pub fn edits_of(&self, interaction: InteractionId) -> Vec<Rendered> {
        self.edits
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.interaction == interaction)
            .cloned()
            .collect()
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acks.lock().unwrap().clone()
    }

    /// Wait until at least `count` prompts were sent
    pub async fn wait_for_sent(&self, count: usize) {
        loop {
            let changed = self.sent_changed.notified();
            if self.sent.lock().unwrap().len() >= count {
                return;
            }
            changed.await;
        }
    }

    fn check_failing(&self) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(TransportError::Http("mock transport is down".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_prompt(
        &self,
        user_id: UserId,
        text: &str,
        options: &RenderOptions,
    ) -> Result<InteractionId, TransportError> {
        self.check_failing()?;
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        let interaction = InteractionId::new(user_id.0, message_id);
        self.sent.lock().unwrap().push(Rendered {
            interaction,
            text: text.to_string(),
            options: options.clone(),
        });
        self.sent_changed.notify_waiters();
        Ok(interaction)
    }

    async fn edit_prompt(
        &self,
        interaction: InteractionId,
        text: &str,
        options: &RenderOptions,
    ) -> Result<(), TransportError> {
        self.check_failing()?;
        self.edits.lock().unwrap().push(Rendered {
            interaction,
            text: text.to_string(),
            options: options.clone(),
        });
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        self.check_failing()?;
        self.acks.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl EventSource for MockTransport {
    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError> {
        let batch = self.inbound.lock().unwrap().pop_front();
        match batch {
            Some(events) => Ok(events),
            None => {
                // Stand-in for a long poll that returned nothing
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(Vec::new())
            }
        }
    }
}
