//! Generation dispatch
//!
//! Builds a backend request from the session's language and topic, runs it
//! against the resolved model under a timeout, and maps the result to a
//! user-visible outcome.

use crate::llm::{GenerationBackend, LlmErrorKind, LlmResponse, ModelResolver};
use crate::state_machine::{Language, Topic};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// A single backend request, built fresh per topic selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub language: Language,
}

impl GenerationRequest {
    pub fn language_tag(&self) -> &'static str {
        self.language.tag()
    }
}

/// What the user gets to see for a generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success(String),
    /// The backend answered but carried no text
    EmptyResult,
    /// Error detail, shown to the user as-is
    Failure(String),
}

impl GenerationOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationOutcome::Success(_) => "success",
            GenerationOutcome::EmptyResult => "empty",
            GenerationOutcome::Failure(_) => "failure",
        }
    }

    fn from_response(response: LlmResponse) -> Self {
        match response.text {
            Some(text) if !text.trim().is_empty() => GenerationOutcome::Success(text),
            _ => GenerationOutcome::EmptyResult,
        }
    }
}

/// Script directive for each output language.
///
/// English and Hinglish never name a non-Latin script.
fn script_directive(language: Language) -> &'static str {
    match language {
        Language::Hindi => {
            "Write strictly in Hindi language using Devanagari script (हिंदी लिपि) only. \
             Do not use any English alphabets or other non-Devanagari letters."
        }
        Language::English => "Write strictly in English using only the Latin alphabet.",
        Language::Hinglish => {
            "Write in Hinglish: conversational Hindi mixed with English, \
             transliterated entirely in the Latin (Roman) alphabet."
        }
    }
}

/// Compose the backend prompt for a (language, topic) selection
pub fn build_request(language: Language, topic: Topic) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "{} Give a deep and rare {} fact. Keep it engaging.",
            script_directive(language),
            topic.token()
        ),
        language,
    }
}

/// Runs generation requests against the currently resolved model
pub struct GenerationDispatcher {
    resolver: Arc<ModelResolver>,
    backend: Arc<dyn GenerationBackend>,
    timeout: Duration,
}

impl GenerationDispatcher {
    pub fn new(
        resolver: Arc<ModelResolver>,
        backend: Arc<dyn GenerationBackend>,
        timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            backend,
            timeout,
        }
    }

    /// Dispatch one request. Never fails: every error becomes
    /// `GenerationOutcome::Failure`. No retry happens here.
    ///
    /// The timeout covers model resolution as well as the generate call, so
    /// a slow catalogue listing cannot hold the session either.
    pub async fn dispatch(&self, request: &GenerationRequest) -> GenerationOutcome {
        let request_id = uuid::Uuid::new_v4();
        let start = Instant::now();

        tracing::debug!(
            %request_id,
            language = request.language_tag(),
            "Dispatching generation"
        );

        let attempt = async {
            let model = self.resolver.current().await;
            let result = self
                .backend
                .generate(&model.identifier, &request.prompt)
                .await;
            (model, result)
        };

        let (model, outcome) = match timeout(self.timeout, attempt).await {
            Ok((model, Ok(response))) => (Some(model), GenerationOutcome::from_response(response)),
            Ok((model, Err(e))) => {
                if e.kind == LlmErrorKind::ModelUnavailable {
                    self.resolver.mark_unavailable(&model.identifier).await;
                }
                (Some(model), GenerationOutcome::Failure(e.to_string()))
            }
            Err(_) => (
                self.resolver.peek().await,
                GenerationOutcome::Failure(format!(
                    "Generation timed out after {}s",
                    self.timeout.as_secs()
                )),
            ),
        };

        tracing::info!(
            %request_id,
            model = model.as_ref().map_or("unresolved", |m| m.identifier.as_str()),
            duration_ms = %start.elapsed().as_millis(),
            outcome = outcome.kind(),
            "Generation finished"
        );

        outcome
    }
}
