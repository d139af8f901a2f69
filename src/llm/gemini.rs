//! Google Gemini backend implementation

use super::types::{Capability, LlmResponse, ModelInfo, Usage};
use super::{GenerationBackend, LlmError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const PAGE_SIZE: u32 = 1000;
/// Upper bound on catalogue pages, in case the server keeps returning tokens
const MAX_PAGES: usize = 10;

/// Gemini service implementation
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    /// `base_url` overrides the public endpoint (gateway or test server)
    pub fn new(api_key: String, base_url: Option<&str>) -> Result<Self, reqwest::Error> {
        // The dispatcher applies its own, shorter timeout
        let client = Client::builder().timeout(Duration::from_secs(300)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn translate_request(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }

    fn normalize_response(resp: GeminiResponse) -> LlmResponse {
        let usage = resp
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u64::from(u.prompt_token_count),
                output_tokens: u64::from(u.candidates_token_count),
            })
            .unwrap_or_default();

        let Some(candidate) = resp.candidates.into_iter().next() else {
            return LlmResponse {
                text: None,
                finish_reason: resp.prompt_feedback.and_then(|f| f.block_reason),
                usage,
            };
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        LlmResponse {
            text: if texts.is_empty() {
                None
            } else {
                Some(texts.concat())
            },
            finish_reason: candidate.finish_reason,
            usage,
        }
    }

    fn normalize_model(model: &GeminiModel) -> ModelInfo {
        let name = model
            .name
            .strip_prefix("models/")
            .unwrap_or(&model.name)
            .to_string();
        let capabilities = model
            .supported_generation_methods
            .iter()
            .map(|m| Capability::from_method(m.as_str()))
            .collect();
        ModelInfo::new(name, capabilities)
    }

    fn classify_transport_error(e: &reqwest::Error) -> LlmError {
        // Never leak the request URL into user-visible text
        if e.is_timeout() {
            LlmError::network(format!("Request timeout: {e}"))
        } else if e.is_connect() {
            LlmError::network(format!("Connection failed: {e}"))
        } else {
            LlmError::unknown(format!("Request failed: {e}"))
        }
    }

    fn classify_status(status: StatusCode, body: &str) -> LlmError {
        let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(body) else {
            return LlmError::unknown(format!("HTTP {status} error: {body}"));
        };
        let message = error_resp.error.message;
        match status.as_u16() {
            400 => LlmError::invalid_request(format!("Invalid request: {message}")),
            401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
            404 => LlmError::model_unavailable(format!("Model unavailable: {message}")),
            429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
            500..=599 => LlmError::server_error(format!("Server error: {message}")),
            _ => LlmError::unknown(format!("HTTP {status}: {message}")),
        }
    }

    /// Read the body and turn non-success statuses into classified errors
    async fn read_body(response: reqwest::Response) -> Result<String, LlmError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {}", e.without_url())))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Self::classify_status(status, &body))
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = self
                .client
                .get(self.models_url())
                .header(API_KEY_HEADER, &self.api_key)
                .query(&query)
                .send()
                .await
                .map_err(|e| Self::classify_transport_error(&e.without_url()))?;
            let body = Self::read_body(response).await?;

            let page: GeminiModelList = serde_json::from_str(&body)
                .map_err(|e| LlmError::unknown(format!("Failed to parse model list: {e}")))?;
            models.extend(page.models.iter().map(Self::normalize_model));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError> {
        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&Self::translate_request(prompt))
            .send()
            .await
            .map_err(|e| Self::classify_transport_error(&e.without_url()))?;
        let body = Self::read_body(response).await?;

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(Self::normalize_response(gemini_response))
    }

    fn provider(&self) -> &str {
        "gemini"
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Only text parts matter here; other part kinds deserialize with `text: None`
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
    #[allow(dead_code)]
    status: Option<String>,
}
