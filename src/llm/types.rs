//! Common types for backend interactions

use std::fmt;

/// An operation a backend model supports
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    GenerateText,
    CountTokens,
    EmbedContent,
    Other(String),
}

impl Capability {
    /// Map a Gemini `supportedGenerationMethods` entry
    pub fn from_method(method: &str) -> Self {
        match method {
            "generateContent" => Capability::GenerateText,
            "countTokens" => Capability::CountTokens,
            "embedContent" => Capability::EmbedContent,
            other => Capability::Other(other.to_string()),
        }
    }
}

/// A catalogue entry as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Bare model name, e.g. `gemini-1.5-flash` (no `models/` prefix)
    pub name: String,
    pub capabilities: Vec<Capability>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, capabilities: Vec<Capability>) -> Self {
        Self {
            name: name.into(),
            capabilities,
        }
    }

    /// A model that can generate text
    pub fn generative(name: impl Into<String>) -> Self {
        Self::new(name, vec![Capability::GenerateText, Capability::CountTokens])
    }

    pub fn supports(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }
}

/// How a `ModelHandle` was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    /// Configured by the operator, catalogue not consulted
    Pinned,
    /// Chosen from the backend catalogue
    Catalogue,
    /// Hardcoded last resort
    Fallback,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelSource::Pinned => "pinned",
            ModelSource::Catalogue => "catalogue",
            ModelSource::Fallback => "fallback",
        })
    }
}

/// The model generation requests are sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    pub identifier: String,
    pub capabilities: Vec<Capability>,
    pub source: ModelSource,
}

impl ModelHandle {
    pub fn assumed(identifier: impl Into<String>, source: ModelSource) -> Self {
        Self {
            identifier: identifier.into(),
            capabilities: vec![Capability::GenerateText],
            source,
        }
    }

    pub fn from_catalogue(model: &ModelInfo) -> Self {
        Self {
            identifier: model.name.clone(),
            capabilities: model.capabilities.clone(),
            source: ModelSource::Catalogue,
        }
    }
}

/// Generation response
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    /// Concatenated text parts; `None` when the response carried no text
    /// at all (no candidates, blocked prompt, non-text parts only)
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("STOP".to_string()),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
