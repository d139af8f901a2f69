//! Model resolution
//!
//! Picks the model generation requests go to, from the backend catalogue,
//! with a fixed preference order and a hardcoded last resort. The chosen
//! handle is cached for the life of the process and only replaced when a
//! generation call reports it unavailable.

use super::{Capability, GenerationBackend, ModelHandle, ModelInfo, ModelSource};
use regex::Regex;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tokio::sync::{Mutex, RwLock};

/// Used when the catalogue cannot be listed or offers nothing usable
pub const FALLBACK_MODEL: &str = "gemini-1.5-flash";

/// Names served before version tags existed
const LEGACY_MODELS: &[&str] = &["gemini-pro"];

/// `gemini-1.5-flash` -> (1, 5); `gemini-2-pro` -> (2, 0)
static VERSION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gemini-(\d+)(?:\.(\d+))?-").expect("valid version regex"));

fn version_tag(name: &str) -> Option<(u32, u32)> {
    let captures = VERSION_TAG.captures(name)?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures
        .get(2)
        .map_or(Some(0), |m| m.as_str().parse().ok())?;
    Some((major, minor))
}

fn is_experimental(name: &str) -> bool {
    name.contains("-exp") || name.contains("preview")
}

/// Newest version, then stable before experimental, then shortest name,
/// then lexical order
fn newest<'a>(models: impl Iterator<Item = &'a ModelInfo>) -> Option<&'a ModelInfo> {
    models
        .filter_map(|m| version_tag(&m.name).map(|v| (v, m)))
        .max_by_key(|&(version, m)| {
            (
                version,
                !is_experimental(&m.name),
                Reverse(m.name.len()),
                Reverse(m.name.as_str()),
            )
        })
        .map(|(_, m)| m)
}

/// Apply the preference order to a catalogue.
///
/// Only models that can generate text and are not in `excluded` are
/// considered:
/// 1. fast (`flash`) models with a version tag, newest first
/// 2. balanced (`pro`) models with a version tag, newest first
/// 3. a legacy default name
/// 4. whatever comes first
pub fn select_model<'a>(
    catalogue: &'a [ModelInfo],
    excluded: &HashSet<String>,
) -> Option<&'a ModelInfo> {
    let candidates: Vec<&ModelInfo> = catalogue
        .iter()
        .filter(|m| m.supports(&Capability::GenerateText) && !excluded.contains(&m.name))
        .collect();

    newest(candidates.iter().copied().filter(|m| m.name.contains("flash")))
        .or_else(|| newest(candidates.iter().copied().filter(|m| m.name.contains("pro"))))
        .or_else(|| {
            LEGACY_MODELS
                .iter()
                .find_map(|legacy| candidates.iter().copied().find(|m| m.name == *legacy))
        })
        .or_else(|| candidates.first().copied())
}

/// Process-wide resolver with a cached handle
pub struct ModelResolver {
    backend: Arc<dyn GenerationBackend>,
    pinned: Option<String>,
    cached: RwLock<Option<Arc<ModelHandle>>>,
    /// Models reported unavailable; the lock also serializes resolution
    unavailable: Mutex<HashSet<String>>,
}

impl ModelResolver {
    pub fn new(backend: Arc<dyn GenerationBackend>, pinned: Option<String>) -> Self {
        Self {
            backend,
            pinned,
            cached: RwLock::new(None),
            unavailable: Mutex::new(HashSet::new()),
        }
    }

    /// The cached handle, resolving it first if needed
    pub async fn current(&self) -> Arc<ModelHandle> {
        if let Some(handle) = self.cached.read().await.clone() {
            return handle;
        }

        let unavailable = self.unavailable.lock().await;
        // Another caller may have resolved while we waited
        if let Some(handle) = self.cached.read().await.clone() {
            return handle;
        }

        let handle = Arc::new(self.resolve(&unavailable).await);
        tracing::info!(
            model = %handle.identifier,
            source = %handle.source,
            "Resolved generation model"
        );
        *self.cached.write().await = Some(handle.clone());
        handle
    }

    /// The cached handle without triggering resolution
    pub async fn peek(&self) -> Option<Arc<ModelHandle>> {
        self.cached.read().await.clone()
    }

    /// Record that `model` cannot serve requests. If it is the cached
    /// handle, the next `current()` re-resolves without it.
    pub async fn mark_unavailable(&self, model: &str) {
        let mut unavailable = self.unavailable.lock().await;
        unavailable.insert(model.to_string());

        let mut cached = self.cached.write().await;
        if cached.as_ref().is_some_and(|h| h.identifier == model) {
            tracing::warn!(model = %model, "Model unavailable, will re-resolve");
            *cached = None;
        }
    }

    async fn resolve(&self, unavailable: &HashSet<String>) -> ModelHandle {
        if let Some(pinned) = self.pinned.as_ref().filter(|p| !unavailable.contains(*p)) {
            return ModelHandle::assumed(pinned.clone(), ModelSource::Pinned);
        }

        match self.backend.list_models().await {
            Ok(catalogue) => {
                if let Some(model) = select_model(&catalogue, unavailable) {
                    return ModelHandle::from_catalogue(model);
                }
                tracing::warn!(
                    listed = catalogue.len(),
                    fallback = FALLBACK_MODEL,
                    "No usable model in catalogue, using fallback"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = FALLBACK_MODEL,
                    "Model catalogue unavailable, using fallback"
                );
            }
        }

        ModelHandle::assumed(FALLBACK_MODEL, ModelSource::Fallback)
    }
}
