//! Vichar bot
//!
//! A Telegram bot that asks for a language and a topic, then replies with a
//! short generated fact. Conversation flow is a pure state machine; the
//! runtime executes its effects against Telegram and Gemini.

mod config;
mod generation;
mod health;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod transport;

use config::BotConfig;
use generation::GenerationDispatcher;
use health::HealthState;
use llm::{GeminiBackend, GenerationBackend, LoggingBackend, ModelResolver};
use runtime::Bot;
use session::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::TelegramTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vichar_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;
    tracing::info!(?config, "Configuration loaded");

    // Generation backend
    let gemini: Arc<dyn GenerationBackend> = Arc::new(GeminiBackend::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.as_deref(),
    )?);
    let backend: Arc<dyn GenerationBackend> = Arc::new(LoggingBackend::new(gemini));
    let resolver = Arc::new(ModelResolver::new(
        backend.clone(),
        config.pinned_model.clone(),
    ));

    // Resolve eagerly so the first user does not wait on the catalogue
    let model = resolver.current().await;
    tracing::info!(model = %model.identifier, source = %model.source, "Model resolved");

    let dispatcher = Arc::new(GenerationDispatcher::new(
        resolver.clone(),
        backend,
        config.generation_timeout,
    ));
    let sessions = Arc::new(SessionStore::new());
    let transport = Arc::new(TelegramTransport::new(&config.telegram_token)?);
    let bot = Bot::new(sessions.clone(), dispatcher, transport.clone());

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown requested");
            }
            cancel.cancel();
        });
    }

    // Keep-alive listener
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let health = {
        let state = HealthState { resolver, sessions };
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(addr, state, cancel).await {
                tracing::error!(%addr, error = %e, "Keep-alive listener failed");
            }
        })
    };

    bot.run(transport.as_ref(), &cancel).await;

    cancel.cancel();
    health.await?;
    tracing::info!("Vichar bot stopped");
    Ok(())
}
