//! Telegram Bot API transport (long polling)

use super::{EventSource, InboundEvent, Transport, TransportError};
use crate::state_machine::{InteractionId, RenderMode, RenderOptions, UserId};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";
const POLL_TIMEOUT_SECS: u64 = 30;
/// Telegram rejects longer message texts
const MESSAGE_LIMIT: usize = 4096;
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];
const NOT_MODIFIED: &str = "message is not modified";

pub struct TelegramTransport {
    client: Client,
    /// `{API_BASE}/bot{token}`
    base_url: String,
    /// Next update id to request
    offset: AtomicI64,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Result<Self, TransportError> {
        Self::with_api_base(token, API_BASE)
    }

    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            // Must outlast the long-poll window
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 30))
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            offset: AtomicI64::new(0),
        })
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TransportError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        // `without_url` keeps the bot token out of error strings
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(params)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.without_url().to_string()))?;

        let body: TelegramResponse<R> = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.without_url().to_string()))?;

        if body.ok {
            body.result
                .ok_or_else(|| TransportError::Decode(format!("{method}: missing result")))
        } else {
            Err(TransportError::Api(format!(
                "{method}: {}",
                body.description.unwrap_or_else(|| "unknown error".to_string())
            )))
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_prompt(
        &self,
        user_id: UserId,
        text: &str,
        options: &RenderOptions,
    ) -> Result<InteractionId, TransportError> {
        let params = SendMessage {
            chat_id: user_id.0,
            text: fit_to_limit(text, options.mode),
            parse_mode: parse_mode(options.mode),
            reply_markup: keyboard(options),
        };
        let message: TelegramMessage = self.call("sendMessage", &params).await?;
        Ok(InteractionId::new(message.chat.id, message.message_id))
    }

    async fn edit_prompt(
        &self,
        interaction: InteractionId,
        text: &str,
        options: &RenderOptions,
    ) -> Result<(), TransportError> {
        let params = EditMessageText {
            chat_id: interaction.chat_id,
            message_id: interaction.message_id,
            text: fit_to_limit(text, options.mode),
            parse_mode: parse_mode(options.mode),
            reply_markup: keyboard(options),
        };
        edit_result(self.call("editMessageText", &params).await)
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TransportError> {
        let params = AnswerCallbackQuery {
            callback_query_id: callback_id,
        };
        let _: IgnoredAny = self.call("answerCallbackQuery", &params).await?;
        Ok(())
    }
}

#[async_trait]
impl EventSource for TelegramTransport {
    async fn next_events(&self) -> Result<Vec<InboundEvent>, TransportError> {
        let params = GetUpdates {
            offset: self.offset.load(Ordering::SeqCst),
            timeout: POLL_TIMEOUT_SECS,
            allowed_updates: ALLOWED_UPDATES,
        };
        let updates: Vec<Update> = self.call("getUpdates", &params).await?;

        if let Some(last) = updates.last() {
            self.offset.fetch_max(last.update_id + 1, Ordering::SeqCst);
        }

        Ok(updates.into_iter().filter_map(to_inbound).collect())
    }
}

/// Translate an update into a bot event; anything else (free text, other
/// commands, presses on inaccessible messages) is dropped
fn to_inbound(update: Update) -> Option<InboundEvent> {
    if let Some(query) = update.callback_query {
        let message = query.message?;
        return Some(InboundEvent::Selection {
            user_id: UserId(query.from.id),
            interaction: InteractionId::new(message.chat.id, message.message_id),
            callback_id: query.id,
            payload: query.data.unwrap_or_default(),
        });
    }

    let message = update.message?;
    let command = message.text.as_deref()?.split_whitespace().next()?;
    // Group chats address commands as `/start@BotName`
    if command.split('@').next() == Some("/start") {
        let user_id = message.from.map_or(message.chat.id, |u| u.id);
        Some(InboundEvent::Start {
            user_id: UserId(user_id),
        })
    } else {
        None
    }
}

/// Re-rendering an unchanged prompt is not a failure
fn edit_result(result: Result<IgnoredAny, TransportError>) -> Result<(), TransportError> {
    match result {
        Err(TransportError::Api(description)) if description.contains(NOT_MODIFIED) => Ok(()),
        result => result.map(|_| ()),
    }
}

fn parse_mode(mode: RenderMode) -> Option<&'static str> {
    match mode {
        RenderMode::Plain => None,
        RenderMode::Rich => Some("HTML"),
    }
}

/// One button per row, in menu order
fn keyboard(options: &RenderOptions) -> Option<InlineKeyboardMarkup> {
    if options.choices.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup {
        inline_keyboard: options
            .choices
            .iter()
            .map(|c| {
                vec![InlineKeyboardButton {
                    text: c.label.clone(),
                    callback_data: c.payload.clone(),
                }]
            })
            .collect(),
    })
}

/// Cut text to the platform limit without splitting an HTML entity
fn fit_to_limit(text: &str, mode: RenderMode) -> Cow<'_, str> {
    if text.chars().count() <= MESSAGE_LIMIT {
        return Cow::Borrowed(text);
    }

    let mut cut: String = text.chars().take(MESSAGE_LIMIT - 1).collect();
    if mode == RenderMode::Rich {
        if let Some(amp) = cut.rfind('&') {
            if cut.rfind(';').is_none_or(|semi| semi < amp) {
                cut.truncate(amp);
            }
        }
    }
    cut.push('…');
    Cow::Owned(cut)
}

// Telegram Bot API types

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<TelegramMessage>,
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    id: String,
    from: User,
    message: Option<TelegramMessage>,
    data: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessageText<'a> {
    chat_id: i64,
    message_id: i64,
    text: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    /// Omitting the markup removes the buttons
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardMarkup {
    inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton {
    text: String,
    callback_data: String,
}
