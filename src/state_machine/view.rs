//! User-facing prompt copy for each stage and outcome

use super::effect::{Choice, Prompt};
use super::state::{Language, Session, Stage, Topic};
use crate::generation::GenerationOutcome;

const WELCOME: &str = "Vichar AI mein aapka swagat hai! Bhasha chunein:";
const AGAIN: &str = "Ek aur vichar? Bhasha chunein:";
const TOPIC: &str = "Topic chunein:";
const THINKING: &str = "🤔 AI Vichar kar raha hai...";
const STILL_THINKING: &str = "⏳ Pichla vichar abhi tayyar ho raha hai, thoda intezaar karein.";
const EMPTY: &str = "🤷 AI ne koi jawab nahi diya. Dobara koshish karein.";

pub fn language_menu() -> Prompt {
    Prompt::plain(WELCOME).with_choices(
        Language::ALL
            .into_iter()
            .map(|l| Choice::new(l.label(), l.payload())),
    )
}

/// Language menu sent after a finished round
pub fn next_round_menu() -> Prompt {
    Prompt {
        text: AGAIN.to_string(),
        ..language_menu()
    }
}

pub fn topic_menu() -> Prompt {
    Prompt::plain(TOPIC).with_choices(
        Topic::ALL
            .into_iter()
            .map(|t| Choice::new(t.label(), t.payload())),
    )
}

pub fn thinking() -> Prompt {
    Prompt::plain(THINKING)
}

pub fn still_thinking() -> Prompt {
    Prompt::plain(STILL_THINKING)
}

/// The prompt matching the session's current stage, for re-rendering a
/// pressed prompt. While generating, the pressed prompt may not be the one
/// the outcome will land on, so it gets a notice rather than the placeholder.
pub fn current(session: &Session) -> Prompt {
    match session.stage {
        Stage::AwaitingLanguage => language_menu(),
        Stage::AwaitingTopic => topic_menu(),
        Stage::AwaitingGeneration => still_thinking(),
    }
}

pub fn outcome(outcome: &GenerationOutcome) -> Prompt {
    match outcome {
        GenerationOutcome::Success(text) => {
            Prompt::rich(format!("✨ <b>Vichar</b> ✨\n\n{}", escape_html(text)))
        }
        GenerationOutcome::EmptyResult => Prompt::plain(EMPTY),
        GenerationOutcome::Failure(detail) => Prompt::plain(format!("❌ ERROR: {detail}")),
    }
}

/// Escape text for Telegram's HTML parse mode so it shows verbatim
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
