//! Session state types

use std::fmt;

/// Opaque identifier of a chat user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rendered prompt the user can interact with (a message carrying buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractionId {
    pub chat_id: i64,
    pub message_id: i64,
}

impl InteractionId {
    pub fn new(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

/// Output language for generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Hindi,
    English,
    Hinglish,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Hindi, Language::English, Language::Hinglish];

    /// Button payload carried by the language menu
    pub fn payload(self) -> &'static str {
        match self {
            Language::Hindi => "l_hi",
            Language::English => "l_en",
            Language::Hinglish => "l_hg",
        }
    }

    pub fn from_payload(payload: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.payload() == payload)
    }

    /// BCP 47 tag attached to generation requests
    pub fn tag(self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::English => "en",
            Language::Hinglish => "hi-Latn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Hindi => "Hindi (देवनागरी) 🇮🇳",
            Language::English => "English 🇺🇸",
            Language::Hinglish => "Hinglish (Roman) 🔤",
        }
    }
}

/// Subject of the generated fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Science,
    Politics,
    Philosophy,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Science, Topic::Politics, Topic::Philosophy];

    pub fn payload(self) -> &'static str {
        match self {
            Topic::Science => "t_sci",
            Topic::Politics => "t_pol",
            Topic::Philosophy => "t_phi",
        }
    }

    pub fn from_payload(payload: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.payload() == payload)
    }

    /// Token embedded verbatim in the generation prompt
    pub fn token(self) -> &'static str {
        match self {
            Topic::Science => "science",
            Topic::Politics => "politics",
            Topic::Philosophy => "philosophy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Topic::Science => "Science 🧪",
            Topic::Politics => "Politics ⚖️",
            Topic::Philosophy => "Philosophy 🧘",
        }
    }
}

/// Where the user is in the decision tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Stage {
    #[default]
    AwaitingLanguage,
    AwaitingTopic,
    /// A generation request is in flight
    AwaitingGeneration,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::AwaitingLanguage => "awaiting_language",
            Stage::AwaitingTopic => "awaiting_topic",
            Stage::AwaitingGeneration => "awaiting_generation",
        }
    }
}

/// Per-user conversational state
///
/// `topic` is only ever set together with `language`; the transition
/// function is the sole writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub language: Option<Language>,
    pub topic: Option<Topic>,
    pub stage: Stage,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            language: None,
            topic: None,
            stage: Stage::AwaitingLanguage,
        }
    }

    /// Same user, fresh round
    pub fn reset(&self) -> Self {
        Self::new(self.user_id)
    }
}
