use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Platform;

/// Outbound frame (page -> privileged).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub query_text: String,
    pub platform: Platform,
}

/// A candidate reply. Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Suggestion {
    pub text: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Inbound frame (privileged -> page): `{ "suggestions": [...] }` or
/// `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Suggestions { suggestions: Vec<Suggestion> },
    Error { error: String },
}

impl RelayResponse {
    pub fn suggestions<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RelayResponse::Suggestions {
            suggestions: texts.into_iter().map(Suggestion::new).collect(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        RelayResponse::Error {
            error: message.into(),
        }
    }
}

/// Identity of a trigger: which settled message asked for suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerKey {
    pub position: usize,
    pub text: String,
}

/// A request proposed by the observer bridge, with the trigger it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTrigger {
    pub key: TriggerKey,
    pub request: RelayRequest,
}

/// Role of the single page <-> privileged channel.
///
/// Older builds named it `messageData`; both names resolve to the same role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelName {
    #[default]
    ConversationData,
}

impl ChannelName {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelName::ConversationData => "conversationData",
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown relay channel name: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for ChannelName {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conversationData" | "messageData" => Ok(ChannelName::ConversationData),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}
