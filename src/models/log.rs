use serde::{Deserialize, Serialize};

/// One line of the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub tag: LogTag,
    pub text: String,
}

/// Session log categories shown to players.
///
/// GM rulings are also written to the log but are never surfaced, so they have
/// no variant here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogTag {
    Event,
    Discovery,
    Thread,
    Advance,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Discovery => "discovery",
            Self::Thread => "thread",
            Self::Advance => "advance",
        }
    }

    /// Parse a tag as written in the log. `world-advance` is an alias for `advance`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "event" => Some(Self::Event),
            "discovery" => Some(Self::Discovery),
            "thread" => Some(Self::Thread),
            "advance" | "world-advance" => Some(Self::Advance),
            _ => None,
        }
    }
}
