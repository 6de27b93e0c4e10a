use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    pub description: String,
    pub status: QuestStatus,
}

/// The bucket a quest sits in.
///
/// - `Active`: The party is pursuing it now
/// - `Developing`: Hooks the party has heard about but not taken up
/// - `Completed`: Resolved, kept for reference
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    #[default]
    Active,
    Developing,
    Completed,
}

impl QuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Developing => "developing",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "developing" => Some(Self::Developing),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}
