use serde::{Deserialize, Serialize};

/// A non-player character dossier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub name: String,
    /// Human-readable location label, e.g. `Old Mill` for the slug `old-mill`.
    pub location: String,
    /// Current goal, NPC type, or the literal `NPC`.
    pub role: String,
    pub disposition: Disposition,
}

/// How an NPC feels about the party.
///
/// Anything that is not one of these four values reads as `Neutral`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Friendly,
    #[default]
    Neutral,
    Cautious,
    Hostile,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Neutral => "neutral",
            Self::Cautious => "cautious",
            Self::Hostile => "hostile",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "friendly" => Some(Self::Friendly),
            "neutral" => Some(Self::Neutral),
            "cautious" => Some(Self::Cautious),
            "hostile" => Some(Self::Hostile),
            _ => None,
        }
    }
}
