use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Calendar, Character, ClockEntry, GmNotes, LogEntry, MythEntry, Npc, Quest};

/// One complete, internally consistent view of the campaign world.
///
/// A snapshot is built in one piece by the loader and replaced wholesale by the
/// next refresh. The `status` field is private because `Empty` is derived from
/// the contents rather than set by callers; use the constructors below.
///
/// # Lifecycle
/// `initial` (Empty) → `loading` → `assemble` (Empty | Loaded) → ... with
/// `failed` (Error) whenever a refresh cannot reach any source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    status: WorldStatus,
    pub character: Option<Character>,
    pub npcs: Vec<Npc>,
    pub quests: Vec<Quest>,
    pub log_entries: Vec<LogEntry>,
    pub dooms: Vec<MythEntry>,
    pub clocks: Vec<ClockEntry>,
    pub calendar: Option<Calendar>,
    pub gm_notes: Option<GmNotes>,
    /// When this snapshot was assembled. `None` until the first refresh lands.
    pub updated_at: Option<DateTime<Utc>>,
}

/// The parsed pieces a snapshot is assembled from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldParts {
    pub character: Option<Character>,
    pub npcs: Vec<Npc>,
    pub quests: Vec<Quest>,
    pub log_entries: Vec<LogEntry>,
    pub dooms: Vec<MythEntry>,
    pub clocks: Vec<ClockEntry>,
    pub calendar: Option<Calendar>,
    pub gm_notes: Option<GmNotes>,
}

/// Overall state of the world as seen by the view layer.
///
/// - `Empty`: No character, quests or dooms yet (campaign not started)
/// - `Loading`: The first refresh is in flight
/// - `Loaded`: At least one of character, quests or dooms is present
/// - `Error`: The last refresh could not reach any source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorldStatus {
    Empty,
    Loading,
    Loaded,
    Error,
}

impl WorldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "empty" => Some(Self::Empty),
            "loading" => Some(Self::Loading),
            "loaded" => Some(Self::Loaded),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl WorldSnapshot {
    /// The snapshot before anything has been fetched.
    pub fn initial() -> Self {
        Self::from_parts(WorldStatus::Empty, WorldParts::default(), None)
    }

    /// Build a snapshot from one retrieval round, deriving `Empty` vs `Loaded`.
    pub fn assemble(parts: WorldParts, updated_at: DateTime<Utc>) -> Self {
        let status = if parts.character.is_none() && parts.quests.is_empty() && parts.dooms.is_empty()
        {
            WorldStatus::Empty
        } else {
            WorldStatus::Loaded
        };
        Self::from_parts(status, parts, Some(updated_at))
    }

    /// The same contents as `previous`, marked as loading.
    pub fn loading(previous: &WorldSnapshot) -> Self {
        Self {
            status: WorldStatus::Loading,
            ..previous.clone()
        }
    }

    /// The same contents as `previous`, marked as failed.
    ///
    /// Whether stale contents are worth showing is up to the caller; pass
    /// [`WorldSnapshot::initial`] to drop them.
    pub fn failed(previous: &WorldSnapshot) -> Self {
        Self {
            status: WorldStatus::Error,
            ..previous.clone()
        }
    }

    pub fn status(&self) -> WorldStatus {
        self.status
    }

    fn from_parts(status: WorldStatus, parts: WorldParts, updated_at: Option<DateTime<Utc>>) -> Self {
        let WorldParts {
            character,
            npcs,
            quests,
            log_entries,
            dooms,
            clocks,
            calendar,
            gm_notes,
        } = parts;
        Self {
            status,
            character,
            npcs,
            quests,
            log_entries,
            dooms,
            clocks,
            calendar,
            gm_notes,
            updated_at,
        }
    }
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestStatus;

    fn quest() -> Quest {
        Quest {
            name: "Find the Ledger".to_string(),
            description: "It went missing".to_string(),
            status: QuestStatus::Active,
        }
    }

    #[test]
    fn empty_when_no_character_quests_or_dooms() {
        let parts = WorldParts {
            npcs: vec![Npc {
                name: "Mara".to_string(),
                location: String::new(),
                role: "NPC".to_string(),
                disposition: Default::default(),
            }],
            ..Default::default()
        };
        let snapshot = WorldSnapshot::assemble(parts, Utc::now());
        assert_eq!(snapshot.status(), WorldStatus::Empty);
        assert_eq!(snapshot.npcs.len(), 1);
    }

    #[test]
    fn loaded_when_any_quest_exists() {
        let parts = WorldParts {
            quests: vec![quest()],
            ..Default::default()
        };
        let snapshot = WorldSnapshot::assemble(parts, Utc::now());
        assert_eq!(snapshot.status(), WorldStatus::Loaded);
        assert!(snapshot.updated_at.is_some());
    }

    #[test]
    fn failed_keeps_previous_contents() {
        let parts = WorldParts {
            quests: vec![quest()],
            ..Default::default()
        };
        let good = WorldSnapshot::assemble(parts, Utc::now());
        let failed = WorldSnapshot::failed(&good);
        assert_eq!(failed.status(), WorldStatus::Error);
        assert_eq!(failed.quests, good.quests);
    }
}
