use serde::{Deserialize, Serialize};

/// Prep material for the GM screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GmNotes {
    /// Prose of the first prepared strong start.
    pub strong_start: String,
    pub secrets: Vec<SecretEntry>,
    pub npc_moves: Vec<NpcMove>,
}

/// A secret the party has not uncovered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretEntry {
    pub title: String,
    pub description: String,
    /// How the party might discover it.
    pub discovery: String,
}

/// What an NPC is up to off-screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcMove {
    pub name: String,
    pub plan: String,
}
