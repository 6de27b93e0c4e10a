use serde::{Deserialize, Serialize};

/// A doom advancing toward its final omen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MythEntry {
    pub name: String,
    pub omens: u32,
    pub max_omens: u32,
}

/// A segmented progress clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEntry {
    pub name: String,
    pub filled: u32,
    pub total: u32,
}
