use serde::{Deserialize, Serialize};

/// The player character sheet.
///
/// Identity and vitals come from the document frontmatter; inventory, gold and
/// gear slots come from the markdown body. `hp <= max_hp` is not enforced: the
/// values are passed through as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub ancestry: String,
    pub class: String,
    pub level: u32,
    pub background: String,
    pub hp: i64,
    pub max_hp: i64,
    pub armor: i64,
    pub gold: u64,
    pub stats: Vec<StatBlock>,
    pub training: Vec<String>,
    pub countdown_dice: Vec<CountdownDie>,
    pub inventory: Vec<InventoryItem>,
    pub slots_used: u32,
    pub slots_max: u32,
    pub class_features: Vec<Feature>,
    pub ancestry_traits: Vec<Feature>,
    pub location: Location,
}

/// A single ability score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Upper-cased stat name, e.g. `STR`.
    pub name: String,
    pub value: i64,
    /// Skill name when the character is trained under this stat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained: Option<String>,
}

/// A consumable resource tracked with a shrinking die (torches, rations, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownDie {
    pub name: String,
    pub icon: String,
    /// Standard die notation, e.g. `d6`.
    pub die: String,
    /// Set when the die is down to four faces or fewer.
    pub low: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub icon: String,
    pub detail: String,
    pub worn: bool,
}

/// A named class feature or ancestry trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
}

/// Where the character currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub description: String,
    pub danger: DangerLevel,
}

/// How dangerous a location is.
///
/// - `Safe`: No threat; rest is possible
/// - `Unsafe`: Random encounters may occur
/// - `Risky`: Active threat, encounters are likely
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DangerLevel {
    #[default]
    Safe,
    Unsafe,
    Risky,
}

impl DangerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Unsafe => "unsafe",
            Self::Risky => "risky",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "safe" => Some(Self::Safe),
            "unsafe" => Some(Self::Unsafe),
            "risky" => Some(Self::Risky),
            _ => None,
        }
    }
}
