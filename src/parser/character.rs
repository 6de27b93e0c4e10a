//! Character sheet parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

use super::frontmatter::{scalar_int, scalar_text, split_frontmatter, Frontmatter};
use super::{bullet_text, extract_section};
use crate::models::{
    Character, CountdownDie, DangerLevel, Feature, InventoryItem, Location, StatBlock,
};

const DEFAULT_SLOTS_MAX: u32 = 12;
const FALLBACK_ICON: &str = "\u{1F4E6}";

static GOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*Gold:\*\*\s*(\d+)").unwrap());
static GEAR_SLOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Gear Slots:\*\*\s*(\d+)\s*/\s*(\d+)").unwrap());
static SLOT_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\((\d+)\s+slots?\)").unwrap());
static SLOT_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\(\d+\s+slots?\)").unwrap());
static WORN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)worn|equipped").unwrap());
static WORN_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*·\s*(?:worn|equipped)").unwrap());
static NAMED_DESCRIPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s*\((.+)\)$").unwrap());

/// Parse a character document.
///
/// Returns `None` when the frontmatter has no `name`: the file exists but the
/// character has not been created yet.
pub fn parse_character(raw: &str) -> Option<Character> {
    let (meta, body) = split_frontmatter(raw);
    let name = meta.text("name")?;
    let (hp, max_hp) = hit_points(meta.get("hp"));
    let (slots_used, slots_max) = gear_slots(body);

    Some(Character {
        name,
        ancestry: meta.text("ancestry").unwrap_or_else(|| "Unknown".to_string()),
        class: meta.text("class").unwrap_or_else(|| "Unknown".to_string()),
        level: meta
            .int("level")
            .and_then(|l| u32::try_from(l).ok())
            .unwrap_or(1),
        background: meta.text("background").unwrap_or_default(),
        hp,
        max_hp,
        armor: meta.int("armor").unwrap_or(0),
        gold: gold(body),
        stats: stats(&meta),
        training: meta.list("training"),
        countdown_dice: countdown_dice(&meta),
        inventory: inventory(body),
        slots_used,
        slots_max,
        class_features: features(&meta.list("class_features")),
        ancestry_traits: ancestry_traits(&meta),
        location: Location {
            name: meta
                .text("current_location")
                .unwrap_or_else(|| "Unknown".to_string()),
            description: String::new(),
            // TODO: read danger from the location registry once the world files record it.
            danger: DangerLevel::Safe,
        },
    })
}

/// `hp` is either a bare number (current and max) or `{current, max}`.
fn hit_points(value: Option<&Value>) -> (i64, i64) {
    match value {
        Some(Value::Mapping(pair)) => {
            let current = pair.get("current").and_then(scalar_int);
            let max = pair.get("max").and_then(scalar_int);
            (
                current.or(max).unwrap_or(0),
                max.or(current).unwrap_or(0),
            )
        }
        Some(other) => {
            let hp = scalar_int(other).unwrap_or(0);
            (hp, hp)
        }
        None => (0, 0),
    }
}

fn stats(meta: &Frontmatter) -> Vec<StatBlock> {
    let Some(stats) = meta.mapping("stats") else {
        return Vec::new();
    };
    stats
        .iter()
        .filter_map(|(name, value)| {
            Some(StatBlock {
                name: scalar_text(name)?.to_uppercase(),
                value: scalar_int(value)?,
                trained: None,
            })
        })
        .collect()
}

fn countdown_dice(meta: &Frontmatter) -> Vec<CountdownDie> {
    let Some(dice) = meta.mapping("countdown_dice") else {
        return Vec::new();
    };
    dice.iter()
        .filter_map(|(name, die)| {
            let name = scalar_text(name)?;
            let die = scalar_text(die)?;
            Some(countdown_die(&name, &die))
        })
        .collect()
}

fn countdown_die(name: &str, die: &str) -> CountdownDie {
    let die = match die.strip_prefix("cd") {
        Some(faces) => format!("d{faces}"),
        None => die.to_string(),
    };
    let faces: u32 = die.replacen('d', "", 1).trim().parse().unwrap_or(0);

    CountdownDie {
        name: capitalize(name),
        icon: resource_icon(name).to_string(),
        die,
        low: faces <= 4,
    }
}

fn resource_icon(name: &str) -> &'static str {
    match name.to_lowercase().as_str() {
        "torches" => "\u{1F525}",
        "rations" => "\u{1F356}",
        "arrows" => "\u{1F3F9}",
        "ammo" => "\u{1F3AF}",
        "oil" => "\u{1F9F4}",
        "water" => "\u{1F4A7}",
        _ => FALLBACK_ICON,
    }
}

fn inventory(body: &str) -> Vec<InventoryItem> {
    let Some(section) = extract_section(body, "Inventory") else {
        return Vec::new();
    };
    section.lines().filter_map(bullet_text).map(inventory_item).collect()
}

fn inventory_item(text: &str) -> InventoryItem {
    let worn = WORN.is_match(text);
    let detail = match SLOT_COUNT.captures(text) {
        Some(caps) if &caps[1] == "1" => "1 slot".to_string(),
        Some(caps) => format!("{} slots", &caps[1]),
        None if worn => "worn".to_string(),
        None => String::new(),
    };
    let name = SLOT_ANNOTATION.replace(text, "");
    let name = WORN_ANNOTATION.replace(&name, "");

    InventoryItem {
        name: name.trim().to_string(),
        icon: String::new(),
        detail,
        worn,
    }
}

fn gold(body: &str) -> u64 {
    GOLD.captures(body)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

fn gear_slots(body: &str) -> (u32, u32) {
    GEAR_SLOTS
        .captures(body)
        .and_then(|caps| Some((caps[1].parse().ok()?, caps[2].parse().ok()?)))
        .unwrap_or((0, DEFAULT_SLOTS_MAX))
}

fn features(entries: &[String]) -> Vec<Feature> {
    entries.iter().map(|entry| feature(entry)).collect()
}

/// `Name (description)`, or just `Name`.
fn feature(entry: &str) -> Feature {
    match NAMED_DESCRIPTION.captures(entry) {
        Some(caps) => Feature {
            name: caps[1].trim().to_string(),
            description: caps[2].trim().to_string(),
        },
        None => Feature {
            name: entry.to_string(),
            description: String::new(),
        },
    }
}

fn ancestry_traits(meta: &Frontmatter) -> Vec<Feature> {
    let mut traits = features(&meta.list("ancestry_traits"));
    let languages = meta.list("languages");
    if !languages.is_empty() {
        traits.push(Feature {
            name: "Languages".to_string(),
            description: languages.join(", "),
        });
    }
    traits
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cd_notation_is_normalized() {
        let die = countdown_die("torches", "cd6");
        assert_eq!(die.die, "d6");
        assert_eq!(die.name, "Torches");
        assert_eq!(die.icon, "\u{1F525}");
        assert!(!die.low);
    }

    #[test]
    fn small_or_unreadable_dice_are_low() {
        assert!(countdown_die("rations", "d4").low);
        assert!(countdown_die("rations", "dx").low);
        assert_eq!(countdown_die("rope", "d8").icon, FALLBACK_ICON);
    }

    #[test]
    fn inventory_item_annotations() {
        let item = inventory_item("Chainmail (2 slots) · worn");
        assert_eq!(item.name, "Chainmail");
        assert_eq!(item.detail, "2 slots");
        assert!(item.worn);

        let item = inventory_item("Dagger (1 slot)");
        assert_eq!(item.detail, "1 slot");
        assert!(!item.worn);

        let item = inventory_item("Ring · Equipped");
        assert_eq!(item.name, "Ring");
        assert_eq!(item.detail, "worn");
    }

    #[test]
    fn hp_pair_and_bare_number() {
        let pair: Value = serde_yaml::from_str("{current: 4, max: 9}").unwrap();
        assert_eq!(hit_points(Some(&pair)), (4, 9));
        let bare: Value = serde_yaml::from_str("7").unwrap();
        assert_eq!(hit_points(Some(&bare)), (7, 7));
        assert_eq!(hit_points(None), (0, 0));
    }
}
