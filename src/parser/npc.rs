//! NPC dossier parsing.

use super::frontmatter::split_frontmatter;
use crate::models::{Disposition, Npc};

/// Parse an NPC document. Returns `None` when the frontmatter has no `name`.
pub fn parse_npc(raw: &str) -> Option<Npc> {
    let (meta, _) = split_frontmatter(raw);
    let name = meta.text("name")?;

    Some(Npc {
        name,
        location: location_label(&meta.text("location").unwrap_or_default()),
        role: meta
            .text("current_goal")
            .or_else(|| meta.text("type"))
            .unwrap_or_else(|| "NPC".to_string()),
        disposition: meta
            .text("disposition")
            .and_then(|d| Disposition::from_str(&d.to_lowercase()))
            .unwrap_or_default(),
    })
}

/// Turn a location slug into a label: `old-mill-road` → `Old Mill Road`.
fn location_label(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
