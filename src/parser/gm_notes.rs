//! GM notes parsing: strong start, secrets and NPC moves.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{extract_section, h3_title};
use crate::models::{GmNotes, NpcMove, SecretEntry};

/// Sub-heading that marks where found secrets are kept. Not a secret itself.
const DISCOVERED: &str = "Discovered";

static INFORMATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Information:\*\*\s*(.+)").unwrap());
static DISCOVERY_PATHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Discovery paths:\*\*\s*(.+)").unwrap());
static DOING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*Doing:\*\*\s*(.+?)(?:\s*\||$)").unwrap());
static WANTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*Wants:\*\*\s*(.+?)(?:\s*\||$)").unwrap());
static HOOK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*Hook:\*\*\s*(.+)").unwrap());

/// Parse `gm-notes.md`. Blank input is `None`; otherwise every part defaults to empty.
pub fn parse_gm_notes(raw: &str) -> Option<GmNotes> {
    if raw.trim().is_empty() {
        return None;
    }
    Some(GmNotes {
        strong_start: strong_start(raw),
        secrets: secrets(raw),
        npc_moves: npc_moves(raw),
    })
}

/// Prose under the first `###` in `## Strong Starts`, up to the second `###`.
///
/// Selection is positional: whichever sub-heading comes first wins.
fn strong_start(raw: &str) -> String {
    let Some(section) = extract_section(raw, "Strong Starts") else {
        return String::new();
    };
    let mut lines = section.lines();
    if lines.by_ref().find(|line| h3_title(line).is_some()).is_none() {
        return String::new();
    }
    lines
        .take_while(|line| h3_title(line).is_none())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================
// Secrets
// ============================================================

#[derive(Default)]
struct SecretScan {
    pending: Option<SecretEntry>,
    secrets: Vec<SecretEntry>,
}

impl SecretScan {
    fn step(mut self, line: &str) -> Self {
        if let Some(title) = h3_title(line) {
            self.flush();
            self.pending = Some(SecretEntry {
                title: title.to_string(),
                description: String::new(),
                discovery: String::new(),
            });
            return self;
        }
        if let Some(secret) = self.pending.as_mut() {
            if let Some(caps) = INFORMATION.captures(line) {
                secret.description = caps[1].trim().to_string();
            } else if let Some(caps) = DISCOVERY_PATHS.captures(line) {
                secret.discovery = caps[1].trim().to_string();
            }
        }
        self
    }

    fn flush(&mut self) {
        if let Some(secret) = self.pending.take() {
            if secret.title != DISCOVERED {
                self.secrets.push(secret);
            }
        }
    }

    fn finish(mut self) -> Vec<SecretEntry> {
        self.flush();
        self.secrets
    }
}

fn secrets(raw: &str) -> Vec<SecretEntry> {
    let Some(section) = extract_section(raw, "Active Secrets") else {
        return Vec::new();
    };
    section
        .lines()
        .fold(SecretScan::default(), SecretScan::step)
        .finish()
}

// ============================================================
// NPC Moves
// ============================================================

#[derive(Default)]
struct MoveScan {
    pending: Option<(String, Vec<String>)>,
    moves: Vec<NpcMove>,
}

impl MoveScan {
    fn step(mut self, line: &str) -> Self {
        if let Some(name) = h3_title(line) {
            self.flush();
            self.pending = Some((name.to_string(), Vec::new()));
            return self;
        }
        if let Some((_, plan)) = self.pending.as_mut() {
            if let Some(part) = plan_part(line) {
                plan.push(part);
            }
        }
        self
    }

    fn flush(&mut self) {
        if let Some((name, plan)) = self.pending.take() {
            self.moves.push(NpcMove {
                name,
                plan: plan.join(" ").trim().to_string(),
            });
        }
    }

    fn finish(mut self) -> Vec<NpcMove> {
        self.flush();
        self.moves
    }
}

/// One line's contribution to a plan: Doing, else Wants, else Hook.
fn plan_part(line: &str) -> Option<String> {
    if let Some(caps) = DOING.captures(line) {
        return Some(caps[1].trim().to_string());
    }
    if let Some(caps) = WANTS.captures(line) {
        return Some(caps[1].trim().to_string());
    }
    HOOK.captures(line).map(|caps| {
        caps[1]
            .trim()
            .trim_matches(['"', '\u{201C}', '\u{201D}'])
            .trim()
            .to_string()
    })
}

fn npc_moves(raw: &str) -> Vec<NpcMove> {
    let Some(section) = extract_section(raw, "NPC Moves") else {
        return Vec::new();
    };
    section
        .lines()
        .fold(MoveScan::default(), MoveScan::step)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_prefers_doing_then_wants_then_hook() {
        assert_eq!(
            plan_part("**Doing:** Hiding the ledger | **Wants:** Coin").as_deref(),
            Some("Hiding the ledger")
        );
        assert_eq!(plan_part("**Wants:** Revenge").as_deref(), Some("Revenge"));
        assert_eq!(
            plan_part("**Hook:** \"Meet me at the mill\"").as_deref(),
            Some("Meet me at the mill")
        );
        assert!(plan_part("Just prose").is_none());
    }
}
