//! Quest list parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::h2_title;
use crate::models::{Quest, QuestStatus};

static QUEST_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\s+\*\*(.+?)\*\*\s*[—–-]\s*(.+)").unwrap());
static TRAILING_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\*[^*]+\*\s*$").unwrap());

#[derive(Default)]
struct QuestScan {
    status: QuestStatus,
    quests: Vec<Quest>,
}

impl QuestScan {
    fn step(mut self, line: &str) -> Self {
        if let Some(title) = h2_title(line) {
            // Unknown headings keep the bucket we were already in.
            let word: String = title
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if let Some(status) = QuestStatus::from_str(&word.to_lowercase()) {
                self.status = status;
            }
            return self;
        }

        if let Some(caps) = QUEST_LINE.captures(line) {
            self.quests.push(Quest {
                name: caps[1].trim().to_string(),
                description: TRAILING_ITALIC.replace(&caps[2], "").trim().to_string(),
                status: self.status,
            });
        }
        self
    }
}

/// Parse `quests.md`.
///
/// `## Active`, `## Developing` and `## Completed` headings select the bucket
/// for the `- **Name** — description` lines below them. Quests before any
/// heading are active.
pub fn parse_quests(raw: &str) -> Vec<Quest> {
    raw.lines().fold(QuestScan::default(), QuestScan::step).quests
}
