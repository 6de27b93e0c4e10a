//! Session log parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{LogEntry, LogTag};

static LOG_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s+\[(\w[\w-]*)\]\s+(.+)").unwrap());

/// Tag for GM rulings, which are logged but never shown.
const RULING: &str = "ruling";

/// Parse `session-log.md` into entries, most recent first.
///
/// Lines look like `- [discovery] Found the hidden door`. Rulings and lines
/// with an unknown tag are dropped.
pub fn parse_session_log(raw: &str) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = raw.lines().filter_map(log_entry).collect();
    entries.reverse();
    entries
}

fn log_entry(line: &str) -> Option<LogEntry> {
    let caps = LOG_LINE.captures(line)?;
    let tag = caps[1].to_lowercase();
    if tag == RULING {
        return None;
    }
    Some(LogEntry {
        tag: LogTag::from_str(&tag)?,
        text: caps[2].trim().to_string(),
    })
}
