//! Calendar parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{bullet_text, extract_section};
use crate::models::Calendar;

const EVENT_SEPARATOR: &str = " · ";

static DATE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Day\s+(\d+)\s+of\s+(?:the\s+)?([^,\n]+)").unwrap());
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s.*").unwrap());

/// Parse `calendar.md`.
///
/// The whole calendar is `None` unless there is a non-empty `## Current Date`
/// section. A date line that cannot be read falls back to day 1 of `Unknown`.
pub fn parse_calendar(raw: &str) -> Option<Calendar> {
    let date = extract_section(raw, "Current Date").filter(|s| !s.is_empty())?;

    let (day, month) = match DATE_LINE.captures(&date) {
        Some(caps) => (
            caps[1].parse().unwrap_or(1),
            trim_trailing_punctuation(caps[2].trim()).to_string(),
        ),
        None => (1, "Unknown".to_string()),
    };

    let season = first_line(raw, "Season")
        .map(|line| {
            let clause = SENTENCE_BREAK.replace(&line, "");
            trim_trailing_punctuation(clause.trim()).to_string()
        })
        .unwrap_or_default();

    let weather = first_line(raw, "Recent Weather")
        .map(|line| trim_trailing_punctuation(&line).to_string())
        .unwrap_or_default();

    let upcoming = extract_section(raw, "Notable Upcoming Events")
        .map(|section| {
            section
                .lines()
                .filter_map(bullet_text)
                .collect::<Vec<_>>()
                .join(EVENT_SEPARATOR)
        })
        .unwrap_or_default();

    Some(Calendar {
        day,
        month,
        season,
        weather,
        upcoming,
    })
}

fn first_line(raw: &str, heading: &str) -> Option<String> {
    let section = extract_section(raw, heading)?;
    section.lines().next().map(|line| line.trim().to_string())
}

fn trim_trailing_punctuation(s: &str) -> &str {
    s.trim_end_matches(['.', ',', ';', ':', '!']).trim_end()
}
