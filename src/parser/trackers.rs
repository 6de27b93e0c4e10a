//! Doom and clock trackers.
//!
//! Both files share one shape: a `## Name` heading followed somewhere below by
//! a labeled fraction such as `**Portent Level:** 2/6`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::h2_title;
use crate::models::{ClockEntry, MythEntry};

static PORTENT_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\*\*)?Portent Level:(?:\*\*)?\s*(\d+)\s*/\s*(\d+)").unwrap());
static SEGMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\*\*)?Segments:(?:\*\*)?\s*(\d+)\s*/\s*(\d+)").unwrap());

struct Tally {
    name: String,
    value: u32,
    max: u32,
}

#[derive(Default)]
struct TallyScan {
    current: Option<String>,
    tallies: Vec<Tally>,
}

impl TallyScan {
    fn step(mut self, line: &str, label: &Regex) -> Self {
        if let Some(title) = h2_title(line) {
            self.current = Some(title.to_string());
            return self;
        }
        // A fraction before any heading has nothing to attach to.
        let Some(name) = &self.current else {
            return self;
        };
        if let Some(caps) = label.captures(line) {
            if let (Ok(value), Ok(max)) = (caps[1].parse(), caps[2].parse()) {
                self.tallies.push(Tally {
                    name: name.clone(),
                    value,
                    max,
                });
            }
        }
        self
    }
}

fn scan(raw: &str, label: &Regex) -> Vec<Tally> {
    raw.lines()
        .fold(TallyScan::default(), |scan, line| scan.step(line, label))
        .tallies
}

/// Parse `dooms.md`.
pub fn parse_dooms(raw: &str) -> Vec<MythEntry> {
    scan(raw, &PORTENT_LEVEL)
        .into_iter()
        .map(|t| MythEntry {
            name: t.name,
            omens: t.value,
            max_omens: t.max,
        })
        .collect()
}

/// Parse `clocks.md`.
pub fn parse_clocks(raw: &str) -> Vec<ClockEntry> {
    scan(raw, &SEGMENTS)
        .into_iter()
        .map(|t| ClockEntry {
            name: t.name,
            filled: t.value,
            total: t.max,
        })
        .collect()
}
