//! Parsers that turn world documents into typed records.
//!
//! Every parser here is a pure function of its input text. None of them fail:
//! a missing section or field becomes a documented default (or `None`), and a
//! line that does not match the expected shape is skipped so one bad entry
//! never invalidates the rest of the file.
//!
//! Heading-scoped state (the current quest bucket, doom name, clock name, ...)
//! is carried through each scan as an explicit accumulator folded over the
//! document's lines.

mod calendar;
mod character;
mod frontmatter;
mod gm_notes;
mod npc;
mod quests;
mod session_log;
mod trackers;

pub use calendar::parse_calendar;
pub use character::parse_character;
pub use frontmatter::{split_frontmatter, Frontmatter};
pub use gm_notes::parse_gm_notes;
pub use npc::parse_npc;
pub use quests::parse_quests;
pub use session_log::parse_session_log;
pub use trackers::{parse_clocks, parse_dooms};

/// Return the body of the level-2 section titled `heading`.
///
/// The heading match is case-insensitive and anchored to a `## ` line. Text
/// after the heading on the same line is ignored as long as it does not
/// continue the word (`## Inventory (3 items)` matches `Inventory`,
/// `## Inventory2` does not). The body runs to the next level-2 heading or the
/// end of the document and is trimmed. Returns `None` when no such heading exists.
pub fn extract_section(markdown: &str, heading: &str) -> Option<String> {
    let mut lines = markdown.lines();
    lines.by_ref().find(|line| section_title_matches(line, heading))?;

    let body: Vec<&str> = lines.take_while(|line| h2_title(line).is_none()).collect();
    Some(body.join("\n").trim().to_string())
}

fn section_title_matches(line: &str, heading: &str) -> bool {
    let Some(title) = h2_title(line) else {
        return false;
    };
    match strip_prefix_ignore_case(title, heading.trim()) {
        Some(rest) => rest.chars().next().map_or(true, |c| !c.is_alphanumeric()),
        None => false,
    }
}

/// Title of a `## ` heading line, if the line is one.
pub(crate) fn h2_title(line: &str) -> Option<&str> {
    heading_title(line, 2)
}

/// Title of a `### ` heading line, if the line is one.
pub(crate) fn h3_title(line: &str) -> Option<&str> {
    heading_title(line, 3)
}

fn heading_title(line: &str, level: usize) -> Option<&str> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes != level {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then_some(title)
}

/// Text of a `- item` bullet line.
pub(crate) fn bullet_text(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('-')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let end = chars.next().map_or(text.len(), |(idx, _)| idx);
    Some(&text[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Sheet\n\n## Inventory (4 slots)\n- Rope\n- Torch\n\n### Worn\n- Cloak\n\n## Notes\nNothing here.\n";

    #[test]
    fn extracts_until_next_level_two_heading() {
        let section = extract_section(DOC, "Inventory").unwrap();
        assert_eq!(section, "- Rope\n- Torch\n\n### Worn\n- Cloak");
    }

    #[test]
    fn matches_case_insensitively() {
        assert_eq!(extract_section(DOC, "notes").as_deref(), Some("Nothing here."));
    }

    #[test]
    fn last_section_runs_to_end_of_document() {
        let doc = "## Season\nAutumn.\nLeaves are falling.";
        assert_eq!(
            extract_section(doc, "Season").as_deref(),
            Some("Autumn.\nLeaves are falling.")
        );
    }

    #[test]
    fn does_not_match_longer_heading_word() {
        let doc = "## Seasonal Festivals\nHarvest fair\n";
        assert!(extract_section(doc, "Season").is_none());
    }

    #[test]
    fn does_not_match_deeper_headings() {
        let doc = "### Inventory\n- Rope\n";
        assert!(extract_section(doc, "Inventory").is_none());
    }

    #[test]
    fn missing_heading_is_none() {
        assert!(extract_section(DOC, "Spells").is_none());
    }

    #[test]
    fn empty_section_is_some_empty() {
        let doc = "## Current Date\n\n## Season\nWinter";
        assert_eq!(extract_section(doc, "Current Date").as_deref(), Some(""));
    }

    #[test]
    fn heading_titles() {
        assert_eq!(h2_title("## Active"), Some("Active"));
        assert_eq!(h2_title("### Active"), None);
        assert_eq!(h2_title("##Active"), None);
        assert_eq!(h3_title("###  The Ledger "), Some("The Ledger"));
        assert_eq!(h3_title("#### Deeper"), None);
    }

    #[test]
    fn bullets() {
        assert_eq!(bullet_text("- Rope"), Some("Rope"));
        assert_eq!(bullet_text("-Rope"), None);
        assert_eq!(bullet_text("  - Rope"), None);
    }
}
