//! YAML frontmatter splitting.

use serde_yaml::{Mapping, Value};

/// Metadata block at the head of a character or NPC document.
///
/// Wraps the ordered YAML mapping with lenient accessors: a field that is
/// missing, null, or of an unexpected shape reads as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    pub fn new(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// A scalar field rendered as text. Empty strings read as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text).filter(|s| !s.is_empty())
    }

    /// An integer field. Numeric strings are accepted.
    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(scalar_int)
    }

    /// A sequence of scalars rendered as text. Anything else reads as empty.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }

    pub fn mapping(&self, key: &str) -> Option<&Mapping> {
        self.get(key).and_then(Value::as_mapping)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

/// Render a YAML scalar as trimmed text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a YAML scalar as an integer, truncating floats.
pub(crate) fn scalar_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Split a document into its frontmatter and markdown body.
///
/// Frontmatter is a `---` line at the very start, YAML, and a closing `---`
/// line. Without both fences the metadata is empty and the body is the whole
/// input. YAML that fails to parse is treated the same way.
pub fn split_frontmatter(raw: &str) -> (Frontmatter, &str) {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next().filter(|line| is_fence(line)) else {
        return (Frontmatter::default(), raw);
    };

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return match serde_yaml::from_str::<Value>(yaml) {
                Ok(Value::Mapping(mapping)) => (Frontmatter(mapping), body),
                Ok(_) => (Frontmatter::default(), body),
                Err(_) => (Frontmatter::default(), raw),
            };
        }
        offset += line.len();
    }

    (Frontmatter::default(), raw)
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_metadata_from_body() {
        let raw = "---\nname: Kell\nlevel: 3\n---\n## Inventory\n- Rope\n";
        let (meta, body) = split_frontmatter(raw);
        assert_eq!(meta.text("name").as_deref(), Some("Kell"));
        assert_eq!(meta.int("level"), Some(3));
        assert_eq!(body, "## Inventory\n- Rope\n");
    }

    #[test]
    fn keeps_insertion_order_of_nested_mappings() {
        let raw = "---\nstats:\n  str: 14\n  dex: 9\n  con: 12\n---\n";
        let (meta, _) = split_frontmatter(raw);
        let keys: Vec<String> = meta
            .mapping("stats")
            .unwrap()
            .keys()
            .filter_map(scalar_text)
            .collect();
        assert_eq!(keys, vec!["str", "dex", "con"]);
    }

    #[test]
    fn no_frontmatter_returns_whole_input() {
        let raw = "# Just markdown\n\nText";
        let (meta, body) = split_frontmatter(raw);
        assert!(meta.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn unclosed_fence_is_not_frontmatter() {
        let raw = "---\nname: Kell\n";
        let (meta, body) = split_frontmatter(raw);
        assert!(meta.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn invalid_yaml_falls_back_to_body() {
        let raw = "---\nname: [unclosed\n---\nbody";
        let (meta, body) = split_frontmatter(raw);
        assert!(meta.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let raw = "---\r\nname: Kell\r\n---\r\nbody";
        let (meta, body) = split_frontmatter(raw);
        assert_eq!(meta.text("name").as_deref(), Some("Kell"));
        assert_eq!(body, "body");
    }

    #[test]
    fn lists_and_empty_strings() {
        let raw = "---\nname: ''\nlanguages:\n  - Common\n  - Elvish\n---\n";
        let (meta, _) = split_frontmatter(raw);
        assert!(meta.text("name").is_none());
        assert_eq!(meta.list("languages"), vec!["Common", "Elvish"]);
        assert!(meta.list("missing").is_empty());
    }
}
