use serde::Deserialize;
use serde_json::Value;

/// Event type sent when a file in the campaign directory changes.
pub const FILE_WATCHER_UPDATED: &str = "file.watcher.updated";
/// Event type sent when the agent finishes its turn.
pub const SESSION_IDLE: &str = "session.idle";

/// A notification from the agent's event feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    FileChanged { path: String },
    SessionIdle,
    Other { kind: String },
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    properties: Value,
}

impl ChangeEvent {
    /// Decode one event payload. Payloads without a `type` are ignored.
    pub fn from_json(data: &str) -> Option<Self> {
        let raw: RawEvent = serde_json::from_str(data).ok()?;
        let event = match raw.kind.as_str() {
            FILE_WATCHER_UPDATED => {
                let path = raw.file.or_else(|| {
                    raw.properties
                        .get("file")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                });
                match path {
                    Some(path) => Self::FileChanged { path },
                    None => Self::Other { kind: raw.kind },
                }
            }
            SESSION_IDLE => Self::SessionIdle,
            _ => Self::Other { kind: raw.kind },
        };
        Some(event)
    }

    /// Whether this event should (eventually) reload the world: a change to a
    /// file under `world_root`, or the agent finishing its turn.
    pub fn triggers_refresh(&self, world_root: &str) -> bool {
        match self {
            Self::FileChanged { path } => {
                let root = world_root.trim_end_matches('/');
                path.strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('/'))
            }
            Self::SessionIdle => true,
            Self::Other { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_file_change_from_properties() {
        let event = ChangeEvent::from_json(
            r#"{"type":"file.watcher.updated","properties":{"file":"world/quests.md","event":"change"}}"#,
        );
        assert_eq!(
            event,
            Some(ChangeEvent::FileChanged {
                path: "world/quests.md".to_string()
            })
        );
    }

    #[test]
    fn decodes_top_level_file_and_idle() {
        assert_eq!(
            ChangeEvent::from_json(r#"{"type":"file.watcher.updated","file":"world/npcs/mara.md"}"#),
            Some(ChangeEvent::FileChanged {
                path: "world/npcs/mara.md".to_string()
            })
        );
        assert_eq!(
            ChangeEvent::from_json(r#"{"type":"session.idle","properties":{}}"#),
            Some(ChangeEvent::SessionIdle)
        );
    }

    #[test]
    fn ignores_malformed_payloads() {
        assert!(ChangeEvent::from_json("not json").is_none());
        assert!(ChangeEvent::from_json(r#"{"file":"world/x.md"}"#).is_none());
    }

    #[test]
    fn only_world_files_and_idle_trigger() {
        let world = ChangeEvent::FileChanged {
            path: "world/clocks.md".to_string(),
        };
        let elsewhere = ChangeEvent::FileChanged {
            path: "worldbuilding/notes.md".to_string(),
        };
        let other = ChangeEvent::Other {
            kind: "message.updated".to_string(),
        };
        assert!(world.triggers_refresh("world"));
        assert!(world.triggers_refresh("world/"));
        assert!(!elsewhere.triggers_refresh("world"));
        assert!(ChangeEvent::SessionIdle.triggers_refresh("world"));
        assert!(!other.triggers_refresh("world"));
    }
}
