//! World Loader: one retrieval round, assembled into a snapshot.
//!
//! Every retrieval is its own branch. A failed branch becomes the empty value
//! for that source and never aborts the others; only when every top-level
//! branch fails to reach its source is the round reported as unreachable.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;

use crate::config::WorldPaths;
use crate::models::{Character, Npc, WorldParts, WorldSnapshot};
use crate::parser;
use crate::source::{DocumentSource, SourceError};

/// Number of top-level retrievals in one round.
const BRANCHES: usize = 8;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("All {failed} world sources are unreachable")]
    Unreachable { failed: usize },
}

#[derive(Clone)]
pub struct WorldLoader {
    source: Arc<dyn DocumentSource>,
    paths: WorldPaths,
}

impl WorldLoader {
    pub fn new(source: Arc<dyn DocumentSource>, paths: WorldPaths) -> Self {
        Self { source, paths }
    }

    pub fn paths(&self) -> &WorldPaths {
        &self.paths
    }

    /// Load a snapshot, folding a total failure into an `error` snapshot.
    pub async fn fetch_snapshot(&self) -> WorldSnapshot {
        match self.try_fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("World load failed: {}", e);
                WorldSnapshot::failed(&WorldSnapshot::initial())
            }
        }
    }

    /// Load a snapshot, reporting a total failure as an error so callers can
    /// keep their last good one.
    pub async fn try_fetch(&self) -> Result<WorldSnapshot, LoadError> {
        let paths = &self.paths;
        let source = self.source.as_ref();

        let (characters, npcs, quests, session_log, dooms, clocks, calendar, gm_notes) = tokio::join!(
            source.list_directory(&paths.characters_dir),
            source.list_directory(&paths.npcs_dir),
            source.read_document(&paths.quests),
            source.read_document(&paths.session_log),
            source.read_document(&paths.dooms),
            source.read_document(&paths.clocks),
            source.read_document(&paths.calendar),
            source.read_document(&paths.gm_notes),
        );

        let failures = [
            characters.as_ref().err(),
            npcs.as_ref().err(),
            quests.as_ref().err(),
            session_log.as_ref().err(),
            dooms.as_ref().err(),
            clocks.as_ref().err(),
            calendar.as_ref().err(),
            gm_notes.as_ref().err(),
        ];
        if failures
            .iter()
            .all(|failure| failure.is_some_and(SourceError::is_transport))
        {
            return Err(LoadError::Unreachable { failed: BRANCHES });
        }

        let characters = settle(&paths.characters_dir, characters);
        let npcs = settle(&paths.npcs_dir, npcs);

        let (character, npcs) = tokio::join!(
            self.load_character(&characters),
            self.load_npcs(&npcs),
        );

        let parts = WorldParts {
            character,
            npcs,
            quests: document(&paths.quests, quests)
                .map(|text| parser::parse_quests(&text))
                .unwrap_or_default(),
            log_entries: document(&paths.session_log, session_log)
                .map(|text| parser::parse_session_log(&text))
                .unwrap_or_default(),
            dooms: document(&paths.dooms, dooms)
                .map(|text| parser::parse_dooms(&text))
                .unwrap_or_default(),
            clocks: document(&paths.clocks, clocks)
                .map(|text| parser::parse_clocks(&text))
                .unwrap_or_default(),
            calendar: document(&paths.calendar, calendar)
                .and_then(|text| parser::parse_calendar(&text)),
            gm_notes: document(&paths.gm_notes, gm_notes)
                .and_then(|text| parser::parse_gm_notes(&text)),
        };

        let snapshot = WorldSnapshot::assemble(parts, Utc::now());
        tracing::debug!(
            "Assembled world snapshot: status={} character={} npcs={} quests={} log={} dooms={} clocks={}",
            snapshot.status().as_str(),
            snapshot.character.is_some(),
            snapshot.npcs.len(),
            snapshot.quests.len(),
            snapshot.log_entries.len(),
            snapshot.dooms.len(),
            snapshot.clocks.len(),
        );
        Ok(snapshot)
    }

    /// The first markdown file in the characters directory.
    async fn load_character(&self, listing: &[String]) -> Option<Character> {
        let name = listing.iter().find(|name| is_markdown(name))?;
        let path = join_path(&self.paths.characters_dir, name);
        let text = document(&path, self.source.read_document(&path).await)?;
        parser::parse_character(&text)
    }

    /// Every markdown file in the NPCs directory, each read and parsed on its own.
    async fn load_npcs(&self, listing: &[String]) -> Vec<Npc> {
        let reads = listing
            .iter()
            .filter(|name| is_markdown(name))
            .map(|name| async move {
                let path = join_path(&self.paths.npcs_dir, name);
                let text = document(&path, self.source.read_document(&path).await)?;
                parser::parse_npc(&text)
            });
        join_all(reads).await.into_iter().flatten().collect()
    }
}

/// Resolve one branch to its value, or to the empty value if it failed.
fn settle<T: Default>(path: &str, result: Result<T, SourceError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!("Failed to load {}: {}", path, e);
        T::default()
    })
}

fn document(path: &str, result: Result<Option<String>, SourceError>) -> Option<String> {
    settle(path, result)
}

fn is_markdown(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".md")
}

fn join_path(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_markdown_names() {
        assert!(is_markdown("kira.md"));
        assert!(is_markdown("KIRA.MD"));
        assert!(!is_markdown("kira.md.bak"));
        assert!(!is_markdown("notes.txt"));
    }

    #[test]
    fn joins_without_doubling_separators() {
        assert_eq!(join_path("world/npcs/", "mara.md"), "world/npcs/mara.md");
        assert_eq!(join_path("world/npcs", "mara.md"), "world/npcs/mara.md");
    }
}
