use std::fs;
use std::path::Path;
use std::sync::Arc;

use glintlock::config::WorldPaths;
use glintlock::loader::WorldLoader;
use glintlock::models::*;
use glintlock::source::{DocumentSource, FsSource};
use tempfile::TempDir;

fn write(root: &Path, path: &str, text: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, text).unwrap();
}

fn campaign() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = dir.path();
    write(root, "world/characters/kira.md", "---\nname: Kira\nlevel: 2\n---\n**Gold:** 12\n");
    write(root, "world/npcs/mara.md", "---\nname: Mara Voss\ndisposition: friendly\n---\n");
    write(root, "world/quests.md", "## Active\n- **Find the ledger** — Missing\n");
    write(root, "world/dooms.md", "## The Rot\n**Portent Level:** 1/4\n");
    write(root, "world/calendar.md", "## Current Date\nDay 2 of Thaw\n");
    dir
}

mod documents {
    use super::*;

    #[tokio::test]
    async fn reads_an_existing_document() {
        let dir = campaign();
        let source = FsSource::new(dir.path());

        let text = source.read_document("world/quests.md").await.unwrap();

        assert!(text.unwrap().contains("Find the ledger"));
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let dir = campaign();
        let source = FsSource::new(dir.path());

        let text = source.read_document("world/clocks.md").await.unwrap();

        assert!(text.is_none());
    }

    #[tokio::test]
    async fn undecodable_document_is_not_a_transport_failure() {
        let dir = campaign();
        fs::write(dir.path().join("world/clocks.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let source = FsSource::new(dir.path());

        let err = source.read_document("world/clocks.md").await.unwrap_err();

        assert!(!err.is_transport());
    }
}

mod listings {
    use super::*;

    #[tokio::test]
    async fn lists_files_sorted_without_subdirectories() {
        let dir = campaign();
        write(dir.path(), "world/npcs/aldo.md", "---\nname: Aldo\n---\n");
        fs::create_dir_all(dir.path().join("world/npcs/archive")).unwrap();
        let source = FsSource::new(dir.path());

        let names = source.list_directory("world/npcs").await.unwrap();

        assert_eq!(names, vec!["aldo.md", "mara.md"]);
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let dir = campaign();
        let source = FsSource::new(dir.path());

        let names = source.list_directory("world/locations").await.unwrap();

        assert!(names.is_empty());
    }
}

mod loading {
    use super::*;

    #[tokio::test]
    async fn loads_a_campaign_directory() {
        let dir = campaign();
        let loader = WorldLoader::new(Arc::new(FsSource::new(dir.path())), WorldPaths::default());

        let snapshot = loader.try_fetch().await.unwrap();

        assert_eq!(snapshot.status(), WorldStatus::Loaded);
        let character = snapshot.character.unwrap();
        assert_eq!(character.name, "Kira");
        assert_eq!(character.gold, 12);
        assert_eq!(snapshot.npcs[0].disposition, Disposition::Friendly);
        assert_eq!(snapshot.quests.len(), 1);
        assert_eq!(snapshot.dooms[0].max_omens, 4);
        assert_eq!(snapshot.calendar.unwrap().month, "Thaw");
        assert!(snapshot.clocks.is_empty());
        assert!(snapshot.gm_notes.is_none());
    }

    #[tokio::test]
    async fn empty_directory_is_an_empty_world() {
        let dir = tempfile::tempdir().unwrap();
        let loader = WorldLoader::new(Arc::new(FsSource::new(dir.path())), WorldPaths::default());

        let snapshot = loader.try_fetch().await.unwrap();

        assert_eq!(snapshot.status(), WorldStatus::Empty);
    }
}
