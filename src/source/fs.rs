//! Local filesystem source, for reading a campaign directory directly.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{DocumentSource, SourceError};

/// Reads world documents from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentSource for FsSource {
    async fn read_document(&self, path: &str) -> Result<Option<String>, SourceError> {
        let full = self.root.join(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SourceError::io_error(full, e)),
        }
    }

    /// Regular files only, sorted by name so "the first character file" is stable.
    async fn list_directory(&self, path: &str) -> Result<Vec<String>, SourceError> {
        let full = self.root.join(path);
        let mut entries = match tokio::fs::read_dir(&full).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SourceError::io_error(full, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SourceError::io_error(&full, e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| SourceError::io_error(entry.path(), e))?
                .is_file();
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}
