//! Document retrieval and change-event collaborators.
//!
//! The loader and watcher only talk to the world through the two traits here:
//!
//! - [`DocumentSource`]: read one document, list one directory.
//! - [`EventSource`]: open a long-lived stream of [`ChangeEvent`]s.
//!
//! "Not found" is not an error: a missing document reads as `Ok(None)` and a
//! missing directory lists as empty. Anything else is a [`SourceError`] that
//! callers isolate to the one source that produced it.

mod event;
mod fs;
mod http;
mod memory;
mod sse;

pub use event::{ChangeEvent, FILE_WATCHER_UPDATED, SESSION_IDLE};
pub use fs::FsSource;
pub use http::AgentClient;
pub use memory::{MemoryEvents, MemorySource};

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a retrieval collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this failure means the source could not be reached at all,
    /// as opposed to one document being unreadable.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout(),
            Self::Io { source, .. } => source.kind() != std::io::ErrorKind::InvalidData,
            Self::Unavailable(_) => true,
            Self::Unauthorized | Self::Server(_) | Self::Decode(_) => false,
        }
    }
}

/// Reads world documents by path relative to the campaign directory.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Read a whole document. `Ok(None)` when it does not exist.
    async fn read_document(&self, path: &str) -> Result<Option<String>, SourceError>;

    /// File names (not paths) directly inside `path`. Empty when it does not exist.
    async fn list_directory(&self, path: &str) -> Result<Vec<String>, SourceError>;
}

/// Stream of change notifications. An `Err` item or the end of the stream
/// means the subscription is gone and must be re-established.
pub type EventStream = BoxStream<'static, Result<ChangeEvent, SourceError>>;

/// Opens subscriptions to the agent's change-event feed.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn subscribe(&self) -> Result<EventStream, SourceError>;
}
