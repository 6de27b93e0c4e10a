//! HTTP client for the agent server's file and event endpoints.
//!
//! The agent server exposes the campaign directory over HTTP:
//! - `GET /file/content?path=..` - document body as `{"content": "..."}`
//! - `GET /file?path=..` - directory entries as `[{"name", "type"}]`
//! - `GET /event` - server-sent events, one JSON object per `data:` payload

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::sse::SseDecoder;
use super::{ChangeEvent, DocumentSource, EventSource, EventStream, SourceError};
use crate::config::Config;

#[derive(Debug, Deserialize)]
struct FileContent {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Client for one agent server and campaign directory.
#[derive(Debug, Clone)]
pub struct AgentClient {
    base_url: String,
    directory: Option<String>,
    api_key: Option<String>,
    request_timeout: Duration,
    client: Client,
}

/// Per-request limit for document reads and listings.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl AgentClient {
    /// Create with explicit configuration.
    pub fn new(
        base_url: impl Into<String>,
        directory: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            directory,
            api_key,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            client: Client::new(),
        }
    }

    /// Give up on a document read or listing after `timeout`. The event
    /// stream is long-lived and never times out.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.server_url.clone(),
            config.directory.clone(),
            config.api_key.clone(),
        )
        .with_request_timeout(config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request with the campaign directory and optional auth header.
    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url);
        if let Some(ref directory) = self.directory {
            req = req.query(&[("directory", directory)]);
        }
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Decode a JSON response. 404 becomes `Ok(None)`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>, SourceError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map(Some)
                .map_err(|e| SourceError::Decode(e.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED => Err(SourceError::Unauthorized),
            _ => Err(SourceError::Server(format!("{}: {}", status, body))),
        }
    }
}

#[async_trait]
impl DocumentSource for AgentClient {
    async fn read_document(&self, path: &str) -> Result<Option<String>, SourceError> {
        let response = self
            .get("/file/content")
            .query(&[("path", path)])
            .timeout(self.request_timeout)
            .send()
            .await?;
        let file: Option<FileContent> = self.handle_response(response).await?;
        Ok(file.map(|f| f.content))
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<String>, SourceError> {
        let response = self
            .get("/file")
            .query(&[("path", path)])
            .timeout(self.request_timeout)
            .send()
            .await?;
        let entries: Option<Vec<DirectoryEntry>> = self.handle_response(response).await?;
        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| entry.kind.as_deref() != Some("directory"))
            .map(|entry| entry.name)
            .collect())
    }
}

#[async_trait]
impl EventSource for AgentClient {
    async fn subscribe(&self) -> Result<EventStream, SourceError> {
        let response = self
            .get("/event")
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED => SourceError::Unauthorized,
                _ => SourceError::Server(format!("event stream rejected: {}", status)),
            });
        }

        let mut decoder = SseDecoder::default();
        let stream = response
            .bytes_stream()
            .map(move |chunk| -> Vec<Result<String, SourceError>> {
                match chunk {
                    Ok(bytes) => decoder.push(&bytes).into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(SourceError::Http(e))],
                }
            })
            .flat_map(futures::stream::iter)
            .filter_map(|item| async move {
                match item {
                    Ok(data) => ChangeEvent::from_json(&data).map(Ok),
                    Err(e) => Some(Err(e)),
                }
            })
            .boxed();

        Ok(stream)
    }
}
