//! In-memory scripted source.
//!
//! Holds documents in a map and lets callers inject failures, latency and
//! change events. Used by the test suites and handy for view-layer previews.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, Notify};

use super::{ChangeEvent, DocumentSource, EventSource, EventStream, SourceError};

#[derive(Debug, Default)]
struct Documents {
    files: BTreeMap<String, String>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: HashMap<String, usize>,
    offline: bool,
}

/// A [`DocumentSource`] backed by a map of path → text.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Arc<Mutex<Documents>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&self, path: impl Into<String>, text: impl Into<String>) {
        self.lock().files.insert(path.into(), text.into());
    }

    pub fn remove(&self, path: &str) {
        self.lock().files.remove(path);
    }

    /// Make every read or listing of `path` fail.
    pub fn fail(&self, path: impl Into<String>) {
        self.lock().failing.insert(path.into());
    }

    pub fn heal(&self, path: &str) {
        self.lock().failing.remove(path);
    }

    /// Delay every read or listing of `path` that starts from now on.
    pub fn delay(&self, path: impl Into<String>, delay: Duration) {
        self.lock().delays.insert(path.into(), delay);
    }

    pub fn clear_delay(&self, path: &str) {
        self.lock().delays.remove(path);
    }

    /// Fail every call as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// How many times `path` has been read or listed.
    pub fn calls(&self, path: &str) -> usize {
        self.lock().calls.get(path).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Documents> {
        self.inner.lock().expect("memory source lock poisoned")
    }

    /// Record the call and decide how it should go, without holding the lock
    /// across the delay.
    async fn begin(&self, path: &str) -> Result<(), SourceError> {
        let (delay, outcome) = {
            let mut docs = self.lock();
            *docs.calls.entry(path.to_string()).or_default() += 1;
            let outcome = if docs.offline {
                Err(SourceError::Unavailable("offline".to_string()))
            } else if docs.failing.contains(path) {
                Err(SourceError::Server(format!("{path}: injected failure")))
            } else {
                Ok(())
            };
            (docs.delays.get(path).copied(), outcome)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn read_document(&self, path: &str) -> Result<Option<String>, SourceError> {
        self.begin(path).await?;
        Ok(self.lock().files.get(path).cloned())
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<String>, SourceError> {
        self.begin(path).await?;
        let prefix = format!("{}/", path.trim_end_matches('/'));
        Ok(self
            .lock()
            .files
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|name| !name.contains('/'))
            .map(str::to_string)
            .collect())
    }
}

type EventItem = Result<ChangeEvent, SourceError>;

#[derive(Debug, Default)]
struct Feed {
    sender: Option<mpsc::UnboundedSender<EventItem>>,
    refusals: VecDeque<SourceError>,
    subscriptions: usize,
}

/// An [`EventSource`] whose events are pushed by hand.
#[derive(Debug, Clone, Default)]
pub struct MemoryEvents {
    feed: Arc<Mutex<Feed>>,
    subscribed: Arc<Notify>,
}

impl MemoryEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to the live subscription. Returns false if there is none.
    pub fn push(&self, event: ChangeEvent) -> bool {
        match &self.lock().sender {
            Some(sender) => sender.send(Ok(event)).is_ok(),
            None => false,
        }
    }

    /// Break the live subscription with a transport error.
    pub fn disconnect(&self) {
        if let Some(sender) = self.lock().sender.take() {
            let _ = sender.send(Err(SourceError::Unavailable("connection reset".to_string())));
        }
    }

    /// Refuse the next subscription attempt.
    pub fn refuse_next(&self) {
        self.lock()
            .refusals
            .push_back(SourceError::Unavailable("connection refused".to_string()));
    }

    /// Total successful subscriptions so far.
    pub fn subscriptions(&self) -> usize {
        self.lock().subscriptions
    }

    /// Wait until at least `count` subscriptions have been opened.
    pub async fn wait_for_subscriptions(&self, count: usize) {
        loop {
            let notified = self.subscribed.notified();
            if self.subscriptions() >= count {
                return;
            }
            notified.await;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Feed> {
        self.feed.lock().expect("event feed lock poisoned")
    }
}

#[async_trait]
impl EventSource for MemoryEvents {
    async fn subscribe(&self) -> Result<EventStream, SourceError> {
        let receiver = {
            let mut feed = self.lock();
            if let Some(refusal) = feed.refusals.pop_front() {
                return Err(refusal);
            }
            let (sender, receiver) = mpsc::unbounded_channel();
            feed.sender = Some(sender);
            feed.subscriptions += 1;
            receiver
        };
        self.subscribed.notify_waiters();

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            receiver.recv().await.map(|item| (item, receiver))
        });
        Ok(stream.boxed())
    }
}
