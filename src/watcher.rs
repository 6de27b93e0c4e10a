//! Change subscription and debounced refresh.
//!
//! A [`WorldWatcher`] keeps a [`SnapshotStore`] current. It loads once on
//! start, then listens to the change-event feed. Each qualifying event
//! restarts the debounce timer, and a refresh runs only once the feed has
//! been quiet for the whole window. A broken feed is re-subscribed after a
//! fixed backoff.
//!
//! Refreshes run as their own tasks and are tagged with a generation number
//! when they start. A result is committed only if no newer refresh has
//! committed first, and never after the watcher has been cancelled.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, Sleep};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::loader::WorldLoader;
use crate::models::{WorldSnapshot, WorldStatus};
use crate::source::{ChangeEvent, EventSource, EventStream, SourceError};

// ============================================================
// Snapshot store
// ============================================================

/// One committed snapshot and the refresh that produced it.
#[derive(Debug, Clone)]
pub struct Published {
    pub generation: u64,
    pub snapshot: Arc<WorldSnapshot>,
}

/// Summary of the current snapshot, as served by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStatus {
    pub status: WorldStatus,
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

struct StoreInner {
    sender: watch::Sender<Published>,
    next_generation: AtomicU64,
    closed: AtomicBool,
}

/// The current snapshot, replaced whole on every commit.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<StoreInner>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(WorldSnapshot::initial())
    }
}

impl SnapshotStore {
    pub fn new(snapshot: WorldSnapshot) -> Self {
        let (sender, _) = watch::channel(Published {
            generation: 0,
            snapshot: Arc::new(snapshot),
        });
        Self {
            inner: Arc::new(StoreInner {
                sender,
                next_generation: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn current(&self) -> Arc<WorldSnapshot> {
        self.inner.sender.borrow().snapshot.clone()
    }

    pub fn published(&self) -> Published {
        self.inner.sender.borrow().clone()
    }

    pub fn status(&self) -> StoreStatus {
        let published = self.inner.sender.borrow();
        StoreStatus {
            status: published.snapshot.status(),
            generation: published.generation,
            updated_at: published.snapshot.updated_at,
        }
    }

    /// Receiver notified on every commit.
    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.inner.sender.subscribe()
    }

    /// Reserve the generation number for a refresh that is starting now.
    pub fn begin(&self) -> u64 {
        self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commit `snapshot` as the result of refresh `generation`.
    pub fn commit(&self, generation: u64, snapshot: WorldSnapshot) -> bool {
        self.commit_with(generation, move |_| snapshot)
    }

    /// Commit the snapshot built from the current one. Returns false, leaving
    /// the store untouched, if a newer generation is already committed or the
    /// store is closed.
    pub fn commit_with(
        &self,
        generation: u64,
        build: impl FnOnce(&WorldSnapshot) -> WorldSnapshot,
    ) -> bool {
        let closed = &self.inner.closed;
        self.inner.sender.send_if_modified(|current| {
            if closed.load(Ordering::SeqCst) || generation <= current.generation {
                return false;
            }
            let snapshot = build(&current.snapshot);
            *current = Published {
                generation,
                snapshot: Arc::new(snapshot),
            };
            true
        })
    }

    /// Show the current contents as loading, without taking a generation.
    pub fn mark_loading(&self) {
        let closed = &self.inner.closed;
        self.inner.sender.send_if_modified(|current| {
            if closed.load(Ordering::SeqCst) {
                return false;
            }
            current.snapshot = Arc::new(WorldSnapshot::loading(&current.snapshot));
            true
        });
    }

    /// Refuse all further commits.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

/// Run one refresh against `store`. Returns whether its result was committed.
pub async fn refresh(loader: WorldLoader, store: SnapshotStore) -> bool {
    let generation = store.begin();
    let committed = match loader.try_fetch().await {
        Ok(snapshot) => store.commit(generation, snapshot),
        Err(e) => {
            tracing::warn!("World refresh {} failed: {}", generation, e);
            store.commit_with(generation, WorldSnapshot::failed)
        }
    };
    if !committed {
        tracing::debug!("Discarded world refresh {}: superseded or cancelled", generation);
    }
    committed
}

// ============================================================
// Listener
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerState {
    #[default]
    Idle,
    Listening,
    Debouncing,
    Refreshing,
    Retrying,
}

impl ListenerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerState::Idle => "idle",
            ListenerState::Listening => "listening",
            ListenerState::Debouncing => "debouncing",
            ListenerState::Refreshing => "refreshing",
            ListenerState::Retrying => "retrying",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Quiet period required after the last qualifying event.
    pub debounce: Duration,
    /// Wait before re-subscribing after the feed fails.
    pub retry: Duration,
    /// File changes under this prefix trigger a refresh.
    pub world_root: String,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl WatcherConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.debounce(),
            retry: config.retry(),
            world_root: config.world_root.clone(),
        }
    }
}

pub struct WorldWatcher {
    loader: WorldLoader,
    events: Arc<dyn EventSource>,
    config: WatcherConfig,
    store: SnapshotStore,
}

impl WorldWatcher {
    pub fn new(loader: WorldLoader, events: Arc<dyn EventSource>, config: WatcherConfig) -> Self {
        Self {
            loader,
            events,
            config,
            store: SnapshotStore::default(),
        }
    }

    /// Publish into an existing store instead of a fresh one.
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = store;
        self
    }

    /// Mark the store loading, start the initial refresh and begin listening.
    pub fn start(self) -> WatchHandle {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(ListenerState::Idle);
        let store = self.store.clone();
        let loader = self.loader.clone();

        store.mark_loading();
        let task = tokio::spawn(self.run(cancel.clone(), state_tx));

        WatchHandle {
            store,
            loader,
            state: state_rx,
            cancel,
            task,
        }
    }

    async fn run(self, cancel: CancellationToken, state: watch::Sender<ListenerState>) {
        let mut refreshes = JoinSet::new();
        let mut deadline: Option<Instant> = None;
        let mut link = Link::connect(self.events.clone(), false);

        refreshes.spawn(refresh(self.loader.clone(), self.store.clone()));

        loop {
            publish_state(&state, &link, deadline, &refreshes);

            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                Some(_) = refreshes.join_next(), if !refreshes.is_empty() => {}

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    tracing::debug!("Change events settled; refreshing world");
                    refreshes.spawn(refresh(self.loader.clone(), self.store.clone()));
                }

                step = link.next() => match step {
                    LinkStep::Subscribed(Ok(stream)) => {
                        tracing::info!("Subscribed to change events");
                        link = Link::Connected(stream);
                    }
                    LinkStep::Subscribed(Err(e)) => {
                        tracing::warn!(
                            "Failed to subscribe to change events, retrying in {:?}: {}",
                            self.config.retry,
                            e
                        );
                        link = Link::backoff(self.config.retry);
                    }
                    LinkStep::Event(Some(Ok(event))) => {
                        if event.triggers_refresh(&self.config.world_root) {
                            tracing::trace!("Qualifying change event: {:?}", event);
                            deadline = Some(Instant::now() + self.config.debounce);
                        }
                    }
                    LinkStep::Event(Some(Err(e))) => {
                        tracing::warn!(
                            "Change event stream failed, retrying in {:?}: {}",
                            self.config.retry,
                            e
                        );
                        link = Link::backoff(self.config.retry);
                    }
                    LinkStep::Event(None) => {
                        tracing::warn!(
                            "Change event stream closed, retrying in {:?}",
                            self.config.retry
                        );
                        link = Link::backoff(self.config.retry);
                    }
                    LinkStep::RetryDue => {
                        link = Link::connect(self.events.clone(), true);
                    }
                },
            }
        }

        // In-flight refreshes may finish; the closed store discards them.
        refreshes.detach_all();
        state.send_replace(ListenerState::Idle);
        tracing::info!("Stopped watching world changes");
    }
}

type Subscribing = Pin<Box<dyn Future<Output = Result<EventStream, SourceError>> + Send>>;

/// Where the watcher is with its event subscription.
enum Link {
    Connecting {
        attempt: Subscribing,
        reconnect: bool,
    },
    Connected(EventStream),
    Waiting(Pin<Box<Sleep>>),
}

enum LinkStep {
    Subscribed(Result<EventStream, SourceError>),
    Event(Option<Result<ChangeEvent, SourceError>>),
    RetryDue,
}

impl Link {
    fn connect(events: Arc<dyn EventSource>, reconnect: bool) -> Self {
        Link::Connecting {
            attempt: Box::pin(async move { events.subscribe().await }),
            reconnect,
        }
    }

    fn is_retrying(&self) -> bool {
        matches!(
            self,
            Link::Waiting(_) | Link::Connecting { reconnect: true, .. }
        )
    }

    fn backoff(retry: Duration) -> Self {
        Link::Waiting(Box::pin(tokio::time::sleep(retry)))
    }

    async fn next(&mut self) -> LinkStep {
        match self {
            Link::Connecting { attempt, .. } => LinkStep::Subscribed(attempt.await),
            Link::Connected(stream) => LinkStep::Event(stream.next().await),
            Link::Waiting(sleep) => {
                sleep.await;
                LinkStep::RetryDue
            }
        }
    }
}

fn publish_state(
    state: &watch::Sender<ListenerState>,
    link: &Link,
    deadline: Option<Instant>,
    refreshes: &JoinSet<bool>,
) {
    let next = if !refreshes.is_empty() {
        ListenerState::Refreshing
    } else if link.is_retrying() {
        ListenerState::Retrying
    } else if deadline.is_some() {
        ListenerState::Debouncing
    } else if matches!(link, Link::Connected(_)) {
        ListenerState::Listening
    } else {
        ListenerState::Idle
    };
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}

// ============================================================
// Handle
// ============================================================

/// Control over a running [`WorldWatcher`].
pub struct WatchHandle {
    store: SnapshotStore,
    loader: WorldLoader,
    state: watch::Receiver<ListenerState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatchHandle {
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    pub fn state_receiver(&self) -> watch::Receiver<ListenerState> {
        self.state.clone()
    }

    /// Start a refresh now, outside the debounce timer.
    pub fn refresh_now(&self) -> JoinHandle<bool> {
        tokio::spawn(refresh(self.loader.clone(), self.store.clone()))
    }

    /// Stop listening. A refresh already running finishes, but its result is
    /// discarded.
    pub fn cancel(&self) {
        self.store.close();
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait for the listener task to exit.
    pub async fn shutdown(self) {
        self.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!("World watcher task ended abnormally: {}", e);
        }
    }
}
