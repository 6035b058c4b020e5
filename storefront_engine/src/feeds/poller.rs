use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use log::*;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use crate::{errors::ApiError, feeds::FeedSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What a poller currently knows about its feed.
#[derive(Debug, Clone)]
pub struct FeedSnapshot<I> {
    pub status: FeedStatus,
    /// The last successfully fetched list. Survives failed refreshes.
    pub items: Vec<I>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// The request generation `items` came from. Results from older requests are never applied over it.
    pub generation: u64,
}

impl<I> Default for FeedSnapshot<I> {
    fn default() -> Self {
        Self { status: FeedStatus::Idle, items: Vec::new(), error: None, last_updated: None, generation: 0 }
    }
}

impl<I> FeedSnapshot<I> {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }
}

struct PollerState<F: FeedSource> {
    source: F,
    snapshot: watch::Sender<FeedSnapshot<F::Item>>,
    active: AtomicBool,
    issued: AtomicU64,
}

/// Periodically re-fetches a [`FeedSource`] and publishes the result as a [`FeedSnapshot`].
///
/// Every fetch is tagged with a generation number when it is issued. A response is applied only if the poller is
/// still active and no later-issued request has already been applied, so overlapping timer and manual refreshes
/// resolve to the later request. Once [`stop`](Self::stop) is called, late responses are dropped on arrival.
pub struct FeedPoller<F: FeedSource> {
    state: Arc<PollerState<F>>,
}

impl<F: FeedSource> Clone for FeedPoller<F> {
    fn clone(&self) -> Self {
        Self { state: Arc::clone(&self.state) }
    }
}

impl<F: FeedSource> FeedPoller<F> {
    pub fn new(source: F) -> Self {
        let (snapshot, _) = watch::channel(FeedSnapshot::default());
        let state = PollerState { source, snapshot, active: AtomicBool::new(true), issued: AtomicU64::new(0) };
        Self { state: Arc::new(state) }
    }

    pub fn snapshot(&self) -> FeedSnapshot<F::Item> {
        self.state.snapshot.borrow().clone()
    }

    /// A receiver that is notified whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot<F::Item>> {
        self.state.snapshot.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Tears the poller down. Pending and future responses are discarded; a stopped poller cannot be restarted.
    pub fn stop(&self) {
        if self.state.active.swap(false, Ordering::SeqCst) {
            debug!("🔔️ Stopped polling {}", self.state.source.name());
        }
    }

    fn next_generation(&self) -> u64 {
        self.state.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetches the feed once and applies the result. Failures are recorded in the snapshot, not returned.
    pub async fn refresh(&self) -> FeedSnapshot<F::Item> {
        if !self.is_active() {
            return self.snapshot();
        }
        let generation = self.next_generation();
        self.state.snapshot.send_modify(|s| {
            s.status = FeedStatus::Loading;
        });
        trace!("🔔️ Refreshing {} (request {generation})", self.state.source.name());
        let result = self.state.source.fetch().await;
        self.apply(generation, result);
        self.snapshot()
    }

    fn apply(&self, generation: u64, result: Result<Vec<F::Item>, ApiError>) {
        let name = self.state.source.name();
        self.state.snapshot.send_if_modified(|s| {
            if !self.is_active() {
                warn!("🔔️ Discarding a {name} response that arrived after the poller was stopped");
                return false;
            }
            if generation < s.generation {
                warn!("🔔️ Discarding a stale {name} response (request {generation}, showing {})", s.generation);
                return false;
            }
            match result {
                Ok(items) => {
                    debug!("🔔️ {} {name}", items.len());
                    s.items = items;
                    s.error = None;
                    s.status = FeedStatus::Loaded;
                    s.last_updated = Some(Utc::now());
                },
                Err(e) => {
                    warn!("🔔️ Could not refresh {name}. {e}");
                    s.error = Some(e.to_string());
                    s.status = FeedStatus::Failed;
                },
            }
            s.generation = generation;
            true
        });
    }

    /// Empties the feed on the server, then resets the local list without re-fetching. On failure the displayed
    /// items are left alone and the error is both recorded and returned.
    pub async fn clear(&self) -> Result<(), ApiError> {
        let name = self.state.source.name();
        let generation = self.next_generation();
        match self.state.source.clear().await {
            Ok(()) => {
                self.state.snapshot.send_if_modified(|s| {
                    if !self.is_active() {
                        return false;
                    }
                    s.items.clear();
                    s.error = None;
                    s.status = FeedStatus::Loaded;
                    s.last_updated = Some(Utc::now());
                    s.generation = s.generation.max(generation);
                    true
                });
                Ok(())
            },
            Err(e) => {
                error!("🔔️ Could not clear {name}. {e}");
                let message = e.to_string();
                self.state.snapshot.send_if_modified(|s| {
                    if !self.is_active() {
                        return false;
                    }
                    s.error = Some(message);
                    s.status = FeedStatus::Failed;
                    true
                });
                Err(e)
            },
        }
    }

    /// Spawns the polling task: one fetch immediately, then one per interval tick, until the handle is stopped or
    /// dropped.
    pub fn start(&self) -> PollerHandle {
        let poller = self.clone();
        let period = self.state.source.interval();
        let name = self.state.source.name();
        let task = tokio::spawn(async move {
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("🔔️ Polling {name} every {}s", period.as_secs());
            loop {
                timer.tick().await;
                if !poller.is_active() {
                    break;
                }
                poller.refresh().await;
            }
            debug!("🔔️ Polling task for {name} has ended");
        });
        let poller = self.clone();
        PollerHandle { task: Some(task), stop: Box::new(move || poller.stop()) }
    }
}

/// Owns a running polling task. Stopping (or dropping) the handle stops the poller and aborts the task.
pub struct PollerHandle {
    task: Option<JoinHandle<()>>,
    stop: Box<dyn Fn() + Send + Sync>,
}

impl PollerHandle {
    pub fn stop(&mut self) {
        (self.stop)();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
