//! Async driver for the load queue
//!
//! A [`LoadScheduler`] owns one [`LoadQueue`] plus the decoded image store.
//! Admission runs on a fixed cadence so a burst of enqueues landing in the
//! same tick is sorted together before any slot is committed. Completions
//! are applied under the state lock and only while the scheduler is alive;
//! `shutdown` takes the same lock before revoking, so no worker can slip a
//! write in after it returns.

use super::LoaderConfig;
use super::priority::Priority;
use super::queue::{LoadQueue, LoadRequest, LoadState, LoadStatus, QueueStats};
use super::worker::{DecodedImage, FetchWorker, ImageFetcher, Liveness, LoadOutcome};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Called after every state change, e.g. to request a repaint
pub type ChangeNotifier = Arc<dyn Fn() + Send + Sync>;

/// Everything guarded by the scheduler lock
#[derive(Debug, Default)]
struct LoaderState {
    queue: LoadQueue,
    images: HashMap<String, Arc<DecodedImage>>,
    failures: HashMap<String, String>,
}

fn lock(state: &Mutex<LoaderState>) -> MutexGuard<'_, LoaderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared pieces handed to the ticker and to each worker task
#[derive(Clone)]
struct Dispatcher {
    state: Arc<Mutex<LoaderState>>,
    fetcher: Arc<dyn ImageFetcher>,
    liveness: Liveness,
    notifier: Option<ChangeNotifier>,
    fetch_timeout: Duration,
}

impl Dispatcher {
    /// One admission step: move what fits from pending to in-flight
    fn admission_step(&self) -> usize {
        let batch = {
            let mut state = lock(&self.state);
            if !self.liveness.is_alive() {
                return 0;
            }
            state.queue.admit()
        };
        if batch.is_empty() {
            return 0;
        }

        log::debug!(
            "admitting {} load(s): {}",
            batch.len(),
            batch
                .iter()
                .map(|r| format!("{}@{}", r.id, r.priority))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let admitted = batch.len();
        for request in batch {
            let worker = FetchWorker::new(
                Arc::clone(&self.fetcher),
                request,
                self.fetch_timeout,
                self.liveness.clone(),
            );
            let dispatcher = self.clone();
            tokio::spawn(async move {
                if let Some((request, outcome)) = worker.run().await {
                    dispatcher.apply(request, outcome);
                }
            });
        }
        self.notify();
        admitted
    }

    fn apply(&self, request: LoadRequest, outcome: LoadOutcome) {
        {
            let mut state = lock(&self.state);
            if !self.liveness.is_alive() {
                return;
            }
            if !state.queue.complete(&request.id, outcome.is_loaded()) {
                log::warn!("ignoring completion for {} (not loading)", request.id);
                return;
            }
            match outcome {
                LoadOutcome::Loaded(image) => {
                    log::debug!("loaded {} ({}x{})", request.id, image.width, image.height);
                    state.failures.remove(&request.id);
                    state.images.insert(request.id, image);
                }
                LoadOutcome::Failed(reason) => {
                    log::warn!("failed to load {} from {}: {}", request.id, request.url, reason);
                    state.failures.insert(request.id, reason);
                }
            }
        }
        self.notify();
    }

    fn notify(&self) {
        if let Some(notifier) = &self.notifier {
            notifier();
        }
    }
}

/// Bounded-concurrency, priority-ordered image loader
pub struct LoadScheduler {
    dispatcher: Dispatcher,
    tick_interval: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl LoadScheduler {
    /// Create a scheduler. Nothing is admitted until [`LoadScheduler::start`].
    pub fn new(config: &LoaderConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let state = LoaderState {
            queue: LoadQueue::new(config.max_concurrent),
            ..LoaderState::default()
        };
        Self {
            dispatcher: Dispatcher {
                state: Arc::new(Mutex::new(state)),
                fetcher,
                liveness: Liveness::new(),
                notifier: None,
                fetch_timeout: config.fetch_timeout(),
            },
            tick_interval: config.tick_interval(),
            ticker: None,
        }
    }

    /// Install a change notifier
    pub fn with_notifier(mut self, notifier: ChangeNotifier) -> Self {
        self.dispatcher.notifier = Some(notifier);
        self
    }

    /// Start the admission timer on `handle`
    pub fn start(&mut self, handle: &Handle) {
        if self.ticker.is_some() || !self.dispatcher.liveness.is_alive() {
            return;
        }

        let dispatcher = self.dispatcher.clone();
        let period = self.tick_interval;
        self.ticker = Some(handle.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !dispatcher.liveness.is_alive() {
                    break;
                }
                dispatcher.admission_step();
            }
        }));
        log::debug!("load scheduler started, tick {:?}", period);
    }

    /// Ask for an image to be loaded at the next admission tick
    pub fn enqueue(&self, id: &str, url: &str, priority: Priority) -> bool {
        if !self.dispatcher.liveness.is_alive() {
            return false;
        }
        lock(&self.dispatcher.state).queue.enqueue(id, url, priority)
    }

    /// Manually retry a failed image
    pub fn retry(&self, id: &str) -> bool {
        if !self.dispatcher.liveness.is_alive() {
            return false;
        }
        let mut state = lock(&self.dispatcher.state);
        let retried = state.queue.retry(id);
        if retried {
            state.failures.remove(id);
            log::info!("retrying {}", id);
        }
        retried
    }

    /// Current status, `Idle` when untracked
    pub fn status(&self, id: &str) -> LoadStatus {
        lock(&self.dispatcher.state).queue.status(id)
    }

    /// Whether `id` is queued and waiting for admission
    pub fn is_pending(&self, id: &str) -> bool {
        lock(&self.dispatcher.state).queue.is_pending(id)
    }

    /// Full status record, `None` when untracked
    pub fn load_state(&self, id: &str) -> Option<LoadState> {
        lock(&self.dispatcher.state).queue.state(id).cloned()
    }

    /// Decoded pixels for a loaded image
    pub fn image(&self, id: &str) -> Option<Arc<DecodedImage>> {
        lock(&self.dispatcher.state).images.get(id).cloned()
    }

    /// Failure reason for an image in `Error`
    pub fn failure(&self, id: &str) -> Option<String> {
        lock(&self.dispatcher.state).failures.get(id).cloned()
    }

    /// Queue statistics
    pub fn stats(&self) -> QueueStats {
        lock(&self.dispatcher.state).queue.stats()
    }

    /// Nothing pending and nothing in flight
    pub fn is_settled(&self) -> bool {
        lock(&self.dispatcher.state).queue.is_settled()
    }

    /// Whether the admission timer is active
    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Whether the scheduler still accepts work
    pub fn is_alive(&self) -> bool {
        self.dispatcher.liveness.is_alive()
    }

    /// Stop the timer and discard every later worker result.
    ///
    /// In-flight fetches are not aborted; their results are dropped.
    pub fn shutdown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        let state = lock(&self.dispatcher.state);
        if self.dispatcher.liveness.revoke() {
            log::info!(
                "load scheduler shut down ({} in flight, {} pending)",
                state.queue.in_flight(),
                state.queue.len()
            );
        }
    }
}

impl Drop for LoadScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
