//! Bounded-concurrency priority queue for image loads
//!
//! Owns the per-image status map, the pending request list and the
//! in-flight counter. A request leaves `pending` in the same step its status
//! becomes [`LoadStatus::Loading`], so the two views never disagree.

use super::priority::Priority;
use std::collections::HashMap;

/// Load status of one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadStatus {
    /// Known but not yet admitted
    #[default]
    Idle,
    /// Admitted, a worker is fetching it
    Loading,
    /// Fetched and decoded
    Loaded,
    /// The attempt failed
    Error,
}

impl LoadStatus {
    /// Whether no further automatic transition happens
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::Error)
    }
}

/// A pending or admitted load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Image id
    pub id: String,
    /// Source URL
    pub url: String,
    /// Load priority
    pub priority: Priority,
}

/// Per-image status record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState {
    pub id: String,
    pub status: LoadStatus,
    pub priority: Priority,
    pub url: String,
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub pending: usize,
    pub in_flight: usize,
    pub max_concurrent: usize,
    pub loaded: usize,
    pub failed: usize,
}

/// Priority queue for image loading
#[derive(Debug)]
pub struct LoadQueue {
    /// Status record per id
    states: HashMap<String, LoadState>,
    /// Requests waiting for admission, in arrival order
    pending: Vec<LoadRequest>,
    /// Maximum concurrent loads
    max_concurrent: usize,
    /// Currently in-flight loads
    in_flight: usize,
}

impl LoadQueue {
    /// Create a queue admitting at most `max_concurrent` loads at once
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            states: HashMap::new(),
            pending: Vec::new(),
            max_concurrent: max_concurrent.max(1),
            in_flight: 0,
        }
    }

    /// Ask for an image to be loaded.
    ///
    /// Returns `true` when a new pending request was recorded. Ids that are
    /// already pending, loading, loaded or failed are left untouched; a
    /// failed id only comes back through [`LoadQueue::retry`].
    pub fn enqueue(&mut self, id: &str, url: &str, priority: Priority) -> bool {
        if let Some(state) = self.states.get(id) {
            if state.status != LoadStatus::Idle || self.is_pending(id) {
                return false;
            }
        }

        self.states
            .entry(id.to_string())
            .or_insert_with(|| LoadState {
                id: id.to_string(),
                status: LoadStatus::Idle,
                priority,
                url: url.to_string(),
            });
        self.pending.push(LoadRequest {
            id: id.to_string(),
            url: url.to_string(),
            priority,
        });
        true
    }

    /// Run one admission step, returning the requests to dispatch
    pub fn admit(&mut self) -> Vec<LoadRequest> {
        let available = self.max_concurrent.saturating_sub(self.in_flight);
        if available == 0 || self.pending.is_empty() {
            return Vec::new();
        }

        // Stable sort: equal priorities keep arrival order
        self.pending.sort_by_key(|request| request.priority);
        let take = available.min(self.pending.len());
        let batch: Vec<LoadRequest> = self.pending.drain(..take).collect();

        for request in &batch {
            if let Some(state) = self.states.get_mut(&request.id) {
                state.status = LoadStatus::Loading;
            }
        }
        self.in_flight += batch.len();
        batch
    }

    /// Record a worker's terminal outcome.
    ///
    /// Returns `false` (and changes nothing) when `id` is not loading.
    pub fn complete(&mut self, id: &str, succeeded: bool) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        if state.status != LoadStatus::Loading {
            return false;
        }

        state.status = if succeeded {
            LoadStatus::Loaded
        } else {
            LoadStatus::Error
        };
        self.in_flight = self.in_flight.saturating_sub(1);
        true
    }

    /// Put a failed image back in line at its recorded priority
    pub fn retry(&mut self, id: &str) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            return false;
        };
        if state.status != LoadStatus::Error {
            return false;
        }

        state.status = LoadStatus::Idle;
        let request = LoadRequest {
            id: state.id.clone(),
            url: state.url.clone(),
            priority: state.priority,
        };
        self.pending.push(request);
        true
    }

    /// Current status, `Idle` when the id is not tracked
    pub fn status(&self, id: &str) -> LoadStatus {
        self.states
            .get(id)
            .map(|state| state.status)
            .unwrap_or_default()
    }

    /// Full status record for an id
    pub fn state(&self, id: &str) -> Option<&LoadState> {
        self.states.get(id)
    }

    /// Whether `id` is waiting for admission
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.iter().any(|request| request.id == id)
    }

    /// Number of loads currently in flight
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Configured concurrency budget
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Get queue length
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Nothing pending and nothing in flight
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }

    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        let count = |status: LoadStatus| self.states.values().filter(|s| s.status == status).count();
        QueueStats {
            pending: self.pending.len(),
            in_flight: self.in_flight,
            max_concurrent: self.max_concurrent,
            loaded: count(LoadStatus::Loaded),
            failed: count(LoadStatus::Error),
        }
    }
}

impl Default for LoadQueue {
    fn default() -> Self {
        Self::new(super::DEFAULT_MAX_CONCURRENT)
    }
}
