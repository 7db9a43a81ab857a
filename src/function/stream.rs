//! Result Stream
//!
//! The queue that carries results from the collector (called on the cluster
//! client's threads) to the dispatcher (running on the caller's runtime).
//!
//! ```text
//!   collector ──append/close──▶ [VecDeque<ResultItem>] ──drain──▶ dispatcher
//!                   │                                       ▲
//!                   └──────────── wake (Notify) ────────────┘
//! ```
//!
//! Wake-ups coalesce: a single `woken()` may cover many appends, so the consumer
//! always drains to empty. The state sits behind a `std::sync::Mutex` that is
//! never held across an await.

use super::types::ResultItem;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

struct StreamState {
    items: VecDeque<ResultItem>,
    closed: bool,
}

pub struct ResultStream {
    state: Mutex<StreamState>,
    wake: Notify,
}

impl ResultStream {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StreamState {
                items: VecDeque::new(),
                closed: false,
            }),
            wake: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Producer side. Appends an item and wakes the consumer.
    ///
    /// Returns `false` without appending if the stream is already closed.
    pub fn append(&self, item: ResultItem) -> bool {
        {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            state.items.push_back(item);
        }

        self.wake.notify_one();
        true
    }

    /// Producer side. Marks the stream closed and wakes the consumer one last time.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let newly_closed = {
            let mut state = self.lock();
            !std::mem::replace(&mut state.closed, true)
        };

        if newly_closed {
            self.wake.notify_one();
        }
        newly_closed
    }

    /// Consumer side. Takes every item appended since the last drain, in arrival order.
    pub fn drain(&self) -> Vec<ResultItem> {
        self.lock().items.drain(..).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Consumer side. Resolves once an append or close happened since the last wake.
    pub async fn woken(&self) {
        self.wake.notified().await
    }
}

impl Default for ResultStream {
    fn default() -> Self {
        Self::new()
    }
}
